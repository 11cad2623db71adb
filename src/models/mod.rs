//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos de la concesionaria y la
//! máquina de estados de venta del vehículo.

pub mod customer;
pub mod sale_record;
pub mod user;
pub mod vehicle;

pub use customer::{Customer, CustomerCategory};
pub use sale_record::{SaleRecord, SaleStatus};
pub use user::User;
pub use vehicle::{TransitionError, Vehicle, VehicleStatus};
