//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el workflow
//! de ventas, el inventario con sus guardas, las métricas del dashboard y
//! la gestión de clientes y usuarios.

pub mod customer_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod sale_service;
pub mod transaction_search;
pub mod user_service;

pub use customer_service::CustomerService;
pub use dashboard_service::DashboardService;
pub use inventory_service::InventoryService;
pub use sale_service::SaleService;
pub use transaction_search::SearchCriteria;
pub use user_service::UserService;
