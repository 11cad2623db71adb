//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle como snapshot inmutable y la
//! máquina de estados de venta. Las transiciones validan sus guardas y
//! devuelven un snapshot nuevo; el snapshot actual nunca se muta, así el
//! workflow decide qué versión persistir dentro de un commit atómico.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::Entity;

/// Estado de venta del vehículo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available,
    Reserved,
    Sold,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::Reserved => "RESERVED",
            VehicleStatus::Sold => "SOLD",
            VehicleStatus::Maintenance => "MAINTENANCE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AVAILABLE" => Some(VehicleStatus::Available),
            "RESERVED" => Some(VehicleStatus::Reserved),
            "SOLD" => Some(VehicleStatus::Sold),
            "MAINTENANCE" => Some(VehicleStatus::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores de transición de la máquina de estados.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("illegal status transition from {from} to {to}")]
    Illegal {
        from: VehicleStatus,
        to: VehicleStatus,
    },

    #[error("a reservation requires an associated customer")]
    MissingCustomer,

    #[error("a reservation requires a deposit greater than zero")]
    InvalidDeposit,
}

/// Vehicle principal - una fila de la colección `vehicles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub listing_price: Decimal,
    pub cost_price: Option<Decimal>,
    pub mileage: i32,
    pub color: String,
    pub vin: String,
    pub status: VehicleStatus,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub date_added: DateTime<Utc>,
    pub reserved_customer_id: Option<String>,
    pub deposit_amount: Option<Decimal>,
}

impl Entity for Vehicle {
    const COLLECTION: &'static str = "vehicles";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Vehicle {
    /// AVAILABLE|MAINTENANCE → RESERVED. Requiere cliente y depósito > 0;
    /// deja ambos campos en el snapshot nuevo.
    pub fn reserve(&self, customer_id: &str, deposit: Decimal) -> Result<Vehicle, TransitionError> {
        if !matches!(
            self.status,
            VehicleStatus::Available | VehicleStatus::Maintenance
        ) {
            return Err(TransitionError::Illegal {
                from: self.status,
                to: VehicleStatus::Reserved,
            });
        }
        if customer_id.trim().is_empty() {
            return Err(TransitionError::MissingCustomer);
        }
        if deposit <= Decimal::ZERO {
            return Err(TransitionError::InvalidDeposit);
        }

        let mut next = self.clone();
        next.status = VehicleStatus::Reserved;
        next.reserved_customer_id = Some(customer_id.trim().to_string());
        next.deposit_amount = Some(deposit);
        Ok(next)
    }

    /// RESERVED → AVAILABLE. Limpia cliente y depósito; el SaleRecord
    /// abierto lo retira el workflow, no esta transición.
    pub fn cancel_reservation(&self) -> Result<Vehicle, TransitionError> {
        if self.status != VehicleStatus::Reserved {
            return Err(TransitionError::Illegal {
                from: self.status,
                to: VehicleStatus::Available,
            });
        }

        let mut next = self.clone();
        next.status = VehicleStatus::Available;
        next.reserved_customer_id = None;
        next.deposit_amount = None;
        Ok(next)
    }

    /// RESERVED → SOLD. Los campos de reserva son datos de preparación de la
    /// venta, no del registro de venta: se limpian al completar.
    pub fn complete_reservation(&self) -> Result<Vehicle, TransitionError> {
        if self.status != VehicleStatus::Reserved {
            return Err(TransitionError::Illegal {
                from: self.status,
                to: VehicleStatus::Sold,
            });
        }

        let mut next = self.clone();
        next.status = VehicleStatus::Sold;
        next.reserved_customer_id = None;
        next.deposit_amount = None;
        Ok(next)
    }

    /// AVAILABLE|MAINTENANCE → SOLD (venta directa). No toca los campos de
    /// reserva; el SaleRecord lleva cliente y precio.
    pub fn mark_sold(&self) -> Result<Vehicle, TransitionError> {
        if !matches!(
            self.status,
            VehicleStatus::Available | VehicleStatus::Maintenance
        ) {
            return Err(TransitionError::Illegal {
                from: self.status,
                to: VehicleStatus::Sold,
            });
        }

        let mut next = self.clone();
        next.status = VehicleStatus::Sold;
        Ok(next)
    }

    /// ¿Puede un update plano cambiar el estado de `from` a `to`?
    /// Solo AVAILABLE ↔ MAINTENANCE; entrar o salir de RESERVED/SOLD pasa
    /// exclusivamente por el workflow de ventas.
    pub fn plain_edit_allowed(from: VehicleStatus, to: VehicleStatus) -> bool {
        matches!(
            (from, to),
            (VehicleStatus::Available, VehicleStatus::Maintenance)
                | (VehicleStatus::Maintenance, VehicleStatus::Available)
        )
    }

    /// Descriptor "{año} {marca} {modelo}" usado por la búsqueda de transacciones.
    pub fn descriptor(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    /// Invariante de reserva: RESERVED ⇔ cliente presente y depósito > 0.
    pub fn reservation_invariant_holds(&self) -> bool {
        match self.status {
            VehicleStatus::Reserved => {
                self.reserved_customer_id
                    .as_deref()
                    .map(|c| !c.trim().is_empty())
                    .unwrap_or(false)
                    && self.deposit_amount.map(|d| d > Decimal::ZERO).unwrap_or(false)
            }
            _ => self.reserved_customer_id.is_none() && self.deposit_amount.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn vehicle(status: VehicleStatus) -> Vehicle {
        Vehicle {
            id: "v-1".to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2020,
            listing_price: dec(100_000),
            cost_price: Some(dec(80_000)),
            mileage: 42_000,
            color: "Blanco".to_string(),
            vin: "JTDBR32E720123456".to_string(),
            status,
            description: None,
            image_url: None,
            date_added: Utc::now(),
            reserved_customer_id: None,
            deposit_amount: None,
        }
    }

    #[test]
    fn reserve_from_available_sets_fields() {
        let v = vehicle(VehicleStatus::Available);
        let reserved = v.reserve("c-1", dec(5_000)).unwrap();

        assert_eq!(reserved.status, VehicleStatus::Reserved);
        assert_eq!(reserved.reserved_customer_id.as_deref(), Some("c-1"));
        assert_eq!(reserved.deposit_amount, Some(dec(5_000)));
        assert!(reserved.reservation_invariant_holds());
        // El snapshot original no cambia
        assert_eq!(v.status, VehicleStatus::Available);
    }

    #[test]
    fn reserve_from_maintenance_is_legal() {
        let v = vehicle(VehicleStatus::Maintenance);
        assert!(v.reserve("c-1", dec(1)).is_ok());
    }

    #[test]
    fn reserve_requires_positive_deposit() {
        let v = vehicle(VehicleStatus::Available);
        assert_eq!(
            v.reserve("c-1", Decimal::ZERO).unwrap_err(),
            TransitionError::InvalidDeposit
        );
        assert_eq!(
            v.reserve("  ", dec(100)).unwrap_err(),
            TransitionError::MissingCustomer
        );
    }

    #[test]
    fn reserve_from_sold_is_illegal() {
        let v = vehicle(VehicleStatus::Sold);
        assert!(matches!(
            v.reserve("c-1", dec(100)).unwrap_err(),
            TransitionError::Illegal { .. }
        ));
    }

    #[test]
    fn cancel_clears_reservation_fields() {
        let v = vehicle(VehicleStatus::Available)
            .reserve("c-1", dec(5_000))
            .unwrap();
        let back = v.cancel_reservation().unwrap();

        assert_eq!(back.status, VehicleStatus::Available);
        assert!(back.reserved_customer_id.is_none());
        assert!(back.deposit_amount.is_none());
        assert!(back.reservation_invariant_holds());
    }

    #[test]
    fn cancel_only_from_reserved() {
        let v = vehicle(VehicleStatus::Available);
        assert!(v.cancel_reservation().is_err());
    }

    #[test]
    fn complete_reservation_clears_staging_fields() {
        let v = vehicle(VehicleStatus::Available)
            .reserve("c-1", dec(5_000))
            .unwrap();
        let sold = v.complete_reservation().unwrap();

        assert_eq!(sold.status, VehicleStatus::Sold);
        assert!(sold.reserved_customer_id.is_none());
        assert!(sold.deposit_amount.is_none());
    }

    #[test]
    fn sold_is_terminal() {
        let v = vehicle(VehicleStatus::Sold);
        assert!(v.mark_sold().is_err());
        assert!(v.reserve("c-1", dec(1)).is_err());
        assert!(v.cancel_reservation().is_err());
        assert!(v.complete_reservation().is_err());
    }

    #[test]
    fn plain_edit_only_toggles_maintenance() {
        use VehicleStatus::*;
        assert!(Vehicle::plain_edit_allowed(Available, Maintenance));
        assert!(Vehicle::plain_edit_allowed(Maintenance, Available));
        assert!(!Vehicle::plain_edit_allowed(Available, Sold));
        assert!(!Vehicle::plain_edit_allowed(Available, Reserved));
        assert!(!Vehicle::plain_edit_allowed(Reserved, Available));
        assert!(!Vehicle::plain_edit_allowed(Sold, Available));
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&VehicleStatus::Reserved).unwrap();
        assert_eq!(json, "\"RESERVED\"");
        assert_eq!(VehicleStatus::parse("MAINTENANCE"), Some(VehicleStatus::Maintenance));
        assert_eq!(VehicleStatus::parse("pending"), None);
    }
}
