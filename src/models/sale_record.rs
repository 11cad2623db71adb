//! Modelo de SaleRecord
//!
//! Entrada del libro de ventas: una por reserva o venta directa. Un registro
//! RESERVED es la reserva abierta de su vehículo; al completarse fija
//! `final_price` y no vuelve a mutar. Al cancelarse queda en CANCELLED como
//! rastro de auditoría en lugar de borrarse.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// Estado del registro de venta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Reserved,
    Completed,
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Reserved => "RESERVED",
            SaleStatus::Completed => "COMPLETED",
            SaleStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: String,
    pub vehicle_id: String,
    pub customer_id: String,
    pub agreed_price: Decimal,
    pub final_price: Option<Decimal>,
    pub deposit_amount: Option<Decimal>,
    pub status: SaleStatus,
    pub transaction_date: DateTime<Utc>,
    pub handled_by_user_id: Option<String>,
}

impl Entity for SaleRecord {
    const COLLECTION: &'static str = "sale_records";

    fn id(&self) -> &str {
        &self.id
    }
}

impl SaleRecord {
    /// Precio efectivo del registro: el precio final si existe, si no el pactado.
    pub fn effective_price(&self) -> Decimal {
        self.final_price.unwrap_or(self.agreed_price)
    }

    pub fn is_open_reservation(&self) -> bool {
        self.status == SaleStatus::Reserved
    }
}
