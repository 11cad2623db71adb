//! DTOs de transacciones

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dto::customer_dto::CustomerResponse;
use crate::dto::vehicle_dto::VehicleResponse;
use crate::services::sale_service::SaleRecordWithRelations;

/// Request para crear una venta directa
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub vehicle_id: String,
    pub customer_id: String,
    pub price: Decimal,
    pub handled_by_user_id: Option<String>,
    /// Fecha de la transacción; si falta se usa el momento actual
    pub date: Option<DateTime<Utc>>,
}

/// Parámetros de búsqueda; todos opcionales, combinados con AND
#[derive(Debug, Default, Deserialize)]
pub struct SearchTransactionsQuery {
    pub status: Option<String>,
    pub order_id: Option<String>,
    pub vehicle: Option<String>,
    pub customer: Option<String>,
    pub price: Option<Decimal>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Response de transacción con vehículo y cliente resueltos
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub vehicle_id: String,
    pub customer_id: String,
    pub agreed_price: Decimal,
    pub final_price: Option<Decimal>,
    pub deposit_amount: Option<Decimal>,
    pub status: String,
    pub transaction_date: DateTime<Utc>,
    pub handled_by_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerResponse>,
}

impl From<SaleRecordWithRelations> for TransactionResponse {
    fn from(item: SaleRecordWithRelations) -> Self {
        Self {
            id: item.record.id,
            vehicle_id: item.record.vehicle_id,
            customer_id: item.record.customer_id,
            agreed_price: item.record.agreed_price,
            final_price: item.record.final_price,
            deposit_amount: item.record.deposit_amount,
            status: item.record.status.to_string(),
            transaction_date: item.record.transaction_date,
            handled_by_user_id: item.record.handled_by_user_id,
            vehicle: item.vehicle.map(VehicleResponse::from),
            customer: item.customer.map(CustomerResponse::from),
        }
    }
}
