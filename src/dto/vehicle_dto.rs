//! DTOs de vehículos

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Vehicle;

/// Request para dar de alta un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 50))]
    pub make: String,

    #[validate(length(min = 1, max = 50))]
    pub model: String,

    #[validate(range(min = 1900, max = 2035))]
    pub year: i32,

    pub listing_price: Decimal,

    pub cost_price: Option<Decimal>,

    #[validate(range(min = 0))]
    pub mileage: i32,

    #[validate(length(min = 1, max = 20))]
    pub color: String,

    #[validate(length(min = 8, max = 17))]
    pub vin: String,

    pub status: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 500))]
    pub image_url: Option<String>,

    pub reserved_customer_id: Option<String>,
    pub deposit_amount: Option<Decimal>,
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 50))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2035))]
    pub year: Option<i32>,

    pub listing_price: Option<Decimal>,

    pub cost_price: Option<Decimal>,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    #[validate(length(min = 1, max = 20))]
    pub color: Option<String>,

    #[validate(length(min = 8, max = 17))]
    pub vin: Option<String>,

    pub status: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 500))]
    pub image_url: Option<String>,

    pub reserved_customer_id: Option<String>,
    pub deposit_amount: Option<Decimal>,
}

/// Request para reservar un vehículo
#[derive(Debug, Deserialize)]
pub struct ReserveVehicleRequest {
    pub customer_id: String,
    pub deposit_amount: Decimal,
    /// Precio pactado; si falta se usa el precio de lista
    pub asking_price: Option<Decimal>,
}

/// Request para completar la reserva de un vehículo
#[derive(Debug, Deserialize)]
pub struct CompleteReservationRequest {
    pub final_price: Decimal,
    pub handled_by_user_id: Option<String>,
}

/// Filtro por estado
#[derive(Debug, Deserialize)]
pub struct VehicleStatusQuery {
    pub status: String,
}

/// Parámetros de la verificación de VIN
#[derive(Debug, Deserialize)]
pub struct CheckVinQuery {
    pub vin: String,
    pub exclude_id: Option<String>,
}

/// Resultado de la verificación de VIN
#[derive(Debug, Serialize)]
pub struct CheckVinResponse {
    pub exists: bool,
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub listing_price: Decimal,
    pub cost_price: Option<Decimal>,
    pub mileage: i32,
    pub color: String,
    pub vin: String,
    pub status: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub date_added: DateTime<Utc>,
    pub reserved_customer_id: Option<String>,
    pub deposit_amount: Option<Decimal>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            listing_price: vehicle.listing_price,
            cost_price: vehicle.cost_price,
            mileage: vehicle.mileage,
            color: vehicle.color,
            vin: vehicle.vin,
            status: vehicle.status.to_string(),
            description: vehicle.description,
            image_url: vehicle.image_url,
            date_added: vehicle.date_added,
            reserved_customer_id: vehicle.reserved_customer_id,
            deposit_amount: vehicle.deposit_amount,
        }
    }
}
