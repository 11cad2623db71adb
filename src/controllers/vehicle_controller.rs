//! Controller de vehículos
//!
//! Mapea requests de la API a las operaciones de inventario y de venta
//! sobre vehículos. Las operaciones de reserva viven acá porque la API las
//! expone por vehículo, pero la lógica corre en el workflow de ventas.

use validator::Validate;

use crate::dto::vehicle_dto::{
    CheckVinQuery, CheckVinResponse, CompleteReservationRequest, CreateVehicleRequest,
    ReserveVehicleRequest, UpdateVehicleRequest, VehicleResponse,
};
use crate::dto::transaction_dto::TransactionResponse;
use crate::dto::ApiResponse;
use crate::models::VehicleStatus;
use crate::services::inventory_service::{NewVehicle, VehicleUpdate};
use crate::services::sale_service::SaleRecordWithRelations;
use crate::services::{InventoryService, SaleService};
use crate::store::EntityStore;
use crate::utils::errors::{bad_request_error, AppError, AppResult};

pub struct VehicleController<S: EntityStore> {
    inventory: InventoryService<S>,
    sales: SaleService<S>,
}

fn parse_status(value: Option<String>) -> AppResult<Option<VehicleStatus>> {
    match value {
        Some(raw) => VehicleStatus::parse(&raw)
            .map(Some)
            .ok_or_else(|| bad_request_error("Estado de vehículo inválido")),
        None => Ok(None),
    }
}

impl<S: EntityStore> VehicleController<S> {
    pub fn new(store: S) -> Self {
        Self {
            inventory: InventoryService::new(store.clone()),
            sales: SaleService::new(store),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.inventory.list().await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<VehicleResponse> {
        Ok(self.inventory.get(id).await?.into())
    }

    pub async fn list_by_status(&self, status: &str) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.inventory.list_by_status(status).await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn check_vin(&self, query: CheckVinQuery) -> AppResult<CheckVinResponse> {
        let exists = self
            .inventory
            .vin_exists(&query.vin, query.exclude_id.as_deref())
            .await?;
        Ok(CheckVinResponse { exists })
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;
        let status = parse_status(request.status)?;

        let vehicle = self
            .inventory
            .create(NewVehicle {
                make: request.make,
                model: request.model,
                year: request.year,
                listing_price: request.listing_price,
                cost_price: request.cost_price,
                mileage: request.mileage,
                color: request.color,
                vin: request.vin,
                status,
                description: request.description,
                image_url: request.image_url,
                reserved_customer_id: request.reserved_customer_id,
                deposit_amount: request.deposit_amount,
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehículo creado exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;
        let status = parse_status(request.status)?;

        let vehicle = self
            .inventory
            .update(
                id,
                VehicleUpdate {
                    make: request.make,
                    model: request.model,
                    year: request.year,
                    listing_price: request.listing_price,
                    cost_price: request.cost_price,
                    mileage: request.mileage,
                    color: request.color,
                    vin: request.vin,
                    status,
                    description: request.description,
                    image_url: request.image_url,
                    reserved_customer_id: request.reserved_customer_id,
                    deposit_amount: request.deposit_amount,
                },
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehículo actualizado exitosamente".to_string(),
        ))
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.inventory.delete(id).await
    }

    pub async fn reserve(
        &self,
        id: &str,
        request: ReserveVehicleRequest,
    ) -> AppResult<ApiResponse<TransactionResponse>> {
        if request.deposit_amount <= rust_decimal::Decimal::ZERO {
            return Err(AppError::BadRequest(
                "El depósito debe ser mayor que cero".to_string(),
            ));
        }

        let record = self
            .sales
            .reserve(
                id,
                &request.customer_id,
                request.deposit_amount,
                request.asking_price,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            TransactionResponse::from(SaleRecordWithRelations {
                record,
                vehicle: None,
                customer: None,
            }),
            "Vehículo reservado exitosamente".to_string(),
        ))
    }

    pub async fn back_to_sale(&self, id: &str) -> AppResult<ApiResponse<VehicleResponse>> {
        let vehicle = self.sales.cancel_reservation(id).await?;
        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "El vehículo volvió a la venta".to_string(),
        ))
    }

    pub async fn complete_reservation(
        &self,
        id: &str,
        request: CompleteReservationRequest,
    ) -> AppResult<ApiResponse<TransactionResponse>> {
        let record = self
            .sales
            .complete_reservation(
                id,
                request.final_price,
                request.handled_by_user_id.as_deref(),
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            TransactionResponse::from(SaleRecordWithRelations {
                record,
                vehicle: None,
                customer: None,
            }),
            "Reserva completada exitosamente".to_string(),
        ))
    }
}
