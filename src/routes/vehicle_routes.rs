use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{
    CheckVinQuery, CheckVinResponse, CompleteReservationRequest, CreateVehicleRequest,
    ReserveVehicleRequest, UpdateVehicleRequest, VehicleResponse, VehicleStatusQuery,
};
use crate::dto::transaction_dto::TransactionResponse;
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::store::EntityStore;
use crate::utils::errors::AppError;

pub fn create_vehicle_router<S: EntityStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", post(create_vehicle::<S>))
        .route("/", get(list_vehicles::<S>))
        .route("/by-status", get(vehicles_by_status::<S>))
        .route("/check-vin", get(check_vin::<S>))
        .route("/:id", get(get_vehicle::<S>))
        .route("/:id", put(update_vehicle::<S>))
        .route("/:id", delete(delete_vehicle::<S>))
        .route("/:id/reserve", put(reserve_vehicle::<S>))
        .route("/:id/back-to-sale", put(back_to_sale::<S>))
        .route("/:id/complete-reservation", put(complete_reservation::<S>))
}

async fn create_vehicle<S: EntityStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_vehicles<S: EntityStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn vehicles_by_status<S: EntityStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<VehicleStatusQuery>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.list_by_status(&query.status).await?;
    Ok(Json(response))
}

async fn check_vin<S: EntityStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<CheckVinQuery>,
) -> Result<Json<CheckVinResponse>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.check_vin(query).await?;
    Ok(Json(response))
}

async fn get_vehicle<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<VehicleResponse>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.get_by_id(&id).await?;
    Ok(Json(response))
}

async fn update_vehicle<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.update(&id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    controller.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Vehículo eliminado exitosamente"
    })))
}

async fn reserve_vehicle<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<ReserveVehicleRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.reserve(&id, request).await?;
    Ok(Json(response))
}

async fn back_to_sale<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.back_to_sale(&id).await?;
    Ok(Json(response))
}

async fn complete_reservation<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<CompleteReservationRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.complete_reservation(&id, request).await?;
    Ok(Json(response))
}
