use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::controllers::customer_controller::CustomerController;
use crate::dto::customer_dto::{
    CreateCustomerRequest, CustomerResponse, SearchCustomersQuery, UpdateCustomerRequest,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::store::EntityStore;
use crate::utils::errors::AppError;

pub fn create_customer_router<S: EntityStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", post(create_customer::<S>))
        .route("/", get(list_customers::<S>))
        .route("/search", get(search_customers::<S>))
        .route("/:id", get(get_customer::<S>))
        .route("/:id", put(update_customer::<S>))
        .route("/:id", delete(delete_customer::<S>))
}

async fn create_customer<S: EntityStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_customers<S: EntityStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn search_customers<S: EntityStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<SearchCustomersQuery>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.search(&query.keyword).await?;
    Ok(Json(response))
}

async fn get_customer<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<CustomerResponse>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.get_by_id(&id).await?;
    Ok(Json(response))
}

async fn update_customer<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.update(&id, request).await?;
    Ok(Json(response))
}

async fn delete_customer<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    controller.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Cliente eliminado exitosamente"
    })))
}
