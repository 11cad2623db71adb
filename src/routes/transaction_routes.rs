use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};

use crate::controllers::transaction_controller::TransactionController;
use crate::dto::transaction_dto::{
    CreateTransactionRequest, SearchTransactionsQuery, TransactionResponse,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::store::EntityStore;
use crate::utils::errors::AppError;

pub fn create_transaction_router<S: EntityStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", post(create_transaction::<S>))
        .route("/", get(list_transactions::<S>))
        .route("/search", get(search_transactions::<S>))
        .route("/:id", get(get_transaction::<S>))
        .route("/:id", delete(delete_transaction::<S>))
}

async fn create_transaction<S: EntityStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, AppError> {
    let controller = TransactionController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_transactions<S: EntityStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let controller = TransactionController::new(state.store.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn search_transactions<S: EntityStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<SearchTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let controller = TransactionController::new(state.store.clone());
    let response = controller.search(query).await?;
    Ok(Json(response))
}

async fn get_transaction<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResponse>, AppError> {
    let controller = TransactionController::new(state.store.clone());
    let response = controller.get_by_id(&id).await?;
    Ok(Json(response))
}

async fn delete_transaction<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = TransactionController::new(state.store.clone());
    controller.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Transacción eliminada exitosamente"
    })))
}
