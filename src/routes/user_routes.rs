use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::controllers::user_controller::UserController;
use crate::dto::user_dto::{
    CreateUserRequest, UpdateUserRequest, UpdateUserStatusRequest, UserResponse, UserRoleQuery,
    UserSearchQuery,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::store::EntityStore;
use crate::utils::errors::AppError;

pub fn create_user_router<S: EntityStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", post(create_user::<S>))
        .route("/", get(list_users::<S>))
        .route("/by-role", get(users_by_role::<S>))
        .route("/search", get(search_users::<S>))
        .route("/:id", get(get_user::<S>))
        .route("/:id", put(update_user::<S>))
        .route("/:id", delete(delete_user::<S>))
        .route("/:id/status", put(update_user_status::<S>))
}

async fn create_user<S: EntityStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_users<S: EntityStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let controller = UserController::new(state.store.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn users_by_role<S: EntityStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<UserRoleQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let controller = UserController::new(state.store.clone());
    let response = controller.list_by_role(&query.role).await?;
    Ok(Json(response))
}

async fn search_users<S: EntityStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let controller = UserController::new(state.store.clone());
    let response = controller.search_by_name(query.name.as_deref()).await?;
    Ok(Json(response))
}

async fn get_user<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = UserController::new(state.store.clone());
    let response = controller.get_by_id(&id).await?;
    Ok(Json(response))
}

async fn update_user<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.store.clone());
    let response = controller.update(&id, request).await?;
    Ok(Json(response))
}

async fn update_user_status<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserStatusRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = UserController::new(state.store.clone());
    let response = controller.update_status(&id, &request.status).await?;
    Ok(Json(response))
}

async fn delete_user<S: EntityStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = UserController::new(state.store.clone());
    controller.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Usuario eliminado exitosamente"
    })))
}
