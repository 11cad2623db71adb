use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::controllers::dashboard_controller::DashboardController;
use crate::dto::dashboard_dto::{DashboardStatsResponse, TrendPointResponse};
use crate::state::AppState;
use crate::store::EntityStore;
use crate::utils::errors::AppError;

#[derive(Debug, Deserialize)]
struct TrendQuery {
    months: Option<u32>,
}

pub fn create_dashboard_router<S: EntityStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/stats", get(get_stats::<S>))
        .route("/sales-trend", get(get_sales_trend::<S>))
}

async fn get_stats<S: EntityStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<DashboardStatsResponse>, AppError> {
    let controller = DashboardController::new(state.store.clone());
    let response = controller.stats().await?;
    Ok(Json(response))
}

async fn get_sales_trend<S: EntityStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<Vec<TrendPointResponse>>, AppError> {
    let controller = DashboardController::new(state.store.clone());
    let response = controller.sales_trend(query.months).await?;
    Ok(Json(response))
}
