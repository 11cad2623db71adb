//! Controller del dashboard

use crate::dto::dashboard_dto::{DashboardStatsResponse, TrendPointResponse};
use crate::services::dashboard_service::DEFAULT_TREND_MONTHS;
use crate::services::DashboardService;
use crate::store::EntityStore;
use crate::utils::errors::{bad_request_error, AppResult};

pub struct DashboardController<S: EntityStore> {
    dashboard: DashboardService<S>,
}

impl<S: EntityStore> DashboardController<S> {
    pub fn new(store: S) -> Self {
        Self {
            dashboard: DashboardService::new(store),
        }
    }

    pub async fn stats(&self) -> AppResult<DashboardStatsResponse> {
        Ok(self.dashboard.stats().await?.into())
    }

    pub async fn sales_trend(&self, months: Option<u32>) -> AppResult<Vec<TrendPointResponse>> {
        let months = months.unwrap_or(DEFAULT_TREND_MONTHS);
        if months == 0 || months > 24 {
            return Err(bad_request_error(
                "La ventana de la tendencia debe estar entre 1 y 24 meses",
            ));
        }

        let points = self.dashboard.sales_trend(months).await?;
        Ok(points.into_iter().map(TrendPointResponse::from).collect())
    }
}
