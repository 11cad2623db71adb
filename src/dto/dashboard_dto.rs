//! DTOs del dashboard

use rust_decimal::Decimal;
use serde::Serialize;

use crate::services::dashboard_service::{DashboardStats, TrendPoint};

/// Response con las estadísticas del negocio
#[derive(Debug, Serialize)]
pub struct DashboardStatsResponse {
    pub total_inventory_value: Decimal,
    pub total_inventory_count: i64,
    pub available_cars_count: i64,
    pub reserved_cars_count: i64,
    pub sold_cars_count: i64,
    pub maintenance_cars_count: i64,
    pub total_revenue: Decimal,
    pub total_sales_count: i64,
    pub total_profit: Decimal,
    pub avg_profit_rate: Decimal,
    pub total_customers_count: i64,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_inventory_value: stats.total_inventory_value,
            total_inventory_count: stats.total_inventory_count,
            available_cars_count: stats.available_count,
            reserved_cars_count: stats.reserved_count,
            sold_cars_count: stats.sold_count,
            maintenance_cars_count: stats.maintenance_count,
            total_revenue: stats.total_revenue,
            total_sales_count: stats.total_sales_count,
            total_profit: stats.total_profit,
            avg_profit_rate: stats.avg_profit_rate,
            total_customers_count: stats.total_customers_count,
        }
    }
}

/// Punto de la tendencia mensual de ventas
#[derive(Debug, Serialize)]
pub struct TrendPointResponse {
    pub name: String,
    pub value: Decimal,
}

impl From<TrendPoint> for TrendPointResponse {
    fn from(point: TrendPoint) -> Self {
        Self {
            name: point.name,
            value: point.value,
        }
    }
}
