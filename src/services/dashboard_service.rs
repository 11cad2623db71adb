//! Servicio de dashboard
//!
//! Métricas de negocio derivadas del inventario y del libro de ventas:
//! snapshot puntual y tendencia mensual de ventas. Es una pasada pura sobre
//! una lectura de las colecciones, sin estado de proceso. Las referencias
//! cruzadas faltantes aportan cero al cálculo en lugar de romper el
//! dashboard; cada degradación se deja registrada en el log.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{Customer, SaleRecord, SaleStatus, Vehicle, VehicleStatus};
use crate::store::EntityStore;
use crate::utils::errors::{internal_error, AppResult};

/// Ventana por defecto de la tendencia de ventas, en meses.
pub const DEFAULT_TREND_MONTHS: u32 = 6;

/// Estadísticas puntuales del negocio.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Valor de inventario: precio de lista de vehículos en venta + reservados.
    pub total_inventory_value: Decimal,
    pub total_inventory_count: i64,
    pub available_count: i64,
    pub reserved_count: i64,
    pub sold_count: i64,
    pub maintenance_count: i64,
    pub total_revenue: Decimal,
    pub total_sales_count: i64,
    pub total_profit: Decimal,
    /// Porcentaje con un decimal; 0 cuando no hay ingresos.
    pub avg_profit_rate: Decimal,
    pub total_customers_count: i64,
}

/// Punto de la tendencia mensual: etiqueta "AAAA-MM" y facturación del mes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub name: String,
    pub value: Decimal,
}

pub struct DashboardService<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> DashboardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> AppResult<DashboardStats> {
        // Registros antes que vehículos: ver nota de consistencia en
        // sale_service::relation_maps
        let records: Vec<SaleRecord> = self
            .store
            .find_all::<SaleRecord>()
            .await?
            .into_iter()
            .map(|r| r.data)
            .collect();
        let vehicles: Vec<Vehicle> = self
            .store
            .find_all::<Vehicle>()
            .await?
            .into_iter()
            .map(|v| v.data)
            .collect();
        let customers = self.store.find_all::<Customer>().await?;

        Ok(compute_stats(&vehicles, &records, customers.len() as i64))
    }

    /// Facturación por mes de los últimos `window_months` meses calendario,
    /// terminando en el mes actual, del más viejo al más nuevo. Los meses
    /// sin ventas aparecen con valor 0.
    pub async fn sales_trend(&self, window_months: u32) -> AppResult<Vec<TrendPoint>> {
        let records: Vec<SaleRecord> = self
            .store
            .find_all::<SaleRecord>()
            .await?
            .into_iter()
            .map(|r| r.data)
            .collect();

        compute_trend(&records, Utc::now(), window_months)
    }
}

fn compute_stats(vehicles: &[Vehicle], records: &[SaleRecord], customer_count: i64) -> DashboardStats {
    let mut stats = DashboardStats {
        total_inventory_value: Decimal::ZERO,
        total_inventory_count: vehicles.len() as i64,
        available_count: 0,
        reserved_count: 0,
        sold_count: 0,
        maintenance_count: 0,
        total_revenue: Decimal::ZERO,
        total_sales_count: 0,
        total_profit: Decimal::ZERO,
        avg_profit_rate: Decimal::ZERO,
        total_customers_count: customer_count,
    };

    let mut by_id: HashMap<&str, &Vehicle> = HashMap::new();
    for vehicle in vehicles {
        by_id.insert(vehicle.id.as_str(), vehicle);
        match vehicle.status {
            VehicleStatus::Available => {
                stats.available_count += 1;
                stats.total_inventory_value += vehicle.listing_price;
            }
            VehicleStatus::Reserved => {
                stats.reserved_count += 1;
                stats.total_inventory_value += vehicle.listing_price;
            }
            VehicleStatus::Sold => stats.sold_count += 1,
            VehicleStatus::Maintenance => stats.maintenance_count += 1,
        }
    }

    for record in records.iter().filter(|r| r.status == SaleStatus::Completed) {
        let price = record.effective_price();
        stats.total_revenue += price;
        stats.total_sales_count += 1;

        // Vehículo o costo faltante: la venta aporta 0 al beneficio
        match by_id.get(record.vehicle_id.as_str()) {
            Some(vehicle) => match vehicle.cost_price {
                Some(cost) => stats.total_profit += price - cost,
                None => warn!(
                    "⚠️ Venta {} sin precio de costo en el vehículo {}, beneficio contado como 0",
                    record.id, record.vehicle_id
                ),
            },
            None => warn!(
                "⚠️ Venta {} referencia al vehículo inexistente {}, beneficio contado como 0",
                record.id, record.vehicle_id
            ),
        }
    }

    if stats.total_revenue > Decimal::ZERO {
        stats.avg_profit_rate =
            (stats.total_profit / stats.total_revenue * Decimal::from(100)).round_dp(1);
    }

    stats
}

/// Límites inclusivos de un mes calendario en UTC.
fn month_window(year: i32, month: u32) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| internal_error("fecha de inicio de mes inválida"))?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next_start = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| internal_error("fecha de fin de mes inválida"))?;

    // Último instante del último día del mes
    Ok((start, next_start - Duration::milliseconds(1)))
}

fn compute_trend(
    records: &[SaleRecord],
    now: DateTime<Utc>,
    window_months: u32,
) -> AppResult<Vec<TrendPoint>> {
    let current = now.year() * 12 + now.month0() as i32;
    let mut points = Vec::with_capacity(window_months as usize);

    for offset in (0..window_months as i32).rev() {
        let index = current - offset;
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        let (start, end) = month_window(year, month)?;

        let revenue = records
            .iter()
            .filter(|r| {
                r.status == SaleStatus::Completed
                    && r.transaction_date >= start
                    && r.transaction_date <= end
            })
            .map(SaleRecord::effective_price)
            .sum();

        points.push(TrendPoint {
            name: format!("{:04}-{:02}", year, month),
            value: revenue,
        });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerCategory;
    use crate::services::sale_service::SaleService;
    use crate::store::MemoryStore;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn vehicle(id: &str, listing: i64, cost: Option<i64>) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            make: "Nissan".to_string(),
            model: "Versa".to_string(),
            year: 2021,
            listing_price: dec(listing),
            cost_price: cost.map(dec),
            mileage: 15_000,
            color: "Rojo".to_string(),
            vin: format!("3N1CN7AP{:09}", id.len()),
            status: VehicleStatus::Available,
            description: None,
            image_url: None,
            date_added: Utc::now(),
            reserved_customer_id: None,
            deposit_amount: None,
        }
    }

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: "Carlos Ruiz".to_string(),
            phone: "5598765432".to_string(),
            category: CustomerCategory::Buyer,
            contact_info: None,
            notes: None,
            date_added: Utc::now(),
        }
    }

    fn completed_record(id: &str, vehicle_id: &str, price: i64, date: DateTime<Utc>) -> SaleRecord {
        SaleRecord {
            id: id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            customer_id: "c-1".to_string(),
            agreed_price: dec(price),
            final_price: Some(dec(price)),
            deposit_amount: None,
            status: SaleStatus::Completed,
            transaction_date: date,
            handled_by_user_id: None,
        }
    }

    #[tokio::test]
    async fn direct_sale_scenario_metrics() {
        // Vehículo A: lista 100000, costo 80000; venta directa por 95000
        let store = MemoryStore::new();
        store.insert(&vehicle("v-a", 100_000, Some(80_000))).await.unwrap();
        store.insert(&customer("c-1")).await.unwrap();

        let sales = SaleService::new(store.clone());
        sales
            .create_direct_sale("v-a", "c-1", dec(95_000), None, None)
            .await
            .unwrap();

        let stats = DashboardService::new(store).stats().await.unwrap();
        assert_eq!(stats.total_revenue, dec(95_000));
        assert_eq!(stats.total_sales_count, 1);
        assert_eq!(stats.total_profit, dec(15_000));
        assert_eq!(stats.avg_profit_rate.to_string(), "15.8");
        assert_eq!(stats.sold_count, 1);
        assert_eq!(stats.available_count, 0);
        // El vehículo vendido ya no cuenta en el valor de inventario
        assert_eq!(stats.total_inventory_value, Decimal::ZERO);
        assert_eq!(stats.total_inventory_count, 1);
        assert_eq!(stats.total_customers_count, 1);
    }

    #[tokio::test]
    async fn inventory_value_counts_available_and_reserved() {
        let store = MemoryStore::new();
        store.insert(&vehicle("v-1", 100_000, None)).await.unwrap();
        store.insert(&vehicle("v-2", 50_000, None)).await.unwrap();
        store.insert(&customer("c-1")).await.unwrap();

        let sales = SaleService::new(store.clone());
        sales.reserve("v-2", "c-1", dec(2_000), None).await.unwrap();

        let stats = DashboardService::new(store).stats().await.unwrap();
        assert_eq!(stats.total_inventory_value, dec(150_000));
        assert_eq!(stats.available_count, 1);
        assert_eq!(stats.reserved_count, 1);
    }

    #[tokio::test]
    async fn missing_cross_references_degrade_to_zero_profit() {
        let store = MemoryStore::new();
        // Venta que referencia un vehículo inexistente
        store
            .insert(&completed_record("t-1", "ghost", 40_000, Utc::now()))
            .await
            .unwrap();
        // Venta de un vehículo sin precio de costo
        store.insert(&vehicle("v-1", 60_000, None)).await.unwrap();
        store
            .insert(&completed_record("t-2", "v-1", 60_000, Utc::now()))
            .await
            .unwrap();

        let stats = DashboardService::new(store).stats().await.unwrap();
        assert_eq!(stats.total_revenue, dec(100_000));
        assert_eq!(stats.total_profit, Decimal::ZERO);
        assert_eq!(stats.avg_profit_rate, Decimal::ZERO.round_dp(1));
    }

    #[tokio::test]
    async fn zero_revenue_has_zero_rate() {
        let store = MemoryStore::new();
        let stats = DashboardService::new(store).stats().await.unwrap();
        assert_eq!(stats.total_revenue, Decimal::ZERO);
        assert_eq!(stats.avg_profit_rate, Decimal::ZERO);
    }

    #[test]
    fn cancelled_and_open_records_do_not_count_as_sales() {
        let mut reserved = completed_record("t-1", "v-1", 10_000, Utc::now());
        reserved.status = SaleStatus::Reserved;
        reserved.final_price = None;
        let mut cancelled = completed_record("t-2", "v-1", 10_000, Utc::now());
        cancelled.status = SaleStatus::Cancelled;

        let stats = compute_stats(&[], &[reserved, cancelled], 0);
        assert_eq!(stats.total_sales_count, 0);
        assert_eq!(stats.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn trend_includes_zero_revenue_months() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 0).unwrap();
        let records = vec![
            completed_record(
                "t-1",
                "v-1",
                30_000,
                Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
            ),
            completed_record(
                "t-2",
                "v-1",
                20_000,
                Utc.with_ymd_and_hms(2026, 5, 31, 23, 59, 59).unwrap(),
            ),
        ];

        let points = compute_trend(&records, now, 6).unwrap();
        assert_eq!(points.len(), 6);

        let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["2026-03", "2026-04", "2026-05", "2026-06", "2026-07", "2026-08"]
        );

        assert_eq!(points[2].value, dec(20_000)); // mayo, límite inclusivo
        assert_eq!(points[5].value, dec(30_000)); // mes actual
        assert_eq!(points[0].value, Decimal::ZERO);
        assert_eq!(points[3].value, Decimal::ZERO);
        assert_eq!(points[4].value, Decimal::ZERO);
    }

    #[test]
    fn trend_window_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 15, 0, 0, 0).unwrap();
        let records = vec![completed_record(
            "t-1",
            "v-1",
            12_000,
            Utc.with_ymd_and_hms(2025, 12, 25, 18, 0, 0).unwrap(),
        )];

        let points = compute_trend(&records, now, 4).unwrap();
        let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);
        assert_eq!(points[1].value, dec(12_000));
    }

    #[test]
    fn trend_ignores_open_reservations() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 0).unwrap();
        let mut open = completed_record("t-1", "v-1", 9_000, now);
        open.status = SaleStatus::Reserved;
        open.final_price = None;

        let points = compute_trend(&[open], now, 2).unwrap();
        assert!(points.iter().all(|p| p.value == Decimal::ZERO));
    }
}
