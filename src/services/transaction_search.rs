//! Búsqueda de transacciones
//!
//! Filtrado del libro de ventas por una conjunción de criterios opcionales.
//! Cada criterio vacío o ausente no restringe nada; las fechas malformadas
//! se ignoran en lugar de rechazarse. El matching es una función pura sobre
//! el registro y sus entidades relacionadas ya resueltas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{Customer, SaleRecord, SaleStatus, Vehicle};
use crate::utils::validation::validate_date;

/// Criterios de búsqueda; todos opcionales, combinados con AND.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchCriteria {
    /// Match exacto contra el estado del registro (RESERVED/COMPLETED/CANCELLED).
    pub status: Option<String>,
    /// Substring case-insensitive contra el id del registro.
    pub order_id: Option<String>,
    /// Substring case-insensitive contra "{año} {marca} {modelo}" del vehículo.
    pub vehicle: Option<String>,
    /// Substring case-insensitive contra "{nombre} {teléfono}" del cliente.
    pub customer: Option<String>,
    /// Match exacto contra el precio efectivo según el estado del registro.
    pub price: Option<Decimal>,
    /// Límite inferior inclusivo (YYYY-MM-DD, 00:00:00).
    pub start_date: Option<String>,
    /// Límite superior inclusivo (YYYY-MM-DD, 23:59:59).
    pub end_date: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Inicio del día en UTC, o None si la fecha está malformada.
fn parse_day_start(value: &str) -> Option<DateTime<Utc>> {
    let date = validate_date(value).ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0)?,
        Utc,
    ))
}

/// Fin del día en UTC (23:59:59), o None si la fecha está malformada.
fn parse_day_end(value: &str) -> Option<DateTime<Utc>> {
    let date = validate_date(value).ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(23, 59, 59)?,
        Utc,
    ))
}

impl SearchCriteria {
    /// ¿El registro pasa todos los filtros activos? `vehicle` y `customer`
    /// llegan ya resueltos; si un filtro de descriptor está activo y la
    /// entidad relacionada no existe, el registro queda excluido.
    pub fn matches(
        &self,
        record: &SaleRecord,
        vehicle: Option<&Vehicle>,
        customer: Option<&Customer>,
    ) -> bool {
        if let Some(status) = active(&self.status) {
            if status != record.status.as_str() {
                return false;
            }
        }

        if let Some(order_id) = active(&self.order_id) {
            if !record
                .id
                .to_lowercase()
                .contains(&order_id.to_lowercase())
            {
                return false;
            }
        }

        if let Some(descriptor) = active(&self.vehicle) {
            match vehicle {
                Some(v) => {
                    if !v
                        .descriptor()
                        .to_lowercase()
                        .contains(&descriptor.to_lowercase())
                    {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if let Some(descriptor) = active(&self.customer) {
            match customer {
                Some(c) => {
                    if !c
                        .descriptor()
                        .to_lowercase()
                        .contains(&descriptor.to_lowercase())
                    {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if let Some(price) = self.price {
            // Reservas: depósito o precio pactado; el resto: final o pactado
            let matched = match record.status {
                SaleStatus::Reserved => {
                    record.deposit_amount == Some(price) || record.agreed_price == price
                }
                _ => record.final_price == Some(price) || record.agreed_price == price,
            };
            if !matched {
                return false;
            }
        }

        if let Some(start) = active(&self.start_date).and_then(parse_day_start) {
            if record.transaction_date < start {
                return false;
            }
        }

        if let Some(end) = active(&self.end_date).and_then(parse_day_end) {
            if record.transaction_date > end {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerCategory;
    use chrono::TimeZone;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn record(status: SaleStatus) -> SaleRecord {
        SaleRecord {
            id: "abc-123-def".to_string(),
            vehicle_id: "v-1".to_string(),
            customer_id: "c-1".to_string(),
            agreed_price: dec(100_000),
            final_price: match status {
                SaleStatus::Completed => Some(dec(95_000)),
                _ => None,
            },
            deposit_amount: match status {
                SaleStatus::Reserved => Some(dec(5_000)),
                _ => None,
            },
            status,
            transaction_date: Utc.with_ymd_and_hms(2026, 3, 15, 12, 30, 0).unwrap(),
            handled_by_user_id: None,
        }
    }

    fn vehicle() -> Vehicle {
        Vehicle {
            id: "v-1".to_string(),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            year: 2019,
            listing_price: dec(100_000),
            cost_price: Some(dec(80_000)),
            mileage: 30_000,
            color: "Gris".to_string(),
            vin: "2HGFC2F59KH123456".to_string(),
            status: crate::models::VehicleStatus::Sold,
            description: None,
            image_url: None,
            date_added: Utc::now(),
            reserved_customer_id: None,
            deposit_amount: None,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: "c-1".to_string(),
            name: "Ana García".to_string(),
            phone: "5512345678".to_string(),
            category: CustomerCategory::Buyer,
            contact_info: None,
            notes: None,
            date_added: Utc::now(),
        }
    }

    #[test]
    fn empty_criteria_matches_everything() {
        let criteria = SearchCriteria::default();
        assert!(criteria.matches(&record(SaleStatus::Completed), None, None));
    }

    #[test]
    fn status_is_exact_match() {
        let criteria = SearchCriteria {
            status: Some("COMPLETED".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&record(SaleStatus::Completed), None, None));
        assert!(!criteria.matches(&record(SaleStatus::Reserved), None, None));
    }

    #[test]
    fn order_id_is_case_insensitive_substring() {
        let criteria = SearchCriteria {
            order_id: Some("123-DEF".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&record(SaleStatus::Completed), None, None));

        let criteria = SearchCriteria {
            order_id: Some("zzz".to_string()),
            ..Default::default()
        };
        assert!(!criteria.matches(&record(SaleStatus::Completed), None, None));
    }

    #[test]
    fn vehicle_descriptor_matches_year_make_model() {
        let v = vehicle();
        let criteria = SearchCriteria {
            vehicle: Some("2019 honda".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&record(SaleStatus::Completed), Some(&v), None));
    }

    #[test]
    fn unresolvable_vehicle_is_excluded_when_filter_active() {
        let criteria = SearchCriteria {
            vehicle: Some("honda".to_string()),
            ..Default::default()
        };
        assert!(!criteria.matches(&record(SaleStatus::Completed), None, None));
    }

    #[test]
    fn customer_descriptor_matches_name_or_phone() {
        let c = customer();
        let by_name = SearchCriteria {
            customer: Some("ana gar".to_string()),
            ..Default::default()
        };
        let by_phone = SearchCriteria {
            customer: Some("551234".to_string()),
            ..Default::default()
        };
        assert!(by_name.matches(&record(SaleStatus::Completed), None, Some(&c)));
        assert!(by_phone.matches(&record(SaleStatus::Completed), None, Some(&c)));
    }

    #[test]
    fn price_matches_deposit_for_reservations() {
        let criteria = SearchCriteria {
            price: Some(dec(5_000)),
            ..Default::default()
        };
        assert!(criteria.matches(&record(SaleStatus::Reserved), None, None));
        assert!(!criteria.matches(&record(SaleStatus::Completed), None, None));
    }

    #[test]
    fn price_matches_final_price_for_completed() {
        let criteria = SearchCriteria {
            price: Some(dec(95_000)),
            ..Default::default()
        };
        assert!(criteria.matches(&record(SaleStatus::Completed), None, None));
        assert!(!criteria.matches(&record(SaleStatus::Reserved), None, None));
    }

    #[test]
    fn date_range_is_inclusive() {
        let criteria = SearchCriteria {
            start_date: Some("2026-03-15".to_string()),
            end_date: Some("2026-03-15".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&record(SaleStatus::Completed), None, None));

        let criteria = SearchCriteria {
            end_date: Some("2026-03-14".to_string()),
            ..Default::default()
        };
        assert!(!criteria.matches(&record(SaleStatus::Completed), None, None));
    }

    #[test]
    fn malformed_dates_are_ignored() {
        let criteria = SearchCriteria {
            start_date: Some("15/03/2026".to_string()),
            end_date: Some("no-date".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&record(SaleStatus::Completed), None, None));
    }

    #[test]
    fn empty_strings_do_not_constrain() {
        let criteria = SearchCriteria {
            status: Some("".to_string()),
            order_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&record(SaleStatus::Reserved), None, None));
    }
}
