//! Servicio de inventario
//!
//! CRUD de vehículos con las guardas del dominio: unicidad de VIN,
//! invariante de reserva y bloqueo de borrado mientras existan
//! transacciones asociadas. Los cambios de estado por update plano solo
//! alternan entre disponible y taller; reserva y venta pasan por el
//! workflow de ventas.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::{SaleRecord, Vehicle, VehicleStatus};
use crate::store::EntityStore;
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};
use crate::utils::validation::validate_vin;

/// Datos para alta de vehículo, ya validados a nivel de request.
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub listing_price: Decimal,
    pub cost_price: Option<Decimal>,
    pub mileage: i32,
    pub color: String,
    pub vin: String,
    pub status: Option<VehicleStatus>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub reserved_customer_id: Option<String>,
    pub deposit_amount: Option<Decimal>,
}

/// Cambios parciales de vehículo; los campos ausentes conservan su valor.
#[derive(Debug, Clone, Default)]
pub struct VehicleUpdate {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub listing_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub mileage: Option<i32>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub status: Option<VehicleStatus>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub reserved_customer_id: Option<String>,
    pub deposit_amount: Option<Decimal>,
}

pub struct InventoryService<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> InventoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = self
            .store
            .find_all::<Vehicle>()
            .await?
            .into_iter()
            .map(|v| v.data)
            .collect();
        // Más recientes primero, como el resto de los listados
        vehicles.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        Ok(vehicles)
    }

    pub async fn get(&self, id: &str) -> AppResult<Vehicle> {
        Ok(self
            .store
            .get::<Vehicle>(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?
            .data)
    }

    pub async fn list_by_status(&self, status: &str) -> AppResult<Vec<Vehicle>> {
        let status = VehicleStatus::parse(status)
            .ok_or_else(|| bad_request_error("Estado de vehículo inválido"))?;
        let vehicles = self.list().await?;
        Ok(vehicles.into_iter().filter(|v| v.status == status).collect())
    }

    /// ¿Existe otro vehículo con este VIN? `exclude_id` permite excluir al
    /// propio vehículo en edición.
    pub async fn vin_exists(&self, vin: &str, exclude_id: Option<&str>) -> AppResult<bool> {
        let vin = normalize_vin(vin);
        let vehicles = self.store.find_all::<Vehicle>().await?;
        Ok(vehicles.iter().any(|v| {
            v.data.vin == vin && exclude_id.map(|id| v.data.id != id).unwrap_or(true)
        }))
    }

    pub async fn create(&self, input: NewVehicle) -> AppResult<Vehicle> {
        if input.make.trim().is_empty() {
            return Err(bad_request_error("La marca es requerida"));
        }
        if input.model.trim().is_empty() {
            return Err(bad_request_error("El modelo es requerido"));
        }
        validate_vin(&input.vin)
            .map_err(|_| bad_request_error("El VIN no tiene un formato válido"))?;

        let vin = normalize_vin(&input.vin);
        if self.vin_exists(&vin, None).await? {
            return Err(AppError::Conflict(
                "El VIN ya está registrado en otro vehículo".to_string(),
            ));
        }

        let status = input.status.unwrap_or(VehicleStatus::Available);
        if status == VehicleStatus::Sold {
            return Err(bad_request_error(
                "Un vehículo no puede darse de alta como vendido",
            ));
        }

        let mut vehicle = Vehicle {
            id: Uuid::new_v4().to_string(),
            make: input.make.trim().to_string(),
            model: input.model.trim().to_string(),
            year: input.year,
            listing_price: input.listing_price,
            cost_price: input.cost_price,
            mileage: input.mileage,
            color: input.color,
            vin,
            status,
            description: input.description,
            image_url: input.image_url,
            date_added: Utc::now(),
            reserved_customer_id: None,
            deposit_amount: None,
        };

        if status == VehicleStatus::Reserved {
            apply_reservation_fields(
                &mut vehicle,
                input.reserved_customer_id,
                input.deposit_amount,
            )?;
        }

        let saved = self.store.insert(&vehicle).await?;
        info!("🚗 Vehículo dado de alta: {} {} ({})", saved.data.make, saved.data.model, saved.data.vin);
        Ok(saved.data)
    }

    pub async fn update(&self, id: &str, changes: VehicleUpdate) -> AppResult<Vehicle> {
        let current = self
            .store
            .get::<Vehicle>(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;

        let mut next = current.data.clone();

        if let Some(vin) = changes.vin {
            validate_vin(&vin)
                .map_err(|_| bad_request_error("El VIN no tiene un formato válido"))?;
            let vin = normalize_vin(&vin);
            if vin != next.vin && self.vin_exists(&vin, Some(id)).await? {
                return Err(AppError::Conflict(
                    "El VIN ya está registrado en otro vehículo".to_string(),
                ));
            }
            next.vin = vin;
        }

        if let Some(status) = changes.status {
            if status != next.status && !Vehicle::plain_edit_allowed(next.status, status) {
                return Err(AppError::Conflict(
                    "Los estados de reserva y venta se gestionan con las operaciones de venta"
                        .to_string(),
                ));
            }
            next.status = status;
        }

        if let Some(make) = changes.make {
            if make.trim().is_empty() {
                return Err(bad_request_error("La marca es requerida"));
            }
            next.make = make.trim().to_string();
        }
        if let Some(model) = changes.model {
            if model.trim().is_empty() {
                return Err(bad_request_error("El modelo es requerido"));
            }
            next.model = model.trim().to_string();
        }
        if let Some(year) = changes.year {
            next.year = year;
        }
        if let Some(listing_price) = changes.listing_price {
            next.listing_price = listing_price;
        }
        if let Some(cost_price) = changes.cost_price {
            next.cost_price = Some(cost_price);
        }
        if let Some(mileage) = changes.mileage {
            next.mileage = mileage;
        }
        if let Some(color) = changes.color {
            next.color = color;
        }
        if let Some(description) = changes.description {
            next.description = Some(description);
        }
        if let Some(image_url) = changes.image_url {
            next.image_url = Some(image_url);
        }

        match next.status {
            VehicleStatus::Reserved => {
                let customer = changes
                    .reserved_customer_id
                    .or_else(|| next.reserved_customer_id.clone());
                let deposit = changes.deposit_amount.or(next.deposit_amount);
                apply_reservation_fields(&mut next, customer, deposit)?;
            }
            _ => {
                // Fuera de RESERVED ambos campos quedan vacíos
                next.reserved_customer_id = None;
                next.deposit_amount = None;
            }
        }

        // La fecha de alta nunca se toca
        next.date_added = current.data.date_added;

        let saved = self.store.update(&next, current.version).await?;
        Ok(saved.data)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if self.store.get::<Vehicle>(id).await?.is_none() {
            return Err(not_found_error("Vehicle", id));
        }

        let records = self.store.find_all::<SaleRecord>().await?;
        if records.iter().any(|r| r.data.vehicle_id == id) {
            return Err(AppError::Conflict(
                "El vehículo tiene transacciones asociadas y no puede eliminarse".to_string(),
            ));
        }

        self.store.delete::<Vehicle>(id).await?;
        info!("🗑️ Vehículo {} eliminado del inventario", id);
        Ok(())
    }
}

fn normalize_vin(vin: &str) -> String {
    vin.trim().to_uppercase()
}

/// Poner los campos de reserva validando el invariante: cliente presente y
/// depósito > 0.
fn apply_reservation_fields(
    vehicle: &mut Vehicle,
    customer_id: Option<String>,
    deposit: Option<Decimal>,
) -> AppResult<()> {
    let customer_id = customer_id
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| bad_request_error("El estado reservado requiere un cliente asociado"))?;
    let deposit = deposit
        .filter(|d| *d > Decimal::ZERO)
        .ok_or_else(|| bad_request_error("El estado reservado requiere un depósito mayor que cero"))?;

    vehicle.status = VehicleStatus::Reserved;
    vehicle.reserved_customer_id = Some(customer_id);
    vehicle.deposit_amount = Some(deposit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerCategory, SaleStatus};
    use crate::store::MemoryStore;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn new_vehicle(vin: &str) -> NewVehicle {
        NewVehicle {
            make: "Mazda".to_string(),
            model: "3".to_string(),
            year: 2022,
            listing_price: dec(250_000),
            cost_price: Some(dec(210_000)),
            mileage: 8_000,
            color: "Azul".to_string(),
            vin: vin.to_string(),
            status: None,
            description: None,
            image_url: None,
            reserved_customer_id: None,
            deposit_amount: None,
        }
    }

    fn service() -> (InventoryService<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        (InventoryService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_defaults_to_available() {
        let (service, _) = service();
        let vehicle = service.create(new_vehicle("JM1BL1VF8A1234567")).await.unwrap();

        assert_eq!(vehicle.status, VehicleStatus::Available);
        assert!(vehicle.reserved_customer_id.is_none());
        assert!(vehicle.reservation_invariant_holds());
    }

    #[tokio::test]
    async fn create_normalizes_and_dedupes_vin() {
        let (service, _) = service();
        service.create(new_vehicle("jm1bl1vf8a1234567")).await.unwrap();

        // El mismo VIN en otra caja sigue siendo duplicado
        let err = service
            .create(new_vehicle(" JM1BL1VF8A1234567 "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_rejects_malformed_vin_and_sold_status() {
        let (service, _) = service();

        let err = service.create(new_vehicle("not a vin!")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mut input = new_vehicle("JM1BL1VF8A1234567");
        input.status = Some(VehicleStatus::Sold);
        let err = service.create(input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_reserved_requires_customer_and_deposit() {
        let (service, _) = service();

        let mut input = new_vehicle("JM1BL1VF8A1234567");
        input.status = Some(VehicleStatus::Reserved);
        let err = service.create(input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mut input = new_vehicle("JM1BL1VF8A7654321");
        input.status = Some(VehicleStatus::Reserved);
        input.reserved_customer_id = Some("c-9".to_string());
        input.deposit_amount = Some(dec(4_000));
        let vehicle = service.create(input).await.unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Reserved);
        assert!(vehicle.reservation_invariant_holds());
    }

    #[tokio::test]
    async fn update_checks_vin_against_other_vehicles_only() {
        let (service, _) = service();
        let first = service.create(new_vehicle("JM1BL1VF8A1234567")).await.unwrap();
        service.create(new_vehicle("JM1BL1VF8A7654321")).await.unwrap();

        // Reescribir el propio VIN no es conflicto
        let updated = service
            .update(
                &first.id,
                VehicleUpdate {
                    vin: Some("jm1bl1vf8a1234567".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.vin, "JM1BL1VF8A1234567");

        // Tomar el VIN del otro vehículo sí
        let err = service
            .update(
                &first.id,
                VehicleUpdate {
                    vin: Some("JM1BL1VF8A7654321".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn plain_update_toggles_maintenance_only() {
        let (service, _) = service();
        let vehicle = service.create(new_vehicle("JM1BL1VF8A1234567")).await.unwrap();

        let updated = service
            .update(
                &vehicle.id,
                VehicleUpdate {
                    status: Some(VehicleStatus::Maintenance),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, VehicleStatus::Maintenance);

        let err = service
            .update(
                &vehicle.id,
                VehicleUpdate {
                    status: Some(VehicleStatus::Sold),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service
            .update(
                &vehicle.id,
                VehicleUpdate {
                    status: Some(VehicleStatus::Reserved),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_preserves_date_added_and_clears_stray_fields() {
        let (service, store) = service();
        let vehicle = service.create(new_vehicle("JM1BL1VF8A1234567")).await.unwrap();

        let updated = service
            .update(
                &vehicle.id,
                VehicleUpdate {
                    color: Some("Negro".to_string()),
                    // Campos de reserva sin estar reservado: se descartan
                    reserved_customer_id: Some("c-1".to_string()),
                    deposit_amount: Some(dec(1_000)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.date_added, vehicle.date_added);
        assert_eq!(updated.color, "Negro");
        assert!(updated.reserved_customer_id.is_none());
        assert!(updated.deposit_amount.is_none());
        assert!(updated.reservation_invariant_holds());

        let stored = store.get::<Vehicle>(&vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.data.color, "Negro");
    }

    #[tokio::test]
    async fn delete_blocked_while_referenced_by_sale_record() {
        let (service, store) = service();
        let vehicle = service.create(new_vehicle("JM1BL1VF8A1234567")).await.unwrap();
        store
            .insert(&crate::models::Customer {
                id: "c-1".to_string(),
                name: "Eva".to_string(),
                phone: "5511122233".to_string(),
                category: CustomerCategory::Buyer,
                contact_info: None,
                notes: None,
                date_added: Utc::now(),
            })
            .await
            .unwrap();
        store
            .insert(&SaleRecord {
                id: "t-1".to_string(),
                vehicle_id: vehicle.id.clone(),
                customer_id: "c-1".to_string(),
                agreed_price: dec(250_000),
                final_price: Some(dec(250_000)),
                deposit_amount: None,
                status: SaleStatus::Completed,
                transaction_date: Utc::now(),
                handled_by_user_id: None,
            })
            .await
            .unwrap();

        let err = service.delete(&vehicle.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Sin referencias sí se puede
        let other = service.create(new_vehicle("JM1BL1VF8A7654321")).await.unwrap();
        service.delete(&other.id).await.unwrap();
    }

    #[tokio::test]
    async fn list_by_status_filters_and_validates() {
        let (service, _) = service();
        service.create(new_vehicle("JM1BL1VF8A1234567")).await.unwrap();
        let second = service.create(new_vehicle("JM1BL1VF8A7654321")).await.unwrap();
        service
            .update(
                &second.id,
                VehicleUpdate {
                    status: Some(VehicleStatus::Maintenance),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let available = service.list_by_status("AVAILABLE").await.unwrap();
        assert_eq!(available.len(), 1);
        let maintenance = service.list_by_status("MAINTENANCE").await.unwrap();
        assert_eq!(maintenance.len(), 1);

        let err = service.list_by_status("PARKED").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn vin_exists_respects_exclude_id() {
        let (service, _) = service();
        let vehicle = service.create(new_vehicle("JM1BL1VF8A1234567")).await.unwrap();

        assert!(service.vin_exists("JM1BL1VF8A1234567", None).await.unwrap());
        assert!(!service
            .vin_exists("JM1BL1VF8A1234567", Some(&vehicle.id))
            .await
            .unwrap());
        assert!(!service.vin_exists("JM1BL1VF8A0000000", None).await.unwrap());
    }
}
