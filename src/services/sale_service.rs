//! Servicio de ventas
//!
//! Este módulo orquesta el ciclo de vida de venta: venta directa, reserva,
//! cancelación de reserva y cierre de reserva. Cada operación valida sus
//! precondiciones antes de tocar el store y aplica vehículo + registro de
//! venta en un único commit con chequeo de versión sobre el vehículo: de dos
//! operaciones en carrera sobre el mismo vehículo, exactamente una gana.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Customer, SaleRecord, SaleStatus, User, Vehicle};
use crate::services::transaction_search::SearchCriteria;
use crate::store::{Commit, EntityStore, Versioned};
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};

/// Registro de venta junto con sus entidades relacionadas resueltas.
#[derive(Debug, Clone)]
pub struct SaleRecordWithRelations {
    pub record: SaleRecord,
    pub vehicle: Option<Vehicle>,
    pub customer: Option<Customer>,
}

pub struct SaleService<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> SaleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Venta directa: crea un registro COMPLETED y pasa el vehículo a SOLD
    /// en un único commit.
    pub async fn create_direct_sale(
        &self,
        vehicle_id: &str,
        customer_id: &str,
        price: Decimal,
        handled_by_user_id: Option<&str>,
        date: Option<DateTime<Utc>>,
    ) -> AppResult<SaleRecord> {
        if price <= Decimal::ZERO {
            return Err(bad_request_error("El precio de venta debe ser mayor que cero"));
        }

        let vehicle = self
            .store
            .get::<Vehicle>(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        // mark_sold rechaza vehículos ya vendidos o reservados
        let sold = vehicle.data.mark_sold()?;

        if self.store.get::<Customer>(customer_id).await?.is_none() {
            return Err(not_found_error("Customer", customer_id));
        }
        let handled_by = self.validate_handler(handled_by_user_id).await?;

        let record = SaleRecord {
            id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle_id.to_string(),
            customer_id: customer_id.to_string(),
            agreed_price: price,
            final_price: Some(price),
            deposit_amount: None,
            status: SaleStatus::Completed,
            transaction_date: date.unwrap_or_else(Utc::now),
            handled_by_user_id: handled_by,
        };

        let commit = Commit::new()
            .update(&sold, vehicle.version)?
            .insert(&record)?;
        self.store.commit(commit).await?;

        info!(
            "💰 Venta directa registrada: vehículo {} vendido a {} por {}",
            vehicle_id, customer_id, price
        );
        Ok(record)
    }

    /// Reserva: pasa el vehículo a RESERVED y abre un registro RESERVED con
    /// el depósito. El precio pactado es el de lista salvo que se indique
    /// otro.
    pub async fn reserve(
        &self,
        vehicle_id: &str,
        customer_id: &str,
        deposit: Decimal,
        asking_price: Option<Decimal>,
    ) -> AppResult<SaleRecord> {
        let vehicle = self
            .store
            .get::<Vehicle>(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        let reserved = vehicle.data.reserve(customer_id, deposit)?;

        if self.store.get::<Customer>(customer_id).await?.is_none() {
            return Err(not_found_error("Customer", customer_id));
        }

        let record = SaleRecord {
            id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle_id.to_string(),
            customer_id: customer_id.trim().to_string(),
            agreed_price: asking_price.unwrap_or(vehicle.data.listing_price),
            final_price: None,
            deposit_amount: Some(deposit),
            status: SaleStatus::Reserved,
            transaction_date: Utc::now(),
            handled_by_user_id: None,
        };

        let commit = Commit::new()
            .update(&reserved, vehicle.version)?
            .insert(&record)?;
        self.store.commit(commit).await?;

        info!(
            "📌 Vehículo {} reservado por {} con depósito {}",
            vehicle_id, customer_id, deposit
        );
        Ok(record)
    }

    /// Cancelación de reserva: el vehículo vuelve a AVAILABLE y el registro
    /// abierto queda en CANCELLED como rastro de auditoría.
    pub async fn cancel_reservation(&self, vehicle_id: &str) -> AppResult<Vehicle> {
        let vehicle = self
            .store
            .get::<Vehicle>(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        let released = vehicle.data.cancel_reservation()?;

        let mut commit = Commit::new().update(&released, vehicle.version)?;
        match self.find_open_reservation(vehicle_id).await? {
            Some(open) => {
                let mut cancelled = open.data.clone();
                cancelled.status = SaleStatus::Cancelled;
                commit = commit.update(&cancelled, open.version)?;
            }
            None => {
                // Vehículo reservado sin registro abierto: dato degradado,
                // se normaliza el vehículo igual
                warn!(
                    "⚠️ Vehículo {} estaba RESERVED sin registro de venta abierto",
                    vehicle_id
                );
            }
        }
        self.store.commit(commit).await?;

        info!("↩️ Reserva cancelada: vehículo {} vuelve a la venta", vehicle_id);
        Ok(released)
    }

    /// Cierre de reserva: fija el precio final en el registro abierto, lo
    /// pasa a COMPLETED y el vehículo a SOLD en un único commit.
    pub async fn complete_reservation(
        &self,
        vehicle_id: &str,
        final_price: Decimal,
        handled_by_user_id: Option<&str>,
    ) -> AppResult<SaleRecord> {
        if final_price <= Decimal::ZERO {
            return Err(AppError::Conflict(
                "El precio final debe ser mayor que cero".to_string(),
            ));
        }

        let vehicle = self
            .store
            .get::<Vehicle>(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        let sold = vehicle.data.complete_reservation()?;
        let handled_by = self.validate_handler(handled_by_user_id).await?;

        let open = self
            .find_open_reservation(vehicle_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No existe una reserva abierta para el vehículo '{}'",
                    vehicle_id
                ))
            })?;

        let mut completed = open.data.clone();
        completed.status = SaleStatus::Completed;
        completed.final_price = Some(final_price);
        completed.transaction_date = Utc::now();
        if handled_by.is_some() {
            completed.handled_by_user_id = handled_by;
        }

        let commit = Commit::new()
            .update(&sold, vehicle.version)?
            .update(&completed, open.version)?;
        self.store.commit(commit).await?;

        info!(
            "✅ Reserva completada: vehículo {} vendido por {}",
            vehicle_id, final_price
        );
        Ok(completed)
    }

    /// Listado completo con vehículo y cliente resueltos.
    pub async fn list_with_relations(&self) -> AppResult<Vec<SaleRecordWithRelations>> {
        let records = self.store.find_all::<SaleRecord>().await?;
        let (vehicles, customers) = self.relation_maps().await?;

        Ok(records
            .into_iter()
            .map(|r| {
                let vehicle = vehicles.get(&r.data.vehicle_id).cloned();
                let customer = customers.get(&r.data.customer_id).cloned();
                SaleRecordWithRelations {
                    record: r.data,
                    vehicle,
                    customer,
                }
            })
            .collect())
    }

    pub async fn get_with_relations(&self, id: &str) -> AppResult<SaleRecordWithRelations> {
        let record = self
            .store
            .get::<SaleRecord>(id)
            .await?
            .ok_or_else(|| not_found_error("Transaction", id))?;

        let vehicle = self
            .store
            .get::<Vehicle>(&record.data.vehicle_id)
            .await?
            .map(|v| v.data);
        let customer = self
            .store
            .get::<Customer>(&record.data.customer_id)
            .await?
            .map(|c| c.data);

        Ok(SaleRecordWithRelations {
            record: record.data,
            vehicle,
            customer,
        })
    }

    /// Borrar un registro del libro. Solo se admiten registros CANCELLED:
    /// las reservas abiertas se retiran cancelándolas y las ventas
    /// completadas son asiento contable permanente.
    pub async fn delete_record(&self, id: &str) -> AppResult<()> {
        let record = self
            .store
            .get::<SaleRecord>(id)
            .await?
            .ok_or_else(|| not_found_error("Transaction", id))?;

        match record.data.status {
            SaleStatus::Cancelled => {
                self.store.delete::<SaleRecord>(id).await?;
                info!("🗑️ Registro de venta {} eliminado", id);
                Ok(())
            }
            SaleStatus::Reserved => Err(AppError::Conflict(
                "La reserva está abierta; cancele la reserva en lugar de borrarla".to_string(),
            )),
            SaleStatus::Completed => Err(AppError::Conflict(
                "Las ventas completadas no se pueden eliminar del libro".to_string(),
            )),
        }
    }

    /// Búsqueda por criterios combinados con AND sobre el libro completo.
    pub async fn search(&self, criteria: &SearchCriteria) -> AppResult<Vec<SaleRecordWithRelations>> {
        let all = self.list_with_relations().await?;
        Ok(all
            .into_iter()
            .filter(|item| {
                criteria.matches(&item.record, item.vehicle.as_ref(), item.customer.as_ref())
            })
            .collect())
    }

    /// Localizar la reserva abierta de un vehículo. El invariante del
    /// sistema garantiza a lo sumo una.
    async fn find_open_reservation(
        &self,
        vehicle_id: &str,
    ) -> AppResult<Option<Versioned<SaleRecord>>> {
        let records = self.store.find_all::<SaleRecord>().await?;
        Ok(records
            .into_iter()
            .find(|r| r.data.vehicle_id == vehicle_id && r.data.is_open_reservation()))
    }

    /// Validar el responsable si viene informado; cadena vacía cuenta como
    /// no informado.
    async fn validate_handler(&self, handled_by: Option<&str>) -> AppResult<Option<String>> {
        match handled_by.map(str::trim).filter(|h| !h.is_empty()) {
            Some(user_id) => {
                if self.store.get::<User>(user_id).await?.is_none() {
                    return Err(AppError::Conflict(format!(
                        "El usuario responsable '{}' no existe",
                        user_id
                    )));
                }
                Ok(Some(user_id.to_string()))
            }
            None => Ok(None),
        }
    }

    // Los registros se leen antes que los vehículos: una venta que se
    // complete entre ambas lecturas deja el vehículo más nuevo que el
    // registro, nunca un registro COMPLETED con vehículo todavía AVAILABLE.
    async fn relation_maps(
        &self,
    ) -> AppResult<(HashMap<String, Vehicle>, HashMap<String, Customer>)> {
        let vehicles = self
            .store
            .find_all::<Vehicle>()
            .await?
            .into_iter()
            .map(|v| (v.data.id.clone(), v.data))
            .collect();
        let customers = self
            .store
            .find_all::<Customer>()
            .await?
            .into_iter()
            .map(|c| (c.data.id.clone(), c.data))
            .collect();
        Ok((vehicles, customers))
    }
}
