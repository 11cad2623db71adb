//! Servicio de clientes
//!
//! CRUD de clientes con unicidad de teléfono y búsqueda por nombre o
//! teléfono.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::{Customer, CustomerCategory};
use crate::store::EntityStore;
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};
use crate::utils::validation::validate_phone;

/// Datos de alta de cliente.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub category: CustomerCategory,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}

/// Cambios parciales de cliente.
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub category: Option<CustomerCategory>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}

pub struct CustomerService<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Customer>> {
        let mut customers: Vec<Customer> = self
            .store
            .find_all::<Customer>()
            .await?
            .into_iter()
            .map(|c| c.data)
            .collect();
        customers.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        Ok(customers)
    }

    pub async fn get(&self, id: &str) -> AppResult<Customer> {
        Ok(self
            .store
            .get::<Customer>(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", id))?
            .data)
    }

    /// Búsqueda por nombre o teléfono, substring sin distinguir mayúsculas.
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<Customer>> {
        let keyword = keyword.trim().to_lowercase();
        let customers = self.list().await?;
        if keyword.is_empty() {
            return Ok(customers);
        }
        Ok(customers
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&keyword)
                    || c.phone.to_lowercase().contains(&keyword)
            })
            .collect())
    }

    pub async fn create(&self, input: NewCustomer) -> AppResult<Customer> {
        if input.name.trim().is_empty() {
            return Err(bad_request_error("El nombre del cliente es requerido"));
        }
        let phone = input.phone.trim().to_string();
        if phone.is_empty() {
            return Err(bad_request_error("El teléfono del cliente es requerido"));
        }
        validate_phone(&phone)
            .map_err(|_| bad_request_error("El teléfono no tiene un formato válido"))?;
        if self.phone_exists(&phone, None).await? {
            return Err(AppError::Conflict(
                "El teléfono ya está registrado en otro cliente".to_string(),
            ));
        }

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone,
            category: input.category,
            contact_info: input.contact_info,
            notes: input.notes,
            date_added: Utc::now(),
        };

        let saved = self.store.insert(&customer).await?;
        info!("👤 Cliente dado de alta: {} ({})", saved.data.name, saved.data.phone);
        Ok(saved.data)
    }

    pub async fn update(&self, id: &str, changes: CustomerUpdate) -> AppResult<Customer> {
        let current = self
            .store
            .get::<Customer>(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", id))?;

        let mut next = current.data.clone();

        if let Some(name) = changes.name {
            if name.trim().is_empty() {
                return Err(bad_request_error("El nombre del cliente es requerido"));
            }
            next.name = name.trim().to_string();
        }
        if let Some(phone) = changes.phone {
            let phone = phone.trim().to_string();
            if phone.is_empty() {
                return Err(bad_request_error("El teléfono del cliente es requerido"));
            }
            validate_phone(&phone)
                .map_err(|_| bad_request_error("El teléfono no tiene un formato válido"))?;
            if phone != next.phone && self.phone_exists(&phone, Some(id)).await? {
                return Err(AppError::Conflict(
                    "El teléfono ya está registrado en otro cliente".to_string(),
                ));
            }
            next.phone = phone;
        }
        if let Some(category) = changes.category {
            next.category = category;
        }
        if let Some(contact_info) = changes.contact_info {
            next.contact_info = Some(contact_info);
        }
        if let Some(notes) = changes.notes {
            next.notes = Some(notes);
        }

        // La fecha de alta no se modifica
        next.date_added = current.data.date_added;

        let saved = self.store.update(&next, current.version).await?;
        Ok(saved.data)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.store.delete::<Customer>(id).await? {
            return Err(not_found_error("Customer", id));
        }
        info!("🗑️ Cliente {} eliminado", id);
        Ok(())
    }

    async fn phone_exists(&self, phone: &str, exclude_id: Option<&str>) -> AppResult<bool> {
        let customers = self.store.find_all::<Customer>().await?;
        Ok(customers.iter().any(|c| {
            c.data.phone == phone && exclude_id.map(|id| c.data.id != id).unwrap_or(true)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn new_customer(name: &str, phone: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            phone: phone.to_string(),
            category: CustomerCategory::Buyer,
            contact_info: None,
            notes: None,
        }
    }

    fn service() -> CustomerService<MemoryStore> {
        CustomerService::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn phone_must_be_unique() {
        let service = service();
        service.create(new_customer("Ana", "5512345678")).await.unwrap();

        let err = service
            .create(new_customer("Otra Ana", "5512345678"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_allows_keeping_own_phone() {
        let service = service();
        let ana = service.create(new_customer("Ana", "5512345678")).await.unwrap();
        service.create(new_customer("Luis", "5587654321")).await.unwrap();

        let updated = service
            .update(
                &ana.id,
                CustomerUpdate {
                    phone: Some("5512345678".to_string()),
                    name: Some("Ana María".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana María");
        assert_eq!(updated.date_added, ana.date_added);

        let err = service
            .update(
                &ana.id,
                CustomerUpdate {
                    phone: Some("5587654321".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn search_matches_name_or_phone() {
        let service = service();
        service.create(new_customer("Ana García", "5512345678")).await.unwrap();
        service.create(new_customer("Luis Pérez", "5587654321")).await.unwrap();

        assert_eq!(service.search("ana").await.unwrap().len(), 1);
        assert_eq!(service.search("5587").await.unwrap().len(), 1);
        assert_eq!(service.search("").await.unwrap().len(), 2);
        assert!(service.search("zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let service = service();
        let err = service.delete("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
