//! Servicio de usuarios
//!
//! Gestión de usuarios del sistema: alta con username único, edición
//! parcial, búsqueda y cambio de estado de cuenta. Este backend no maneja
//! credenciales; los usuarios existen como referencia del responsable de
//! cada transacción.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::user::{DEFAULT_ROLE, STATUS_ACTIVE, STATUS_DISABLED};
use crate::models::User;
use crate::store::EntityStore;
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};
use crate::utils::validation::validate_email;

/// Datos de alta de usuario.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Cambios parciales de usuario; los campos ausentes conservan su valor.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

pub struct UserService<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self
            .store
            .find_all::<User>()
            .await?
            .into_iter()
            .map(|u| u.data)
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub async fn get(&self, id: &str) -> AppResult<User> {
        Ok(self
            .store
            .get::<User>(id)
            .await?
            .ok_or_else(|| not_found_error("User", id))?
            .data)
    }

    pub async fn list_by_role(&self, role: &str) -> AppResult<Vec<User>> {
        let users = self.list().await?;
        Ok(users.into_iter().filter(|u| u.role == role).collect())
    }

    pub async fn search_by_name(&self, name: &str) -> AppResult<Vec<User>> {
        let name = name.trim().to_lowercase();
        let users = self.list().await?;
        if name.is_empty() {
            return Ok(users);
        }
        Ok(users
            .into_iter()
            .filter(|u| u.name.to_lowercase().contains(&name))
            .collect())
    }

    pub async fn create(&self, input: NewUser) -> AppResult<User> {
        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(bad_request_error("El nombre de usuario es requerido"));
        }
        if input.name.trim().is_empty() {
            return Err(bad_request_error("El nombre real es requerido"));
        }
        if let Some(email) = input.email.as_deref() {
            validate_email(email)
                .map_err(|_| bad_request_error("El email no tiene un formato válido"))?;
        }
        if self.username_exists(&username, None).await? {
            return Err(AppError::Conflict(
                "El nombre de usuario ya existe".to_string(),
            ));
        }

        let role = input
            .role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            name: input.name.trim().to_string(),
            role,
            status: STATUS_ACTIVE.to_string(),
            email: input.email,
            phone: input.phone,
            created_at: Utc::now(),
        };

        let saved = self.store.insert(&user).await?;
        info!("👥 Usuario dado de alta: {} ({})", saved.data.username, saved.data.role);
        Ok(saved.data)
    }

    pub async fn update(&self, id: &str, changes: UserUpdate) -> AppResult<User> {
        let current = self
            .store
            .get::<User>(id)
            .await?
            .ok_or_else(|| not_found_error("User", id))?;

        let mut next = current.data.clone();

        if let Some(username) = changes.username {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(bad_request_error("El nombre de usuario es requerido"));
            }
            if username != next.username && self.username_exists(&username, Some(id)).await? {
                return Err(AppError::Conflict(
                    "El nombre de usuario ya está en uso por otro usuario".to_string(),
                ));
            }
            next.username = username;
        }
        if let Some(name) = changes.name {
            if name.trim().is_empty() {
                return Err(bad_request_error("El nombre real es requerido"));
            }
            next.name = name.trim().to_string();
        }
        if let Some(role) = changes.role.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()) {
            next.role = role;
        }
        if let Some(email) = changes.email {
            validate_email(&email)
                .map_err(|_| bad_request_error("El email no tiene un formato válido"))?;
            next.email = Some(email);
        }
        if let Some(phone) = changes.phone {
            next.phone = Some(phone);
        }
        if let Some(status) = changes.status.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            validate_status(&status)?;
            next.status = status;
        }

        let saved = self.store.update(&next, current.version).await?;
        Ok(saved.data)
    }

    pub async fn update_status(&self, id: &str, status: &str) -> AppResult<User> {
        validate_status(status)?;
        let current = self
            .store
            .get::<User>(id)
            .await?
            .ok_or_else(|| not_found_error("User", id))?;

        let mut next = current.data.clone();
        next.status = status.to_string();

        let saved = self.store.update(&next, current.version).await?;
        info!("👥 Usuario {} ahora está {}", id, status);
        Ok(saved.data)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.store.delete::<User>(id).await? {
            return Err(not_found_error("User", id));
        }
        info!("🗑️ Usuario {} eliminado", id);
        Ok(())
    }

    async fn username_exists(&self, username: &str, exclude_id: Option<&str>) -> AppResult<bool> {
        let users = self.store.find_all::<User>().await?;
        Ok(users.iter().any(|u| {
            u.data.username == username && exclude_id.map(|id| u.data.id != id).unwrap_or(true)
        }))
    }
}

fn validate_status(status: &str) -> AppResult<()> {
    if status != STATUS_ACTIVE && status != STATUS_DISABLED {
        return Err(bad_request_error(
            "Estado de usuario inválido, solo se admite ACTIVE o DISABLED",
        ));
    }
    Ok(())
}
