//! Modelo de User
//!
//! Usuarios del sistema (administradores y vendedores). El workflow de
//! ventas los consume solo como referencia del responsable de una
//! transacción; no hay credenciales ni login en este backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// Rol por defecto para usuarios nuevos.
pub const DEFAULT_ROLE: &str = "Sales";
/// Estados de cuenta permitidos.
pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_DISABLED: &str = "DISABLED";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}
