//! DTOs de usuarios

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

/// Request para dar de alta un usuario
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,

    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(length(max = 20))]
    pub role: Option<String>,

    #[validate(length(max = 100))]
    pub email: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

/// Request para actualizar un usuario
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,

    #[validate(length(max = 20))]
    pub role: Option<String>,

    #[validate(length(max = 100))]
    pub email: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    pub status: Option<String>,
}

/// Request para cambiar el estado de la cuenta
#[derive(Debug, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub status: String,
}

/// Filtro por rol
#[derive(Debug, Deserialize)]
pub struct UserRoleQuery {
    pub role: String,
}

/// Búsqueda por nombre
#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub name: Option<String>,
}

/// Response de usuario para la API
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            role: user.role,
            status: user.status,
            email: user.email,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}
