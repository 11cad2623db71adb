//! Modelo de Customer
//!
//! Clientes de la concesionaria: compradores y vendedores. El teléfono es
//! único a nivel global; lo verifica el servicio antes de persistir.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// Tipo de cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerCategory {
    Buyer,
    Seller,
}

impl fmt::Display for CustomerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerCategory::Buyer => f.write_str("BUYER"),
            CustomerCategory::Seller => f.write_str("SELLER"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub category: CustomerCategory,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
    pub date_added: DateTime<Utc>,
}

impl Entity for Customer {
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Customer {
    /// Descriptor "{nombre} {teléfono}" usado por la búsqueda de transacciones.
    pub fn descriptor(&self) -> String {
        format!("{} {}", self.name, self.phone)
    }
}
