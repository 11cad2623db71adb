//! DTOs de clientes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Customer, CustomerCategory};

/// Request para dar de alta un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(length(min = 10, max = 20))]
    pub phone: String,

    pub category: CustomerCategory,

    #[validate(length(max = 100))]
    pub contact_info: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Request para actualizar un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,

    #[validate(length(min = 10, max = 20))]
    pub phone: Option<String>,

    pub category: Option<CustomerCategory>,

    #[validate(length(max = 100))]
    pub contact_info: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Parámetros de búsqueda de clientes
#[derive(Debug, Deserialize)]
pub struct SearchCustomersQuery {
    pub keyword: String,
}

/// Response de cliente para la API
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub category: String,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
    pub date_added: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            phone: customer.phone,
            category: customer.category.to_string(),
            contact_info: customer.contact_info,
            notes: customer.notes,
            date_added: customer.date_added,
        }
    }
}
