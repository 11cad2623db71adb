//! Controller de clientes

use validator::Validate;

use crate::dto::customer_dto::{CreateCustomerRequest, CustomerResponse, UpdateCustomerRequest};
use crate::dto::ApiResponse;
use crate::services::customer_service::{CustomerUpdate, NewCustomer};
use crate::services::CustomerService;
use crate::store::EntityStore;
use crate::utils::errors::AppResult;

pub struct CustomerController<S: EntityStore> {
    customers: CustomerService<S>,
}

impl<S: EntityStore> CustomerController<S> {
    pub fn new(store: S) -> Self {
        Self {
            customers: CustomerService::new(store),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<CustomerResponse>> {
        let customers = self.customers.list().await?;
        Ok(customers.into_iter().map(CustomerResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<CustomerResponse> {
        Ok(self.customers.get(id).await?.into())
    }

    pub async fn search(&self, keyword: &str) -> AppResult<Vec<CustomerResponse>> {
        let customers = self.customers.search(keyword).await?;
        Ok(customers.into_iter().map(CustomerResponse::from).collect())
    }

    pub async fn create(
        &self,
        request: CreateCustomerRequest,
    ) -> AppResult<ApiResponse<CustomerResponse>> {
        request.validate()?;

        let customer = self
            .customers
            .create(NewCustomer {
                name: request.name,
                phone: request.phone,
                category: request.category,
                contact_info: request.contact_info,
                notes: request.notes,
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            customer.into(),
            "Cliente creado exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdateCustomerRequest,
    ) -> AppResult<ApiResponse<CustomerResponse>> {
        request.validate()?;

        let customer = self
            .customers
            .update(
                id,
                CustomerUpdate {
                    name: request.name,
                    phone: request.phone,
                    category: request.category,
                    contact_info: request.contact_info,
                    notes: request.notes,
                },
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            customer.into(),
            "Cliente actualizado exitosamente".to_string(),
        ))
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.customers.delete(id).await
    }
}
