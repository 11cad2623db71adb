//! Controller de transacciones

use crate::dto::transaction_dto::{
    CreateTransactionRequest, SearchTransactionsQuery, TransactionResponse,
};
use crate::dto::ApiResponse;
use crate::services::transaction_search::SearchCriteria;
use crate::services::SaleService;
use crate::store::EntityStore;
use crate::utils::errors::AppResult;

pub struct TransactionController<S: EntityStore> {
    sales: SaleService<S>,
}

impl<S: EntityStore> TransactionController<S> {
    pub fn new(store: S) -> Self {
        Self {
            sales: SaleService::new(store),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<TransactionResponse>> {
        let records = self.sales.list_with_relations().await?;
        Ok(records.into_iter().map(TransactionResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<TransactionResponse> {
        Ok(self.sales.get_with_relations(id).await?.into())
    }

    /// Venta directa: crea el registro COMPLETED y marca el vehículo como vendido
    pub async fn create(
        &self,
        request: CreateTransactionRequest,
    ) -> AppResult<ApiResponse<TransactionResponse>> {
        let record = self
            .sales
            .create_direct_sale(
                &request.vehicle_id,
                &request.customer_id,
                request.price,
                request.handled_by_user_id.as_deref(),
                request.date,
            )
            .await?;

        let full = self.sales.get_with_relations(&record.id).await?;
        Ok(ApiResponse::success_with_message(
            full.into(),
            "Transacción creada exitosamente".to_string(),
        ))
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.sales.delete_record(id).await
    }

    pub async fn search(
        &self,
        query: SearchTransactionsQuery,
    ) -> AppResult<Vec<TransactionResponse>> {
        let criteria = SearchCriteria {
            status: query.status,
            order_id: query.order_id,
            vehicle: query.vehicle,
            customer: query.customer,
            price: query.price,
            start_date: query.start_date,
            end_date: query.end_date,
        };
        let results = self.sales.search(&criteria).await?;
        Ok(results.into_iter().map(TransactionResponse::from).collect())
    }
}
