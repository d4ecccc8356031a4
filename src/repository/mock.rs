//! Mock repository implementations for isolating services in tests.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;

use crate::domain::entity::{EntityKind, EntityRef};
use crate::domain::order::{NewOrder, Order, OrderStatus, UpdateOrder};
use crate::domain::partner::{NewSupplier, Supplier};
use crate::domain::sample::{NewSample, Sample, UploadedFile};
use crate::domain::types::EntityId;
use crate::pagination::Paginated;
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    EntityReader, EntityWriter, ListQuery, OptionsReader, OrderStatusWriter, SampleWriter,
};

mock! {
    pub SupplierRepository {}

    #[async_trait]
    impl EntityReader<Supplier> for SupplierRepository {
        async fn list(&self, query: &ListQuery) -> RepositoryResult<Arc<Paginated<Supplier>>>;
        async fn get_by_id(&self, id: &EntityId) -> RepositoryResult<Arc<Supplier>>;
    }

    #[async_trait]
    impl EntityWriter<Supplier> for SupplierRepository {
        async fn create(&self, payload: &NewSupplier) -> RepositoryResult<Supplier>;
        async fn update(&self, id: &EntityId, payload: &NewSupplier) -> RepositoryResult<Supplier>;
        async fn delete(&self, id: &EntityId) -> RepositoryResult<()>;
    }
}

mock! {
    pub OrderRepository {}

    #[async_trait]
    impl EntityReader<Order> for OrderRepository {
        async fn list(&self, query: &ListQuery) -> RepositoryResult<Arc<Paginated<Order>>>;
        async fn get_by_id(&self, id: &EntityId) -> RepositoryResult<Arc<Order>>;
    }

    #[async_trait]
    impl EntityWriter<Order> for OrderRepository {
        async fn create(&self, payload: &NewOrder) -> RepositoryResult<Order>;
        async fn update(&self, id: &EntityId, payload: &UpdateOrder) -> RepositoryResult<Order>;
        async fn delete(&self, id: &EntityId) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl OrderStatusWriter for OrderRepository {
        async fn change_status(&self, id: &EntityId, status: OrderStatus) -> RepositoryResult<()>;
    }
}

mock! {
    pub SampleRepository {}

    #[async_trait]
    impl EntityReader<Sample> for SampleRepository {
        async fn list(&self, query: &ListQuery) -> RepositoryResult<Arc<Paginated<Sample>>>;
        async fn get_by_id(&self, id: &EntityId) -> RepositoryResult<Arc<Sample>>;
    }

    #[async_trait]
    impl EntityWriter<Sample> for SampleRepository {
        async fn create(&self, payload: &NewSample) -> RepositoryResult<Sample>;
        async fn update(&self, id: &EntityId, payload: &NewSample) -> RepositoryResult<Sample>;
        async fn delete(&self, id: &EntityId) -> RepositoryResult<()>;
    }

    #[async_trait]
    impl SampleWriter for SampleRepository {
        async fn verify(&self, id: &EntityId) -> RepositoryResult<()>;
        async fn upload_image(
            &self,
            file_name: &str,
            content_type: &str,
            bytes: Vec<u8>,
        ) -> RepositoryResult<UploadedFile>;
    }
}

mock! {
    pub OptionsRepository {}

    #[async_trait]
    impl OptionsReader for OptionsRepository {
        async fn options(&self, kind: EntityKind) -> RepositoryResult<Arc<Vec<EntityRef>>>;
    }
}
