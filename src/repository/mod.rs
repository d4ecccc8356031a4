use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{
        entity::{EntityKind, EntityRef, Resource},
        order::OrderStatus,
        sample::UploadedFile,
        types::EntityId,
    },
    pagination::{PageRequest, Paginated},
    repository::errors::RepositoryResult,
};

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use http::HttpRepository;

/// One page of an entity list plus the filters narrowing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: PageRequest,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(page: PageRequest) -> Self {
        Self {
            page,
            filters: BTreeMap::new(),
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters.extend(filters);
        self
    }
}

#[async_trait]
pub trait EntityReader<R: Resource>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> RepositoryResult<Arc<Paginated<R>>>;
    async fn get_by_id(&self, id: &EntityId) -> RepositoryResult<Arc<R>>;
}

/// Mutations. Implementations invalidate cached reads only after the backend
/// confirmed the change.
#[async_trait]
pub trait EntityWriter<R: Resource>: Send + Sync {
    async fn create(&self, payload: &R::Create) -> RepositoryResult<R>;
    async fn update(&self, id: &EntityId, payload: &R::Update) -> RepositoryResult<R>;
    async fn delete(&self, id: &EntityId) -> RepositoryResult<()>;
}

/// `{id, name}` lists feeding dropdowns and the reference screens.
#[async_trait]
pub trait OptionsReader: Send + Sync {
    async fn options(&self, kind: EntityKind) -> RepositoryResult<Arc<Vec<EntityRef>>>;
}

#[async_trait]
pub trait OrderStatusWriter: Send + Sync {
    async fn change_status(&self, id: &EntityId, status: OrderStatus) -> RepositoryResult<()>;
}

#[async_trait]
pub trait SampleWriter: Send + Sync {
    async fn verify(&self, id: &EntityId) -> RepositoryResult<()>;
    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> RepositoryResult<UploadedFile>;
}
