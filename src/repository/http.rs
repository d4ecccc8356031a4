use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    cache::{QueryCache, QueryKey},
    client::BackendClient,
    domain::{
        entity::{EntityKind, EntityRef, Resource},
        order::{OrderStatus, StatusChange},
        sample::UploadedFile,
        types::EntityId,
    },
    pagination::Paginated,
    repository::{
        EntityReader, EntityWriter, ListQuery, OptionsReader, OrderStatusWriter, SampleWriter,
        errors::RepositoryResult,
    },
};

/// Backend path receiving image uploads.
pub const UPLOADS_PATH: &str = "uploads";

/// Backend-backed implementation of the repository traits. Every read goes
/// through the shared [`QueryCache`].
#[derive(Clone)]
pub struct HttpRepository {
    client: BackendClient,
    cache: QueryCache,
}

impl HttpRepository {
    pub fn new(client: BackendClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// `[entity, "page", filters..., index, size]`
    pub fn list_key(kind: EntityKind, query: &ListQuery) -> QueryKey {
        query
            .filters
            .iter()
            .fold(QueryKey::entity(kind).with("page"), |key, (name, value)| {
                key.with(format!("{name}={value}"))
            })
            .with(query.page.index())
            .with(query.page.size())
    }

    /// `[entity, "detail", id]`
    pub fn detail_key(kind: EntityKind, id: &EntityId) -> QueryKey {
        QueryKey::entity(kind).with("detail").with(id)
    }

    /// `[entity, "options"]`
    pub fn options_key(kind: EntityKind) -> QueryKey {
        QueryKey::entity(kind).with("options")
    }

    fn record_path(kind: EntityKind, id: &EntityId) -> String {
        format!("{}/{}", kind.name(), id)
    }

    fn mutated(&self, kind: EntityKind) {
        let evicted = self.cache.invalidate_entity(kind);
        log::debug!("Invalidated {evicted} cached {kind} queries");
    }
}

#[async_trait]
impl<R: Resource> EntityReader<R> for HttpRepository {
    async fn list(&self, query: &ListQuery) -> RepositoryResult<Arc<Paginated<R>>> {
        let client = &self.client;
        let page = query.page;
        let filters = &query.filters;
        let key = Self::list_key(R::KIND, query);

        let result = self
            .cache
            .fetch(key, move || client.list::<R>(R::KIND.name(), page, filters))
            .await?;
        Ok(result)
    }

    async fn get_by_id(&self, id: &EntityId) -> RepositoryResult<Arc<R>> {
        let client = &self.client;
        let path = Self::record_path(R::KIND, id);
        let path = path.as_str();

        let result = self
            .cache
            .fetch(Self::detail_key(R::KIND, id), move || client.get::<R>(path))
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl<R: Resource> EntityWriter<R> for HttpRepository {
    async fn create(&self, payload: &R::Create) -> RepositoryResult<R> {
        let created: R = self.client.post(R::KIND.name(), payload).await?;
        log::info!("Created {} {}", R::KIND.label(), created.id());
        self.mutated(R::KIND);
        Ok(created)
    }

    async fn update(&self, id: &EntityId, payload: &R::Update) -> RepositoryResult<R> {
        let updated: R = self
            .client
            .put(&Self::record_path(R::KIND, id), payload)
            .await?;
        log::info!("Updated {} {id}", R::KIND.label());
        self.mutated(R::KIND);
        Ok(updated)
    }

    async fn delete(&self, id: &EntityId) -> RepositoryResult<()> {
        self.client.delete(&Self::record_path(R::KIND, id)).await?;
        log::info!("Deleted {} {id}", R::KIND.label());
        self.mutated(R::KIND);
        Ok(())
    }
}

#[async_trait]
impl OptionsReader for HttpRepository {
    async fn options(&self, kind: EntityKind) -> RepositoryResult<Arc<Vec<EntityRef>>> {
        let client = &self.client;
        let path = format!("{}/options", kind.name());
        let path = path.as_str();

        let result = self
            .cache
            .fetch(Self::options_key(kind), move || {
                client.get::<Vec<EntityRef>>(path)
            })
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl OrderStatusWriter for HttpRepository {
    async fn change_status(&self, id: &EntityId, status: OrderStatus) -> RepositoryResult<()> {
        let path = format!("{}/status", Self::record_path(EntityKind::Order, id));
        self.client.patch(&path, &StatusChange { status }).await?;
        log::info!("Order {id} moved to {status}");
        self.mutated(EntityKind::Order);
        Ok(())
    }
}

#[async_trait]
impl SampleWriter for HttpRepository {
    async fn verify(&self, id: &EntityId) -> RepositoryResult<()> {
        let path = format!("{}/verify", Self::record_path(EntityKind::Sample, id));
        self.client.patch_empty(&path).await?;
        log::info!("Sample {id} verified");
        self.mutated(EntityKind::Sample);
        Ok(())
    }

    async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> RepositoryResult<UploadedFile> {
        let uploaded: UploadedFile = self
            .client
            .upload(UPLOADS_PATH, file_name, content_type, bytes)
            .await?;
        log::info!("Uploaded {file_name} to {}", uploaded.url);
        Ok(uploaded)
    }
}
