use std::sync::Arc;

use crate::domain::entity::Resource;
use crate::domain::types::EntityId;
use crate::forms::{FormState, ResourceForm};
use crate::pagination::{PageRequest, Paginated};
use crate::repository::{EntityReader, EntityWriter, ListQuery};
use crate::services::{ServiceError, ServiceResult};
use crate::view::ViewQuery;

/// Loads the page of `R` addressed by the URL view state. A page past the
/// end, e.g. after the last row of the final page was deleted, falls back to
/// the last page that has rows.
pub async fn load_list<R, Repo>(
    repo: &Repo,
    view: &ViewQuery,
    page_size: usize,
) -> ServiceResult<Arc<Paginated<R>>>
where
    R: Resource,
    Repo: EntityReader<R> + ?Sized,
{
    let requested = view.page_request(page_size);
    let query = ListQuery::new(requested).filters(view.filters.clone());
    let page = list_page(repo, &query).await?;

    if !page.is_empty() || requested.index() <= page.index {
        return Ok(page);
    }
    log::debug!(
        "Page {} of {} is past the end, loading page {}",
        requested.index(),
        R::KIND,
        page.index
    );
    let last = ListQuery {
        page: PageRequest::new(page.index, requested.size()),
        ..query
    };
    list_page(repo, &last).await
}

async fn list_page<R, Repo>(repo: &Repo, query: &ListQuery) -> ServiceResult<Arc<Paginated<R>>>
where
    R: Resource,
    Repo: EntityReader<R> + ?Sized,
{
    repo.list(query).await.map_err(|err| {
        log::error!("Failed to list {}: {err}", R::KIND);
        ServiceError::from(err)
    })
}

/// Loads one record by the id taken from a path or query parameter.
pub async fn load_record<R, Repo>(repo: &Repo, raw_id: &str) -> ServiceResult<Arc<R>>
where
    R: Resource,
    Repo: EntityReader<R> + ?Sized,
{
    let id = EntityId::new(raw_id)?;
    repo.get_by_id(&id).await.map_err(|err| {
        log::error!("Failed to load {} {id}: {err}", R::KIND.label());
        ServiceError::from(err)
    })
}

/// Validates the create form and issues exactly one create call.
pub async fn create_record<R, F, Repo>(repo: &Repo, form: &F) -> ServiceResult<R>
where
    R: Resource,
    F: ResourceForm<R>,
    Repo: EntityWriter<R> + ?Sized,
{
    let payload = form
        .to_create()
        .map_err(|errors| ServiceError::Validation(FormState::new(form, errors)))?;

    repo.create(&payload).await.map_err(|err| {
        log::error!("Failed to create {}: {err}", R::KIND.label());
        ServiceError::from(err)
    })
}

/// Validates the edit form against the current record and issues exactly one
/// update call.
pub async fn update_record<R, F, Repo>(repo: &Repo, raw_id: &str, form: &F) -> ServiceResult<R>
where
    R: Resource,
    F: ResourceForm<R>,
    Repo: EntityReader<R> + EntityWriter<R> + ?Sized,
{
    let current = load_record::<R, Repo>(repo, raw_id).await?;
    let payload = form
        .to_update(&current)
        .map_err(|errors| ServiceError::Validation(FormState::new(form, errors)))?;

    repo.update(current.id(), &payload).await.map_err(|err| {
        log::error!("Failed to update {} {}: {err}", R::KIND.label(), current.id());
        ServiceError::from(err)
    })
}

/// Deletes the record confirmed in the delete dialog.
pub async fn delete_record<R, Repo>(repo: &Repo, raw_id: &str) -> ServiceResult<()>
where
    R: Resource,
    Repo: EntityWriter<R> + ?Sized,
{
    let id = EntityId::new(raw_id)?;
    repo.delete(&id).await.map_err(|err| {
        log::error!("Failed to delete {} {id}: {err}", R::KIND.label());
        ServiceError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::partner::Supplier;
    use crate::forms::partner::SupplierForm;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockSupplierRepository;

    const ID: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";

    fn supplier() -> Supplier {
        Supplier {
            id: EntityId::new(ID).unwrap(),
            name: "Mills & Co".to_string(),
            email: "sales@mills.example".to_string(),
            phone: "+16502530000".to_string(),
            address: None,
        }
    }

    fn valid_form() -> SupplierForm {
        SupplierForm {
            name: "Mills & Co".to_string(),
            email: "sales@mills.example".to_string(),
            phone: "+1 650-253-0000".to_string(),
            address: String::new(),
        }
    }

    #[tokio::test]
    async fn page_past_the_end_loads_the_last_page() {
        let mut repo = MockSupplierRepository::new();
        let mut sequence = mockall::Sequence::new();
        repo.expect_list()
            .withf(|query| query.page.index() == 4)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|query| Ok(Arc::new(Paginated::new(Vec::new(), 4, query.page.size(), 3))));
        repo.expect_list()
            .withf(|query| query.page.index() == 1 && query.filters["search"] == "mill")
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|query| Ok(Arc::new(Paginated::new(vec![supplier()], 1, query.page.size(), 3))));
        let view = ViewQuery::parse("page=5&search=mill", &["search"]);

        let page = load_list::<Supplier, _>(&repo, &view, 2).await.unwrap();

        assert_eq!(page.index, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn empty_result_is_not_refetched() {
        let mut repo = MockSupplierRepository::new();
        repo.expect_list()
            .times(1)
            .returning(|query| Ok(Arc::new(Paginated::new(Vec::new(), 0, query.page.size(), 0))));
        let view = ViewQuery::parse("page=3", &[]);

        let page = load_list::<Supplier, _>(&repo, &view, 2).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_backend() {
        let mut repo = MockSupplierRepository::new();
        repo.expect_create().times(0);
        let form = SupplierForm {
            name: String::new(),
            ..valid_form()
        };

        let result = create_record::<Supplier, _, _>(&repo, &form).await;

        match result {
            Err(ServiceError::Validation(state)) => {
                assert!(state.errors.has("name"));
                assert_eq!(state.values["email"], "sales@mills.example");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_form_creates_once() {
        let mut repo = MockSupplierRepository::new();
        repo.expect_create()
            .withf(|payload| payload.phone.as_str() == "+16502530000")
            .times(1)
            .returning(|_| Ok(supplier()));

        let created = create_record::<Supplier, _, _>(&repo, &valid_form())
            .await
            .unwrap();
        assert_eq!(created.id.as_str(), ID);
    }

    #[tokio::test]
    async fn update_reads_current_record_then_puts() {
        let mut repo = MockSupplierRepository::new();
        repo.expect_get_by_id()
            .times(1)
            .returning(|_| Ok(Arc::new(supplier())));
        repo.expect_update()
            .withf(|id, payload| id.as_str() == ID && payload.name.as_str() == "Mills & Co")
            .times(1)
            .returning(|_, _| Ok(supplier()));

        update_record::<Supplier, _, _>(&repo, ID, &valid_form())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn backend_failure_surfaces_as_backend_error() {
        let mut repo = MockSupplierRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::ConnectionError("refused".to_string())));

        let result = create_record::<Supplier, _, _>(&repo, &valid_form()).await;
        assert!(matches!(result, Err(ServiceError::Backend(_))));
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_without_a_call() {
        let mut repo = MockSupplierRepository::new();
        repo.expect_delete().times(0);

        let result = delete_record::<Supplier, _>(&repo, "../etc").await;
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }

    #[tokio::test]
    async fn missing_record_maps_to_not_found() {
        let mut repo = MockSupplierRepository::new();
        repo.expect_get_by_id()
            .returning(|_| Err(RepositoryError::NotFound));

        let result = load_record::<Supplier, _>(&repo, ID).await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
