use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::entity::{EntityKind, EntityRef};
use crate::pagination::{PageRequest, Paginated};
use crate::repository::OptionsReader;
use crate::services::ServiceResult;

/// Lookup data browsed on the reference screen.
pub const REFERENCE_KINDS: [EntityKind; 3] =
    [EntityKind::Color, EntityKind::Size, EntityKind::CostType];

pub async fn load_options<Repo>(repo: &Repo, kind: EntityKind) -> ServiceResult<Arc<Vec<EntityRef>>>
where
    Repo: OptionsReader + ?Sized,
{
    Ok(repo.options(kind).await.inspect_err(|err| {
        log::error!("Failed to load {kind} options: {err}");
    })?)
}

/// Loads the whole option list of `kind` once and slices one page of it
/// locally, optionally narrowed by a case-insensitive name search.
pub async fn load_reference_page<Repo>(
    repo: &Repo,
    kind: EntityKind,
    search: Option<&str>,
    request: PageRequest,
) -> ServiceResult<Paginated<EntityRef>>
where
    Repo: OptionsReader + ?Sized,
{
    let options = load_options(repo, kind).await?;
    let needle = search
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase);

    let page = match needle {
        Some(needle) => {
            let matching: Vec<EntityRef> = options
                .iter()
                .filter(|option| option.name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            Paginated::from_slice(&matching, request)
        }
        None => Paginated::from_slice(&options, request),
    };
    Ok(page)
}

/// Loads every dropdown a sheet needs, keyed by the kind's logical name.
pub async fn load_dropdowns<Repo>(
    repo: &Repo,
    kinds: &[EntityKind],
) -> ServiceResult<BTreeMap<&'static str, Arc<Vec<EntityRef>>>>
where
    Repo: OptionsReader + ?Sized,
{
    let mut dropdowns = BTreeMap::new();
    for kind in kinds {
        dropdowns.insert(kind.name(), load_options(repo, *kind).await?);
    }
    Ok(dropdowns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::EntityId;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockOptionsRepository;
    use crate::services::ServiceError;

    fn colors() -> Vec<EntityRef> {
        ["Indigo", "Ecru", "Charcoal", "Navy", "Indian red"]
            .into_iter()
            .enumerate()
            .map(|(n, name)| EntityRef {
                id: EntityId::new(&format!("00000000-0000-4000-8000-00000000000{n}")).unwrap(),
                name: name.to_string(),
            })
            .collect()
    }

    fn repo() -> MockOptionsRepository {
        let mut repo = MockOptionsRepository::new();
        repo.expect_options()
            .withf(|kind| *kind == EntityKind::Color)
            .returning(|_| Ok(Arc::new(colors())));
        repo
    }

    #[tokio::test]
    async fn slices_the_full_list_locally() {
        let repo = repo();

        let page = load_reference_page(&repo, EntityKind::Color, None, PageRequest::new(1, 2))
            .await
            .unwrap();

        assert_eq!(page.count, 5);
        assert_eq!(page.pages, 3);
        let names: Vec<_> = page.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Charcoal", "Navy"]);
    }

    #[tokio::test]
    async fn search_narrows_before_paging() {
        let repo = repo();

        let page = load_reference_page(
            &repo,
            EntityKind::Color,
            Some(" ind "),
            PageRequest::new(0, 10),
        )
        .await
        .unwrap();

        assert_eq!(page.count, 2);
        assert_eq!(page.items[0].name, "Indigo");
        assert_eq!(page.items[1].name, "Indian red");
    }

    #[tokio::test]
    async fn page_past_the_end_is_clamped() {
        let repo = repo();

        let page = load_reference_page(&repo, EntityKind::Color, None, PageRequest::new(9, 2))
            .await
            .unwrap();

        assert_eq!(page.index, 2);
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn dropdown_failure_is_a_backend_error() {
        let mut repo = MockOptionsRepository::new();
        repo.expect_options()
            .returning(|_| Err(RepositoryError::ConnectionError("refused".to_string())));

        let result = load_dropdowns(&repo, &[EntityKind::Supplier]).await;
        assert!(matches!(result, Err(ServiceError::Backend(_))));
    }
}
