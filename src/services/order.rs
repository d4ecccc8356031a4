use crate::domain::order::{Order, OrderStatus};
use crate::forms::order::StatusForm;
use crate::repository::{EntityReader, OrderStatusWriter};
use crate::services::entity::load_record;
use crate::services::{ServiceError, ServiceResult};

/// Moves an order exactly one step forward. Backward, skipping and no-op
/// moves, and moves into a status whose required details the order lacks,
/// are rejected before any network call.
pub async fn advance_status<Repo>(
    repo: &Repo,
    raw_id: &str,
    form: &StatusForm,
) -> ServiceResult<OrderStatus>
where
    Repo: EntityReader<Order> + OrderStatusWriter + ?Sized,
{
    let target = form
        .target()
        .ok_or_else(|| ServiceError::InvalidTransition("Unknown order status.".to_string()))?;
    let current = load_record::<Order, Repo>(repo, raw_id).await?;

    if current.status.next() != Some(target) {
        return Err(ServiceError::InvalidTransition(format!(
            "Order {} can only move one step forward.",
            current.plm_id
        )));
    }
    if let Some(detail) = current.missing_detail_for(target) {
        return Err(ServiceError::InvalidTransition(format!(
            "Order {} needs {detail} before it can move to {}. Add it in the edit sheet.",
            current.plm_id,
            target.label().to_lowercase()
        )));
    }

    repo.change_status(&current.id, target).await.map_err(|err| {
        log::error!("Failed to move order {} to {target}: {err}", current.id);
        ServiceError::from(err)
    })?;

    Ok(target)
}
