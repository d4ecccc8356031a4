use actix_web::{HttpRequest, Responder, post, web};
use actix_web_flash_messages::FlashMessage;

use crate::domain::order::Order;
use crate::forms::order::StatusForm;
use crate::repository::HttpRepository;
use crate::routes::{GENERIC_ERROR, notify_success, redirect};
use crate::screens::EntityScreen;
use crate::services::ServiceError;
use crate::services::order as order_service;
use crate::view::ViewQuery;

#[post("/orders/{id}/status")]
pub async fn advance_order_status(
    req: HttpRequest,
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    web::Form(form): web::Form<StatusForm>,
) -> impl Responder {
    let back = ViewQuery::parse(req.query_string(), Order::FILTERS).href(&Order::path());

    match order_service::advance_status(repo.get_ref(), &id, &form).await {
        Ok(status) => notify_success(format!("Order moved to {}.", status.label().to_lowercase())),
        Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
            FlashMessage::error("Order not found.").send();
        }
        Err(ServiceError::InvalidTransition(message)) => {
            log::warn!("Rejected status change of order {id}: {message}");
            FlashMessage::warning(message).send();
        }
        Err(_) => FlashMessage::error(GENERIC_ERROR).send(),
    }
    redirect(&back)
}
