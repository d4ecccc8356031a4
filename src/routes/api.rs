use actix_web::{HttpResponse, Responder, get, web};

use crate::domain::entity::EntityKind;
use crate::repository::HttpRepository;
use crate::services::reference::load_options;

/// `{id, name}` list of any entity kind for client-side dropdowns.
#[get("/v1/options/{kind}")]
pub async fn api_v1_options(
    kind: web::Path<String>,
    repo: web::Data<HttpRepository>,
) -> impl Responder {
    let Some(kind) = EntityKind::from_name(&kind) else {
        return HttpResponse::NotFound().finish();
    };

    match load_options(repo.get_ref(), kind).await {
        Ok(options) => HttpResponse::Ok().json(options.as_ref()),
        Err(_) => HttpResponse::BadGateway().finish(),
    }
}
