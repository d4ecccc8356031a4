use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::Serialize;
use tera::Tera;

use crate::domain::entity::EntityKind;
use crate::models::config::ServerConfig;
use crate::pagination::Paginated;
use crate::repository::HttpRepository;
use crate::routes::{
    Alert, GENERIC_ERROR, base_context, incoming_alerts, redirect, render_with_status,
};
use crate::screens::{SEARCH_PARAM, search_field};
use crate::services::reference::{REFERENCE_KINDS, load_reference_page};
use crate::view::ViewQuery;

#[derive(Serialize)]
struct ReferenceTab {
    name: &'static str,
    label: &'static str,
    href: String,
    active: bool,
}

fn reference_kind(name: &str) -> Option<EntityKind> {
    EntityKind::from_name(name).filter(|kind| REFERENCE_KINDS.contains(kind))
}

#[get("/references")]
pub async fn show_references_index() -> impl Responder {
    redirect(&format!("/references/{}", REFERENCE_KINDS[0].name()))
}

/// Reference data is small: the whole option list is loaded once through
/// the cache and paged locally.
#[get("/references/{kind}")]
pub async fn show_references(
    req: HttpRequest,
    kind: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let Some(kind) = reference_kind(&kind) else {
        return HttpResponse::NotFound().finish();
    };
    let base = format!("/references/{}", kind.name());
    let view = ViewQuery::parse(req.query_string(), &[SEARCH_PARAM]);
    let request = view.page_request(config.page_size());
    let mut alerts = incoming_alerts(&flash_messages);

    let search = view.filters.get(SEARCH_PARAM).map(String::as_str);
    let (page, status) = match load_reference_page(repo.get_ref(), kind, search, request).await {
        Ok(page) => (page, StatusCode::OK),
        Err(_) => {
            alerts.push(Alert::danger(GENERIC_ERROR));
            (Paginated::empty(request.size()), StatusCode::BAD_GATEWAY)
        }
    };

    let tabs = REFERENCE_KINDS
        .iter()
        .map(|tab| ReferenceTab {
            name: tab.name(),
            label: tab.label(),
            href: format!("/references/{}", tab.name()),
            active: *tab == kind,
        })
        .collect::<Vec<_>>();

    let mut context = base_context(&alerts, "references");
    context.insert("title", kind.label());
    context.insert("tabs", &tabs);
    context.insert("items", &page.items);
    context.insert("count", &page.count);
    context.insert("pagination", &view.pagination(&base, page.control(), 5));
    context.insert("filters", &[search_field(&view.filters)]);
    context.insert("base", &base);

    render_with_status(&tera, "references/index.html", &context, status)
}
