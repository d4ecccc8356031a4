//! HTTP handlers and the helpers they share.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, Responder, get};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use chrono::Utc;
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::entity::EntityKind;
use crate::table::DATE_TIME_FORMAT;

pub mod api;
pub mod entity;
pub mod order;
pub mod reference;
pub mod sample;

/// Shown whenever the backend fails; the details go to the log.
pub const GENERIC_ERROR: &str = "Something went wrong while talking to the server. Please try again.";

/// Screens listed in the navigation bar, in display order.
pub const NAVIGATION: [EntityKind; 7] = [
    EntityKind::Order,
    EntityKind::Sample,
    EntityKind::Collection,
    EntityKind::Fabric,
    EntityKind::Material,
    EntityKind::Supplier,
    EntityKind::Customer,
];

#[derive(Serialize)]
struct NavLink {
    name: &'static str,
    label: &'static str,
    href: String,
}

/// Alert rendered at the top of a page.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub level: &'static str,
}

impl Alert {
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: "danger",
        }
    }
}

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info | Level::Debug => "info",
    }
}

pub fn incoming_alerts(flash_messages: &IncomingFlashMessages) -> Vec<Alert> {
    flash_messages
        .iter()
        .map(|message| Alert {
            message: message.content().to_string(),
            level: alert_level_to_str(&message.level()),
        })
        .collect()
}

/// Queues a success toast stamped with the time of the action.
pub fn notify_success(message: impl AsRef<str>) {
    FlashMessage::success(format!(
        "{} ({})",
        message.as_ref(),
        Utc::now().format(DATE_TIME_FORMAT)
    ))
    .send();
}

/// Context every page starts from: alerts, the active screen and the
/// navigation bar.
pub fn base_context(alerts: &[Alert], current_page: &str) -> Context {
    let navigation = NAVIGATION
        .iter()
        .map(|kind| NavLink {
            name: kind.name(),
            label: kind.label(),
            href: format!("/{}", kind.name()),
        })
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", alerts);
    context.insert("current_page", current_page);
    context.insert("navigation", &navigation);
    context
}

pub fn render_with_status(
    tera: &Tera,
    template: &str,
    context: &Context,
    status: StatusCode,
) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Upper-cases the first letter of a noun for sentence starts.
pub fn sentence_case(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[get("/")]
pub async fn show_index() -> impl Responder {
    redirect(&format!("/{}", NAVIGATION[0].name()))
}
