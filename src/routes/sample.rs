use std::sync::Arc;

use actix_multipart::MultipartError;
use actix_multipart::form::{MultipartForm, MultipartFormConfig};
use actix_web::error::{InternalError, PayloadError};
use actix_web::{HttpRequest, HttpResponse, Responder, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::sample::Sample;
use crate::editor::EditorState;
use crate::forms::sample::SampleUploadForm;
use crate::models::config::ServerConfig;
use crate::repository::HttpRepository;
use crate::routes::entity::{self, Page, finish_submit, open_for_edit};
use crate::routes::{GENERIC_ERROR, notify_success, redirect};
use crate::screens::EntityScreen;
use crate::services::ServiceError;
use crate::services::sample as sample_service;
use crate::view::ViewQuery;

const TOO_LARGE: &str = "Images must be 5 MiB or smaller.";
const UNREADABLE: &str = "The upload could not be read. Please try again.";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(MultipartFormConfig::default().error_handler(rejected_upload))
        .service(verify_sample);
    entity::configure::<Sample>(
        cfg,
        web::post().to(create_sample),
        web::post().to(update_sample),
    );
}

/// Bodies the extractor refuses, most often an image over the per-field
/// limit, go back to the open sheet with an alert instead of a bare 400.
fn rejected_upload(err: MultipartError, req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        MultipartError::Payload(PayloadError::Overflow) => TOO_LARGE,
        _ => UNREADABLE,
    };
    log::warn!("Rejected sample upload to {}: {err}", req.path());
    FlashMessage::error(message).send();

    let view = ViewQuery::parse(req.query_string(), Sample::FILTERS);
    let back = view.href_with_sheet(&Sample::path(), &view.sheet);
    InternalError::from_response(err, redirect(&back)).into()
}

fn unreadable_upload(err: std::io::Error, back: &str) -> HttpResponse {
    log::error!("Failed to read uploaded image: {err}");
    FlashMessage::error(GENERIC_ERROR).send();
    redirect(back)
}

pub async fn create_sample(
    req: HttpRequest,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    MultipartForm(upload): MultipartForm<SampleUploadForm>,
) -> HttpResponse {
    let page = Page::new::<Sample>(&req, &repo, &tera, &config, &flash_messages);
    let (form, image) = match upload.into_parts() {
        Ok(parts) => parts,
        Err(err) => return unreadable_upload(err, &page.view.href(&Sample::path())),
    };

    let mut editor = EditorState::<Arc<Sample>>::default();
    editor.open_create();
    if let Err(err) = editor.begin_submit() {
        log::error!("Could not submit sample sheet: {err}");
        return HttpResponse::InternalServerError().finish();
    }

    let result = sample_service::create_sample(page.repo, &form, image).await;
    finish_submit(page, editor, form, result, "created").await
}

pub async fn update_sample(
    req: HttpRequest,
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    MultipartForm(upload): MultipartForm<SampleUploadForm>,
) -> HttpResponse {
    let page = Page::new::<Sample>(&req, &repo, &tera, &config, &flash_messages);
    let (form, image) = match upload.into_parts() {
        Ok(parts) => parts,
        Err(err) => return unreadable_upload(err, &page.view.href(&Sample::path())),
    };

    let editor = match open_for_edit::<Sample>(&page, &id).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };

    let result = sample_service::update_sample(page.repo, &id, &form, image).await;
    finish_submit(page, editor, form, result, "updated").await
}

#[post("/samples/{id}/verify")]
pub async fn verify_sample(
    req: HttpRequest,
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
) -> impl Responder {
    let back = ViewQuery::parse(req.query_string(), Sample::FILTERS).href(&Sample::path());

    match sample_service::verify_sample(repo.get_ref(), &id).await {
        Ok(()) => notify_success("Sample verified."),
        Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
            FlashMessage::error("Sample not found.").send();
        }
        Err(ServiceError::InvalidTransition(message)) => FlashMessage::warning(message).send(),
        Err(_) => FlashMessage::error(GENERIC_ERROR).send(),
    }
    redirect(&back)
}
