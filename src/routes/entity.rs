//! List, sheet and delete handlers shared by every entity screen.
//!
//! All state lives in the query string: `page` and the screen's filters
//! select the rows, `sheet=create`, `edit={id}` and `delete={id}` open the
//! sheet or the delete dialog. Successful mutations redirect back to the
//! same view, which re-reads through the query cache.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_DISPOSITION, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, Route, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Serialize;
use tera::Tera;

use crate::editor::{DeleteConfirmation, EditorState, EditorTarget};
use crate::forms::{FieldErrors, ResourceForm, parse_body};
use crate::models::config::ServerConfig;
use crate::pagination::Paginated;
use crate::repository::HttpRepository;
use crate::routes::{
    Alert, GENERIC_ERROR, base_context, incoming_alerts, notify_success, redirect,
    render_with_status, sentence_case,
};
use crate::screens::{EntityScreen, RowAction};
use crate::services::entity as entity_service;
use crate::services::reference::load_dropdowns;
use crate::services::{ServiceError, ServiceResult};
use crate::sheet::{Dropdowns, Field, attach_errors};
use crate::view::{SheetRequest, ViewQuery};

pub const LIST_TEMPLATE: &str = "entities/index.html";

/// Numbered page links shown around the current page.
const PAGE_LINKS: usize = 5;

/// Request-scoped dependencies of a list page.
pub struct Page<'a> {
    pub repo: &'a HttpRepository,
    pub tera: &'a Tera,
    pub config: &'a ServerConfig,
    pub view: ViewQuery,
    pub alerts: Vec<Alert>,
}

impl<'a> Page<'a> {
    pub fn new<T: EntityScreen>(
        req: &HttpRequest,
        repo: &'a HttpRepository,
        tera: &'a Tera,
        config: &'a ServerConfig,
        flash_messages: &IncomingFlashMessages,
    ) -> Self {
        Self {
            repo,
            tera,
            config,
            view: ViewQuery::parse(req.query_string(), T::FILTERS),
            alerts: incoming_alerts(flash_messages),
        }
    }
}

/// Form values and errors to show in an open sheet.
pub struct SheetSource<T: EntityScreen> {
    pub form: T::Form,
    pub current: Option<Arc<T>>,
    pub errors: FieldErrors,
}

impl<T: EntityScreen> SheetSource<T> {
    fn from_editor(editor: &EditorState<Arc<T>>) -> Option<Self> {
        let source = match editor.target()? {
            EditorTarget::Create => Self {
                form: T::Form::default(),
                current: None,
                errors: FieldErrors::new(),
            },
            EditorTarget::Edit(record) => Self {
                form: T::Form::from_record(record),
                current: Some(Arc::clone(record)),
                errors: FieldErrors::new(),
            },
        };
        Some(source)
    }
}

#[derive(Serialize)]
struct SheetContext {
    title: String,
    action: String,
    cancel_href: String,
    multipart: bool,
    submit_label: &'static str,
    fields: Vec<Field>,
}

#[derive(Serialize)]
struct DeleteContext {
    id: String,
    action: String,
    cancel_href: String,
    noun: &'static str,
}

#[derive(Serialize)]
struct ListRow {
    id: String,
    cells: Vec<String>,
    edit_href: String,
    delete_href: String,
    actions: Vec<RowAction>,
}

/// Registers list, export, delete and the given create/update routes for `T`.
pub fn configure<T: EntityScreen>(cfg: &mut web::ServiceConfig, create: Route, update: Route) {
    let base = T::path();
    cfg.service(web::resource(format!("{base}/export.csv")).route(web::get().to(export_csv::<T>)))
        .service(
            web::resource(base.clone())
                .route(web::get().to(show_list::<T>))
                .route(create),
        )
        .service(web::resource(format!("{base}/{{id}}/delete")).route(web::post().to(delete::<T>)))
        .service(web::resource(format!("{base}/{{id}}")).route(update));
}

/// [`configure`] with url-encoded sheets.
pub fn configure_urlencoded<T: EntityScreen>(cfg: &mut web::ServiceConfig) {
    configure::<T>(cfg, web::post().to(create::<T>), web::post().to(update::<T>));
}

async fn dropdowns<T: EntityScreen>(page: &mut Page<'_>) -> Dropdowns {
    match load_dropdowns(page.repo, T::DROPDOWNS).await {
        Ok(dropdowns) => dropdowns,
        Err(err) => {
            log::warn!("Rendering {} without dropdown options: {err}", T::KIND);
            page.alerts.push(Alert::danger(GENERIC_ERROR));
            Dropdowns::new()
        }
    }
}

/// Renders the list with an optional open sheet or delete dialog.
pub async fn render_list<T: EntityScreen>(
    mut page: Page<'_>,
    sheet: Option<SheetSource<T>>,
    dialog: DeleteConfirmation,
    status: StatusCode,
) -> HttpResponse {
    let base = T::path();
    let page_size = page.config.page_size();

    let (records, status) =
        match entity_service::load_list::<T, HttpRepository>(page.repo, &page.view, page_size).await
        {
            Ok(records) => (records, status),
            Err(_) => {
                page.alerts.push(Alert::danger(GENERIC_ERROR));
                (Arc::new(Paginated::empty(page_size)), StatusCode::BAD_GATEWAY)
            }
        };
    let dropdowns = dropdowns::<T>(&mut page).await;

    let rendered = T::table().render(&records.items);
    let rows = rendered
        .rows
        .iter()
        .zip(records.items.iter())
        .map(|(row, record)| ListRow {
            id: row.id.clone(),
            cells: row.cells.clone(),
            edit_href: page
                .view
                .href_with_sheet(&base, &SheetRequest::Edit(row.id.clone())),
            delete_href: page
                .view
                .href_with_sheet(&base, &SheetRequest::Delete(row.id.clone())),
            actions: T::row_actions(record)
                .into_iter()
                .map(|action| RowAction {
                    action: page.view.href(&action.action),
                    ..action
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    let sheet = sheet.map(|source| {
        let mut fields = T::fields(&source.form, source.current.as_deref(), &dropdowns);
        attach_errors(&mut fields, &source.errors);
        let (title, action, submit_label) = match &source.current {
            Some(record) => (
                format!("Edit {}", T::NOUN),
                page.view.href(&format!("{base}/{}", record.id())),
                "Save changes",
            ),
            None => (format!("New {}", T::NOUN), page.view.href(&base), "Create"),
        };
        SheetContext {
            title,
            action,
            cancel_href: page.view.href(&base),
            multipart: T::MULTIPART,
            submit_label,
            fields,
        }
    });

    let delete = dialog.open.then(|| DeleteContext {
        action: page.view.href(&format!("{base}/{}/delete", dialog.id)),
        id: dialog.id.clone(),
        cancel_href: page.view.href(&base),
        noun: T::NOUN,
    });

    let mut context = base_context(&page.alerts, T::KIND.name());
    context.insert("title", T::KIND.label());
    context.insert("noun", T::NOUN);
    context.insert("base", &base);
    context.insert("headers", &rendered.headers);
    context.insert("rows", &rows);
    context.insert("colspan", &(rendered.headers.len() + 1));
    context.insert("empty", &rendered.empty);
    context.insert("empty_message", rendered.empty_message);
    context.insert("count", &records.count);
    context.insert(
        "pagination",
        &page.view.pagination(&base, records.control(), PAGE_LINKS),
    );
    context.insert("filters", &T::filter_fields(&page.view.filters, &dropdowns));
    context.insert("reset_href", &base);
    context.insert(
        "create_href",
        &page.view.href_with_sheet(&base, &SheetRequest::Create),
    );
    context.insert("export_href", &page.view.href(&format!("{base}/export.csv")));
    context.insert("sheet", &sheet);
    context.insert("delete", &delete);

    render_with_status(page.tera, LIST_TEMPLATE, &context, status)
}

pub async fn show_list<T: EntityScreen>(
    req: HttpRequest,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let mut page = Page::new::<T>(&req, &repo, &tera, &config, &flash_messages);
    let mut editor = EditorState::<Arc<T>>::default();
    let mut dialog = DeleteConfirmation::default();

    match page.view.sheet.clone() {
        SheetRequest::None => {}
        SheetRequest::Create => editor.open_create(),
        SheetRequest::Edit(id) => {
            match entity_service::load_record::<T, HttpRepository>(page.repo, &id).await {
                Ok(record) => editor.open_edit(record),
                Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
                    page.alerts
                        .push(Alert::danger(format!("{} not found.", sentence_case(T::NOUN))));
                }
                Err(_) => page.alerts.push(Alert::danger(GENERIC_ERROR)),
            }
        }
        SheetRequest::Delete(id) => dialog = DeleteConfirmation::open(id),
    }

    let sheet = SheetSource::from_editor(&editor);
    render_list(page, sheet, dialog, StatusCode::OK).await
}

/// Settles a submitted sheet: redirect on success, otherwise re-render it
/// open with the entered values.
pub async fn finish_submit<T: EntityScreen>(
    mut page: Page<'_>,
    mut editor: EditorState<Arc<T>>,
    form: T::Form,
    result: ServiceResult<T>,
    verb: &str,
) -> HttpResponse {
    let base = T::path();
    let (errors, status) = match result {
        Ok(_) => {
            if let Err(err) = editor.submit_succeeded() {
                log::warn!("Sheet for {} settled twice: {err}", T::KIND);
            }
            notify_success(format!("{} {verb}.", sentence_case(T::NOUN)));
            return redirect(&page.view.href(&base));
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error(format!("{} not found.", sentence_case(T::NOUN))).send();
            return redirect(&page.view.href(&base));
        }
        Err(ServiceError::Validation(state)) => (state.errors, StatusCode::UNPROCESSABLE_ENTITY),
        Err(ServiceError::InvalidTransition(message)) => {
            page.alerts.push(Alert::danger(message));
            (FieldErrors::new(), StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(err) => {
            log::error!("Failed to save {}: {err}", T::NOUN);
            page.alerts.push(Alert::danger(GENERIC_ERROR));
            (FieldErrors::new(), StatusCode::BAD_GATEWAY)
        }
    };

    if let Err(err) = editor.submit_failed() {
        log::warn!("Sheet for {} was not submitting: {err}", T::KIND);
    }
    let sheet = SheetSource {
        form,
        current: editor.record().cloned(),
        errors,
    };
    render_list(page, Some(sheet), DeleteConfirmation::default(), status).await
}

fn malformed_body(err: impl std::fmt::Display, base: &str) -> HttpResponse {
    log::warn!("Rejected malformed form body: {err}");
    FlashMessage::error(GENERIC_ERROR).send();
    redirect(base)
}

pub async fn create<T: EntityScreen>(
    req: HttpRequest,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    body: web::Bytes,
) -> HttpResponse {
    let page = Page::new::<T>(&req, &repo, &tera, &config, &flash_messages);
    let form: T::Form = match parse_body(&body) {
        Ok(form) => form,
        Err(err) => return malformed_body(err, &page.view.href(&T::path())),
    };

    let mut editor = EditorState::<Arc<T>>::default();
    editor.open_create();
    if let Err(err) = editor.begin_submit() {
        log::error!("Could not submit {} sheet: {err}", T::NOUN);
        return HttpResponse::InternalServerError().finish();
    }

    let result = entity_service::create_record::<T, T::Form, HttpRepository>(page.repo, &form).await;
    finish_submit(page, editor, form, result, "created").await
}

pub async fn update<T: EntityScreen>(
    req: HttpRequest,
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
    tera: web::Data<Tera>,
    config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    body: web::Bytes,
) -> HttpResponse {
    let page = Page::new::<T>(&req, &repo, &tera, &config, &flash_messages);
    let form: T::Form = match parse_body(&body) {
        Ok(form) => form,
        Err(err) => return malformed_body(err, &page.view.href(&T::path())),
    };

    let editor = match open_for_edit::<T>(&page, &id).await {
        Ok(editor) => editor,
        Err(response) => return response,
    };

    let result =
        entity_service::update_record::<T, T::Form, HttpRepository>(page.repo, &id, &form).await;
    finish_submit(page, editor, form, result, "updated").await
}

/// Loads the record behind an edit sheet and moves the sheet to submitting.
pub async fn open_for_edit<T: EntityScreen>(
    page: &Page<'_>,
    id: &str,
) -> Result<EditorState<Arc<T>>, HttpResponse> {
    let base = page.view.href(&T::path());
    let record = match entity_service::load_record::<T, HttpRepository>(page.repo, id).await {
        Ok(record) => record,
        Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(format!("{} not found.", sentence_case(T::NOUN))).send();
            return Err(redirect(&base));
        }
        Err(_) => {
            FlashMessage::error(GENERIC_ERROR).send();
            return Err(redirect(&base));
        }
    };

    let mut editor = EditorState::default();
    editor.open_edit(record);
    editor.begin_submit().map_err(|err| {
        log::error!("Could not submit {} sheet: {err}", T::NOUN);
        HttpResponse::InternalServerError().finish()
    })?;
    Ok(editor)
}

pub async fn delete<T: EntityScreen>(
    req: HttpRequest,
    id: web::Path<String>,
    repo: web::Data<HttpRepository>,
) -> HttpResponse {
    let view = ViewQuery::parse(req.query_string(), T::FILTERS);
    let back = view.href(&T::path());

    let mut dialog = DeleteConfirmation::open(id.into_inner());
    let Some(id) = dialog.confirm() else {
        return redirect(&back);
    };

    match entity_service::delete_record::<T, HttpRepository>(&repo, &id).await {
        Ok(()) => notify_success(format!("{} deleted.", sentence_case(T::NOUN))),
        Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(format!("{} not found.", sentence_case(T::NOUN))).send();
        }
        Err(_) => FlashMessage::error(GENERIC_ERROR).send(),
    }
    redirect(&back)
}

/// Exports the current page, with its filters, as CSV.
pub async fn export_csv<T: EntityScreen>(
    req: HttpRequest,
    repo: web::Data<HttpRepository>,
    config: web::Data<ServerConfig>,
) -> HttpResponse {
    let view = ViewQuery::parse(req.query_string(), T::FILTERS);
    let records =
        match entity_service::load_list::<T, HttpRepository>(&repo, &view, config.page_size()).await {
            Ok(records) => records,
            Err(_) => return HttpResponse::BadGateway().finish(),
        };

    match T::table().render(&records.items).to_csv() {
        Ok(csv) => {
            let disposition = format!("attachment; filename=\"{}.csv\"", T::KIND.name());
            let mut response = HttpResponse::Ok();
            response.content_type("text/csv; charset=utf-8");
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                response.insert_header((CONTENT_DISPOSITION, value));
            }
            response.body(csv)
        }
        Err(err) => {
            log::error!("Failed to export {}: {err}", T::KIND);
            HttpResponse::InternalServerError().finish()
        }
    }
}
