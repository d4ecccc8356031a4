//! In-process fake of the backend REST API used by the integration tests.

#![allow(dead_code, unused_macros)]

use std::collections::{HashMap, VecDeque};
use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::http::{Method, StatusCode};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use textile_admin::models::config::ServerConfig;

pub const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
pub const TOKEN: &str = "test-token";

#[derive(Default)]
pub struct Store {
    records: HashMap<String, Vec<Value>>,
    options: HashMap<String, Vec<Value>>,
    /// `"{METHOD} {path}"` of every request, in arrival order.
    hits: Vec<String>,
    /// Statuses returned instead of handling the next requests to a path.
    failures: HashMap<String, VecDeque<u16>>,
    last_authorization: Option<String>,
    next_id: u32,
}

impl Store {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("00000000-0000-4000-8000-{:012}", self.next_id)
    }
}

pub struct TestBackend {
    pub url: String,
    store: Arc<Mutex<Store>>,
}

impl TestBackend {
    /// Starts the fake on an ephemeral port of the current test runtime.
    pub fn start() -> Self {
        let store = Arc::new(Mutex::new(Store::default()));
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let shared = store.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(shared.clone()))
                .default_service(web::to(dispatch))
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .unwrap()
        .run();
        actix_web::rt::spawn(server);

        Self {
            url: format!("http://127.0.0.1:{port}"),
            store,
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    /// Stores `record` under `name`, assigning an id when it has none.
    pub fn seed(&self, name: &str, mut record: Value) -> String {
        let mut store = self.store();
        let id = match record.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = store.next_id();
                record["id"] = json!(id);
                id
            }
        };
        store.records.entry(name.to_string()).or_default().push(record);
        id
    }

    pub fn seed_options(&self, name: &str, names: &[&str]) -> Vec<String> {
        let mut store = self.store();
        let mut ids = Vec::new();
        for option in names {
            let id = store.next_id();
            store
                .options
                .entry(name.to_string())
                .or_default()
                .push(json!({ "id": id, "name": option }));
            ids.push(id);
        }
        ids
    }

    pub fn record(&self, name: &str, id: &str) -> Option<Value> {
        self.store()
            .records
            .get(name)
            .and_then(|records| records.iter().find(|record| record["id"] == id).cloned())
    }

    pub fn fail_next(&self, method: &str, path: &str, statuses: &[u16]) {
        self.store()
            .failures
            .entry(format!("{method} {path}"))
            .or_default()
            .extend(statuses);
    }

    /// Number of requests whose `"{METHOD} {path}"` starts with `prefix`.
    pub fn hits(&self, prefix: &str) -> usize {
        self.store()
            .hits
            .iter()
            .filter(|hit| hit.starts_with(prefix))
            .count()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.store().last_authorization.clone()
    }

    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            address: "127.0.0.1".to_string(),
            port: 0,
            backend_url: self.url.clone(),
            backend_token: Some(TOKEN.to_string()),
            request_timeout_secs: 5,
            page_size: 2,
            retry_attempts: 2,
            retry_backoff_ms: 1,
            cache_stale_secs: 60,
            cache_max_entries: 100,
            templates_dir: "templates/**/*".to_string(),
            secret: SECRET.to_string(),
        }
    }
}

fn display_name(record: &Value) -> Value {
    record
        .get("name")
        .or_else(|| record.get("plmId"))
        .cloned()
        .unwrap_or(Value::Null)
}

fn page(records: &[Value], query: &HashMap<String, String>) -> Value {
    let search = query.get("search").map(|value| value.to_lowercase());
    let matching: Vec<&Value> = records
        .iter()
        .filter(|record| match &search {
            Some(needle) => display_name(record)
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(needle)),
            None => true,
        })
        .collect();

    let index: usize = query.get("PageIndex").and_then(|v| v.parse().ok()).unwrap_or(0);
    let size: usize = query.get("PageSize").and_then(|v| v.parse().ok()).unwrap_or(10);
    let items: Vec<&Value> = matching.iter().skip(index * size).take(size).copied().collect();
    let pages = matching.len().div_ceil(size.max(1));

    json!({
        "items": items,
        "index": index,
        "size": size,
        "count": matching.len(),
        "pages": pages,
        "hasPrevious": index > 0,
        "hasNext": index + 1 < pages,
    })
}

async fn dispatch(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    body: web::Bytes,
    store: web::Data<Arc<Mutex<Store>>>,
) -> HttpResponse {
    let Ok(mut store) = store.lock() else {
        return HttpResponse::InternalServerError().finish();
    };
    let hit = format!("{} {}", req.method(), req.path());
    store.hits.push(hit.clone());
    store.last_authorization = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if let Some(status) = store.failures.get_mut(&hit).and_then(VecDeque::pop_front) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return HttpResponse::build(status).body("injected failure");
    }

    let segments: Vec<String> = req
        .path()
        .trim_matches('/')
        .split('/')
        .map(str::to_string)
        .collect();
    let json_body = || serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);

    match (req.method().clone(), segments.as_slice()) {
        (Method::POST, [name]) if name == "uploads" => {
            HttpResponse::Ok().json(json!({ "url": "https://cdn.example/uploads/1.png" }))
        }
        (Method::GET, [name]) => {
            let records = store.records.get(name).cloned().unwrap_or_default();
            HttpResponse::Ok().json(page(&records, &query))
        }
        (Method::POST, [name]) => {
            let mut record = json_body();
            record["id"] = json!(store.next_id());
            store.records.entry(name.clone()).or_default().push(record.clone());
            HttpResponse::Created().json(record)
        }
        (Method::GET, [name, last]) if last == "options" => {
            let options = store.options.get(name).cloned().unwrap_or_else(|| {
                store
                    .records
                    .get(name)
                    .map(|records| {
                        records
                            .iter()
                            .map(|record| json!({ "id": record["id"], "name": display_name(record) }))
                            .collect()
                    })
                    .unwrap_or_default()
            });
            HttpResponse::Ok().json(options)
        }
        (method, [name, id, rest @ ..]) => {
            let Some(records) = store.records.get_mut(name) else {
                return HttpResponse::NotFound().finish();
            };
            let Some(position) = records.iter().position(|record| record["id"] == id.as_str()) else {
                return HttpResponse::NotFound().finish();
            };

            match (method, rest) {
                (Method::GET, []) => HttpResponse::Ok().json(&records[position]),
                (Method::PUT, []) => {
                    let mut record = json_body();
                    record["id"] = json!(id);
                    records[position] = record.clone();
                    HttpResponse::Ok().json(record)
                }
                (Method::DELETE, []) => {
                    records.remove(position);
                    HttpResponse::NoContent().finish()
                }
                (Method::PATCH, [action]) if action == "status" => {
                    records[position]["status"] = json_body()["status"].clone();
                    HttpResponse::NoContent().finish()
                }
                (Method::PATCH, [action]) if action == "verify" => {
                    records[position]["status"] = json!(1);
                    HttpResponse::NoContent().finish()
                }
                _ => HttpResponse::MethodNotAllowed().finish(),
            }
        }
        _ => HttpResponse::NotFound().finish(),
    }
}

/// Builds the dashboard against `$backend` the way `run` does, minus the
/// static files and the network listener.
macro_rules! init_app {
    ($backend:expr) => {{
        let config = $backend.config();
        let repo = textile_admin::build_repository(&config).unwrap();
        let tera = tera::Tera::new(&config.templates_dir).unwrap();
        let store = actix_web_flash_messages::storage::CookieMessageStore::builder(
            actix_web::cookie::Key::from(crate::common::SECRET.as_bytes()),
        )
        .build();
        let flash = actix_web_flash_messages::FlashMessagesFramework::builder(store).build();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(flash)
                .configure(textile_admin::configure_app)
                .app_data(actix_web::web::Data::new(tera))
                .app_data(actix_web::web::Data::new(repo))
                .app_data(actix_web::web::Data::new(config)),
        )
        .await
    }};
}

pub fn order(plm_id: &str, status: u8) -> Value {
    json!({
        "plmId": plm_id,
        "customer": { "id": "00000000-0000-4000-8000-100000000001", "name": "Maison Laine" },
        "collection": { "id": "00000000-0000-4000-8000-100000000002", "name": "Autumn" },
        "amount": 120,
        "sizes": [],
        "status": status,
        "trackingNumber": null,
        "productionStart": null,
        "createdAt": "2024-05-01T09:30:00Z",
    })
}

pub fn supplier(name: &str) -> Value {
    json!({
        "name": name,
        "email": "sales@mill.example",
        "phone": "+16502530000",
        "address": null,
    })
}
