#[cfg(feature = "data")]
pub mod cache;
#[cfg(feature = "server")]
pub mod client;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod editor;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod screens;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "data")]
pub mod sheet;
#[cfg(feature = "data")]
pub mod table;
#[cfg(feature = "data")]
pub mod view;

#[cfg(feature = "server")]
pub use app::{build_repository, configure_app, run};

#[cfg(feature = "server")]
mod app {
    use actix_cors::Cors;
    use actix_files::Files;
    use actix_web::cookie::Key;
    use actix_web::{App, HttpServer, middleware, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
    use tera::Tera;

    use crate::cache::QueryCache;
    use crate::client::BackendClient;
    use crate::domain::catalog::{Collection, Fabric, Material};
    use crate::domain::order::Order;
    use crate::domain::partner::{Customer, Supplier};
    use crate::models::config::ServerConfig;
    use crate::repository::HttpRepository;
    use crate::routes::api::api_v1_options;
    use crate::routes::entity::configure_urlencoded;
    use crate::routes::order::advance_order_status;
    use crate::routes::reference::{show_references, show_references_index};
    use crate::routes::{sample, show_index};

    /// Minimum key length accepted by [`Key::from`].
    const SECRET_MIN_BYTES: usize = 64;

    /// Backend client plus the process-wide query cache shared by all
    /// workers.
    pub fn build_repository(server_config: &ServerConfig) -> std::io::Result<HttpRepository> {
        let client = BackendClient::new(
            &server_config.backend_url,
            server_config.backend_token.clone(),
            server_config.request_timeout(),
        )
        .map_err(|e| std::io::Error::other(format!("Failed to build backend client: {e}")))?;

        Ok(HttpRepository::new(
            client,
            QueryCache::new(server_config.retry_policy(), server_config.cache_limits()),
        ))
    }

    /// Registers every dashboard route.
    pub fn configure_app(cfg: &mut web::ServiceConfig) {
        cfg.service(show_index)
            .service(advance_order_status)
            .service(show_references_index)
            .service(show_references)
            .service(web::scope("/api").service(api_v1_options));
        sample::configure(cfg);
        configure_urlencoded::<Order>(cfg);
        configure_urlencoded::<Collection>(cfg);
        configure_urlencoded::<Fabric>(cfg);
        configure_urlencoded::<Material>(cfg);
        configure_urlencoded::<Supplier>(cfg);
        configure_urlencoded::<Customer>(cfg);
    }

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        let repo = build_repository(&server_config)?;

        if server_config.secret.len() < SECRET_MIN_BYTES {
            return Err(std::io::Error::other(format!(
                "secret must be at least {SECRET_MIN_BYTES} bytes"
            )));
        }
        // Keys and stores for flash messages.
        let secret_key = Key::from(server_config.secret.as_bytes());

        let message_store = CookieMessageStore::builder(secret_key).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        let tera = Tera::new(&server_config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let bind_address = (server_config.address.clone(), server_config.port);

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(message_framework.clone())
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .service(Files::new("/assets", "./assets"))
                .configure(configure_app)
                .app_data(web::Data::new(tera.clone()))
                .app_data(web::Data::new(repo.clone()))
                .app_data(web::Data::new(server_config.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
