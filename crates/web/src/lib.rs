pub use crate::common::RouteResult;

use std::{env, path::PathBuf};

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    handler::HandlerWithoutStateExt,
    routing::get_service,
    Router,
};
use common::route_not_found;
use database::SqliteDatabase;
use restrooms::client::Client;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

pub mod api;
pub mod common;
pub mod extract;
pub mod hateoas;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_STATIC_DIR: &str = "resources/www";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub restroom_client: Client<SqliteDatabase>,
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind_address: String,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl WebConfig {
    /// Reads `BIND_ADDRESS`, `UPLOAD_DIR`, `STATIC_DIR` and `MAX_UPLOAD_BYTES`.
    /// Unset variables fall back to defaults, `None` is returned if a variable
    /// is set but unusable.
    pub fn from_env() -> Option<Self> {
        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_owned());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_owned());
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_owned());
        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(value) => value.parse().ok()?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };
        Some(Self {
            bind_address,
            upload_dir: upload_dir.into(),
            static_dir: static_dir.into(),
            max_upload_bytes,
        })
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            upload_dir: DEFAULT_UPLOAD_DIR.into(),
            static_dir: DEFAULT_STATIC_DIR.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// All routes of the service. Uploaded images are served from the directory
/// of the client's image store.
pub fn app(state: WebState, config: &WebConfig) -> Router {
    let uploads = ServeDir::new(state.restroom_client.images.directory());
    Router::new()
        .nest_service("/api", api::routes())
        .nest_service("/restrooms", api::restrooms::routes(state))
        .nest_service("/uploads", uploads)
        .fallback_service(static_content_service(config))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}

pub async fn start_web_server(state: WebState, config: WebConfig) -> std::io::Result<()> {
    let routes = app(state, &config);

    let listener = TcpListener::bind(config.bind_address.as_str()).await?;
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}

/// The map page and its assets.
fn static_content_service(config: &WebConfig) -> axum::routing::MethodRouter {
    get_service(
        ServeDir::new(&config.static_dir).not_found_service(route_not_found.into_service()),
    )
}
