//! HTTP server for SK Docs.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Documentation reads (pages, landing pages, indices, categories)
//! - Cache administration
//! - Reader votes and comments
//! - Search proxied to a Meilisearch-compatible backend
//! - A shields.io status badge
//!
//! # Quick Start
//!
//! ```ignore
//! use skdocs_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         database_url: "mysql://docs@localhost/docs".to_owned(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum router (skdocs-server)
//!                        │
//!                        ├─► validation (allow-lists, path segments)
//!                        │
//!                        ├─► DocsCache (skdocs-site)
//!                        │       ├─► Storage (page bodies, timestamps)
//!                        │       └─► MetadataStore (views, products, related, featured)
//!                        │
//!                        ├─► MetadataStore (votes)
//!                        │
//!                        └─► SearchClient ──HTTP──► search backend
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod search;
mod state;
mod validate;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use skdocs_meta::{MetadataStore, SqlMetadataStore};
use skdocs_site::{CacheSettings, DocsCache, ProductLinks};
use skdocs_storage::{FsStorage, Storage};
use state::AppState;

pub use error::ServerError;
pub use search::{SearchClient, SearchError};

/// Search backend connection settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSettings {
    /// Backend base URL.
    pub url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Root of the content tree.
    pub root_dir: PathBuf,
    /// Metadata database URL.
    pub database_url: String,
    /// Maximum metadata pool size.
    pub max_connections: u32,
    /// Cache TTL and coverage denominator.
    pub cache: CacheSettings,
    /// Product link classification.
    pub products: ProductLinks,
    /// Versions accepted in request paths.
    pub versions: Vec<String>,
    /// Languages accepted in request paths.
    pub languages: Vec<String>,
    /// Search backend (`None` disables search routes).
    pub search: Option<SearchSettings>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3002,
            root_dir: PathBuf::from("data/pages"),
            database_url: String::new(),
            max_connections: 5,
            cache: CacheSettings::default(),
            products: ProductLinks::default(),
            versions: vec!["v1".to_owned()],
            languages: vec!["en-US".to_owned()],
            search: None,
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the database URL is invalid or the server fails to
/// start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(config.root_dir.clone()));
    let store: Arc<dyn MetadataStore> = Arc::new(SqlMetadataStore::connect_lazy(
        &config.database_url,
        config.max_connections,
    )?);

    let docs = DocsCache::new(
        storage,
        Arc::clone(&store),
        config.products.clone(),
        config.cache,
    );
    let search = config
        .search
        .as_ref()
        .map(|s| Arc::new(SearchClient::new(&s.url, &s.api_key)));

    let state = Arc::new(AppState {
        docs,
        store,
        search,
        versions: config.versions.clone(),
        languages: config.languages.clone(),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        root_dir = %config.root_dir.display(),
        cache_ttl_secs = config.cache.ttl.as_secs(),
        search = config.search.is_some(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from SK Docs config.
///
/// # Arguments
///
/// * `config` - Loaded and validated configuration
#[must_use]
pub fn server_config_from_config(config: &skdocs_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root_dir: config.content.root_dir.clone(),
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        cache: CacheSettings {
            ttl: config.cache.effective_ttl(),
            expected_page_count: config.cache.expected_page_count,
        },
        products: ProductLinks {
            read_base_path: config.products.read_base_path.clone(),
            image_base_url: config.products.image_base_url.clone(),
            bots: config.products.bots.clone(),
            legacy: config.products.legacy.clone(),
        },
        versions: config.content.versions.clone(),
        languages: config.content.languages.clone(),
        search: config.search.is_enabled().then(|| SearchSettings {
            url: config.search.url.clone(),
            api_key: config.search.api_key.clone(),
        }),
    }
}
