//! `skdocs serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use skdocs_config::{CliSettings, Config};
use skdocs_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover skdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content root directory (overrides config).
    #[arg(short, long)]
    root_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Metadata database URL (overrides config).
    #[arg(long, env = "SKDOCS_DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose output (request traces and cache timing logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable caching (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable caching.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cache_enabled = self.resolve_cache_enabled();
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            root_dir: self.root_dir,
            database_url: self.database_url,
            cache_enabled,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        config.require_database()?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Content directory: {}",
            config.content.root_dir.display()
        ));
        output.info(&format!(
            "Versions: {} / Languages: {}",
            config.content.versions.join(", "),
            config.content.languages.join(", ")
        ));

        if config.cache.enabled {
            output.info(&format!("Cache TTL: {}s", config.cache.ttl_secs));
        } else {
            output.info("Cache: disabled");
        }

        if config.search.is_enabled() {
            output.info(&format!("Search backend: {}", config.search.url));
        } else {
            output.info("Search: disabled (no search.url in config)");
        }

        let server_config = server_config_from_config(&config);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }
}
