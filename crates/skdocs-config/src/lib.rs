//! Configuration management for SK Docs.
//!
//! Parses `skdocs.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `database.url`
//! - `search.url`
//! - `search.api_key`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content root directory.
    pub root_dir: Option<PathBuf>,
    /// Override database URL.
    pub database_url: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "skdocs.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content tree location and allow-lists.
    pub content: ContentConfig,
    /// Metadata database connection.
    pub database: DatabaseConfig,
    /// Page and index cache.
    pub cache: CacheConfig,
    /// Product link classification.
    pub products: ProductsConfig,
    /// Full-text search backend.
    pub search: SearchConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3002,
        }
    }
}

/// Content tree configuration.
///
/// The tree is laid out as `{root_dir}/{version}/{language}/{type}/NN_Category/NN_Page.html`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Root of the content tree. Relative paths are resolved against the
    /// config file's directory.
    pub root_dir: PathBuf,
    /// Versions accepted in request paths.
    pub versions: Vec<String>,
    /// Languages accepted in request paths.
    pub languages: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("data/pages"),
            versions: vec!["v1".to_owned()],
            languages: vec!["en-US".to_owned()],
        }
    }
}

/// Metadata database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL (`mysql://...` or `sqlite:...`).
    pub url: String,
    /// Maximum pool size.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "${DATABASE_URL:-}".to_owned(),
            max_connections: 5,
        }
    }
}

/// Cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Entry lifetime in seconds, measured from insertion.
    pub ttl_secs: u64,
    /// Number of pages in the content tree, used to report cache coverage.
    pub expected_page_count: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 24 * 60 * 60,
            expected_page_count: 97,
        }
    }
}

impl CacheConfig {
    /// Lifetime applied to cache entries. Zero when caching is disabled.
    #[must_use]
    pub fn effective_ttl(&self) -> Duration {
        if self.enabled {
            Duration::from_secs(self.ttl_secs)
        } else {
            Duration::ZERO
        }
    }
}

/// Product link configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProductsConfig {
    /// Base path of the documentation reader, e.g. `/documentation/read/Doc`.
    pub read_base_path: String,
    /// Base URL of product images; `{base}/{product}.png` is served.
    pub image_base_url: String,
    /// Bot products, linked by anchor on the bots page.
    pub bots: Vec<String>,
    /// Legacy products, linked by anchor on the version one page.
    pub legacy: Vec<String>,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            read_base_path: "/documentation/read/Doc".to_owned(),
            image_base_url: "https://files.stefankruik.com/Products/100".to_owned(),
            bots: ["Apricaria", "Stelleri", "Ispidina", "Interpres"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            legacy: ["Luscinia", "Ciconia"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Search backend configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Meilisearch-compatible server URL. Empty disables search.
    pub url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "${MEILISEARCH_HOST:-}".to_owned(),
            api_key: "${MEILISEARCH_MASTER:-}".to_owned(),
        }
    }
}

impl SearchConfig {
    /// True if a search backend is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`database.url`").
        field: String,
        /// Error message (e.g., "${`DATABASE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `skdocs.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            let mut config = Self::default_with_cwd();
            config.expand_env_vars()?;
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(root_dir) = &settings.root_dir {
            self.content.root_dir.clone_from(root_dir);
        }
        if let Some(database_url) = &settings.database_url {
            self.database.url.clone_from(database_url);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache.enabled = cache_enabled;
        }
    }

    /// Get validated database configuration.
    ///
    /// Only commands that talk to the metadata store need a database, so an
    /// empty URL is rejected here rather than at load time.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `database.url` is empty or the
    /// pool size is zero.
    pub fn require_database(&self) -> Result<&DatabaseConfig, ConfigError> {
        require_non_empty(&self.database.url, "database.url")?;
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be greater than 0".to_owned(),
            ));
        }
        Ok(&self.database)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let content = ContentConfig::default();
        Self {
            server: ServerConfig::default(),
            content: ContentConfig {
                root_dir: base.join(&content.root_dir),
                ..content
            },
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            products: ProductsConfig::default(),
            search: SearchConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_content()?;
        self.validate_cache()?;
        self.validate_search()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_content(&self) -> Result<(), ConfigError> {
        if self.content.versions.is_empty() {
            return Err(ConfigError::Validation(
                "content.versions cannot be empty".to_owned(),
            ));
        }
        if self.content.languages.is_empty() {
            return Err(ConfigError::Validation(
                "content.languages cannot be empty".to_owned(),
            ));
        }
        for value in self.content.versions.iter().chain(&self.content.languages) {
            // Allow-list entries become path components
            if value.is_empty() || value.contains(['/', '\\']) || value.contains("..") {
                return Err(ConfigError::Validation(format!(
                    "invalid version or language in content allow-list: {value:?}"
                )));
            }
        }
        Ok(())
    }

    fn validate_cache(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache.ttl_secs must be greater than 0".to_owned(),
            ));
        }
        if self.cache.expected_page_count == 0 {
            return Err(ConfigError::Validation(
                "cache.expected_page_count must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_search(&self) -> Result<(), ConfigError> {
        if self.search.is_enabled() {
            require_http_url(&self.search.url, "search.url")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.database.url = expand::expand_env(&self.database.url, "database.url")?;
        self.search.url = expand::expand_env(&self.search.url, "search.url")?;
        self.search.api_key = expand::expand_env(&self.search.api_key, "search.api_key")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content.root_dir = config_dir.join(&self.content.root_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    /// Defaults with env-backed fields already expanded to empty.
    fn test_config() -> Config {
        let mut config = Config::default_with_base(Path::new("/srv"));
        config.database.url = String::new();
        config.search.url = String::new();
        config.search.api_key = String::new();
        config
    }

    #[test]
    fn test_default_config() {
        let config = test_config();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3002);
        assert_eq!(config.content.root_dir, PathBuf::from("/srv/data/pages"));
        assert_eq!(config.content.versions, vec!["v1"]);
        assert_eq!(config.content.languages, vec!["en-US"]);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert_eq!(config.cache.expected_page_count, 97);
        assert_eq!(config.products.bots.len(), 4);
        assert_eq!(config.products.legacy, vec!["Luscinia", "Ciconia"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.server.port, 3002);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 8080

[content]
root_dir = "html"
versions = ["v1", "v2"]
languages = ["en-US", "nl-NL"]

[database]
url = "sqlite:docs.db"
max_connections = 2

[cache]
enabled = false
ttl_secs = 60
expected_page_count = 10

[products]
bots = ["Apricaria"]
legacy = []
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.content.versions, vec!["v1", "v2"]);
        assert_eq!(config.database.url, "sqlite:docs.db");
        assert!(!config.cache.enabled);
        assert_eq!(config.products.bots, vec!["Apricaria"]);
        assert!(config.products.legacy.is_empty());
        assert_eq!(config.products.read_base_path, "/documentation/read/Doc");
    }

    #[test]
    fn test_load_resolves_root_dir_against_config_dir() {
        let (dir, path) = write_config("[content]\nroot_dir = \"html\"\n");

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.content.root_dir, dir.path().join("html"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/skdocs.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let (_dir, path) = write_config("[server\nport = ");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_expands_database_url() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("SKDOCS_TEST_LOAD_DB", "sqlite:pages.db");
        }
        let (_dir, path) = write_config("[database]\nurl = \"${SKDOCS_TEST_LOAD_DB}\"\n");

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.database.url, "sqlite:pages.db");
        unsafe {
            std::env::remove_var("SKDOCS_TEST_LOAD_DB");
        }
    }

    #[test]
    fn test_load_missing_required_env_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("SKDOCS_TEST_NO_HOST");
        }
        let (_dir, path) = write_config("[server]\nhost = \"${SKDOCS_TEST_NO_HOST}\"\n");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "server.host"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let (_dir, path) = write_config("");
        let settings = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            root_dir: Some(PathBuf::from("/content")),
            database_url: Some("sqlite::memory:".to_owned()),
            cache_enabled: Some(false),
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.content.root_dir, PathBuf::from("/content"));
        assert_eq!(config.database.url, "sqlite::memory:");
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let (_dir, path) = write_config("[server]\nport = 4000\n");

        let config = Config::load(Some(&path), Some(&CliSettings::default())).unwrap();

        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_cli_port_zero_is_rejected() {
        let (_dir, path) = write_config("");
        let settings = CliSettings {
            port: Some(0),
            ..CliSettings::default()
        };

        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_effective_ttl() {
        let mut cache = CacheConfig::default();
        assert_eq!(cache.effective_ttl(), Duration::from_secs(86_400));

        cache.enabled = false;
        assert_eq!(cache.effective_ttl(), Duration::ZERO);
    }

    #[test]
    fn test_require_database_empty_url() {
        let mut config = test_config();
        config.database.url = String::new();

        let err = config.require_database().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: database.url cannot be empty"
        );
    }

    #[test]
    fn test_require_database_valid() {
        let mut config = test_config();
        config.database.url = "mysql://docs@localhost/skdocs".to_owned();

        assert_eq!(config.require_database().unwrap().max_connections, 5);
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = test_config();
        config.server.host = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_versions() {
        let mut config = test_config();
        config.content.versions.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_language_with_separator() {
        let mut config = test_config();
        config.content.languages = vec!["../etc".to_owned()];

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ttl_zero() {
        let mut config = test_config();
        config.cache.ttl_secs = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_search_url_scheme() {
        let mut config = test_config();
        config.search.url = "search.internal:7700".to_owned();

        let err = config.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: search.url must start with http:// or https://"
        );
    }

    #[test]
    fn test_search_disabled_by_empty_url() {
        let mut config = test_config();
        config.search.url = String::new();

        assert!(!config.search.is_enabled());
        assert!(config.validate().is_ok());
    }
}
