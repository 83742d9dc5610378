use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub places: PlacesSettings,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub suggestions: SuggestionSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), workers: None }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), namespace: default_namespace() }
    }
}

fn default_data_dir() -> String { "data".to_string() }
fn default_namespace() -> String { "user_preferences".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesSettings {
    #[serde(default = "default_places_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_radius_meters")]
    pub radius_meters: f64,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
    pub language_code: Option<String>,
}

impl Default for PlacesSettings {
    fn default() -> Self {
        Self {
            endpoint: default_places_endpoint(),
            api_key: String::new(),
            radius_meters: default_radius_meters(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout_secs(),
            language_code: None,
        }
    }
}

fn default_places_endpoint() -> String { "https://places.googleapis.com".to_string() }
fn default_radius_meters() -> f64 { 5000.0 }
fn default_max_results() -> u32 { 1 }
fn default_search_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LocationSettings {
    #[serde(default)]
    pub device_permission: bool,
    pub provider_endpoint: Option<String>,
    pub geocoder_endpoint: Option<String>,
    #[serde(default = "default_location_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub default_latitude: f64,
    #[serde(default)]
    pub default_longitude: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            device_permission: false,
            provider_endpoint: None,
            geocoder_endpoint: None,
            timeout_secs: default_location_timeout_secs(),
            default_latitude: 0.0,
            default_longitude: 0.0,
        }
    }
}

fn default_location_timeout_secs() -> u64 { 5 }

/// Where food suggestions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionMode {
    /// Query the places provider
    Dynamic,
    /// Always serve the fallback catalog
    Prototype,
}

/// How re-rolls pick from the fallback catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    Toggle,
    Random,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionSettings {
    #[serde(default = "default_mode")]
    pub mode: SuggestionMode,
    #[serde(default = "default_selection")]
    pub selection: SelectionPolicy,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self { mode: default_mode(), selection: default_selection() }
    }
}

fn default_mode() -> SuggestionMode { SuggestionMode::Dynamic }
fn default_selection() -> SelectionPolicy { SelectionPolicy::Toggle }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_enabled() -> bool { true }
fn default_cache_capacity() -> u64 { 1000 }
fn default_cache_ttl_secs() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with NYOOM__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., NYOOM__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("NYOOM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("NYOOM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Pick up the places API key from its conventional variable
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let api_key = std::env::var("GOOGLE_PLACES_API_KEY").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        builder = builder.set_override("places.api_key", key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_places_settings() {
        let places = PlacesSettings::default();
        assert_eq!(places.radius_meters, 5000.0);
        assert_eq!(places.max_results, 1);
        assert_eq!(places.timeout_secs, 10);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "compact");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[places]
max_results = 5

[location]
device_permission = true
timeout_secs = 3

[suggestions]
mode = "prototype"
selection = "random"
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.places.max_results, 5);
        assert!(settings.location.device_permission);
        assert_eq!(settings.location.timeout_secs, 3);
        assert_eq!(settings.suggestions.mode, SuggestionMode::Prototype);
        assert_eq!(settings.suggestions.selection, SelectionPolicy::Random);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.storage.namespace, "user_preferences");
    }
}
