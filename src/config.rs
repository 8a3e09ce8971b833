use crate::components::calendar::time::{
    DEFAULT_LOOKAHEAD_HOURS, DEFAULT_LOOKBACK_HOURS, LOOKAHEAD_HOURS_RANGE, LOOKBACK_HOURS_RANGE,
};
use crate::error::{config_error, SyncResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Environment variable that overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "GOODASH_CONFIG";

/// Main configuration structure, loaded once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub photos: PhotosConfig,
    pub sheets: SheetsConfig,
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Map of component names to their enabled status
    #[serde(default)]
    pub components: HashMap<String, bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotosConfig {
    pub album_id: String,
    /// Local directory the album is mirrored into
    #[serde(default = "default_photos_directory")]
    pub directory: PathBuf,
    /// Prefix prepended to each filename in the listing file
    #[serde(default = "default_photos_url_prefix")]
    pub url_prefix: String,
    #[serde(default = "default_photos_output")]
    pub output: PathBuf,
    /// Follow `nextPageToken` through the whole album
    #[serde(default = "default_true")]
    pub paginate: bool,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    pub sheet_id: String,
    pub cell_range: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    pub calendar_id: String,
    #[serde(default = "default_calendar_output")]
    pub output: PathBuf,
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Google OAuth client secrets ("installed app" JSON)
    #[serde(default = "default_client_secrets")]
    pub client_secrets: PathBuf,
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    /// Local port for the authorization callback
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secrets: default_client_secrets(),
            token_file: default_token_file(),
            redirect_port: default_redirect_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
    /// Filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_photos_directory() -> PathBuf {
    PathBuf::from("templates/img/slideshow")
}

fn default_photos_url_prefix() -> String {
    "img/slideshow/".to_string()
}

fn default_photos_output() -> PathBuf {
    PathBuf::from("templates/js/photos.js")
}

fn default_page_size() -> u32 {
    100
}

fn default_calendar_output() -> PathBuf {
    PathBuf::from("templates/js/calendar.js")
}

fn default_lookback_hours() -> i64 {
    DEFAULT_LOOKBACK_HOURS
}

fn default_lookahead_hours() -> i64 {
    DEFAULT_LOOKAHEAD_HOURS
}

fn default_client_secrets() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_file() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_redirect_port() -> u16 {
    8080
}

fn default_log_file() -> PathBuf {
    PathBuf::from("goodash.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Components enabled when the config file does not mention them
fn default_components() -> HashMap<String, bool> {
    let mut components = HashMap::new();
    components.insert("photos".to_string(), false);
    components.insert("calendar".to_string(), true);
    components.insert("sheets".to_string(), false);
    components
}

impl Config {
    /// Load configuration from `GOODASH_CONFIG` or `config.toml`
    pub fn load() -> SyncResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(path)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> SyncResult<Self> {
        let mut config: Config = toml::from_str(content)?;

        // Merge file components over the defaults
        let mut components = default_components();
        components.extend(config.components.drain());
        config.components = components;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> SyncResult<()> {
        let required = [
            ("photos.album_id", &self.photos.album_id),
            ("sheets.sheet_id", &self.sheets.sheet_id),
            ("sheets.cell_range", &self.sheets.cell_range),
            ("calendar.calendar_id", &self.calendar.calendar_id),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(config_error(&format!("`{}` must not be empty", key)));
            }
        }

        if self.photos.page_size == 0 || self.photos.page_size > 100 {
            return Err(config_error("`photos.page_size` must be between 1 and 100"));
        }
        if !LOOKBACK_HOURS_RANGE.contains(&self.calendar.lookback_hours) {
            return Err(config_error(&format!(
                "`calendar.lookback_hours` must be between {} and {}",
                LOOKBACK_HOURS_RANGE.start(),
                LOOKBACK_HOURS_RANGE.end()
            )));
        }
        if !LOOKAHEAD_HOURS_RANGE.contains(&self.calendar.lookahead_hours) {
            return Err(config_error(&format!(
                "`calendar.lookahead_hours` must be between {} and {}",
                LOOKAHEAD_HOURS_RANGE.start(),
                LOOKAHEAD_HOURS_RANGE.end()
            )));
        }

        Ok(())
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}
