use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fallback used when neither the command line, the environment nor the
/// config file names a game service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const API_BASE_VAR: &str = "UNO_API_BASE";
pub const BACKEND_URL_VAR: &str = "UNO_BACKEND_URL";

pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_200;
pub const MIN_POLL_INTERVAL_MS: u64 = 400;

const CONFIG_FILE: &str = "uno.toml";
const PREFERENCES_FILE: &str = "preferences.toml";

/// Settings for the terminal table client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnoConfig {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl ApiConfig {
    /// Base URL after applying the `UNO_API_BASE` / `UNO_BACKEND_URL` overrides.
    pub fn resolve_base_url(&self, flag: Option<&str>) -> String {
        pick_base_url(
            flag,
            std_env::var(API_BASE_VAR).ok(),
            std_env::var(BACKEND_URL_VAR).ok(),
            &self.base_url,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub auto_refresh: bool,
    pub poll_interval_ms: u64,
}

impl Default for UnoConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_ms: DEFAULT_TIMEOUT_MS,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                filename: "uno_table.log".to_string(),
            },
            ui: UiConfig {
                auto_refresh: true,
                poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            },
        }
    }
}

struct LoadedConfig {
    config: UnoConfig,
    error: Option<ConfigError>,
}

// Loaded before any subscriber exists; a failure waits in `error`.
static CONFIG: Lazy<LoadedConfig> = Lazy::new(|| LoadedConfig::from_result(UnoConfig::load()));

impl LoadedConfig {
    fn from_result(result: Result<UnoConfig, ConfigError>) -> Self {
        match result {
            Ok(config) => Self {
                config,
                error: None,
            },
            Err(e) => Self {
                config: UnoConfig::default(),
                error: Some(e),
            },
        }
    }
}

impl UnoConfig {
    pub fn global() -> &'static UnoConfig {
        &CONFIG.config
    }

    /// Why [`UnoConfig::global`] fell back to defaults, if it did.
    pub fn load_error() -> Option<&'static ConfigError> {
        CONFIG.error.as_ref()
    }

    /// Defaults, then `uno.toml` from the config dir, then `UNO_` variables
    /// (e.g. `UNO_API__TIMEOUT_MS=5000`).
    pub fn load() -> Result<Self, ConfigError> {
        let config_file = config_dir().join(CONFIG_FILE);
        info!("Loading configuration from: {:?}", config_file);

        let settings = Config::builder()
            // 1. built-in defaults, so every key exists
            .add_source(Config::try_from(&Self::default())?)
            // 2. optional file in the config dir
            .add_source(File::from(config_file).required(false))
            // 3. UNO_ variables win, `__` separates nested keys
            .add_source(
                Environment::with_prefix("UNO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // 4. typed view of the merged layers
        let config: UnoConfig = settings.try_deserialize()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let dir = config_dir();
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(CONFIG_FILE), toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config
    }

    pub fn testing() -> Self {
        let mut config = Self::default();
        config.logging.level = "trace".to_string();
        config.api.timeout_ms = 2_000;
        config.ui.auto_refresh = false;
        config
    }
}

/// First non-empty of: flag, `UNO_API_BASE`, `UNO_BACKEND_URL`, configured value.
pub fn pick_base_url(
    flag: Option<&str>,
    api_base: Option<String>,
    backend_url: Option<String>,
    configured: &str,
) -> String {
    flag.map(str::to_string)
        .into_iter()
        .chain(api_base)
        .chain(backend_url)
        .chain(Some(configured.to_string()))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Clamps a requested poll interval to the supported minimum.
pub fn effective_poll_interval_ms(requested: u64) -> u64 {
    requested.max(MIN_POLL_INTERVAL_MS)
}

/// The one thing the client persists between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub sound_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
        }
    }
}

impl Preferences {
    pub fn path() -> PathBuf {
        config_dir().join(PREFERENCES_FILE)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// A missing or unreadable file means defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring malformed preferences {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    if let Ok(config_home) = std_env::var("XDG_CONFIG_HOME") {
        PathBuf::from(config_home).join("uno_table")
    } else if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".config").join("uno_table")
    } else {
        PathBuf::from("./config")
    }
}

/// Reads `.env` and loads the global config. Call once at startup, before
/// the logger; check [`UnoConfig::load_error`] once logging is up.
pub fn init() -> Result<()> {
    // 1. .env first so its variables feed the environment layer
    dotenv::dotenv().ok();

    // 2. force the global load
    Lazy::force(&CONFIG);

    Ok(())
}
