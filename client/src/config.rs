use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Deserializer, Serialize};
use shared::{ApiBaseUrl, Result, SharedError};

/// Base URL compiled into the client. Edit and redeploy to point a build
/// at another backend:
///   - local network (phone access): the machine's LAN address, e.g.
///     `Some("http://10.0.0.75:8000")`; the API server must listen on
///     0.0.0.0, not only 127.0.0.1
///   - production: e.g. `Some("https://your-app.up.railway.app")`
///   - localhost only: `None`, which resolves to `http://127.0.0.1:8000`
pub const DEFAULT_API_BASE_URL: Option<&str> = Some("http://10.0.0.75:8000");

pub const API_BASE_URL_VAR: &str = "API_BASE_URL";
pub const CONFIG_FILE_VAR: &str = "API_CONFIG_FILE";
pub const ENVIRONMENT_VAR: &str = "RUST_ENV";
pub const ENV_FILE_PATH_VAR: &str = "ENV_FILE_PATH";

static GLOBAL: OnceCell<ClientConfig> = OnceCell::new();

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(SharedError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Layer that produced the configured base URL.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    Override,
    EnvVar,
    File,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConfigSource::Override => "command line",
            ConfigSource::EnvVar => API_BASE_URL_VAR,
            ConfigSource::File => "config file",
            ConfigSource::Default => "built-in default",
        };
        f.write_str(s)
    }
}

/// On-disk form: `{ "api_base_url": "http://10.0.0.75:8000" }`.
/// An explicit `null` means "use localhost"; a missing key defers to the
/// built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub api_base_url: Option<Option<String>>,
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl ConfigFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SharedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Highest precedence, typically a `--base-url` flag.
    pub base_url_override: Option<String>,
    /// Takes precedence over `API_CONFIG_FILE`.
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    environment: Environment,
    api_base_url: Option<ApiBaseUrl>,
    source: ConfigSource,
}

impl ClientConfig {
    pub fn new(environment: Environment, api_base_url: Option<ApiBaseUrl>, source: ConfigSource) -> Self {
        Self {
            environment,
            api_base_url,
            source,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_with(&LoadOptions::default())
    }

    /// Loads `.env` files into the process environment, then resolves
    /// the configuration from it.
    pub fn load_with(options: &LoadOptions) -> Result<Self> {
        load_env_files();
        let config = Self::resolve(options, |key| env::var(key).ok())?;
        config.log_configuration();
        Ok(config)
    }

    /// Resolves the configuration from `lookup` instead of the process
    /// environment. Sources in precedence order: override, `API_BASE_URL`,
    /// config file, built-in default. The first source that is set wins,
    /// even when it sets the value to null.
    pub fn resolve<F>(options: &LoadOptions, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup(ENVIRONMENT_VAR) {
            Some(raw) => raw.parse::<Environment>().unwrap_or_else(|e| {
                warn!("{}, falling back to development", e);
                Environment::Development
            }),
            None => Environment::Development,
        };

        let (api_base_url, source) = if let Some(raw) = &options.base_url_override {
            (ApiBaseUrl::parse_optional(raw)?, ConfigSource::Override)
        } else if let Some(raw) = lookup(API_BASE_URL_VAR) {
            (ApiBaseUrl::parse_optional(&raw)?, ConfigSource::EnvVar)
        } else if let Some(value) = Self::file_value(options, &lookup)? {
            let url = match value {
                Some(raw) => ApiBaseUrl::parse_optional(&raw)?,
                None => None,
            };
            (url, ConfigSource::File)
        } else {
            let url = DEFAULT_API_BASE_URL.map(ApiBaseUrl::parse).transpose()?;
            (url, ConfigSource::Default)
        };

        Ok(Self::new(environment, api_base_url, source))
    }

    fn file_value<F>(options: &LoadOptions, lookup: &F) -> Result<Option<Option<String>>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = match &options.config_file {
            Some(path) => path.clone(),
            None => match lookup(CONFIG_FILE_VAR) {
                Some(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
                _ => return Ok(None),
            },
        };
        info!("Reading API configuration from {}", path.display());
        Ok(ConfigFile::read(&path)?.api_base_url)
    }

    /// The configured base URL, or `None` when consumers should use the
    /// localhost default.
    pub fn api_base_url(&self) -> Option<&ApiBaseUrl> {
        self.api_base_url.as_ref()
    }

    pub fn effective_base_url(&self) -> ApiBaseUrl {
        self.api_base_url.clone().unwrap_or_else(ApiBaseUrl::localhost)
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn log_configuration(&self) {
        info!("Client configuration loaded:");
        info!("  Environment: {:?}", self.environment);
        match &self.api_base_url {
            Some(url) => info!("  API base URL: {} (from {})", url, self.source),
            None => info!(
                "  API base URL: not set (from {}), using {}",
                self.source,
                ApiBaseUrl::localhost()
            ),
        }

        if self.is_production() {
            match &self.api_base_url {
                None => warn!("No API base URL configured in production, requests will go to localhost"),
                Some(url) if url.is_loopback() => {
                    warn!("API base URL {} points at a loopback address in production", url)
                }
                Some(_) => {}
            }
        }
    }
}

/// Stores `config` as the process-wide configuration. Only the first call
/// succeeds; later calls leave the stored value untouched.
pub fn init_global(config: ClientConfig) -> Result<&'static ClientConfig> {
    let mut stored_now = false;
    let stored = GLOBAL.get_or_init(|| {
        stored_now = true;
        config
    });
    if stored_now {
        Ok(stored)
    } else {
        Err(SharedError::AlreadyInitialized)
    }
}

pub fn global() -> Option<&'static ClientConfig> {
    GLOBAL.get()
}

fn load_env_files() {
    match env::var(ENV_FILE_PATH_VAR) {
        Ok(path) if !path.is_empty() => {
            info!("Loading environment from {}: {}", ENV_FILE_PATH_VAR, path);
            if let Err(e) = dotenv::from_filename(&path) {
                warn!("Could not load {}: {}", path, e);
            }
        }
        _ => {
            // dotenv never overwrites a variable that is already set, so
            // .env.<environment> is loaded first to take precedence over .env
            let environment = env::var(ENVIRONMENT_VAR)
                .ok()
                .and_then(|raw| raw.parse::<Environment>().ok())
                .unwrap_or(Environment::Development);
            if environment != Environment::Development {
                let env_file = format!(".env.{:?}", environment).to_lowercase();
                load_optional_env_file(&env_file);
            }
            load_optional_env_file(".env");
        }
    }
}

fn load_optional_env_file(name: &str) {
    match dotenv::from_filename(name) {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not load {}: {}", name, e),
    }
}
