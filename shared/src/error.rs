use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SharedError {
    #[error("Invalid base URL {input:?}: {reason}")]
    InvalidBaseUrl { input: String, reason: String },

    #[error("Unsupported URL scheme {scheme:?}, expected http or https")]
    UnsupportedScheme { scheme: String },

    #[error("Expected a relative API path, got {0:?}")]
    AbsolutePath(String),

    #[error("API path {path:?} leaves the base URL {base}")]
    EscapesBasePath { path: String, base: String },

    #[error("Base URL {input:?} must not carry a {component}")]
    UnexpectedComponent { input: String, component: &'static str },

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Configuration has already been initialized")]
    AlreadyInitialized,
}

impl From<JsonError> for SharedError {
    fn from(error: JsonError) -> Self {
        Self::Conversion(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SharedError>;
