//! Client-side holder for the planner API base URL.
//!
//! The value is resolved once at start-up (see [`config::ClientConfig::load`])
//! and is read-only afterwards. Consumers either pass the `ClientConfig`
//! around or store it once with [`config::init_global`].

pub mod api;
pub mod config;
pub mod report;

pub use api::{api_url, route_url};
pub use config::{global, init_global, ClientConfig, ConfigSource, Environment, LoadOptions};
pub use report::ConfigReport;
