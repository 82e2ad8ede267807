use std::fmt;

use serde::Serialize;
use shared::{ApiRoute, HttpMethod, Result};

use crate::api::route_url;
use crate::config::{ClientConfig, ConfigSource, Environment};

/// Snapshot of the resolved configuration, as printed by `planner-config`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub api_base_url: Option<String>,
    pub source: ConfigSource,
    pub environment: Environment,
    pub effective_base_url: String,
    pub routes: Vec<RouteReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub method: HttpMethod,
    pub path: String,
    pub url: String,
}

impl ConfigReport {
    pub fn new(config: &ClientConfig, routes: &[ApiRoute]) -> Result<Self> {
        let routes = routes
            .iter()
            .map(|route| -> Result<RouteReport> {
                Ok(RouteReport {
                    method: route.method(),
                    path: route.path(),
                    url: route_url(config, route)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            api_base_url: config.api_base_url().map(|u| u.to_string()),
            source: config.source(),
            environment: config.environment(),
            effective_base_url: config.effective_base_url().to_string(),
            routes,
        })
    }
}

impl fmt::Display for ConfigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "api_base_url: {}", self.api_base_url.as_deref().unwrap_or("null"))?;
        writeln!(f, "source:       {}", self.source)?;
        writeln!(f, "environment:  {:?}", self.environment)?;
        writeln!(f, "effective:    {}", self.effective_base_url)?;
        for route in &self.routes {
            writeln!(f, "{:<6} {} -> {}", route.method, route.path, route.url)?;
        }
        Ok(())
    }
}
