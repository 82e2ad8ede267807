use shared::{ApiRoute, Result};

use crate::config::ClientConfig;

/// Full request URL for a path relative to the API root, e.g. `/tasks`.
pub fn api_url(config: &ClientConfig, path: &str) -> Result<String> {
    let url = config.effective_base_url().join(path)?;
    Ok(url.to_string())
}

pub fn route_url(config: &ClientConfig, route: &ApiRoute) -> Result<String> {
    api_url(config, &route.path())
}
