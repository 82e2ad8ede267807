pub mod base_url;
pub mod endpoints;
pub mod error;

// Re-export commonly used items
pub use base_url::{is_null_marker, ApiBaseUrl, LOCALHOST_BASE_URL};
pub use endpoints::{ApiRoute, HttpMethod};
pub use error::{Result, SharedError};
