//! Application configuration
//!
//! Plain structs with defaults. Only the service endpoints and the API key
//! come from the environment.

use tracing::warn;

use crate::chat::ChatConfig;
use crate::client::ClientConfig;
use crate::controller::FetchConfig;
use crate::detail::DetailConfig;

/// Environment variable holding the OMDb API key
pub const ENV_OMDB_API_KEY: &str = "OMDB_API_KEY";
/// Environment variable overriding the OMDb endpoint
pub const ENV_OMDB_BASE_URL: &str = "OMDB_BASE_URL";
/// Environment variable holding the chat service base URL
pub const ENV_AI_API_URL: &str = "AI_API_URL";

/// Everything needed to wire up the search, detail and chat flows
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub omdb: ClientConfig,
    pub chat: ChatConfig,
    pub search: FetchConfig,
    pub detail: DetailConfig,
}

impl AppConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by `lookup`; blank values are ignored
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        match get(ENV_OMDB_API_KEY) {
            Some(key) => config.omdb.api_key = key,
            None => warn!("{ENV_OMDB_API_KEY} is not set; OMDb requests will be rejected"),
        }
        if let Some(url) = get(ENV_OMDB_BASE_URL) {
            config.omdb.base_url = url;
        }
        if let Some(url) = get(ENV_AI_API_URL) {
            config.chat.api_url = url;
        }
        config
    }
}
