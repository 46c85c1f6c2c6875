//! Client configuration.
//!
//! [`ClientConfig`] is built either through the generated
//! [`ClientConfigBuilder`] or from environment variables:
//!
//! | Variable               | Default                     |
//! |------------------------|-----------------------------|
//! | `HONDANA_API_URL`      | [`DEFAULT_API_URL`]         |
//! | `HONDANA_PAGE_SIZE`    | `20`                        |
//! | `HONDANA_TIMEOUT_SECS` | `30`                        |
//! | `HONDANA_LEDGER_PATH`  | `collection.json`           |
//!
//! ```rust
//! use hondana::config::ClientConfigBuilder;
//!
//! let config = ClientConfigBuilder::default()
//!     .base_url("http://localhost:8080")
//!     .page_size(50u32)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.page_size, 50);
//! assert_eq!(config.user_agent, "hondana/0.1.0");
//! ```

use derive_builder::Builder;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://mymanga-acacademy-5607149ebe3d.herokuapp.com";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ClientConfig {
    /// Backend root, without a trailing slash
    #[builder(default = "DEFAULT_API_URL.to_string()")]
    pub base_url: String,

    /// Items requested per page by paginated controllers
    #[builder(default = "DEFAULT_PAGE_SIZE")]
    pub page_size: u32,

    #[builder(default = "Duration::from_secs(30)")]
    pub timeout: Duration,

    #[builder(default = "\"hondana/0.1.0\".to_string()")]
    pub user_agent: String,

    /// Where the JSON ledger store keeps the local collection
    #[builder(default = "PathBuf::from(\"collection.json\")")]
    pub ledger_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(30),
            user_agent: "hondana/0.1.0".to_string(),
            ledger_path: PathBuf::from("collection.json"),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the environment, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: env::var("HONDANA_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            page_size: env::var("HONDANA_PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|&p| p > 0)
                .unwrap_or(defaults.page_size),
            timeout: env::var("HONDANA_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            user_agent: defaults.user_agent,
            ledger_path: env::var("HONDANA_LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_path),
        }
    }
}
