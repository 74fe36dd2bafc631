//! Runtime configuration from the environment.
//!
//! `.env` is loaded first (if present), then `EZME_*` variables are read.
//! CLI flags override individual fields.

use std::env;
use std::path::PathBuf;

use crate::seo::DEFAULT_BRAND;
use crate::storage::DEFAULT_STORE_DIR;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory of the file-backed product store
    pub store_dir: PathBuf,
    /// HTTP port for `serve`
    pub port: u16,
    /// Brand used in meta titles and JSON-LD
    pub brand: String,
    /// Public site URL, used for absolute links
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            port: DEFAULT_PORT,
            brand: DEFAULT_BRAND.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` then read the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any variable lookup; unset, blank or unparsable values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            store_dir: get("EZME_STORE_DIR").map(PathBuf::from).unwrap_or(defaults.store_dir),
            port: get("EZME_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            brand: get("EZME_BRAND").unwrap_or(defaults.brand),
            base_url: get("EZME_BASE_URL").unwrap_or(defaults.base_url),
        }
    }
}
