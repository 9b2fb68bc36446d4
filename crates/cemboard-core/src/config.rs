//! Application configuration
//!
//! Loaded from `<config_dir>/cemboard/config.toml` with defaults for every
//! field. Flags and environment variables are layered on top by the binary
//! through [`AppConfig::with_overrides`].

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "https://cemeteryapi.onrender.com";

const CONFIG_DIR_NAME: &str = "cemboard";
const CONFIG_FILE_NAME: &str = "config.toml";
const TOKEN_FILE_NAME: &str = "session.json";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub invoice: InvoiceConfig,
    pub site: SiteConfig,
}

/// Remote API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL without trailing slash
    pub base_url: String,

    /// Static shared secret sent as `x-api-key`
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Where the session token is persisted (defaults under the config dir)
    pub token_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            token_path: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Seller block, assets and footer of generated invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    pub seller_name: String,
    pub seller_address: String,
    pub seller_phone: String,
    pub seller_email: String,
    pub logo_path: Option<PathBuf>,
    pub signature_path: Option<PathBuf>,
    pub attribution_text: String,
    pub attribution_url: String,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            seller_name: "Print Shop BD".to_string(),
            seller_address: "123 Business Road".to_string(),
            seller_phone: "018xx-xxxxxx".to_string(),
            seller_email: "info@printshop.com".to_string(),
            logo_path: None,
            signature_path: None,
            attribution_text: "Developed by Motasim Billah Siam".to_string(),
            attribution_url: "https://facebook.com/".to_string(),
        }
    }
}

/// Static content of the public site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub contact_phone: String,
    pub contact_location: String,
    pub meeting_hours: String,
    /// Form relay the contact form posts to
    pub contact_form_action: String,
    pub map_embed_url: String,
    pub address_lines: Vec<String>,
    pub opening_hours: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Jannatul Baqi Cemetery".to_string(),
            contact_phone: "+880 123 456 789".to_string(),
            contact_location: "123 Jannatul Baqi Road, Dhaka, Bangladesh".to_string(),
            meeting_hours: "Saturday - Thursday, 9 AM - 5 PM".to_string(),
            contact_form_action: "https://formsubmit.co/".to_string(),
            map_embed_url: "https://www.google.com/maps/embed?pb=!1m18!1m12!1m3!1d466.5197122086118!2d90.7200709637688!3d23.954655370415527".to_string(),
            address_lines: vec![
                "123 Heritage Lane".to_string(),
                "Historic Town, HZ 98765".to_string(),
            ],
            opening_hours: vec![
                "Monday - Friday: 9:00 AM - 5:00 PM".to_string(),
                "Saturday: 10:00 AM - 2:00 PM".to_string(),
                "Sunday: Closed".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Default config file location: `<config_dir>/cemboard/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| CoreError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply flag/environment overrides on top of the file values
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        api_key: Option<String>,
        token_path: Option<PathBuf>,
    ) -> Self {
        if let Some(url) = base_url {
            self.api.base_url = url;
        }
        if let Some(key) = api_key {
            self.api.api_key = key;
        }
        if token_path.is_some() {
            self.api.token_path = token_path;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "api.base_url must not be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::InvalidConfig {
                message: format!("api.base_url must be an http(s) URL, got '{}'", url),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig {
                message: "api.timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Resolved token file path
    pub fn token_path(&self) -> Option<PathBuf> {
        self.api.token_path.clone().or_else(|| {
            dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(TOKEN_FILE_NAME))
        })
    }
}
