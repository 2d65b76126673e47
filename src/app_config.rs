//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with PLACEMENTHUB_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like the bootstrap admin password should be kept in environment
//! variables, not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Placement Portal".to_string(),
            description: "Campus placement experience sharing".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Session timeout in minutes (default: 24 hours)
    pub session_timeout_minutes: u32,
    /// Minimum accepted password length at registration
    pub min_password_length: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 1440,
            min_password_length: 6,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Login attempts per window
    pub login_max_attempts: u32,
    /// Login rate limit window in seconds
    pub login_window_seconds: u32,
    /// Registration attempts per hour
    pub registration_per_hour: u32,
    /// Comments per minute per user
    pub comments_per_minute: u32,
    /// Reports per hour per client
    pub reports_per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_max_attempts: 5,
            login_window_seconds: 300,
            registration_per_hour: 3,
            comments_per_minute: 10,
            reports_per_hour: 10,
        }
    }
}

/// First-admin bootstrap configuration
///
/// When email and password are both set and no admin account exists yet, one
/// is provisioned at startup. Disabled (empty) by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapAdminConfig {
    pub email: String,
    /// Should come from the environment, not the config file
    #[serde(default)]
    pub password: String,
    pub name: String,
}

impl Default for BootstrapAdminConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            name: "Administrator".to_string(),
        }
    }
}

impl BootstrapAdminConfig {
    pub fn is_configured(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
    pub bootstrap_admin: BootstrapAdminConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file (optional)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // Override with environment variables (PLACEMENTHUB_ prefix)
            // e.g., PLACEMENTHUB_SITE_NAME
            .add_source(
                Environment::with_prefix("PLACEMENTHUB")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reload configuration from file
    pub fn reload() -> Result<(), ConfigError> {
        let new_config = Self::load()?;
        if let Ok(mut config) = APP_CONFIG.write() {
            *config = new_config;
            log::info!("Configuration reloaded");
        }
        Ok(())
    }
}

/// Initialize application configuration
///
/// This triggers the lazy loading of the config file and logs the result.
/// Should be called early in application startup.
pub fn init() {
    let config = APP_CONFIG.read().unwrap();
    log::info!("Configuration loaded: site.name = {}", config.site.name);
}

// Convenience functions for accessing global config

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

/// Get site configuration
pub fn site() -> SiteConfig {
    get_config().site
}

/// Get security configuration
pub fn security() -> SecurityConfig {
    get_config().security
}

/// Get rate limit configuration
pub fn rate_limit() -> RateLimitConfig {
    get_config().rate_limit
}

/// Get bootstrap admin configuration
pub fn bootstrap_admin() -> BootstrapAdminConfig {
    get_config().bootstrap_admin
}
