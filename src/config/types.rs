// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

use crate::router::CorsConfig;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub cors: CorsSettings,
    pub captcha: CaptchaConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub request_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Diagnostic bodies on 404/500 replies when set.
    pub debug: bool,
    pub max_body_size: u64,
}

/// Cross-origin policy settings, handed to the dispatch engine at startup.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsSettings {
    pub enabled: bool,
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    #[serde(default)]
    pub allow_credentials: Option<bool>,
    #[serde(default)]
    pub vary: Option<String>,
    pub max_age: u32,
    pub options_success_status: u16,
}

impl CorsSettings {
    pub fn to_cors_config(&self) -> CorsConfig {
        CorsConfig {
            allow_origin: self.allow_origin.clone(),
            allow_methods: self.allow_methods.clone(),
            allow_headers: self.allow_headers.clone(),
            allow_credentials: self.allow_credentials,
            vary: self.vary.clone(),
            max_age: self.max_age,
            options_success_status: self.options_success_status,
        }
    }
}

/// Captcha verification settings. The verification service itself is an
/// external collaborator wired in at startup.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CaptchaConfig {
    pub enabled: bool,
    #[serde(default)]
    pub secret: Option<String>,
}
