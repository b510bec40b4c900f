// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    CaptchaConfig, Config, CorsSettings, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig,
};

impl Config {
    /// Load configuration from "config.toml" plus `SAVEGEN_*` environment
    /// variables, falling back to built-in defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SAVEGEN"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.request_timeout", 30)?
            .set_default("http.server_name", "savegen-gateway/0.1")?
            .set_default("http.debug", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_origin", "*")?
            .set_default("cors.allow_methods", "*")?
            .set_default("cors.allow_headers", "*")?
            .set_default("cors.max_age", 86_400)?
            .set_default("cors.options_success_status", 204)?
            .set_default("captcha.enabled", false)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::load_from("nonexistent-config").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.cors.enabled);
        assert_eq!(config.cors.allow_origin, "*");
        assert_eq!(config.cors.max_age, 86_400);
        assert_eq!(config.cors.options_success_status, 204);
        assert!(!config.captcha.enabled);
        assert!(!config.http.debug);
    }

    #[test]
    fn test_cors_settings_conversion() {
        let config = Config::load_from("nonexistent-config").unwrap();
        let cors = config.cors.to_cors_config();
        assert_eq!(cors.allow_origin, "*");
        assert!(cors.allow_credentials.is_none());
        assert!(cors.vary.is_none());
    }
}
