use serde::Deserialize;
use std::env;

pub const DEFAULT_ARK_ENDPOINT: &str = "https://ark.cn-beijing.volces.com/api/v3/chat/completions";
pub const DEFAULT_ARK_MODEL: &str = "doubao-seed-1-6-flash-250715";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub environment: Environment,
    pub log_format: LogFormat,
    /// Postgres connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    // Vision model
    pub ark_api_endpoint: String,
    pub ark_model: String,
    pub demo_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    // Image compression
    pub max_image_bytes: usize,
    pub max_image_dimension: u32,
    pub jpeg_quality: u8,
    // Quota
    pub max_free_usage: u32,
    // Payment simulation
    pub payment_delay_ms: u64,
    pub payment_success_rate: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            database_url: non_empty_var("DATABASE_URL"),
            ark_api_endpoint: env::var("ARK_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ARK_ENDPOINT.to_string()),
            ark_model: env::var("ARK_MODEL").unwrap_or_else(|_| DEFAULT_ARK_MODEL.to_string()),
            demo_api_key: non_empty_var("DEMO_API_KEY"),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            max_retries: env::var("MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            retry_base_delay_ms: env::var("RETRY_BASE_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            max_image_bytes: env::var("MAX_IMAGE_BYTES")
                .unwrap_or_else(|_| (1024 * 1024).to_string())
                .parse()?,
            max_image_dimension: env::var("MAX_IMAGE_DIMENSION")
                .unwrap_or_else(|_| "1200".to_string())
                .parse()?,
            jpeg_quality: env::var("JPEG_QUALITY")
                .unwrap_or_else(|_| "80".to_string())
                .parse()?,
            max_free_usage: env::var("MAX_FREE_USAGE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            payment_delay_ms: env::var("PAYMENT_DELAY_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()?,
            payment_success_rate: env::var("PAYMENT_SUCCESS_RATE")
                .unwrap_or_else(|_| "0.9".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
