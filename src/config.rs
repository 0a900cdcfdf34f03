use std::env;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub auto_migrate: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    /// Upper bound for a single payment.
    pub max_payment_amount: Decimal,
    /// Upper bound for a purchase request quantity.
    pub max_purchase_qty: Decimal,
    /// Upper bound for a purchase request unit price.
    pub max_unit_price: Decimal,
}

/// Monetary and quantity caps handed to the services that validate input.
#[derive(Debug, Copy, Clone)]
pub struct Limits {
    pub max_payment_amount: Decimal,
    pub max_purchase_qty: Decimal,
    pub max_unit_price: Decimal,
}

impl AppConfig {
    pub fn limits(&self) -> Limits {
        Limits {
            max_payment_amount: self.max_payment_amount,
            max_purchase_qty: self.max_purchase_qty,
            max_unit_price: self.max_unit_price,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Loads application configuration.
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config file (config/default.toml), if present
/// 3. Environment-specific config (config/{env}.toml), if present
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://canteen.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("auto_migrate", true)?
        .set_default("db_max_connections", 10)?
        .set_default("db_min_connections", 1)?
        .set_default("max_payment_amount", "100000")?
        .set_default("max_purchase_qty", "10000")?
        .set_default("max_unit_price", "100000")?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    config.try_deserialize()
}

/// Initializes tracing using the provided log level as the default filter.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("canteen_api={level},migrations={level}");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}
