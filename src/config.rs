use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub http_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let api_base_url = get_env("API_BASE_URL")?;
        Url::parse(&api_base_url)
            .map_err(|e| Error::Config(format!("Invalid API_BASE_URL: {}", e)))?;

        let http_timeout_secs = match env::var("HTTP_TIMEOUT_SECS").ok() {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("Invalid value for HTTP_TIMEOUT_SECS: {}", e)))?,
            None => 60,
        };

        Ok(Self {
            api_base_url,
            http_timeout_secs,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
