pub mod attempt;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::services::api::ApiClient;
use reqwest::Client;
use std::time::Duration;

/// Shared handles for everything the client talks to.
#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
}

impl AppContext {
    pub fn new() -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .unwrap();

        Self {
            api: ApiClient::new(http_client, config.api_base_url.clone()),
        }
    }
}
