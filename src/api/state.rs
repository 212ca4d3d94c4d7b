use crate::core::AppConfig;

pub struct AppState {
    pub config: AppConfig,
    // Shared connection pool for backend calls
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}
