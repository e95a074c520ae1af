use tinydi::inject;

pub const DEFAULT_BASE_URL: &str = "https://www.google.com/";

#[derive(Debug)]
pub struct NetworkClient {
    base_url: String,
}

impl NetworkClient {
    #[inject]
    pub fn new() -> Self {
        tracing::debug!("Creating network client for {}", DEFAULT_BASE_URL);
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

include!(concat!(env!("OUT_DIR"), "/net/network_client_factory.rs"));
