use std::net::SocketAddr;

use crate::ServiceConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // Largest accepted request body
    pub max_upload_bytes: usize,
    // Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, service_config: &ServiceConfig) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, max_upload_bytes={}",
            listen_addr,
            service_config.max_upload_bytes
        );
        Self {
            listen_addr,
            log_level: tracing::Level::INFO,
            max_upload_bytes: service_config.max_upload_bytes,
            cors_origins: service_config.cors_origins.clone(),
        }
    }
}
