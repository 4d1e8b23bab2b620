use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use tracing::warn;

static CONFIG: OnceCell<ServerConfig> = OnceCell::new();

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,

    /// Initial size of the per-connection read buffer; it doubles when full.
    pub read_buffer_size: usize,
    /// Scratch buffer size when streaming a chunked body from a reader.
    pub chunk_size: usize,

    pub server_name: String,
    pub compress_responses: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 42069,

            read_buffer_size: 8,
            chunk_size: 1024,

            server_name: "rawhttp/0.1".to_string(),
            compress_responses: true,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path, %err, "failed to read config, falling back to defaults");
                return ServerConfig::default();
            }
        };

        Self::from_toml(&content).unwrap_or_else(|err| {
            warn!(path, %err, "failed to deserialize config, falling back to defaults");
            ServerConfig::default()
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ServerConfig>(content)
    }
}

/// Installs the process-wide config. Returns `false` if one was already set.
pub fn set_config(cfg: ServerConfig) -> bool {
    CONFIG.set(cfg).is_ok()
}

/// The process-wide config, or the defaults if none was installed.
pub fn config() -> &'static ServerConfig {
    CONFIG.get_or_init(ServerConfig::default)
}
