mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{
    ClusterSettings, HttpClientSettings, LogFormat, LoggingSettings, PeerSettings,
    ServerSettings, Settings,
};

/// Default location of the optional configuration file, without extension.
pub const DEFAULT_CONFIG_PATH: &str = "config/default";

/// Loads the configuration from an optional file and `SSE__`-prefixed
/// environment variables (e.g. `SSE__SERVER__PORT`), then fills whatever is
/// missing from `Settings::default()`.
pub fn load_config(path: Option<&str>) -> Result<Settings, ConfigError> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let builder = Config::builder()
        .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(false))
        .add_source(
            Environment::with_prefix("SSE")
                .prefix_separator("__")
                .separator("__"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();
    let server = partial.server;
    let http_client = partial.http_client;
    let cluster = partial.cluster;
    let logging = partial.logging;

    Ok(Settings {
        server: ServerSettings {
            host: server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
            cors_enabled: server
                .as_ref()
                .and_then(|s| s.cors_enabled)
                .unwrap_or(default.server.cors_enabled),
        },
        http_client: HttpClientSettings {
            timeout_ms: http_client
                .as_ref()
                .and_then(|h| h.timeout_ms)
                .unwrap_or(default.http_client.timeout_ms),
        },
        cluster: ClusterSettings {
            node_name: cluster
                .as_ref()
                .and_then(|c| c.node_name.clone())
                .unwrap_or(default.cluster.node_name),
            advertise_addr: cluster
                .as_ref()
                .and_then(|c| c.advertise_addr.clone())
                .unwrap_or(default.cluster.advertise_addr),
            gossip_port: cluster
                .as_ref()
                .and_then(|c| c.gossip_port)
                .unwrap_or(default.cluster.gossip_port),
            peers: cluster
                .as_ref()
                .and_then(|c| c.peers.clone())
                .unwrap_or(default.cluster.peers),
        },
        logging: LoggingSettings {
            level: logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
            format: logging
                .as_ref()
                .and_then(|l| l.format)
                .unwrap_or(default.logging.format),
        },
    })
}

#[cfg(test)]
mod tests;
