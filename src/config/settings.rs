use serde::Deserialize;

/// Top-level configuration settings for a broker node.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub http_client: HttpClientSettings,
    pub cluster: ClusterSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the HTTP server.
///
/// Defines the address the server binds to and whether cross-origin
/// requests are allowed.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

/// Settings for the client used to relay messages to other nodes.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpClientSettings {
    pub timeout_ms: u64,
}

/// Identity of this node within the cluster and the peers it starts with.
#[derive(Debug, Deserialize, Clone)]
pub struct ClusterSettings {
    pub node_name: String,
    pub advertise_addr: String,
    pub gossip_port: u16,
    pub peers: Vec<PeerSettings>,
}

/// A known cluster member.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PeerSettings {
    pub name: String,
    pub addr: String,
    pub gossip_port: u16,
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub http_client: Option<PartialHttpClientSettings>,
    pub cluster: Option<PartialClusterSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PartialHttpClientSettings {
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialClusterSettings {
    pub node_name: Option<String>,
    pub advertise_addr: Option<String>,
    pub gossip_port: Option<u16>,
    pub peers: Option<Vec<PeerSettings>>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

/// Provides default values for `Settings`.
///
/// Every node gets a fresh random name unless one is configured.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_enabled: false,
            },
            http_client: HttpClientSettings { timeout_ms: 10_000 },
            cluster: ClusterSettings {
                node_name: uuid::Uuid::new_v4().to_string(),
                advertise_addr: "127.0.0.1".to_string(),
                gossip_port: 42000,
                peers: Vec::new(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }
}
