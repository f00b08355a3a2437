use super::settings::{LogFormat, Settings};
use super::{PeerSettings, load_config};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8080);
    assert!(!settings.server.cors_enabled);
    assert_eq!(settings.http_client.timeout_ms, 10_000);
    assert_eq!(settings.cluster.gossip_port, 42000);
    assert!(settings.cluster.peers.is_empty());
    assert!(!settings.cluster.node_name.is_empty());
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.logging.format, LogFormat::Json);
}

#[test]
fn test_default_node_names_are_unique() {
    assert_ne!(
        Settings::default().cluster.node_name,
        Settings::default().cluster.node_name
    );
}

#[test]
#[serial]
fn test_load_config_from_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("node.toml");
    let toml = r#"
        [server]
        port = 9000
        cors_enabled = true

        [http_client]
        timeout_ms = 250

        [cluster]
        node_name = "node-a"
        advertise_addr = "10.0.0.1"

        [[cluster.peers]]
        name = "node-b"
        addr = "10.0.0.2"
        gossip_port = 42000
        http_port = 9001

        [logging]
        format = "pretty"
    "#;
    fs::write(&path, toml).expect("write config file");

    let cfg = temp_env::with_vars_unset(["SSE__SERVER__PORT", "SSE__SERVER__HOST"], || {
        load_config(path.to_str()).expect("load_config failed")
    });

    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 9000);
    assert!(cfg.server.cors_enabled);
    assert_eq!(cfg.http_client.timeout_ms, 250);
    assert_eq!(cfg.cluster.node_name, "node-a");
    assert_eq!(cfg.cluster.advertise_addr, "10.0.0.1");
    assert_eq!(cfg.cluster.gossip_port, 42000);
    assert_eq!(
        cfg.cluster.peers,
        vec![PeerSettings {
            name: "node-b".into(),
            addr: "10.0.0.2".into(),
            gossip_port: 42000,
            http_port: 9001,
        }]
    );
    assert_eq!(cfg.logging.level, "info");
    assert_eq!(cfg.logging.format, LogFormat::Pretty);
}

#[test]
#[serial]
fn test_load_config_from_env() {
    let tmp = TempDir::new().expect("create tempdir");
    let missing = tmp.path().join("absent");

    let cfg = temp_env::with_vars(
        [
            ("SSE__SERVER__PORT", Some("9100")),
            ("SSE__CLUSTER__NODE_NAME", Some("env-node")),
            ("SSE__LOGGING__LEVEL", Some("debug")),
        ],
        || load_config(missing.to_str()).expect("load_config failed"),
    );

    assert_eq!(cfg.server.port, 9100);
    assert_eq!(cfg.cluster.node_name, "env-node");
    assert_eq!(cfg.logging.level, "debug");
}
