//! # SSE Cluster
//!
//! `sse-cluster` is a clustered publish/subscribe broker that pushes
//! server-sent events to long-lived HTTP subscribers. Every node tracks only
//! the subscribers connected to it and relays each publish to one other
//! member of the cluster, so an event reaches subscribers wherever they are
//! connected without flooding every node.
//!
//! ## Core Modules
//!
//! - `broker`: channels, clients, the three publish modes and the relay.
//! - `client`: a subscriber's single-slot mailbox.
//! - `cluster`: the read-only membership view the relay walks.
//! - `config`: layered configuration from file and environment.
//! - `transport`: the HTTP surface (status, subscribe, publish).
//! - `utils`: error type and logging setup.

pub mod broker;
pub mod client;
pub mod cluster;
pub mod config;
pub mod transport;
pub mod utils;
