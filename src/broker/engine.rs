//! Broker engine
//!
//! This module contains the per-node broker responsible for:
//! - managing channels and the clients connected to this node
//! - publishing messages to every client, one channel or one client
//! - relaying each publish to one other cluster member
//! - tracking in-flight publish work so shutdown can drain it
//!
//! Concurrency and usage notes:
//! - `Broker` is a cheap handle around shared state and is meant to be
//!   cloned into every request handler.
//! - The channel map lock is only held for lookups and updates, never while
//!   a delivery waits on a subscriber's mailbox.
//! - Each publish runs as background tasks on a `TaskTracker`; `close` waits
//!   for all of them to finish.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::join_all;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::broker::channel::Channel;
use crate::broker::message::Message;
use crate::broker::relay::Relay;
use crate::broker::status::{GossipStatus, Status};
use crate::client::Subscription;
use crate::cluster::Membership;
use crate::utils::BrokerError;

/// A node in the cluster. Holds the channels with clients connected to this
/// node and the membership view used to relay publishes to other nodes.
#[derive(Clone)]
pub struct Broker {
    state: Arc<BrokerState>,
}

struct BrokerState {
    channels: Mutex<HashMap<String, Arc<Channel>>>,
    membership: Arc<dyn Membership>,
    relay: Relay,
    tracker: TaskTracker,
    node: String,
}

impl Broker {
    pub fn new(membership: Arc<dyn Membership>, http: reqwest::Client) -> Self {
        let node = membership.local_node().name;
        let relay = Relay::new(http, Arc::clone(&membership));

        Self {
            state: Arc::new(BrokerState {
                channels: Mutex::new(HashMap::new()),
                membership,
                relay,
                tracker: TaskTracker::new(),
                node,
            }),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, Arc<Channel>>> {
        self.state
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a new client on a channel, creating the channel if needed.
    pub fn new_client(&self, channel_id: &str, client_id: &str) -> Result<Subscription, BrokerError> {
        let mut channels = self.channels();

        let channel = channels.entry(channel_id.to_string()).or_insert_with(|| {
            info!(node = %self.state.node, channel = %channel_id, "created new channel");
            Arc::new(Channel::new(channel_id))
        });

        info!(node = %self.state.node, channel = %channel_id, client = %client_id, "creating new client");
        channel.add_client(client_id)
    }

    /// Removes a client from a channel. A channel left without clients is
    /// removed as well.
    pub fn remove_client(&self, channel_id: &str, client_id: &str) {
        let mut channels = self.channels();

        let Some(channel) = channels.get(channel_id) else {
            return;
        };

        channel.remove_client(client_id);
        info!(node = %self.state.node, channel = %channel_id, client = %client_id, "removed client from channel");

        if channel.num_clients() == 0 {
            channels.remove(channel_id);
            info!(node = %self.state.node, channel = %channel_id, "removed empty channel");
        }
    }

    /// Publishes a message without waiting for delivery.
    ///
    /// - no channel and no client: every client on every channel
    /// - channel only: every client on that channel
    /// - channel and client: that one client, if it is connected here
    /// - client without channel: rejected with `InvalidTarget`
    ///
    /// When the cluster has other members the message is also relayed to
    /// the next node it has not been to.
    pub fn publish(&self, channel_id: &str, client_id: &str, msg: Message) -> Result<(), BrokerError> {
        if self.state.tracker.is_closed() {
            return Err(BrokerError::ShuttingDown);
        }

        match (channel_id.is_empty(), client_id.is_empty()) {
            (true, true) => {
                let broker = self.clone();
                let msg = msg.clone();
                self.state
                    .tracker
                    .spawn(async move { broker.publish_all(msg).await });
            }
            (false, true) => {
                let broker = self.clone();
                let channel_id = channel_id.to_string();
                let msg = msg.clone();
                self.state
                    .tracker
                    .spawn(async move { broker.publish_channel(&channel_id, msg).await });
            }
            (false, false) => {
                let broker = self.clone();
                let channel_id = channel_id.to_string();
                let client_id = client_id.to_string();
                let msg = msg.clone();
                self.state.tracker.spawn(async move {
                    broker.publish_client(&channel_id, &client_id, msg).await
                });
            }
            (true, false) => return Err(BrokerError::InvalidTarget),
        }

        if self.state.membership.num_members() > 1 {
            let relay = self.state.relay.clone();
            let channel_id = channel_id.to_string();
            let client_id = client_id.to_string();
            self.state.tracker.spawn(async move {
                relay.send_to_next_node(&channel_id, &client_id, msg).await;
            });
        }

        Ok(())
    }

    async fn publish_all(&self, msg: Message) {
        let channels: Vec<Arc<Channel>> = self.channels().values().cloned().collect();

        join_all(channels.iter().map(|channel| channel.write(&msg))).await;
    }

    async fn publish_channel(&self, channel_id: &str, msg: Message) {
        let channel = self.channels().get(channel_id).cloned();

        match channel {
            Some(channel) => channel.write(&msg).await,
            None => debug!(node = %self.state.node, channel = %channel_id, "no local clients for channel"),
        }
    }

    async fn publish_client(&self, channel_id: &str, client_id: &str, msg: Message) {
        let channel = self.channels().get(channel_id).cloned();

        let Some(channel) = channel else {
            debug!(node = %self.state.node, channel = %channel_id, "no local clients for channel");
            return;
        };

        // The client may be connected to another node.
        if let Err(err) = channel.write_to(client_id, &msg).await {
            debug!(node = %self.state.node, error = %err, "client not connected to this node");
        }
    }

    /// Returns the number of scheduled tasks, the membership view and the
    /// client ids of every local channel.
    pub fn status(&self) -> Status {
        let tasks = tokio::runtime::Handle::try_current()
            .map(|handle| handle.metrics().num_alive_tasks())
            .unwrap_or(0);

        let members = self
            .state
            .membership
            .members()
            .into_iter()
            .map(|member| (member.addr.to_string(), member.port))
            .collect();

        let channels = self
            .channels()
            .iter()
            .map(|(id, channel)| (id.clone(), channel.client_ids()))
            .collect();

        Status {
            tasks,
            gossip: GossipStatus {
                member_count: self.state.membership.num_members(),
                members,
            },
            channels,
        }
    }

    /// Number of publish and relay tasks still running.
    pub fn in_flight(&self) -> usize {
        self.state.tracker.len()
    }

    /// Stops accepting publishes and waits until every publish and relay
    /// task started before the call has finished.
    pub async fn close(&self) {
        self.state.tracker.close();
        self.state.tracker.wait().await;
        info!(node = %self.state.node, "broker operations finished");
    }
}
