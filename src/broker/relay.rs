//! Node-to-node relay.
//!
//! A publish is forwarded to at most one other node: the first member, in
//! membership order, that is neither this node nor already listed in the
//! message's `been_to`. Members that fail are skipped and the next eligible
//! one is tried, until one accepts the message or none remain. Failures are
//! logged and never reported to the publisher.

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::{StatusCode, Url};
use reqwest::header::CONTENT_TYPE;
use tracing::{error, info};

use crate::broker::message::Message;
use crate::cluster::{Member, Membership};
use crate::utils::BrokerError;

#[derive(Clone)]
pub struct Relay {
    http: reqwest::Client,
    membership: Arc<dyn Membership>,
}

impl Relay {
    pub fn new(http: reqwest::Client, membership: Arc<dyn Membership>) -> Self {
        Self { http, membership }
    }

    /// Members the message may be forwarded to, in membership order.
    pub fn next_hops(&self, msg: &Message) -> Vec<Member> {
        let local = self.membership.local_node();
        let visited: HashSet<&str> = msg.been_to.iter().map(String::as_str).collect();

        self.membership
            .members()
            .into_iter()
            .filter(|member| member.name != local.name && !visited.contains(member.name.as_str()))
            .collect()
    }

    /// Forwards `msg` to the next eligible node, returning the member that
    /// accepted it.
    pub async fn send_to_next_node(
        &self,
        channel_id: &str,
        client_id: &str,
        msg: Message,
    ) -> Option<Member> {
        let candidates = self.next_hops(&msg);
        if candidates.is_empty() {
            return None;
        }

        let mut outbound = msg;
        outbound.been_to.push(self.membership.local_node().name);

        let body = match outbound.encode() {
            Ok(body) => body,
            Err(err) => {
                error!(event_id = %outbound.id, error = %err, "failed to encode message for relay");
                return None;
            }
        };

        for member in candidates {
            match self.post(&member, channel_id, client_id, body.clone()).await {
                Ok(()) => {
                    info!(
                        target_node = %member.name,
                        event_id = %outbound.id,
                        event = %outbound.event,
                        channel = %channel_id,
                        "propagated message to node"
                    );
                    return Some(member);
                }
                Err(err) => {
                    error!(
                        target_node = %member.name,
                        event_id = %outbound.id,
                        event = %outbound.event,
                        channel = %channel_id,
                        error = %err,
                        "failed to propagate event to node"
                    );
                }
            }
        }

        None
    }

    async fn post(
        &self,
        member: &Member,
        channel_id: &str,
        client_id: &str,
        body: Vec<u8>,
    ) -> Result<(), BrokerError> {
        let url = relay_url(member, channel_id, client_id)?;

        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(BrokerError::RelayRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Publish endpoint on `member` for the same channel and client.
pub fn relay_url(member: &Member, channel_id: &str, client_id: &str) -> Result<Url, BrokerError> {
    let addr = member.http_addr()?;
    let invalid = || BrokerError::RelayUrl {
        member: member.name.clone(),
    };

    let mut url = Url::parse(&format!("http://{addr}/publish")).map_err(|_| invalid())?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| invalid())?;
        if !channel_id.is_empty() {
            segments.push(channel_id);
        }
        if !client_id.is_empty() {
            segments.push("client").push(client_id);
        }
    }

    Ok(url)
}
