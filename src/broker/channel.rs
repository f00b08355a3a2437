use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::broker::message::Message;
use crate::client::{Client, Subscription};
use crate::utils::BrokerError;

pub type ClientId = String;

/// A named group of clients that receive the same events.
///
/// The client map has its own lock, separate from the broker's channel map,
/// and it is never held while a client write is waiting on a full mailbox.
#[derive(Debug)]
pub struct Channel {
    id: String,
    clients: Mutex<HashMap<ClientId, Client>>,
}

impl Channel {
    /// Creates an empty channel with the given identifier.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn clients(&self) -> MutexGuard<'_, HashMap<ClientId, Client>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new client, returning the subscription that drains it.
    /// The existence check and the insert happen under one lock.
    pub fn add_client(&self, id: &str) -> Result<Subscription, BrokerError> {
        let mut clients = self.clients();

        if clients.contains_key(id) {
            return Err(BrokerError::DuplicateClient {
                channel: self.id.clone(),
                client: id.to_string(),
            });
        }

        let (client, subscription) = Client::new(id);
        clients.insert(id.to_string(), client);

        Ok(subscription)
    }

    /// Removes a client. Does nothing if it is not registered.
    pub fn remove_client(&self, id: &str) {
        self.clients().remove(id);
    }

    pub fn num_clients(&self) -> usize {
        self.clients().len()
    }

    /// Snapshot of the registered client ids, in no particular order.
    pub fn client_ids(&self) -> Vec<ClientId> {
        self.clients().keys().cloned().collect()
    }

    /// Writes a message to every client registered when the call starts.
    ///
    /// Deliveries run concurrently, so one full mailbox delays only its own
    /// write. Clients whose subscription has already gone away are skipped.
    pub async fn write(&self, msg: &Message) {
        info!(channel = %self.id, event_id = %msg.id, event = %msg.event, "writing message to channel");

        let snapshot: Vec<Client> = self.clients().values().cloned().collect();

        let deliveries = snapshot.iter().map(|client| async move {
            match client.write(msg.clone()).await {
                Ok(()) => info!(
                    channel = %self.id,
                    client = %client.id,
                    event_id = %msg.id,
                    event = %msg.event,
                    "wrote message to client"
                ),
                Err(_) => debug!(channel = %self.id, client = %client.id, "client disconnected before delivery"),
            }
        });

        join_all(deliveries).await;
    }

    /// Writes a message to a single client.
    pub async fn write_to(&self, client_id: &str, msg: &Message) -> Result<(), BrokerError> {
        info!(channel = %self.id, client = %client_id, event_id = %msg.id, event = %msg.event, "writing message to client");

        let client = self
            .clients()
            .get(client_id)
            .cloned()
            .ok_or_else(|| BrokerError::ClientNotFound {
                channel: self.id.clone(),
                client: client_id.to_string(),
            })?;

        if client.write(msg.clone()).await.is_err() {
            debug!(channel = %self.id, client = %client_id, "client disconnected before delivery");
            return Ok(());
        }

        info!(channel = %self.id, client = %client_id, event_id = %msg.id, event = %msg.event, "wrote message to client");
        Ok(())
    }
}
