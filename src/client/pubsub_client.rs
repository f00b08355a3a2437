use tokio::sync::mpsc::{self, Receiver, Sender, error::SendError};

use crate::broker::Message;

/// Number of undelivered messages a subscriber may hold. A second write
/// waits until the first one has been consumed.
pub const MAILBOX_CAPACITY: usize = 1;

/// The delivery side of a subscriber connected to this node.
///
/// Each client is uniquely identified by an `id` within its channel and owns
/// the sending half of a single-slot mailbox. Cloning a client clones the
/// sender, so a channel can hand out snapshots without holding its lock.
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for the client within its channel.
    pub id: String,

    /// Sending half of the subscriber's mailbox.
    pub sender: Sender<Message>,
}

/// The consuming side of a client's mailbox, held by the transport for as
/// long as the subscriber connection is open.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    messages: Receiver<Message>,
}

impl Client {
    /// Creates a client and the subscription that drains its mailbox.
    pub fn new(id: &str) -> (Self, Subscription) {
        let (sender, messages) = mpsc::channel(MAILBOX_CAPACITY);

        let client = Self {
            id: id.to_string(),
            sender,
        };
        let subscription = Subscription {
            id: id.to_string(),
            messages,
        };

        (client, subscription)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Places `msg` in the mailbox, waiting while the previous message is
    /// still undelivered. Fails only once the subscription has been dropped.
    pub async fn write(&self, msg: Message) -> Result<(), SendError<Message>> {
        self.sender.send(msg).await
    }
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Waits for the next message. Consuming it frees the mailbox slot.
    pub async fn recv(&mut self) -> Option<Message> {
        self.messages.recv().await
    }

    /// Read access to the underlying receiver, for callers that want to
    /// poll it directly.
    pub fn messages(&mut self) -> &mut Receiver<Message> {
        &mut self.messages
    }
}
