use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Represents one server-sent event flowing through the cluster.
///
/// A message is rendered two ways: as `text/event-stream` lines for
/// subscribers ([`Message::bytes`]) and as JSON for node-to-node relay
/// ([`Message::encode`]). Apart from `been_to` it is never mutated once
/// built.
///
/// # Fields
///
/// - `id` - Event id, sets the subscriber's last event id when non-empty.
/// - `event` - Event type name; unnamed events reach the `onmessage` handler.
/// - `data` - Raw JSON payload, written verbatim after `data: `.
/// - `retry` - Reconnection time in milliseconds, `0` leaves it unset.
/// - `been_to` - Names of the nodes this message has already passed through.
///
/// # Example
///
/// ```rust
/// use sse_cluster::broker::Message;
///
/// let msg = Message::new("1", "update", Some("{}")).unwrap();
/// assert_eq!(msg.bytes(), b"id: 1\nevent: update\ndata: {}\n\n".to_vec());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: String,
    pub event: String,
    pub data: Option<Box<RawValue>>,
    pub retry: u64,
    pub been_to: Vec<String>,
}

impl Message {
    /// Builds a message whose payload is the given JSON text. Fails if `data`
    /// is not valid JSON.
    pub fn new(id: &str, event: &str, data: Option<&str>) -> Result<Self, serde_json::Error> {
        let data = data
            .map(|raw| RawValue::from_string(raw.to_string()))
            .transpose()?;

        Ok(Self {
            id: id.to_string(),
            event: event.to_string(),
            data,
            ..Default::default()
        })
    }

    /// Returns the message in its `text/event-stream` form. Only set fields
    /// are written and the event is always terminated by a blank line.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = String::new();

        if !self.id.is_empty() {
            out.push_str("id: ");
            out.push_str(&self.id);
            out.push('\n');
        }

        if !self.event.is_empty() {
            out.push_str("event: ");
            out.push_str(&self.event);
            out.push('\n');
        }

        if let Some(data) = &self.data {
            out.push_str("data: ");
            out.push_str(data.get());
            out.push('\n');
        }

        if self.retry > 0 {
            out.push_str("retry: ");
            out.push_str(&self.retry.to_string());
            out.push('\n');
        }

        out.push('\n');
        out.into_bytes()
    }

    /// Returns the JSON encoding used as the relay request body.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses a message from its JSON encoding.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }
}

// `RawValue` has no equality of its own, payloads compare by their text.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.event == other.event
            && self.data.as_ref().map(|d| d.get()) == other.data.as_ref().map(|d| d.get())
            && self.retry == other.retry
            && self.been_to == other.been_to
    }
}

impl Eq for Message {}
