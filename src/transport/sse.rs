//! Subscriber event stream.
//!
//! Each SSE response body drains one subscription. The body ends when the
//! node shuts down; when it is dropped, because the subscriber went away or
//! the stream ended, the client is removed from the broker.

use std::convert::Infallible;

use axum::body::Bytes;
use futures_util::Stream;
use futures_util::stream;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::broker::Broker;
use crate::client::Subscription;

/// Removes the client from the broker when dropped.
struct Unsubscribe {
    broker: Broker,
    channel_id: String,
    client_id: String,
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.broker.remove_client(&self.channel_id, &self.client_id);
        info!(channel = %self.channel_id, client = %self.client_id, "subscriber disconnected");
    }
}

/// Turns a subscription into a stream of `text/event-stream` chunks.
pub fn event_stream(
    broker: Broker,
    channel_id: String,
    subscription: Subscription,
    shutdown: CancellationToken,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let guard = Unsubscribe {
        broker,
        channel_id,
        client_id: subscription.id().to_string(),
    };

    stream::unfold(
        (subscription, guard, shutdown),
        |(mut subscription, guard, shutdown)| async move {
            let next = tokio::select! {
                msg = subscription.recv() => msg,
                _ = shutdown.cancelled() => None,
            };

            next.map(|msg| {
                (
                    Ok(Bytes::from(msg.bytes())),
                    (subscription, guard, shutdown),
                )
            })
        },
    )
}
