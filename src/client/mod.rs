//! The `client` module defines the representation of a subscriber in the
//! broker.
//!
//! A subscriber is split in two: the [`Client`], which a channel stores and
//! writes to, and the [`Subscription`], which the transport drains. The two
//! are connected by a mailbox that holds at most one undelivered message.

pub mod pubsub_client;
pub use pubsub_client::{Client, MAILBOX_CAPACITY, Subscription};
