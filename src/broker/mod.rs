pub mod channel;
pub mod engine;
pub mod message;
pub mod relay;
pub mod status;

pub use channel::Channel;
pub use engine::Broker;
pub use message::Message;
pub use relay::Relay;
pub use status::{GossipStatus, Status};
