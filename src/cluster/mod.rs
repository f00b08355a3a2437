//! The `cluster` module is the broker's window onto cluster membership.
//!
//! Membership itself (failure detection, joins, leaves) is owned by an
//! external gossip layer. The broker only needs a read-only view of it: who
//! the local node is, who the other members are, and where their HTTP
//! endpoints live. [`StaticMembership`] is a view fed from configuration.

pub mod member;
pub mod static_members;

pub use member::Member;
pub use static_members::StaticMembership;

/// Read-only view of the cluster the broker relays through.
pub trait Membership: Send + Sync {
    /// Number of members, including the local node.
    fn num_members(&self) -> usize;

    /// The node this broker runs on.
    fn local_node(&self) -> Member;

    /// Every member, including the local node, in the view's own order.
    fn members(&self) -> Vec<Member>;
}
