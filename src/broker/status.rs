use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Point-in-time view of a node: scheduled tasks, the membership view and
/// the channels with their locally connected clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Tasks alive on the runtime. Diagnostic only.
    #[serde(rename = "num_goroutines")]
    pub tasks: usize,
    pub gossip: GossipStatus,
    pub channels: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GossipStatus {
    pub member_count: usize,
    /// Member address to gossip port.
    pub members: HashMap<String, u16>,
}
