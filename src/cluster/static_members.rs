use std::net::IpAddr;
use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::cluster::{Member, Membership};
use crate::config::Settings;

/// A membership view whose contents are set explicitly rather than learned
/// through gossip. The local node is always the first member.
#[derive(Debug)]
pub struct StaticMembership {
    local: Member,
    peers: RwLock<Vec<Member>>,
}

impl StaticMembership {
    pub fn new(local: Member, peers: Vec<Member>) -> Self {
        Self {
            local,
            peers: RwLock::new(peers),
        }
    }

    /// A view containing only the local node.
    pub fn single(local: Member) -> Self {
        Self::new(local, Vec::new())
    }

    /// Builds the view from cluster settings. The local node advertises the
    /// HTTP server port in its metadata.
    pub fn from_settings(settings: &Settings) -> Result<Self, std::net::AddrParseError> {
        let cluster = &settings.cluster;
        let addr: IpAddr = cluster.advertise_addr.parse()?;
        let local = Member::new(
            &cluster.node_name,
            addr,
            cluster.gossip_port,
            settings.server.port,
        );

        let peers = cluster
            .peers
            .iter()
            .map(|peer| -> Result<Member, std::net::AddrParseError> {
                Ok(Member::new(
                    &peer.name,
                    peer.addr.parse()?,
                    peer.gossip_port,
                    peer.http_port,
                ))
            })
            .collect::<Result<Vec<_>, std::net::AddrParseError>>()?;

        Ok(Self::new(local, peers))
    }

    /// Adds a member, replacing any existing member with the same name.
    pub fn add_member(&self, member: Member) {
        if member.name == self.local.name {
            return;
        }

        let mut peers = self.peers.write().unwrap_or_else(PoisonError::into_inner);

        match peers.iter_mut().find(|peer| peer.name == member.name) {
            Some(existing) => *existing = member,
            None => {
                info!(node = %member.name, "member joined");
                peers.push(member);
            }
        }
    }

    /// Removes the member with the given name, if present.
    pub fn remove_member(&self, name: &str) {
        let mut peers = self.peers.write().unwrap_or_else(PoisonError::into_inner);
        let before = peers.len();
        peers.retain(|peer| peer.name != name);

        if peers.len() != before {
            info!(node = %name, "member left");
        }
    }
}

impl Membership for StaticMembership {
    fn num_members(&self) -> usize {
        self.peers.read().unwrap_or_else(PoisonError::into_inner).len() + 1
    }

    fn local_node(&self) -> Member {
        self.local.clone()
    }

    fn members(&self) -> Vec<Member> {
        let peers = self.peers.read().unwrap_or_else(PoisonError::into_inner);

        std::iter::once(self.local.clone())
            .chain(peers.iter().cloned())
            .collect()
    }
}
