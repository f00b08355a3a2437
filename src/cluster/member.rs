use std::net::{IpAddr, SocketAddr};

use crate::utils::BrokerError;

/// A single node as reported by the membership layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub addr: IpAddr,
    /// Gossip port.
    pub port: u16,
    /// Opaque per-node metadata. Nodes put their HTTP listen port here as
    /// ASCII decimal.
    pub meta: Vec<u8>,
}

impl Member {
    pub fn new(name: &str, addr: IpAddr, port: u16, http_port: u16) -> Self {
        Self {
            name: name.to_string(),
            addr,
            port,
            meta: http_port.to_string().into_bytes(),
        }
    }

    /// Parses the HTTP port advertised in the member's metadata.
    pub fn http_port(&self) -> Result<u16, BrokerError> {
        std::str::from_utf8(&self.meta)
            .ok()
            .and_then(|meta| meta.trim().parse().ok())
            .ok_or_else(|| BrokerError::InvalidMemberMeta {
                member: self.name.clone(),
            })
    }

    /// Address of the member's HTTP server.
    pub fn http_addr(&self) -> Result<SocketAddr, BrokerError> {
        Ok(SocketAddr::new(self.addr, self.http_port()?))
    }
}
