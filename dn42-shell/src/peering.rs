//! Peering session management.

use base64ct::{Base64, Encoding};
use core::fmt;
use registry::Asn;
use std::net::{IpAddr, Ipv6Addr, ToSocketAddrs};
use tracing::{debug, info};

/// Size of a WireGuard public key in bytes.
pub const WG_KEY_SIZE: usize = 32;

/// Peering backend invoked by the shell commands.
///
/// Callers check that the session maintains the AS before calling.
pub trait Peering: Send + Sync {
    /// Set up a peering session with `asn`.
    fn peer_create(&self, asn: &Asn, public_key: &str, endpoint: IpAddr, port: u16) -> bool;

    /// Tear down the peering session with `asn`.
    fn peer_remove(&self, asn: &Asn) -> bool;

    /// Status of the peering session with `asn`, if there is one.
    fn peer_status(&self, asn: &Asn) -> Option<PeerStatus>;

    /// AS numbers which are currently known peers.
    fn list_peers(&self) -> Vec<Asn>;
}

/// State of a peering session.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PeerState {
    /// Configured but never seen up.
    Configured,

    /// Established.
    Up,

    /// Configured and not established.
    Down,
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PeerState::Configured => "configured",
            PeerState::Up => "up",
            PeerState::Down => "down",
        })
    }
}

/// Status of a single peering session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeerStatus {
    /// Peer AS.
    pub asn: Asn,

    /// Session state.
    pub state: PeerState,
}

/// Backend which accepts every request and changes nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct StubPeering;

impl Peering for StubPeering {
    fn peer_create(&self, asn: &Asn, public_key: &str, endpoint: IpAddr, port: u16) -> bool {
        info!(asn = %asn, public_key, %endpoint, port, "peer create");
        true
    }

    fn peer_remove(&self, asn: &Asn) -> bool {
        info!(asn = %asn, "peer remove");
        true
    }

    fn peer_status(&self, asn: &Asn) -> Option<PeerStatus> {
        debug!(asn = %asn, "peer status");
        None
    }

    fn list_peers(&self) -> Vec<Asn> {
        vec![Asn::new("4242420266"), Asn::new("4242420276")]
    }
}

/// Is `key` a base64 encoded WireGuard public key?
pub fn is_wireguard_key(key: &str) -> bool {
    let mut buf = [0u8; WG_KEY_SIZE];

    match Base64::decode(key, &mut buf) {
        Ok(decoded) => decoded.len() == WG_KEY_SIZE,
        Err(_) => false,
    }
}

/// Resolve a tunnel endpoint to its IPv6 addresses.
///
/// IPv6 literals (optionally in brackets) resolve to themselves. Host names
/// are looked up and only IPv6 results are kept. Lookup failures yield no
/// addresses.
pub fn endpoint_ipv6(host: &str) -> Vec<Ipv6Addr> {
    let host = host.trim();
    let literal = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(addr) = literal.parse::<Ipv6Addr>() {
        return vec![addr];
    }

    if host.is_empty() || literal.parse::<IpAddr>().is_ok() {
        return Vec::new();
    }

    match (host, 0u16).to_socket_addrs() {
        Ok(addrs) => {
            let mut resolved = Vec::new();

            for addr in addrs {
                if let IpAddr::V6(ip) = addr.ip() {
                    if !resolved.contains(&ip) {
                        resolved.push(ip);
                    }
                }
            }

            resolved
        }
        Err(err) => {
            debug!(host, %err, "endpoint lookup failed");
            Vec::new()
        }
    }
}
