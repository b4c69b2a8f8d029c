//! IP address registry.
//!
//! Tracks every assigned address and every network a topology uses so
//! uniqueness and non-overlap can be checked in one pass.

use ipnet::Ipv4Net;
use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;

/// Address space a network belongs to.
///
/// Networks are only required to be disjoint within one scope: every LAN
/// /24 lives inside its gateway's WAN /16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkScope {
    Wan,
    Lan,
}

#[derive(Debug)]
struct NetworkEntry {
    net: Ipv4Net,
    owner: String,
}

/// Registry of assigned addresses and networks
#[derive(Debug, Default)]
pub struct AddressRegistry {
    /// Address -> owner ("node/interface")
    assigned: HashMap<Ipv4Addr, String>,
    /// Per scope: network start -> entry
    networks: HashMap<NetworkScope, BTreeMap<u32, NetworkEntry>>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an address for an owner. Re-registering for the same owner is fine.
    pub fn register_address(&mut self, addr: Ipv4Addr, owner: &str) -> Result<(), String> {
        if let Some(existing) = self.assigned.get(&addr) {
            if existing != owner {
                return Err(format!(
                    "IP {} assigned to both {} and {}",
                    addr, existing, owner
                ));
            }
            return Ok(());
        }
        self.assigned.insert(addr, owner.to_string());
        Ok(())
    }

    /// Register the network containing `net` in `scope`.
    ///
    /// The identical network may be registered any number of times (all
    /// hosts of a subnet share it); a different network that overlaps an
    /// existing one is an error.
    pub fn register_network(
        &mut self,
        scope: NetworkScope,
        net: Ipv4Net,
        owner: &str,
    ) -> Result<(), String> {
        let net = net.trunc();
        let start = u32::from(net.network());
        let end = u32::from(net.broadcast());
        let networks = self.networks.entry(scope).or_default();

        if let Some(entry) = networks.get(&start) {
            if entry.net == net {
                return Ok(());
            }
            return Err(overlap_error(scope, &entry.net, &entry.owner, &net, owner));
        }
        if let Some((_, prev)) = networks.range(..start).next_back() {
            if u32::from(prev.net.broadcast()) >= start {
                return Err(overlap_error(scope, &prev.net, &prev.owner, &net, owner));
            }
        }
        if let Some((&next_start, next)) = networks.range(start..).next() {
            if next_start <= end {
                return Err(overlap_error(scope, &next.net, &next.owner, &net, owner));
            }
        }

        networks.insert(
            start,
            NetworkEntry {
                net,
                owner: owner.to_string(),
            },
        );
        Ok(())
    }

    pub fn address_count(&self) -> usize {
        self.assigned.len()
    }

    pub fn network_count(&self, scope: NetworkScope) -> usize {
        self.networks.get(&scope).map_or(0, BTreeMap::len)
    }
}

fn overlap_error(
    scope: NetworkScope,
    existing: &Ipv4Net,
    existing_owner: &str,
    new: &Ipv4Net,
    new_owner: &str,
) -> String {
    format!(
        "{:?} network {} of {} overlaps {} of {}",
        scope, new, new_owner, existing, existing_owner
    )
}
