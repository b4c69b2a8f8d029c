//! Topology consistency checks.
//!
//! The builder produces consistent topologies by construction; these checks
//! re-establish every structural guarantee on a finished topology before it
//! is handed to the runtime, and back the property tests.

use crate::ip::{AddressRegistry, NetworkScope};
use crate::topology::{InterfaceRole, NodeKind, Topology};
use std::collections::{HashMap, HashSet};

/// Validate a built topology
///
/// Checks for:
/// - Duplicate node names
/// - Duplicate interface names within a node
/// - Links referencing missing nodes or interfaces, and duplicate links
/// - Duplicate IP addresses
/// - Overlapping WAN networks and overlapping LAN networks
/// - Hosts whose default route is not a gateway LAN address on their subnet
/// - Node and link counts that disagree with the build parameters
///
/// # Returns
/// * `Ok(())` if validation succeeds
/// * `Err(String)` describing the first violation found
pub fn validate_topology(topology: &Topology) -> Result<(), String> {
    let nodes = validate_node_names(topology)?;
    validate_links(topology, &nodes)?;
    validate_addresses(topology)?;
    validate_default_routes(topology)?;
    validate_counts(topology)?;

    log::debug!(
        "Topology validated: {} nodes, {} links",
        topology.nodes.len(),
        topology.links.len()
    );
    Ok(())
}

fn validate_node_names(topology: &Topology) -> Result<HashMap<&str, usize>, String> {
    let mut nodes = HashMap::with_capacity(topology.nodes.len());
    for (idx, node) in topology.nodes.iter().enumerate() {
        if nodes.insert(node.name.as_str(), idx).is_some() {
            return Err(format!("Duplicate node name '{}'", node.name));
        }
        let mut interfaces = HashSet::new();
        for intf in &node.interfaces {
            if !interfaces.insert(intf.name.as_str()) {
                return Err(format!(
                    "Duplicate interface name '{}' on node '{}'",
                    intf.name, node.name
                ));
            }
        }
        if node.kind == NodeKind::Switch && !node.interfaces.is_empty() {
            return Err(format!("Switch '{}' carries address bindings", node.name));
        }
    }
    Ok(nodes)
}

fn validate_links(topology: &Topology, nodes: &HashMap<&str, usize>) -> Result<(), String> {
    let mut pairs = HashSet::with_capacity(topology.links.len());
    for link in &topology.links {
        let switch = nodes
            .get(link.switch.as_str())
            .map(|&idx| &topology.nodes[idx])
            .ok_or_else(|| format!("Link references unknown node '{}'", link.switch))?;
        let child = nodes
            .get(link.child.as_str())
            .map(|&idx| &topology.nodes[idx])
            .ok_or_else(|| format!("Link references unknown node '{}'", link.child))?;

        if switch.kind != NodeKind::Switch {
            return Err(format!(
                "Link {} -> {} does not start at a switch",
                link.switch, link.child
            ));
        }
        if !pairs.insert((link.switch.as_str(), link.child.as_str())) {
            return Err(format!("Duplicate link {} -> {}", link.switch, link.child));
        }

        let intf = child.interface(&link.child_interface).ok_or_else(|| {
            format!(
                "Link {} -> {} uses unknown interface '{}'",
                link.switch, link.child, link.child_interface
            )
        })?;
        if let Some(addr) = &link.address {
            if !intf.addresses.contains(addr) {
                return Err(format!(
                    "Link {} -> {} binds {} which interface '{}' does not carry",
                    link.switch, link.child, addr, intf.name
                ));
            }
        }
    }
    Ok(())
}

fn validate_addresses(topology: &Topology) -> Result<(), String> {
    let mut registry = AddressRegistry::new();
    for node in &topology.nodes {
        for intf in &node.interfaces {
            let owner = format!("{}/{}", node.name, intf.name);
            let scope = match intf.role {
                InterfaceRole::Wan => NetworkScope::Wan,
                InterfaceRole::Lan | InterfaceRole::Host => NetworkScope::Lan,
            };
            for net in &intf.addresses {
                registry.register_address(net.addr(), &owner)?;
                registry.register_network(scope, *net, &owner)?;
            }
        }
    }
    log::debug!(
        "{} addresses, {} WAN networks, {} LAN networks",
        registry.address_count(),
        registry.network_count(NetworkScope::Wan),
        registry.network_count(NetworkScope::Lan)
    );
    Ok(())
}

fn validate_default_routes(topology: &Topology) -> Result<(), String> {
    let gateway_lans: HashSet<_> = topology
        .gateways()
        .flat_map(|gw| gw.interfaces.iter())
        .filter(|intf| intf.role == InterfaceRole::Lan)
        .flat_map(|intf| intf.addresses.iter().map(|net| net.addr()))
        .collect();

    for host in topology.hosts() {
        let route = host
            .default_route
            .ok_or_else(|| format!("Host '{}' has no default route", host.name))?;
        if !gateway_lans.contains(&route) {
            return Err(format!(
                "Host '{}' routes via {} which is not a gateway LAN address",
                host.name, route
            ));
        }
        if !host.addresses().any(|net| net.contains(&route)) {
            return Err(format!(
                "Host '{}' default route {} is outside its subnet",
                host.name, route
            ));
        }
    }
    Ok(())
}

fn validate_counts(topology: &Topology) -> Result<(), String> {
    let expected_nodes = topology.params.expected_node_count();
    if topology.nodes.len() as u64 != expected_nodes {
        return Err(format!(
            "Expected {} nodes, found {}",
            expected_nodes,
            topology.nodes.len()
        ));
    }
    let expected_links = topology.params.expected_link_count();
    if topology.links.len() as u64 != expected_links {
        return Err(format!(
            "Expected {} links, found {}",
            expected_links,
            topology.links.len()
        ));
    }
    Ok(())
}
