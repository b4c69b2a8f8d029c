//! Topology type definitions.
//!
//! Nodes, interfaces, links and the topology container handed to the
//! external emulation runtime. Everything here derives `Serialize` so the
//! structural description can be written out unchanged.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;

/// Kind of node in the topology tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Top-level switch or a gateway's local distribution switch
    Switch,
    /// IPsec gateway between an upstream switch and its host subnets
    Gateway,
    /// End host behind a gateway
    Host,
}

/// Capabilities a node may carry.
///
/// Behaviour is selected by checking for a capability, never by node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ForwardingEnabled,
    TunnelEndpoint,
    Nat,
}

/// Which side of the hierarchy an interface faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceRole {
    /// Gateway interface facing the upstream switch
    Wan,
    /// Gateway interface facing its local host switch
    Lan,
    /// Host interface facing the local host switch
    Host,
}

/// A named interface with its address bindings.
///
/// A gateway LAN interface serving several host subnets carries one address
/// per subnet; every other interface carries exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub role: InterfaceRole,
    pub addresses: Vec<Ipv4Net>,
}

impl Interface {
    pub fn new(name: String, role: InterfaceRole, address: Ipv4Net) -> Self {
        Self {
            name,
            role,
            addresses: vec![address],
        }
    }

    /// The first (primary) address bound to this interface
    pub fn primary_address(&self) -> Option<Ipv4Net> {
        self.addresses.first().copied()
    }
}

/// A node of the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub capabilities: BTreeSet<Capability>,
    /// Next hop for the default route (hosts only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_route: Option<Ipv4Addr>,
    /// Physical host interface the runtime bridges into this switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridged_interface: Option<String>,
}

impl Node {
    pub fn switch(name: String) -> Self {
        Self::with_kind(name, NodeKind::Switch)
    }

    pub fn gateway(name: String) -> Self {
        Self::with_kind(name, NodeKind::Gateway)
    }

    pub fn host(name: String) -> Self {
        Self::with_kind(name, NodeKind::Host)
    }

    fn with_kind(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            interfaces: Vec::new(),
            capabilities: BTreeSet::new(),
            default_route: None,
            bridged_interface: None,
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|intf| intf.name == name)
    }

    /// First interface carrying the given role
    pub fn interface_by_role(&self, role: InterfaceRole) -> Option<&Interface> {
        self.interfaces.iter().find(|intf| intf.role == role)
    }

    /// All addresses bound on this node, in interface order
    pub fn addresses(&self) -> impl Iterator<Item = &Ipv4Net> {
        self.interfaces.iter().flat_map(|intf| intf.addresses.iter())
    }
}

/// A link from a switch to one of its children.
///
/// `address` is the binding applied to the child's interface when the link
/// is created, mirroring how the runtime configures the child side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub switch: String,
    pub child: String,
    pub child_interface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Ipv4Net>,
}

/// Parameters a topology was built from, echoed into the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyParams {
    pub switches: u32,
    pub gateways: u32,
    pub host_subnets: u32,
    pub hosts_per_subnet: u32,
}

impl TopologyParams {
    pub fn new(switches: u32, gateways: u32, host_subnets: u32, hosts_per_subnet: u32) -> Self {
        Self {
            switches,
            gateways,
            host_subnets,
            hosts_per_subnet,
        }
    }

    /// Number of nodes a build with these parameters produces
    pub fn expected_node_count(&self) -> u64 {
        let s = self.switches as u64;
        let sg = s * self.gateways as u64;
        s + 2 * sg + sg * self.host_subnets as u64 * self.hosts_per_subnet as u64
    }

    /// Number of links a build with these parameters produces
    pub fn expected_link_count(&self) -> u64 {
        let sg = self.switches as u64 * self.gateways as u64;
        2 * sg + sg * self.host_subnets as u64 * self.hosts_per_subnet as u64
    }
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self::new(1, 1, 1, 1)
    }
}

/// The complete node/link graph produced by one build call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub params: TopologyParams,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Topology {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    pub fn gateways(&self) -> impl Iterator<Item = &Node> {
        self.nodes_of_kind(NodeKind::Gateway)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Node> {
        self.nodes_of_kind(NodeKind::Host)
    }

    /// Links whose switch side is the named node
    pub fn links_from<'a>(&'a self, switch: &'a str) -> impl Iterator<Item = &'a Link> {
        self.links.iter().filter(move |link| link.switch == switch)
    }
}
