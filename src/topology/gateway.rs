//! Gateway role binding.
//!
//! A gateway is a plain [`Node`] plus capabilities. Binding the role
//! enables forwarding; further capabilities (tunnel endpoint, NAT) are
//! attached through [`RoleExtension`] implementations supplied by whoever
//! configures the tunnels. The runtime toggles forwarding around the node's
//! start/stop with [`enable_forwarding`] and [`disable_forwarding`].

use super::types::{Capability, Node, NodeKind};
use log::debug;

/// Hook for collaborators that attach extra capabilities to a gateway
pub trait RoleExtension {
    /// Called once per gateway after forwarding has been enabled
    fn extend(&self, node: &mut Node);
}

/// Marks a gateway as an IPsec tunnel endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct TunnelEndpoint;

impl RoleExtension for TunnelEndpoint {
    fn extend(&self, node: &mut Node) {
        node.capabilities.insert(Capability::TunnelEndpoint);
    }
}

/// Masquerades the gateway's host subnets behind its WAN address
#[derive(Debug, Clone, Copy, Default)]
pub struct Nat;

impl RoleExtension for Nat {
    fn extend(&self, node: &mut Node) {
        node.capabilities.insert(Capability::Nat);
    }
}

/// Attach the gateway role to `node`.
///
/// Idempotent. Nodes that are not gateways are returned unchanged.
pub fn bind_gateway_role(node: Node) -> Node {
    bind_gateway_role_with(node, &[])
}

/// Attach the gateway role and run every extension on the node
pub fn bind_gateway_role_with(mut node: Node, extensions: &[&dyn RoleExtension]) -> Node {
    if node.kind != NodeKind::Gateway {
        debug!("Skipping gateway role for {:?} node {}", node.kind, node.name);
        return node;
    }
    enable_forwarding(&mut node);
    for extension in extensions {
        extension.extend(&mut node);
    }
    debug!("Bound gateway role to {}: {:?}", node.name, node.capabilities);
    node
}

/// Turn forwarding on. Only gateways forward; other nodes are left as they are.
pub fn enable_forwarding(node: &mut Node) {
    if node.kind != NodeKind::Gateway {
        debug!("Not enabling forwarding on {:?} node {}", node.kind, node.name);
        return;
    }
    node.capabilities.insert(Capability::ForwardingEnabled);
}

pub fn disable_forwarding(node: &mut Node) {
    if node.kind != NodeKind::Gateway {
        debug!("Not disabling forwarding on {:?} node {}", node.kind, node.name);
        return;
    }
    node.capabilities.remove(&Capability::ForwardingEnabled);
}
