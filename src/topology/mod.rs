//! Network topology module.
//!
//! This module contains the node/link model, the naming scheme, gateway
//! role binding and the builder that ties them together.

pub mod builder;
pub mod gateway;
pub mod naming;
pub mod types;

// Re-export key types and functions for easier access
pub use builder::{build, TopologyBuilder, MAX_COUNT};
pub use gateway::{
    bind_gateway_role, bind_gateway_role_with, disable_forwarding, enable_forwarding,
    RoleExtension,
};
pub use types::{
    Capability, Interface, InterfaceRole, Link, Node, NodeKind, Topology, TopologyParams,
};
