//! # ipsectopo - Topology generator for IPsec gateway test networks
//!
//! This library computes reproducible, multi-level virtual network
//! topologies for testing IPsec gateways: a tree of switches, gateways and
//! end hosts, each with a deterministic name and a non-overlapping address
//! derived from its position in the hierarchy.
//!
//! ## Overview
//!
//! Given four cardinalities (top-level switches, gateways per switch, host
//! subnets per gateway, hosts per subnet) the builder emits a structural
//! description of nodes and links. Starting the emulated network, bridging
//! physical interfaces, bringing up tunnels and running traffic are the
//! job of an external emulation runtime that consumes this description.
//!
//! ```text
//!                 s1 (bridged to eth1)
//!          +-------+--------+
//!        s1_r1            s1_r2          10.1.0.1/16, 10.2.0.1/16
//!          |                |
//!       s1_r1_s1         s1_r2_s1
//!       /      \         /      \
//!  s1_r1_h1  s1_r1_h2  s1_r2_h1  s1_r2_h2  10.1.1.2/24 ... 10.2.1.3/24
//! ```
//!
//! ## Architecture
//!
//! - `topology`: node/link model, naming scheme, gateway role binding and the builder
//! - `ip`: hierarchical address allocation and the address registry
//! - `config` / `config_loader`: YAML configuration and CLI overrides
//! - `utils`: consistency checks on built topologies
//! - `orchestrator`: build, validate and write the topology description
//!
//! ## Example Usage
//!
//! ```rust
//! use ipsectopo::topology::{build, NodeKind};
//!
//! let topology = build(1, 2, 1, 2)?;
//! assert_eq!(topology.gateways().count(), 2);
//! assert_eq!(topology.nodes_of_kind(NodeKind::Host).count(), 4);
//! # Ok::<(), ipsectopo::error::TopologyError>(())
//! ```
//!
//! ## Error Handling
//!
//! The core returns [`error::TopologyError`]; the orchestrator and binary
//! wrap failures in `color_eyre` reports with context.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod ip;
pub mod orchestrator;
pub mod topology;
pub mod utils;
