//! Hierarchical address allocation.
//!
//! The 10.0.0.0/8 block is carved up as a fixed-depth tree:
//!
//! ```text
//! 10.<gateway>.0.1/16            gateway WAN address
//! 10.<gateway>.<subnet>.1/24     gateway LAN address on a host subnet
//! 10.<gateway>.<subnet>.<h+1>/24 host h on that subnet
//! ```
//!
//! `<gateway>` is the global gateway ordinal across all top-level switches.
//! The WAN address always sits in third octet 0 and host subnets start at 1,
//! so a gateway's WAN and LAN addresses can never collide.

use crate::error::{Result, TopologyError};
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// First octet of every allocated address
pub const BASE_OCTET: u8 = 10;
/// Most gateways the plan can address (second octet 1..=254)
pub const MAX_GATEWAYS: u32 = 254;
/// Most host subnets per gateway (third octet 1..=254)
pub const MAX_SUBNETS: u32 = 254;
/// Usable hosts on a /24 after network, gateway and broadcast addresses
pub const MAX_HOSTS_PER_SUBNET: u32 = 253;

pub const WAN_PREFIX_LEN: u8 = 16;
pub const LAN_PREFIX_LEN: u8 = 24;

/// Third octet reserved for WAN addresses
const WAN_SUBNET_OCTET: u8 = 0;
/// Fourth octet of a gateway's own address on any network
const GATEWAY_HOST_OCTET: u8 = 1;
/// Host h receives fourth octet h + HOST_OFFSET
const HOST_OFFSET: u32 = 1;

/// What an address is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressRole {
    /// Gateway interface facing the upstream switch
    WanGateway,
    /// Gateway interface facing a host subnet
    LanGateway,
    /// Host interface on a gateway's subnet
    LanHost,
}

/// Position in the address hierarchy.
///
/// `gateway` is the global ordinal (see [`gateway_ordinal`]); `subnet` and
/// `host` are 1-based and ignored by roles that do not use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressPosition {
    pub gateway: u32,
    pub subnet: u32,
    pub host: u32,
}

impl AddressPosition {
    pub fn gateway(gateway: u32) -> Self {
        Self { gateway, subnet: 1, host: 1 }
    }

    pub fn subnet(gateway: u32, subnet: u32) -> Self {
        Self { gateway, subnet, host: 1 }
    }

    pub fn host(gateway: u32, subnet: u32, host: u32) -> Self {
        Self { gateway, subnet, host }
    }
}

/// Global 1-based ordinal of `gateway` under `switch`.
///
/// Gateways are numbered switch by switch, so switch 2's first gateway
/// follows switch 1's last one.
pub fn gateway_ordinal(switch: u32, gateways_per_switch: u32, gateway: u32) -> Result<u32> {
    if switch == 0 || gateway == 0 || gateway > gateways_per_switch {
        return Err(TopologyError::AddressRange(format!(
            "gateway {} of switch {} is not a valid position (gateways per switch: {})",
            gateway, switch, gateways_per_switch
        )));
    }
    let ordinal = (switch as u64 - 1) * gateways_per_switch as u64 + gateway as u64;
    if ordinal > MAX_GATEWAYS as u64 {
        return Err(TopologyError::AddressRange(format!(
            "gateway ordinal {} exceeds {} (switch {}, gateway {})",
            ordinal, MAX_GATEWAYS, switch, gateway
        )));
    }
    Ok(ordinal as u32)
}

/// Check that a whole build fits the address plan before anything is created
pub fn check_capacity(
    switches: u32,
    gateways_per_switch: u32,
    subnets: u32,
    hosts_per_subnet: u32,
) -> Result<()> {
    let total_gateways = switches as u64 * gateways_per_switch as u64;
    if total_gateways > MAX_GATEWAYS as u64 {
        return Err(TopologyError::AddressRange(format!(
            "{} switches x {} gateways = {} gateways, the address plan holds at most {}",
            switches, gateways_per_switch, total_gateways, MAX_GATEWAYS
        )));
    }
    if subnets > MAX_SUBNETS {
        return Err(TopologyError::AddressRange(format!(
            "{} host subnets per gateway, the address plan holds at most {}",
            subnets, MAX_SUBNETS
        )));
    }
    if hosts_per_subnet > MAX_HOSTS_PER_SUBNET {
        return Err(TopologyError::AddressRange(format!(
            "{} hosts per subnet, a /{} holds at most {}",
            hosts_per_subnet, LAN_PREFIX_LEN, MAX_HOSTS_PER_SUBNET
        )));
    }
    Ok(())
}

fn octet(what: &str, value: u32, max: u32) -> Result<u8> {
    if value == 0 || value > max {
        return Err(TopologyError::AddressRange(format!(
            "{} index {} outside 1..={}",
            what, value, max
        )));
    }
    Ok(value as u8)
}

/// Allocate the address for `role` at `position`
pub fn allocate(role: AddressRole, position: AddressPosition) -> Result<Ipv4Net> {
    let gateway = octet("gateway", position.gateway, MAX_GATEWAYS)?;
    let (addr, prefix_len) = match role {
        AddressRole::WanGateway => (
            Ipv4Addr::new(BASE_OCTET, gateway, WAN_SUBNET_OCTET, GATEWAY_HOST_OCTET),
            WAN_PREFIX_LEN,
        ),
        AddressRole::LanGateway => {
            let subnet = octet("subnet", position.subnet, MAX_SUBNETS)?;
            (
                Ipv4Addr::new(BASE_OCTET, gateway, subnet, GATEWAY_HOST_OCTET),
                LAN_PREFIX_LEN,
            )
        }
        AddressRole::LanHost => {
            let subnet = octet("subnet", position.subnet, MAX_SUBNETS)?;
            let host = octet("host", position.host, MAX_HOSTS_PER_SUBNET)?;
            (
                Ipv4Addr::new(BASE_OCTET, gateway, subnet, (host as u32 + HOST_OFFSET) as u8),
                LAN_PREFIX_LEN,
            )
        }
    };
    Ipv4Net::new(addr, prefix_len)
        .map_err(|e| TopologyError::AddressRange(format!("invalid prefix length: {}", e)))
}
