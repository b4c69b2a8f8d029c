//! Node and interface naming.
//!
//! One formatting function per node kind. Names are built from 1-based
//! hierarchy indices; each kind uses a distinct token sequence so no two
//! (kind, indices) tuples can produce the same string:
//!
//! ```text
//! s{sw}                    top-level switch
//! s{sw}_r{gw}              gateway
//! s{sw}_r{gw}_s1           gateway local switch
//! s{sw}_r{gw}_h{h}         host on the first subnet
//! s{sw}_r{gw}_n{n}_h{h}    host on subnet n > 1
//! {node}_eth{port}         interface
//! ```
//!
//! Range checks against topology limits happen in the builder; here an index
//! is only rejected when the scheme cannot represent it.

use crate::error::{Result, TopologyError};

/// Largest index the naming scheme can represent
pub const MAX_NAME_INDEX: u32 = u16::MAX as u32;

/// Interface port of a gateway facing its upstream switch
pub const GATEWAY_WAN_PORT: u32 = 0;
/// Interface port of a gateway facing its local host switch
pub const GATEWAY_LAN_PORT: u32 = 1;
/// Interface port of a host
pub const HOST_PORT: u32 = 0;

fn check_index(what: &str, index: u32) -> Result<u32> {
    if index == 0 || index > MAX_NAME_INDEX {
        return Err(TopologyError::Format(format!(
            "{} index {} outside representable range 1..={}",
            what, index, MAX_NAME_INDEX
        )));
    }
    Ok(index)
}

/// Name of a top-level switch
pub fn switch_name(switch: u32) -> Result<String> {
    Ok(format!("s{}", check_index("switch", switch)?))
}

/// Name of a gateway attached to a top-level switch
pub fn gateway_name(switch: u32, gateway: u32) -> Result<String> {
    Ok(format!(
        "{}_r{}",
        switch_name(switch)?,
        check_index("gateway", gateway)?
    ))
}

/// Name of the local distribution switch behind a gateway
pub fn local_switch_name(switch: u32, gateway: u32) -> Result<String> {
    Ok(format!("{}_s1", gateway_name(switch, gateway)?))
}

/// Name of a host.
///
/// Hosts on the first subnet keep the short form so single-subnet
/// topologies match the established naming.
pub fn host_name(switch: u32, gateway: u32, subnet: u32, host: u32) -> Result<String> {
    let gateway = gateway_name(switch, gateway)?;
    let subnet = check_index("subnet", subnet)?;
    let host = check_index("host", host)?;
    if subnet == 1 {
        Ok(format!("{}_h{}", gateway, host))
    } else {
        Ok(format!("{}_n{}_h{}", gateway, subnet, host))
    }
}

/// Name of an interface on a node
pub fn interface_name(node_name: &str, port: u32) -> Result<String> {
    if node_name.is_empty() {
        return Err(TopologyError::Format(
            "interface requested on a node without a name".to_string(),
        ));
    }
    if port > MAX_NAME_INDEX {
        return Err(TopologyError::Format(format!(
            "port {} outside representable range 0..={}",
            port, MAX_NAME_INDEX
        )));
    }
    Ok(format!("{}_eth{}", node_name, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_match_scheme() {
        assert_eq!(switch_name(1).unwrap(), "s1");
        assert_eq!(gateway_name(2, 3).unwrap(), "s2_r3");
        assert_eq!(local_switch_name(2, 3).unwrap(), "s2_r3_s1");
        assert_eq!(host_name(2, 3, 1, 4).unwrap(), "s2_r3_h4");
        assert_eq!(host_name(2, 3, 2, 4).unwrap(), "s2_r3_n2_h4");
        assert_eq!(interface_name("s2_r3", GATEWAY_LAN_PORT).unwrap(), "s2_r3_eth1");
    }

    #[test]
    fn test_names_are_injective_across_kinds() {
        let mut seen = HashSet::new();
        for sw in 1..=12 {
            assert!(seen.insert(switch_name(sw).unwrap()));
            for gw in 1..=12 {
                assert!(seen.insert(gateway_name(sw, gw).unwrap()));
                assert!(seen.insert(local_switch_name(sw, gw).unwrap()));
                for subnet in 1..=3 {
                    for h in 1..=12 {
                        let name = host_name(sw, gw, subnet, h).unwrap();
                        assert!(seen.insert(name.clone()), "duplicate name {}", name);
                    }
                }
            }
        }
    }

    #[test]
    fn test_interface_names_unique_within_node() {
        let node = gateway_name(1, 1).unwrap();
        let wan = interface_name(&node, GATEWAY_WAN_PORT).unwrap();
        let lan = interface_name(&node, GATEWAY_LAN_PORT).unwrap();
        assert_ne!(wan, lan);
    }

    #[test]
    fn test_unrepresentable_index_is_format_error() {
        assert!(switch_name(0).unwrap_err().is_format());
        assert!(gateway_name(1, MAX_NAME_INDEX + 1).unwrap_err().is_format());
        assert!(host_name(1, 1, 0, 1).unwrap_err().is_format());
        assert!(interface_name("", 0).unwrap_err().is_format());
        assert!(switch_name(MAX_NAME_INDEX).is_ok());
    }
}
