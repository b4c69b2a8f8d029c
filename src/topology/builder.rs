//! Topology construction.
//!
//! Walks switches, then gateways per switch, then hosts per subnet, naming
//! and addressing every node from its indices. The walk order fixes the
//! order of nodes and links in the output, so two builds with the same
//! parameters serialize identically.

use super::gateway::{bind_gateway_role_with, RoleExtension};
use super::naming::{self, GATEWAY_LAN_PORT, GATEWAY_WAN_PORT, HOST_PORT};
use super::types::{Interface, InterfaceRole, Link, Node, Topology, TopologyParams};
use crate::error::{Result, TopologyError};
use crate::ip::allocator::{self, AddressPosition, AddressRole};
use ipnet::Ipv4Net;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::net::Ipv4Addr;

/// Upper bound shared by all four cardinalities
pub const MAX_COUNT: u32 = 254;

/// Nodes and links collected during one build
#[derive(Debug, Default)]
struct BuildState {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

/// Builds a [`Topology`] from cardinality parameters
pub struct TopologyBuilder<'a> {
    params: TopologyParams,
    bridged_interfaces: Vec<String>,
    extensions: Vec<&'a dyn RoleExtension>,
    multi_subnet: bool,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(params: TopologyParams) -> Self {
        Self {
            params,
            bridged_interfaces: Vec::new(),
            extensions: Vec::new(),
            multi_subnet: false,
        }
    }

    /// Physical interfaces to bridge into the top-level switches, in switch order
    pub fn bridge_interfaces(mut self, interfaces: Vec<String>) -> Self {
        self.bridged_interfaces = interfaces;
        self
    }

    /// Extra gateway capabilities attached when the gateway role is bound
    pub fn extension(mut self, extension: &'a dyn RoleExtension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Allow more than one host subnet per gateway
    pub fn multi_subnet(mut self, enabled: bool) -> Self {
        self.multi_subnet = enabled;
        self
    }

    /// Validate parameters without building anything
    pub fn validate(&self) -> Result<()> {
        let p = &self.params;
        check_count("switches", p.switches)?;
        check_count("gateways", p.gateways)?;
        check_count("host_subnets", p.host_subnets)?;
        check_count("hosts_per_subnet", p.hosts_per_subnet)?;
        self.validate_bridged_interfaces()?;
        allocator::check_capacity(p.switches, p.gateways, p.host_subnets, p.hosts_per_subnet)?;
        if p.host_subnets > 1 {
            self.validate_multi_subnet()?;
        }
        Ok(())
    }

    fn validate_bridged_interfaces(&self) -> Result<()> {
        if self.bridged_interfaces.len() > self.params.switches as usize {
            return Err(TopologyError::parameter(
                "interfaces",
                format!(
                    "{} interfaces given but only {} switches to bridge them into",
                    self.bridged_interfaces.len(),
                    self.params.switches
                ),
            ));
        }
        let mut seen = HashSet::new();
        for intf in &self.bridged_interfaces {
            if intf.trim().is_empty() {
                return Err(TopologyError::parameter(
                    "interfaces",
                    "interface name cannot be empty",
                ));
            }
            if !seen.insert(intf.as_str()) {
                return Err(TopologyError::parameter(
                    "interfaces",
                    format!("interface '{}' listed more than once", intf),
                ));
            }
        }
        Ok(())
    }

    /// Checks for the degraded multi-subnet layout.
    ///
    /// All subnets of a gateway share its single local switch and LAN
    /// interface; each extra subnet only adds a secondary LAN address.
    fn validate_multi_subnet(&self) -> Result<()> {
        if !self.multi_subnet {
            return Err(TopologyError::parameter(
                "host_subnets",
                format!(
                    "{} host subnets per gateway need the multi-subnet layout enabled",
                    self.params.host_subnets
                ),
            ));
        }
        warn!(
            "Building {} host subnets per gateway: all share one local switch and LAN interface",
            self.params.host_subnets
        );
        Ok(())
    }

    /// Build the topology. Either the complete topology or an error is returned.
    pub fn build(&self) -> Result<Topology> {
        self.validate()?;

        let p = &self.params;
        info!(
            "Switches: {}, Gateways: {}, Host subnets: {}, Hosts per subnet: {}",
            p.switches, p.gateways, p.host_subnets, p.hosts_per_subnet
        );

        let mut state = BuildState {
            nodes: Vec::with_capacity(p.expected_node_count() as usize),
            links: Vec::with_capacity(p.expected_link_count() as usize),
        };
        for sw in 1..=p.switches {
            self.add_switch(&mut state, sw)?;
        }

        info!(
            "Built topology with {} nodes and {} links",
            state.nodes.len(),
            state.links.len()
        );
        Ok(Topology {
            params: self.params,
            nodes: state.nodes,
            links: state.links,
        })
    }

    fn add_switch(&self, state: &mut BuildState, sw: u32) -> Result<()> {
        let name = naming::switch_name(sw)?;
        info!("Adding switch: {}", name);

        let mut switch = Node::switch(name.clone());
        switch.bridged_interface = self.bridged_interfaces.get(sw as usize - 1).cloned();
        if let Some(intf) = &switch.bridged_interface {
            info!("Switch {} bridges physical interface {}", name, intf);
        }
        state.nodes.push(switch);

        for gw in 1..=self.params.gateways {
            self.add_gateway(state, sw, &name, gw)?;
        }
        Ok(())
    }

    fn add_gateway(
        &self,
        state: &mut BuildState,
        sw: u32,
        wan_switch: &str,
        gw: u32,
    ) -> Result<()> {
        let ordinal = allocator::gateway_ordinal(sw, self.params.gateways, gw)?;
        let name = naming::gateway_name(sw, gw)?;
        info!("Adding gateway: {}", name);

        let wan_intf = naming::interface_name(&name, GATEWAY_WAN_PORT)?;
        let lan_intf = naming::interface_name(&name, GATEWAY_LAN_PORT)?;

        let wan_addr =
            allocator::allocate(AddressRole::WanGateway, AddressPosition::gateway(ordinal))?;
        let lan_addrs = (1..=self.params.host_subnets)
            .map(|subnet| {
                allocator::allocate(
                    AddressRole::LanGateway,
                    AddressPosition::subnet(ordinal, subnet),
                )
            })
            .collect::<Result<Vec<Ipv4Net>>>()?;
        let primary_lan = *lan_addrs.first().ok_or_else(|| {
            TopologyError::AddressRange(format!("gateway {} has no LAN address", name))
        })?;

        let mut gateway = Node::gateway(name.clone());
        gateway
            .interfaces
            .push(Interface::new(wan_intf.clone(), InterfaceRole::Wan, wan_addr));
        gateway.interfaces.push(Interface {
            name: lan_intf.clone(),
            role: InterfaceRole::Lan,
            addresses: lan_addrs.clone(),
        });
        state.nodes.push(bind_gateway_role_with(gateway, &self.extensions));

        info!(
            "Add link between gateway WAN ({}, {}) and switch {}",
            name, wan_addr, wan_switch
        );
        state.links.push(Link {
            switch: wan_switch.to_string(),
            child: name.clone(),
            child_interface: wan_intf,
            address: Some(wan_addr),
        });

        let local_switch = naming::local_switch_name(sw, gw)?;
        info!("Adding switch: {}", local_switch);
        state.nodes.push(Node::switch(local_switch.clone()));

        info!(
            "Add link between gateway LAN ({}, {}) and switch {}",
            name, primary_lan, local_switch
        );
        state.links.push(Link {
            switch: local_switch.clone(),
            child: name,
            child_interface: lan_intf,
            address: Some(primary_lan),
        });

        for (subnet, lan_addr) in (1..).zip(&lan_addrs) {
            self.add_hosts(state, sw, gw, ordinal, subnet, &local_switch, lan_addr.addr())?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn add_hosts(
        &self,
        state: &mut BuildState,
        sw: u32,
        gw: u32,
        ordinal: u32,
        subnet: u32,
        local_switch: &str,
        gateway_lan: Ipv4Addr,
    ) -> Result<()> {
        for h in 1..=self.params.hosts_per_subnet {
            let name = naming::host_name(sw, gw, subnet, h)?;
            let intf = naming::interface_name(&name, HOST_PORT)?;
            let addr = allocator::allocate(
                AddressRole::LanHost,
                AddressPosition::host(ordinal, subnet, h),
            )?;
            debug!(
                "Host: {}, interface: {}, LAN IP: {}, default route via {}",
                name, intf, addr, gateway_lan
            );

            let mut host = Node::host(name.clone());
            host.interfaces
                .push(Interface::new(intf.clone(), InterfaceRole::Host, addr));
            host.default_route = Some(gateway_lan);
            state.nodes.push(host);

            state.links.push(Link {
                switch: local_switch.to_string(),
                child: name,
                child_interface: intf,
                address: None,
            });
        }
        Ok(())
    }
}

fn check_count(name: &'static str, value: u32) -> Result<()> {
    if value == 0 || value > MAX_COUNT {
        return Err(TopologyError::parameter(
            name,
            format!("must be between 1 and {}, got {}", MAX_COUNT, value),
        ));
    }
    Ok(())
}

/// Build a topology with default options (one host subnet per gateway)
pub fn build(
    switches: u32,
    gateways: u32,
    host_subnets: u32,
    hosts_per_subnet: u32,
) -> Result<Topology> {
    let params = TopologyParams::new(switches, gateways, host_subnets, hosts_per_subnet);
    TopologyBuilder::new(params).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::gateway::TunnelEndpoint;
    use crate::topology::types::{Capability, NodeKind};

    #[test]
    fn test_single_gateway_layout() {
        let topo = build(1, 1, 1, 1).unwrap();
        let names: Vec<&str> = topo.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["s1", "s1_r1", "s1_r1_s1", "s1_r1_h1"]);

        let gateway = topo.node("s1_r1").unwrap();
        assert_eq!(gateway.kind, NodeKind::Gateway);
        assert!(gateway.has_capability(Capability::ForwardingEnabled));
        assert_eq!(
            gateway.interface("s1_r1_eth0").unwrap().addresses,
            vec!["10.1.0.1/16".parse::<Ipv4Net>().unwrap()]
        );
        assert_eq!(
            gateway.interface("s1_r1_eth1").unwrap().addresses,
            vec!["10.1.1.1/24".parse::<Ipv4Net>().unwrap()]
        );

        let host = topo.node("s1_r1_h1").unwrap();
        assert_eq!(host.default_route, Some(Ipv4Addr::new(10, 1, 1, 1)));
        assert_eq!(
            host.interface("s1_r1_h1_eth0").unwrap().primary_address(),
            Some("10.1.1.2/24".parse().unwrap())
        );
    }

    #[test]
    fn test_link_order_and_bindings() {
        let topo = build(1, 1, 1, 1).unwrap();
        assert_eq!(topo.links.len(), 3);
        assert_eq!(topo.links[0].switch, "s1");
        assert_eq!(topo.links[0].child, "s1_r1");
        assert_eq!(topo.links[0].child_interface, "s1_r1_eth0");
        assert_eq!(topo.links[0].address, Some("10.1.0.1/16".parse().unwrap()));
        assert_eq!(topo.links[1].switch, "s1_r1_s1");
        assert_eq!(topo.links[1].child_interface, "s1_r1_eth1");
        assert_eq!(topo.links[1].address, Some("10.1.1.1/24".parse().unwrap()));
        assert_eq!(topo.links[2].switch, "s1_r1_s1");
        assert_eq!(topo.links[2].child, "s1_r1_h1");
        assert_eq!(topo.links[2].address, None);
    }

    #[test]
    fn test_gateway_ordinal_spans_switches() {
        let topo = build(2, 2, 1, 1).unwrap();
        let wan = |name: &str| {
            topo.node(name)
                .and_then(|n| n.interface_by_role(InterfaceRole::Wan))
                .and_then(Interface::primary_address)
                .unwrap()
        };
        assert_eq!(wan("s1_r1"), "10.1.0.1/16".parse().unwrap());
        assert_eq!(wan("s1_r2"), "10.2.0.1/16".parse().unwrap());
        assert_eq!(wan("s2_r1"), "10.3.0.1/16".parse().unwrap());
        assert_eq!(wan("s2_r2"), "10.4.0.1/16".parse().unwrap());
    }

    #[test]
    fn test_parameter_errors() {
        assert!(build(0, 1, 1, 1).unwrap_err().is_parameter());
        assert!(build(255, 1, 1, 1).unwrap_err().is_parameter());
        assert!(build(1, 10_000, 1, 1).unwrap_err().is_parameter());
        assert!(build(1, 1, 0, 1).unwrap_err().is_parameter());
        assert!(build(1, 1, 1, 0).unwrap_err().is_parameter());
        assert!(build(1, 1, 1, 255).unwrap_err().is_parameter());
    }

    #[test]
    fn test_address_range_errors() {
        assert!(build(1, 1, 1, 254).unwrap_err().is_address_range());
        assert!(build(2, 200, 1, 1).unwrap_err().is_address_range());
    }

    #[test]
    fn test_multi_subnet_requires_opt_in() {
        let err = build(1, 1, 2, 1).unwrap_err();
        assert!(matches!(err, TopologyError::Parameter { name: "host_subnets", .. }));

        let err = TopologyBuilder::new(TopologyParams::new(1, 1, 254, 1))
            .build()
            .unwrap_err();
        assert!(err.is_parameter());

        let topo = TopologyBuilder::new(TopologyParams::new(1, 1, 254, 1))
            .multi_subnet(true)
            .build()
            .unwrap();
        assert_eq!(topo.hosts().count(), 254);
    }

    #[test]
    fn test_multi_subnet_layout() {
        let topo = TopologyBuilder::new(TopologyParams::new(1, 1, 2, 1))
            .multi_subnet(true)
            .build()
            .unwrap();
        let names: Vec<&str> = topo.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["s1", "s1_r1", "s1_r1_s1", "s1_r1_h1", "s1_r1_n2_h1"]);

        let lan = topo
            .node("s1_r1")
            .and_then(|n| n.interface_by_role(InterfaceRole::Lan))
            .unwrap();
        assert_eq!(
            lan.addresses,
            vec![
                "10.1.1.1/24".parse::<Ipv4Net>().unwrap(),
                "10.1.2.1/24".parse::<Ipv4Net>().unwrap()
            ]
        );
        let host = topo.node("s1_r1_n2_h1").unwrap();
        assert_eq!(host.default_route, Some(Ipv4Addr::new(10, 1, 2, 1)));
        assert_eq!(topo.links_from("s1_r1_s1").count(), 3);
    }

    #[test]
    fn test_bridged_interfaces() {
        let topo = TopologyBuilder::new(TopologyParams::new(2, 1, 1, 1))
            .bridge_interfaces(vec!["eth1".to_string()])
            .build()
            .unwrap();
        assert_eq!(topo.node("s1").unwrap().bridged_interface.as_deref(), Some("eth1"));
        assert_eq!(topo.node("s2").unwrap().bridged_interface, None);

        let err = TopologyBuilder::new(TopologyParams::new(1, 1, 1, 1))
            .bridge_interfaces(vec!["eth1".to_string(), "eth2".to_string()])
            .build()
            .unwrap_err();
        assert!(err.is_parameter());

        let err = TopologyBuilder::new(TopologyParams::new(2, 1, 1, 1))
            .bridge_interfaces(vec!["eth1".to_string(), "eth1".to_string()])
            .validate()
            .unwrap_err();
        assert!(err.is_parameter());
    }

    #[test]
    fn test_extensions_applied_to_every_gateway() {
        let topo = TopologyBuilder::new(TopologyParams::new(1, 3, 1, 1))
            .extension(&TunnelEndpoint)
            .build()
            .unwrap();
        assert_eq!(topo.gateways().count(), 3);
        assert!(topo
            .gateways()
            .all(|g| g.has_capability(Capability::TunnelEndpoint)));
        assert!(topo.hosts().all(|h| h.capabilities.is_empty()));
    }
}
