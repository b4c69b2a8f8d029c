//! Topology generation orchestrator.
//!
//! Coordinates the flow from a validated configuration through building and
//! checking the topology to writing its structural description for the
//! emulation runtime.

use crate::config::Config;
use crate::error::TopologyError;
use crate::topology::gateway::Nat;
use crate::topology::{InterfaceRole, NodeKind, Topology, TopologyBuilder};
use crate::utils::validation::validate_topology;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use ipnet::Ipv4Net;
use log::info;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Serialization format of the topology description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// Pick the format from a file extension; anything but `.yaml`/`.yml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }
}

/// Build and validate the topology described by `config`
pub fn build_topology(config: &Config) -> Result<Topology> {
    config.validate().map_err(TopologyError::from)?;

    let mut builder = TopologyBuilder::new(config.params())
        .bridge_interfaces(config.interfaces.clone())
        .multi_subnet(config.multi_subnet);
    if config.gateway_nat {
        builder = builder.extension(&Nat);
    }
    let topology = builder.build()?;

    validate_topology(&topology).map_err(|e| eyre!("Topology validation failed: {}", e))?;
    Ok(topology)
}

/// Serialize a topology in the given format
pub fn serialize_topology(topology: &Topology, format: OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(topology)
                .wrap_err("Failed to serialize topology to JSON")?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(topology).wrap_err("Failed to serialize topology to YAML")?
        }
    };
    Ok(content)
}

/// Write a topology to `output_path`, creating parent directories as needed
pub fn write_topology(topology: &Topology, output_path: &Path) -> Result<()> {
    let format = OutputFormat::from_path(output_path);
    let content = serialize_topology(topology, format)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create output directory '{}'", parent.display())
            })?;
        }
    }
    fs::write(output_path, content)
        .wrap_err_with(|| format!("Failed to write topology to '{}'", output_path.display()))?;

    info!("Wrote {:?} topology description to {:?}", format, output_path);
    Ok(())
}

/// Build, validate and write the topology described by `config`
pub fn generate_topology(config: &Config, output_path: &Path) -> Result<Topology> {
    let topology = build_topology(config)?;
    write_topology(&topology, output_path)?;
    Ok(topology)
}

/// Human readable address plan: one line per gateway, then totals
pub fn summarize(topology: &Topology) -> String {
    let mut out = String::new();
    for gateway in topology.gateways() {
        let wan = gateway
            .interface_by_role(InterfaceRole::Wan)
            .and_then(|intf| intf.primary_address())
            .map_or_else(|| "-".to_string(), |net| net.to_string());
        let lans: Vec<Ipv4Net> = gateway
            .interface_by_role(InterfaceRole::Lan)
            .map(|intf| intf.addresses.clone())
            .unwrap_or_default();
        let hosts = topology
            .hosts()
            .filter(|host| {
                host.default_route
                    .map_or(false, |route| lans.iter().any(|lan| lan.addr() == route))
            })
            .count();
        let lans: Vec<String> = lans.iter().map(|net| net.to_string()).collect();
        let _ = writeln!(
            out,
            "{:<12} wan {:<16} lan {:<32} hosts {}",
            gateway.name,
            wan,
            lans.join(","),
            hosts
        );
    }
    let _ = writeln!(
        out,
        "{} switches, {} gateways, {} hosts, {} links",
        topology.nodes_of_kind(NodeKind::Switch).count(),
        topology.gateways().count(),
        topology.hosts().count(),
        topology.links.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Capability;
    use tempfile::tempdir;

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("topo.yaml")), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_path(Path::new("topo.yml")), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_path(Path::new("topo.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("topo")), OutputFormat::Json);
    }

    #[test]
    fn test_nat_capability_from_config() {
        let config = Config {
            gateways: Some(2),
            gateway_nat: true,
            ..Default::default()
        };
        let topology = build_topology(&config).unwrap();
        assert!(topology.gateways().all(|g| g.has_capability(Capability::Nat)));
        assert!(topology
            .gateways()
            .all(|g| g.has_capability(Capability::ForwardingEnabled)));
    }

    #[test]
    fn test_generate_writes_json_and_yaml() {
        let dir = tempdir().unwrap();
        let config = Config {
            gateways: Some(2),
            hosts_per_subnet: Some(2),
            ..Default::default()
        };

        let json_path = dir.path().join("out/topology.json");
        let topology = generate_topology(&config, &json_path).unwrap();
        let parsed: Topology =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed, topology);

        let yaml_path = dir.path().join("topology.yaml");
        generate_topology(&config, &yaml_path).unwrap();
        let parsed: Topology =
            serde_yaml::from_str(&fs::read_to_string(&yaml_path).unwrap()).unwrap();
        assert_eq!(parsed, topology);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            host_subnets: Some(2),
            ..Default::default()
        };
        let err = build_topology(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TopologyError>(),
            Some(TopologyError::Parameter { name: "host_subnets", .. })
        ));
    }

    #[test]
    fn test_multi_subnet_config_reaches_builder() {
        let config = Config {
            host_subnets: Some(2),
            hosts_per_subnet: Some(2),
            multi_subnet: true,
            ..Default::default()
        };
        let topology = build_topology(&config).unwrap();
        assert_eq!(topology.hosts().count(), 4);
        assert!(topology.node("s1_r1_n2_h2").is_some());
    }

    #[test]
    fn test_summary() {
        let topology = build_topology(&Config {
            gateways: Some(2),
            hosts_per_subnet: Some(2),
            ..Default::default()
        })
        .unwrap();
        let summary = summarize(&topology);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("s1_r1"));
        assert!(lines[0].contains("10.1.0.1/16"));
        assert!(lines[0].contains("10.1.1.1/24"));
        assert!(lines[0].ends_with("hosts 2"));
        assert_eq!(lines[2], "3 switches, 2 gateways, 4 hosts, 8 links");
    }
}
