use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;
    debug!("Parsed configuration: {:?}", config);

    config.validate()?;

    Ok(config)
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub switches: Option<u32>,
    pub gateways: Option<u32>,
    pub host_subnets: Option<u32>,
    pub hosts_per_subnet: Option<u32>,
    pub interfaces: Vec<String>,
    pub multi_subnet: bool,
    pub gateway_nat: bool,
}

/// Apply CLI overrides to a configuration and re-validate it
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(switches) = overrides.switches {
        info!("Overriding switches: {}", switches);
        config.switches = Some(switches);
    }
    if let Some(gateways) = overrides.gateways {
        info!("Overriding gateways: {}", gateways);
        config.gateways = Some(gateways);
    }
    if let Some(subnets) = overrides.host_subnets {
        info!("Overriding host subnets: {}", subnets);
        config.host_subnets = Some(subnets);
    }
    if let Some(hosts) = overrides.hosts_per_subnet {
        info!("Overriding hosts per subnet: {}", hosts);
        config.hosts_per_subnet = Some(hosts);
    }
    if !overrides.interfaces.is_empty() {
        info!("Overriding bridged interfaces: {:?}", overrides.interfaces);
        config.interfaces = overrides.interfaces.clone();
    }
    // flags can only switch a capability on
    config.multi_subnet |= overrides.multi_subnet;
    config.gateway_nat |= overrides.gateway_nat;

    config.validate()?;

    Ok(())
}
