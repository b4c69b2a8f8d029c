use crate::error::TopologyError;
use crate::ip::allocator::MAX_HOSTS_PER_SUBNET;
use crate::topology::{TopologyParams, MAX_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Topology generation configuration.
///
/// Every field is optional in YAML; unset counts fall back to 1, except
/// `switches`, which defaults to the number of bridged interfaces when any
/// are listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switches: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateways: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_subnets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts_per_subnet: Option<u32>,
    /// Physical interfaces; interface i is bridged into switch `s{i}`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Allow more than one host subnet per gateway
    #[serde(default)]
    pub multi_subnet: bool,
    /// Give every gateway the NAT capability
    #[serde(default)]
    pub gateway_nat: bool,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid count '{field}': {reason}")]
    InvalidCount { field: &'static str, reason: String },
    #[error("Invalid interface configuration: {0}")]
    InvalidInterfaces(String),
    #[error("Unsupported configuration: {0}")]
    Unsupported(String),
}

impl From<ValidationError> for TopologyError {
    fn from(err: ValidationError) -> Self {
        let name = match &err {
            ValidationError::InvalidCount { field, .. } => *field,
            ValidationError::InvalidInterfaces(_) => "interfaces",
            ValidationError::Unsupported(_) => "host_subnets",
        };
        TopologyError::Parameter {
            name,
            reason: err.to_string(),
        }
    }
}

impl Config {
    pub fn switches(&self) -> u32 {
        match self.switches {
            Some(count) => count,
            None if !self.interfaces.is_empty() => self.interfaces.len() as u32,
            None => 1,
        }
    }

    pub fn gateways(&self) -> u32 {
        self.gateways.unwrap_or(1)
    }

    pub fn host_subnets(&self) -> u32 {
        self.host_subnets.unwrap_or(1)
    }

    pub fn hosts_per_subnet(&self) -> u32 {
        self.hosts_per_subnet.unwrap_or(1)
    }

    /// Resolved build parameters
    pub fn params(&self) -> TopologyParams {
        TopologyParams::new(
            self.switches(),
            self.gateways(),
            self.host_subnets(),
            self.hosts_per_subnet(),
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        Self::validate_count("switches", self.switches(), MAX_COUNT)?;
        Self::validate_count("gateways", self.gateways(), MAX_COUNT)?;
        Self::validate_count("host_subnets", self.host_subnets(), MAX_COUNT)?;
        Self::validate_count("hosts_per_subnet", self.hosts_per_subnet(), MAX_HOSTS_PER_SUBNET)?;

        if self.host_subnets() > 1 && !self.multi_subnet {
            return Err(ValidationError::Unsupported(format!(
                "{} host subnets per gateway requested; set multi_subnet to enable more than one",
                self.host_subnets()
            )));
        }

        if self.interfaces.len() > self.switches() as usize {
            return Err(ValidationError::InvalidInterfaces(format!(
                "{} interfaces listed for {} switches",
                self.interfaces.len(),
                self.switches()
            )));
        }
        let mut seen = HashSet::new();
        for intf in &self.interfaces {
            if intf.trim().is_empty() {
                return Err(ValidationError::InvalidInterfaces(
                    "interface name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(intf) {
                return Err(ValidationError::InvalidInterfaces(format!(
                    "interface '{}' listed more than once",
                    intf
                )));
            }
        }

        Ok(())
    }

    fn validate_count(field: &'static str, value: u32, max: u32) -> Result<(), ValidationError> {
        if value == 0 || value > max {
            return Err(ValidationError::InvalidCount {
                field,
                reason: format!("must be between 1 and {}, got {}", max, value),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.params(), TopologyParams::new(1, 1, 1, 1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_switches_follow_interfaces() {
        let config = Config {
            interfaces: vec!["eth1".to_string(), "eth2".to_string()],
            ..Default::default()
        };
        assert_eq!(config.switches(), 2);

        let config = Config {
            switches: Some(3),
            interfaces: vec!["eth1".to_string()],
            ..Default::default()
        };
        assert_eq!(config.switches(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_counts() {
        let config = Config {
            switches: Some(255),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCount { field: "switches", .. })
        ));

        let config = Config {
            hosts_per_subnet: Some(254),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCount { field: "hosts_per_subnet", .. })
        ));
    }

    #[test]
    fn test_multi_subnet_requires_opt_in() {
        let mut config = Config {
            host_subnets: Some(2),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::Unsupported(_))));
        let err: TopologyError = config.validate().unwrap_err().into();
        assert!(matches!(err, TopologyError::Parameter { name: "host_subnets", .. }));

        config.multi_subnet = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_interface_errors() {
        let config = Config {
            switches: Some(1),
            interfaces: vec!["eth1".to_string(), "eth2".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidInterfaces(_))));

        let config = Config {
            interfaces: vec!["eth1".to_string(), "eth1".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidInterfaces(_))));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
gateways: 2
hosts_per_subnet: 3
interfaces: [eth1, eth2]
gateway_nat: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.params(), TopologyParams::new(2, 2, 1, 3));
        assert!(config.gateway_nat);
        assert!(!config.multi_subnet);

        assert!(serde_yaml::from_str::<Config>("routers: 2").is_err());
    }
}
