//! Error types for topology generation.
//!
//! Every failure is detected synchronously during a single build pass and is
//! never retried: the computation is pure, so the same input always fails the
//! same way.

/// Errors raised while validating parameters, naming nodes or allocating
/// addresses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// A cardinality or configuration value is outside its valid range.
    #[error("Invalid parameter '{name}': {reason}")]
    Parameter { name: &'static str, reason: String },

    /// A computed octet or host offset does not fit the address plan.
    #[error("Address range exceeded: {0}")]
    AddressRange(String),

    /// The naming scheme was handed an index it cannot represent.
    #[error("Cannot format name: {0}")]
    Format(String),
}

impl TopologyError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        TopologyError::Parameter {
            name,
            reason: reason.into(),
        }
    }

    /// Returns true for [`TopologyError::Parameter`]
    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter { .. })
    }

    /// Returns true for [`TopologyError::AddressRange`]
    pub fn is_address_range(&self) -> bool {
        matches!(self, Self::AddressRange(_))
    }

    /// Returns true for [`TopologyError::Format`]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, TopologyError>;
