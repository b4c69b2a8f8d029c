//! IP address allocation and bookkeeping.
//!
//! `allocator` derives every address from a node's position in the
//! hierarchy; `registry` records assignments so a finished topology can be
//! checked for duplicates and overlapping networks.

pub mod allocator;
pub mod registry;

pub use allocator::{allocate, check_capacity, gateway_ordinal, AddressPosition, AddressRole};
pub use registry::{AddressRegistry, NetworkScope};
