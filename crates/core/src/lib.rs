//! `netgate-core` — shared policy-domain primitives.
//!
//! This crate contains the data model of the deployed policy document and the
//! small value types (hardware addresses, principal keys) the compiler and
//! resolver agree on. No I/O, no crypto.

pub mod addr;
pub mod document;
pub mod error;
pub mod principal;

pub use addr::HardwareAddr;
pub use document::{IdentityRecord, PolicyDocument};
pub use error::{ConfigurationError, ConfigurationResult};
pub use principal::PrincipalKey;
