//! Hardware (MAC) address value type.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A hardware address in canonical form: exactly 12 lowercase hex characters,
/// no separators.
///
/// Network gear reports these in a handful of shapes (`AA:BB:..`, `aa-bb-..`,
/// bare). [`HardwareAddr::normalize`] collapses them all to the canonical
/// form; [`HardwareAddr::parse`] additionally validates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareAddr(String);

impl HardwareAddr {
    /// Lowercase and strip `:`/`-` separators without validating.
    pub fn normalize(input: &str) -> String {
        input
            .to_ascii_lowercase()
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .collect()
    }

    /// Validate an already-normalized candidate.
    pub fn is_valid(candidate: &str) -> bool {
        candidate.len() == 12
            && candidate
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    /// Normalize and validate.
    pub fn parse(input: &str) -> Result<Self, ConfigurationError> {
        let normalized = Self::normalize(input);
        if Self::is_valid(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(ConfigurationError::invalid_address(input))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HardwareAddr {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
