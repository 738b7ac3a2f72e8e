//! Supporter tier definitions.
//!
//! Represents the internal access levels a visitor can hold, independent of
//! which provider granted them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Internal supporter tier.
///
/// The variant order is the access order: every tier sees at least the
/// content visible to the tiers below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// No access level at all.
    None,
    /// Lowest paid level.
    Entry,
    Basic,
    Advanced,
    /// Operator access.
    Admin,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 5] = [
        Tier::None,
        Tier::Entry,
        Tier::Basic,
        Tier::Advanced,
        Tier::Admin,
    ];

    /// Returns the lowercase name used in config and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::Entry => "entry",
            Tier::Basic => "basic",
            Tier::Advanced => "advanced",
            Tier::Admin => "admin",
        }
    }

    /// Returns true if this tier grants any access.
    pub fn grants_access(&self) -> bool {
        !matches!(self, Tier::None)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Tier::None),
            "entry" => Ok(Tier::Entry),
            "basic" => Ok(Tier::Basic),
            "advanced" => Ok(Tier::Advanced),
            "admin" => Ok(Tier::Admin),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}
