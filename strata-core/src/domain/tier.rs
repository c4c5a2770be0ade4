//! Tier domain types
//!
//! A tier is the billing/capability class of a job owner. It determines the
//! per-tier concurrency limit and the resource sizing used when a job is
//! dispatched to a compute backend.

use serde::{Deserialize, Serialize};

/// Concurrency class a job is billed against. Immutable after job creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Advanced,
    Professional,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Advanced => "advanced",
            Tier::Professional => "professional",
        }
    }

    pub fn parse(s: &str) -> Option<Tier> {
        match s {
            "basic" => Some(Tier::Basic),
            "advanced" => Some(Tier::Advanced),
            "professional" => Some(Tier::Professional),
            _ => None,
        }
    }

    /// All tiers, lowest first.
    pub fn all() -> [Tier; 3] {
        [Tier::Basic, Tier::Advanced, Tier::Professional]
    }
}

/// Resource sizing used for backend submissions, resolved from the tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceProfile {
    /// Compute instance class requested from the backend (e.g. "compute-small")
    pub instance_class: String,
    /// Degree of parallelism the backend may use
    pub parallelism: u32,
    /// Memory ceiling for the execution, in megabytes
    pub memory_mb: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_round_trip() {
        for tier in Tier::all() {
            assert_eq!(Tier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(Tier::parse("platinum"), None);
    }

    #[test]
    fn test_tier_serde_lowercase() {
        let json = serde_json::to_string(&Tier::Professional).unwrap();
        assert_eq!(json, "\"professional\"");
        let tier: Tier = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(tier, Tier::Basic);
    }
}
