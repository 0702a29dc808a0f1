//! Tunables shared by catalog validation and tier progression.

use serde::Deserialize;

/// Highest tier a site can reach unless configured otherwise.
pub const DEFAULT_MAX_TIER: u8 = 3;

/// Tier limits applied when validating the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TierConfig {
    /// Highest tier any offering may require or any ritual may target (default: 3).
    #[serde(default = "default_max_tier")]
    pub max_tier: u8,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            max_tier: default_max_tier(),
        }
    }
}

const fn default_max_tier() -> u8 {
    DEFAULT_MAX_TIER
}
