//! Enumeration types for the Hallow holy-site engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Deity domains
// ---------------------------------------------------------------------------

/// The deity theme a religion follows.
///
/// A domain scopes which offerings and rituals are valid at that religion's
/// holy sites. Configuration files key their offering and ritual tables by
/// the lowercase domain name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeityDomain {
    /// Smithing, tools, metalwork.
    Craft,
    /// Hunting, forests, wild creatures.
    Wild,
    /// Farming, cooking, the seasons.
    Harvest,
    /// Mining, masonry, the deep earth.
    Stone,
    /// Warfare and martial prowess.
    Conquest,
}

impl DeityDomain {
    /// Every domain, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Craft,
        Self::Wild,
        Self::Harvest,
        Self::Stone,
        Self::Conquest,
    ];

    /// Lowercase configuration key for this domain.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Craft => "craft",
            Self::Wild => "wild",
            Self::Harvest => "harvest",
            Self::Stone => "stone",
            Self::Conquest => "conquest",
        }
    }
}

impl core::fmt::Display for DeityDomain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`DeityDomain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDomain(pub String);

impl core::fmt::Display for UnknownDomain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown deity domain: {}", self.0)
    }
}

impl std::error::Error for UnknownDomain {}

impl core::str::FromStr for DeityDomain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| UnknownDomain(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Host-facing tags
// ---------------------------------------------------------------------------

/// Which side of the host raised an interaction event.
///
/// Only server-side events mutate holy-site state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The authoritative simulation.
    Server,
    /// A client-side prediction of the same interaction.
    Client,
}

/// Chat channel tag for a message sent to a single player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageChannel {
    /// The interaction succeeded.
    Success,
    /// The interaction failed.
    Error,
}

/// Visual/audio effect played at an altar after a successful prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrayerEffect {
    /// A plain prayer or offering with no ritual involvement.
    Prayer,
    /// A ritual was started or advanced.
    RitualProgress,
    /// A ritual completed and the site's tier rose.
    RitualComplete,
}

// ---------------------------------------------------------------------------
// Prayer stages
// ---------------------------------------------------------------------------

/// How far a single prayer has progressed through the pipeline.
///
/// Any stage may jump straight to [`PrayerStage::Completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrayerStage {
    /// Context built, no step has run yet.
    Started,
    /// Site, membership, and cooldown checks passed.
    Validated,
    /// The held item (if any) was evaluated as an offering.
    OfferingEvaluated,
    /// A ritual contribution was attempted.
    RitualAttempted,
    /// Favor, prestige, and item consumption were applied.
    RewardsApplied,
    /// Effects were played at the altar.
    EffectsPlayed,
    /// The prayer finished, successfully or not.
    Completed,
}
