//! Core entity structs: holy sites, ritual progress, offerings, rituals,
//! religions, and the player-facing handles the host hands us.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::DeityDomain;
use crate::geometry::{BlockPos, BlockRegion};
use crate::ids::{PlayerId, ReligionId, SiteId};

/// Tier every holy site starts at when consecrated.
pub const STARTING_TIER: u8 = 1;

/// Display name for a site tier.
pub const fn tier_name(tier: u8) -> &'static str {
    match tier {
        0 => "Ruin",
        1 => "Shrine",
        2 => "Temple",
        _ => "Cathedral",
    }
}

/// Whether an item code matches a configured item pattern.
///
/// A pattern ending in `*` matches every code with the preceding prefix;
/// any other pattern must match exactly.
pub fn item_matches(pattern: &str, code: &str) -> bool {
    pattern
        .strip_suffix('*')
        .map_or_else(|| pattern == code, |prefix| code.starts_with(prefix))
}

// ---------------------------------------------------------------------------
// Holy sites
// ---------------------------------------------------------------------------

/// A consecrated world region tied to a religion and anchored to an altar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolySite {
    /// Unique site identifier.
    pub id: SiteId,
    /// The religion that owns this site.
    pub religion_id: ReligionId,
    /// Display name.
    pub name: String,
    /// The block regions that make up the site. Never empty once registered.
    pub regions: Vec<BlockRegion>,
    /// Position of the altar block that anchors the site.
    pub altar: BlockPos,
    /// The player who consecrated the site.
    pub founder: PlayerId,
    /// World time (total hours) at consecration.
    pub consecrated_at_hours: f64,
    /// Ritual currently in progress, if any.
    pub active_ritual: Option<RitualProgress>,
    /// Current tier. Only ever raised through [`HolySite::raise_tier`].
    tier: u8,
}

impl HolySite {
    /// Create a freshly consecrated site at [`STARTING_TIER`].
    pub fn new(
        religion_id: ReligionId,
        name: impl Into<String>,
        regions: Vec<BlockRegion>,
        altar: BlockPos,
        founder: PlayerId,
        consecrated_at_hours: f64,
    ) -> Self {
        Self {
            id: SiteId::new(),
            religion_id,
            name: name.into(),
            regions,
            altar,
            founder,
            consecrated_at_hours,
            active_ritual: None,
            tier: STARTING_TIER,
        }
    }

    /// Current tier.
    pub const fn tier(&self) -> u8 {
        self.tier
    }

    /// Display name of the current tier.
    pub const fn tier_name(&self) -> &'static str {
        tier_name(self.tier)
    }

    /// Raise the tier to `target`.
    ///
    /// Returns `false` and leaves the tier untouched when `target` is not
    /// strictly above the current tier.
    pub const fn raise_tier(&mut self, target: u8) -> bool {
        if target <= self.tier {
            return false;
        }
        self.tier = target;
        true
    }

    /// Whether the block lies inside any of the site's regions.
    pub fn contains(&self, pos: BlockPos) -> bool {
        self.regions.iter().any(|r| r.contains(pos))
    }
}

/// Running progress of a tier-upgrade ritual, owned by one [`HolySite`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualProgress {
    /// Code of the ritual definition being performed.
    pub ritual_code: String,
    /// Display name of the ritual.
    pub ritual_name: String,
    /// Tier the ritual upgrades from.
    pub source_tier: u8,
    /// Tier the ritual upgrades to.
    pub target_tier: u8,
    /// Contributions made so far.
    pub contributed: u32,
    /// Contributions needed to complete.
    pub required: u32,
    /// Contributions per player.
    pub contributors: BTreeMap<PlayerId, u32>,
}

impl RitualProgress {
    /// Start tracking progress for `ritual` with nothing contributed yet.
    pub fn start(ritual: &Ritual) -> Self {
        Self {
            ritual_code: ritual.code.clone(),
            ritual_name: ritual.name.clone(),
            source_tier: ritual.source_tier,
            target_tier: ritual.target_tier,
            contributed: 0,
            required: ritual.required,
            contributors: BTreeMap::new(),
        }
    }

    /// Record one contribution from `player`.
    pub fn record(&mut self, player: PlayerId) {
        self.contributed = self.contributed.saturating_add(1);
        let tally = self.contributors.entry(player).or_insert(0);
        *tally = tally.saturating_add(1);
    }

    /// Whether the required amount has been reached.
    pub const fn is_complete(&self) -> bool {
        self.contributed >= self.required
    }

    /// Contributions still needed.
    pub const fn remaining(&self) -> u32 {
        self.required.saturating_sub(self.contributed)
    }
}

// ---------------------------------------------------------------------------
// Catalog entries
// ---------------------------------------------------------------------------

/// An item a domain accepts as an offering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offering {
    /// Item code, e.g. `ingot-copper`.
    pub item: String,
    /// Favor granted to the offering player.
    pub favor: u32,
    /// Lowest site tier that accepts this offering.
    pub min_tier: u8,
}

/// Rewards granted when a ritual completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RitualReward {
    /// Favor for the player whose contribution completed the ritual.
    pub favor: u32,
    /// Prestige for the owning religion.
    pub prestige: u32,
}

/// A domain-scoped tier-upgrade path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ritual {
    /// Unique code within the domain.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Domain the ritual belongs to.
    pub domain: DeityDomain,
    /// Tier the site must be at for the ritual to apply.
    pub source_tier: u8,
    /// Tier the site reaches on completion.
    pub target_tier: u8,
    /// Contributions required to complete.
    pub required: u32,
    /// Item patterns the ritual accepts. Empty accepts any valid offering.
    pub accepted_items: Vec<String>,
    /// Completion rewards.
    pub reward: RitualReward,
}

impl Ritual {
    /// Whether an offering of `item` counts toward this ritual.
    pub fn accepts(&self, item: &str) -> bool {
        self.accepted_items.is_empty()
            || self.accepted_items.iter().any(|p| item_matches(p, item))
    }
}

// ---------------------------------------------------------------------------
// Host handles
// ---------------------------------------------------------------------------

/// A religion as seen by the holy-site engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Religion {
    /// Unique religion identifier.
    pub id: ReligionId,
    /// Display name.
    pub name: String,
    /// Deity domain.
    pub domain: DeityDomain,
}

/// A player's identity as carried by interaction events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Unique player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
}

/// The stack a player holds in their active hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeldItem {
    /// Item code.
    pub code: String,
    /// Stack size.
    pub quantity: u32,
}
