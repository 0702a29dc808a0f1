//! Scenario files: the religions, players, and sites of a small world, and
//! the steps to replay against it.
//!
//! ```yaml
//! religions:
//!   - { name: Hearth of Ore, domain: craft }
//! players:
//!   - { name: Aldric, religion: Hearth of Ore }
//! sites:
//!   - { name: Anvil Rest, religion: Hearth of Ore, founder: Aldric, altar: [0, 64, 0], radius: 6 }
//! steps:
//!   - { action: move, player: Aldric, to: [0.5, 64.0, 0.5] }
//!   - { action: give, player: Aldric, item: ingot-copper, quantity: 10 }
//!   - { action: pray, player: Aldric, site: Anvil Rest }
//!   - { action: wait, hours: 1.0 }
//!   - { action: tick, ms: 1000 }
//!   - { action: break, player: Aldric, site: Anvil Rest }
//!   - { action: disconnect, player: Aldric }
//! ```

use std::path::Path;

use hallow_types::DeityDomain;
use serde::Deserialize;

use crate::error::EngineError;

/// A whole scenario.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scenario {
    /// Religions to found.
    #[serde(default)]
    pub religions: Vec<ReligionSpec>,
    /// Players to connect.
    #[serde(default)]
    pub players: Vec<PlayerSpec>,
    /// Sites to consecrate.
    #[serde(default)]
    pub sites: Vec<SiteSpec>,
    /// Steps to replay, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EngineError::scenario(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&contents)
    }

    /// Parse a scenario from YAML.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        serde_yml::from_str(yaml)
            .map_err(|e| EngineError::scenario(format!("failed to parse scenario YAML: {e}")))
    }
}

/// A religion to found.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReligionSpec {
    /// Display name, also used to refer to it.
    pub name: String,
    /// Deity domain.
    pub domain: DeityDomain,
}

/// A player to connect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerSpec {
    /// Display name, also used to refer to the player.
    pub name: String,
    /// Religion to join, by name.
    #[serde(default)]
    pub religion: Option<String>,
}

/// A site to consecrate: a cube of `radius` blocks around the altar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteSpec {
    /// Display name, also used to refer to the site.
    pub name: String,
    /// Owning religion, by name.
    pub religion: String,
    /// Founding player, by name.
    pub founder: String,
    /// Altar block position.
    pub altar: [i32; 3],
    /// Half-width of the site cube in blocks.
    #[serde(default = "default_radius")]
    pub radius: i32,
}

const fn default_radius() -> i32 {
    8
}

/// One replayed action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Teleport a player.
    Move {
        /// Player name.
        player: String,
        /// Entity position.
        to: [f64; 3],
    },
    /// Put a stack in a player's hand.
    Give {
        /// Player name.
        player: String,
        /// Item code.
        item: String,
        /// Stack size.
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    /// Empty a player's hand.
    EmptyHand {
        /// Player name.
        player: String,
    },
    /// Use a site's altar.
    Pray {
        /// Player name.
        player: String,
        /// Site name.
        site: String,
    },
    /// Break a site's altar.
    Break {
        /// Player name.
        player: String,
        /// Site name.
        site: String,
    },
    /// Advance world time.
    Wait {
        /// World hours.
        hours: f64,
    },
    /// Advance real time, firing any scans that come due.
    Tick {
        /// Milliseconds.
        ms: u64,
    },
    /// Disconnect a player.
    Disconnect {
        /// Player name.
        player: String,
    },
}

const fn default_quantity() -> u32 {
    1
}
