//! The host seam: every service the engine consumes from the surrounding
//! game, expressed as traits.
//!
//! The interaction layer, player store, religion membership, progression
//! currencies, chat, effects, and the tick scheduler all live outside this
//! workspace. Components receive them per call through [`HostServices`], or
//! through [`EventHub`] / [`Scheduler`] at construction and disposal.
//! [`LocalHost`](crate::local::LocalHost) implements all of them in memory.

use std::time::Duration;

use hallow_types::{
    BlockPos, EntityPos, HeldItem, MessageChannel, PlayerId, PlayerRef, PrayerEffect, Religion,
    ReligionId, Side,
};
use hallow_world::SiteDirectory;

/// Errors surfaced by host service calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The player is not connected.
    #[error("player {0} is not online")]
    PlayerOffline(PlayerId),

    /// The player's entity has no position yet (still loading in).
    #[error("player {0} has no world position")]
    NoPosition(PlayerId),

    /// The player's active hand does not hold enough items.
    #[error("player {player} does not hold {quantity} item(s) to consume")]
    NothingToConsume {
        /// The player.
        player: PlayerId,
        /// Quantity requested.
        quantity: u32,
    },

    /// The host rejected the call for its own reasons.
    #[error("host service unavailable: {message}")]
    Unavailable {
        /// Host-provided description.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Consumed events
// ---------------------------------------------------------------------------

/// A topic the interaction layer publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    /// A player used (right-clicked) an altar.
    AltarUsed,
    /// A player broke an altar block.
    AltarBroken,
}

/// A player used an altar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltarUsed {
    /// The acting player.
    pub player: PlayerRef,
    /// Position of the altar block.
    pub altar: BlockPos,
    /// Which side raised the event.
    pub side: Side,
}

/// A player broke an altar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltarBroken {
    /// The player who broke it.
    pub player: PlayerRef,
    /// Position of the altar block.
    pub altar: BlockPos,
    /// Which side raised the event.
    pub side: Side,
}

/// Handle for a subscription to a host topic or an [`EventBus`](crate::events::EventBus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle for a callback registered with the [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(pub u64);

/// Subscription management for interaction topics.
///
/// Components subscribe when constructed and unsubscribe when disposed; the
/// host only routes a topic to components holding a live subscription.
pub trait EventHub {
    /// Subscribe to `topic`.
    fn subscribe(&mut self, topic: Topic) -> SubscriptionId;

    /// Drop a subscription. Returns `false` if it was not live.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Tick and lifecycle callback registration.
pub trait Scheduler {
    /// Register a callback fired every `interval`.
    fn register_periodic(&mut self, interval: Duration) -> CallbackId;

    /// Register a callback fired once the world/save has finished loading.
    fn register_world_loaded(&mut self) -> CallbackId;

    /// Register a callback fired when a player disconnects.
    fn register_player_disconnect(&mut self) -> CallbackId;

    /// Remove a callback. Returns `false` if it was not registered.
    fn unregister(&mut self, id: CallbackId) -> bool;
}

// ---------------------------------------------------------------------------
// Consumed services
// ---------------------------------------------------------------------------

/// Religion membership lookups.
pub trait ReligionDirectory {
    /// The religion the player belongs to, if any.
    fn religion_of(&self, player: PlayerId) -> Option<Religion>;

    /// A religion by ID.
    fn religion(&self, id: ReligionId) -> Option<Religion>;
}

/// Online players, their positions, and their active hand.
pub trait PlayerDirectory {
    /// Currently connected players, in the host's list order.
    fn online_players(&self) -> Vec<PlayerRef>;

    /// The player's current world position.
    fn position(&self, player: PlayerId) -> Result<EntityPos, HostError>;

    /// The stack in the player's active hand, if any.
    fn held_item(&self, player: PlayerId) -> Option<HeldItem>;

    /// Remove `quantity` items from the player's active hand.
    fn consume_held_item(&mut self, player: PlayerId, quantity: u32) -> Result<(), HostError>;
}

/// Progression currencies.
pub trait ProgressionLedger {
    /// Grant favor to a player.
    fn award_favor(&mut self, player: PlayerId, amount: u32, reason: &str)
    -> Result<(), HostError>;

    /// Grant prestige to a religion.
    fn award_prestige(
        &mut self,
        religion: ReligionId,
        amount: u32,
        reason: &str,
    ) -> Result<(), HostError>;
}

/// Single-player chat messages.
pub trait Messenger {
    /// Send `text` to `player` on `channel`.
    fn send(&mut self, player: PlayerId, channel: MessageChannel, text: &str);
}

/// Altar effects (particles, sounds).
pub trait PrayerEffects {
    /// Play `effect` for `player` at the altar.
    fn play(&mut self, player: PlayerId, altar: BlockPos, effect: PrayerEffect);
}

/// The in-game calendar.
pub trait WorldClock {
    /// Total elapsed world time in hours.
    fn total_hours(&self) -> f64;
}

/// Borrowed host services handed to a component for one call.
pub struct HostServices<'a> {
    /// Holy-site store and spatial index.
    pub sites: &'a mut dyn SiteDirectory,
    /// Religion membership.
    pub religions: &'a dyn ReligionDirectory,
    /// Online players.
    pub players: &'a mut dyn PlayerDirectory,
    /// Favor and prestige.
    pub ledger: &'a mut dyn ProgressionLedger,
    /// Chat.
    pub messenger: &'a mut dyn Messenger,
    /// Altar effects.
    pub effects: &'a mut dyn PrayerEffects,
    /// World time.
    pub clock: &'a dyn WorldClock,
}
