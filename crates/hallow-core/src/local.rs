//! In-memory implementations of every host trait.
//!
//! [`LocalHost`] backs the tests and the `hallow-engine` scenario runner. Each
//! service is its own public field so callers can inspect what was sent,
//! played, or awarded, and so [`LocalHost::parts`] can lend them out
//! alongside the hub and scheduler without conflicting borrows.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use hallow_types::{
    BlockPos, DeityDomain, EntityPos, HeldItem, MessageChannel, PlayerId, PlayerRef,
    PrayerEffect, Religion, ReligionId,
};
use hallow_world::SiteDirectory;

use crate::host::{
    CallbackId, EventHub, HostError, HostServices, Messenger, PlayerDirectory, PrayerEffects,
    ProgressionLedger, ReligionDirectory, Scheduler, SubscriptionId, Topic, WorldClock,
};

// ---------------------------------------------------------------------------
// Religions
// ---------------------------------------------------------------------------

/// Religions and their members.
#[derive(Debug, Clone, Default)]
pub struct LocalReligions {
    religions: BTreeMap<ReligionId, Religion>,
    members: BTreeMap<PlayerId, ReligionId>,
}

impl LocalReligions {
    /// Found a new religion.
    pub fn found(&mut self, name: &str, domain: DeityDomain) -> Religion {
        let religion = Religion {
            id: ReligionId::new(),
            name: name.to_owned(),
            domain,
        };
        self.religions.insert(religion.id, religion.clone());
        religion
    }

    /// Make `player` a member of `religion`, leaving any previous one.
    pub fn join(&mut self, player: PlayerId, religion: ReligionId) {
        self.members.insert(player, religion);
    }

    /// Remove `player` from their religion.
    pub fn leave(&mut self, player: PlayerId) -> bool {
        self.members.remove(&player).is_some()
    }

    /// A religion by name.
    pub fn by_name(&self, name: &str) -> Option<&Religion> {
        self.religions.values().find(|r| r.name == name)
    }
}

impl ReligionDirectory for LocalReligions {
    fn religion_of(&self, player: PlayerId) -> Option<Religion> {
        self.members
            .get(&player)
            .and_then(|id| self.religions.get(id))
            .cloned()
    }

    fn religion(&self, id: ReligionId) -> Option<Religion> {
        self.religions.get(&id).cloned()
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Connected players, their positions, and their active hands.
#[derive(Debug, Clone, Default)]
pub struct LocalPlayers {
    online: Vec<PlayerRef>,
    positions: BTreeMap<PlayerId, EntityPos>,
    hands: BTreeMap<PlayerId, HeldItem>,
}

impl LocalPlayers {
    /// Connect a new player with no position and an empty hand.
    pub fn connect(&mut self, name: &str) -> PlayerRef {
        let player = PlayerRef {
            id: PlayerId::new(),
            name: name.to_owned(),
        };
        self.online.push(player.clone());
        player
    }

    /// Disconnect a player. Returns whether they were online.
    pub fn disconnect(&mut self, player: PlayerId) -> bool {
        let before = self.online.len();
        self.online.retain(|p| p.id != player);
        self.positions.remove(&player);
        self.hands.remove(&player);
        self.online.len() != before
    }

    /// An online player by name.
    pub fn by_name(&self, name: &str) -> Option<&PlayerRef> {
        self.online.iter().find(|p| p.name == name)
    }

    /// Move a player.
    pub fn set_position(&mut self, player: PlayerId, pos: EntityPos) {
        self.positions.insert(player, pos);
    }

    /// Put a stack in the player's active hand, replacing what was there.
    pub fn give(&mut self, player: PlayerId, code: &str, quantity: u32) {
        if quantity == 0 {
            self.hands.remove(&player);
        } else {
            self.hands.insert(
                player,
                HeldItem {
                    code: code.to_owned(),
                    quantity,
                },
            );
        }
    }

    /// Empty the player's active hand.
    pub fn empty_hand(&mut self, player: PlayerId) {
        self.hands.remove(&player);
    }
}

impl PlayerDirectory for LocalPlayers {
    fn online_players(&self) -> Vec<PlayerRef> {
        self.online.clone()
    }

    fn position(&self, player: PlayerId) -> Result<EntityPos, HostError> {
        if !self.online.iter().any(|p| p.id == player) {
            return Err(HostError::PlayerOffline(player));
        }
        self.positions
            .get(&player)
            .copied()
            .ok_or(HostError::NoPosition(player))
    }

    fn held_item(&self, player: PlayerId) -> Option<HeldItem> {
        self.hands.get(&player).cloned()
    }

    fn consume_held_item(&mut self, player: PlayerId, quantity: u32) -> Result<(), HostError> {
        let missing = HostError::NothingToConsume { player, quantity };
        let Some(stack) = self.hands.get_mut(&player) else {
            return Err(missing);
        };
        let Some(left) = stack.quantity.checked_sub(quantity) else {
            return Err(missing);
        };
        if left == 0 {
            self.hands.remove(&player);
        } else {
            stack.quantity = left;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ledger, chat, effects, clock
// ---------------------------------------------------------------------------

/// Favor and prestige balances.
#[derive(Debug, Clone, Default)]
pub struct LocalLedger {
    favor: BTreeMap<PlayerId, u32>,
    prestige: BTreeMap<ReligionId, u32>,
    /// When set, every award fails with this message.
    pub outage: Option<String>,
}

impl LocalLedger {
    /// A player's favor balance.
    pub fn favor_of(&self, player: PlayerId) -> u32 {
        self.favor.get(&player).copied().unwrap_or(0)
    }

    /// A religion's prestige balance.
    pub fn prestige_of(&self, religion: ReligionId) -> u32 {
        self.prestige.get(&religion).copied().unwrap_or(0)
    }

    fn check_outage(&self) -> Result<(), HostError> {
        self.outage.as_ref().map_or(Ok(()), |message| {
            Err(HostError::Unavailable {
                message: message.clone(),
            })
        })
    }
}

impl ProgressionLedger for LocalLedger {
    fn award_favor(
        &mut self,
        player: PlayerId,
        amount: u32,
        _reason: &str,
    ) -> Result<(), HostError> {
        self.check_outage()?;
        let balance = self.favor.entry(player).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(())
    }

    fn award_prestige(
        &mut self,
        religion: ReligionId,
        amount: u32,
        _reason: &str,
    ) -> Result<(), HostError> {
        self.check_outage()?;
        let balance = self.prestige.entry(religion).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(())
    }
}

/// A chat message delivered to one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient.
    pub player: PlayerId,
    /// Channel.
    pub channel: MessageChannel,
    /// Text.
    pub text: String,
}

/// Every message sent, in order.
#[derive(Debug, Clone, Default)]
pub struct LocalMailbox {
    /// Messages in send order.
    pub sent: Vec<SentMessage>,
}

impl LocalMailbox {
    /// Messages sent to `player`, in order.
    pub fn to(&self, player: PlayerId) -> Vec<&SentMessage> {
        self.sent.iter().filter(|m| m.player == player).collect()
    }
}

impl Messenger for LocalMailbox {
    fn send(&mut self, player: PlayerId, channel: MessageChannel, text: &str) {
        self.sent.push(SentMessage {
            player,
            channel,
            text: text.to_owned(),
        });
    }
}

/// An effect played at an altar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedEffect {
    /// The praying player.
    pub player: PlayerId,
    /// The altar.
    pub altar: BlockPos,
    /// The effect.
    pub effect: PrayerEffect,
}

/// Every effect played, in order.
#[derive(Debug, Clone, Default)]
pub struct LocalEffects {
    /// Effects in play order.
    pub played: Vec<PlayedEffect>,
}

impl PrayerEffects for LocalEffects {
    fn play(&mut self, player: PlayerId, altar: BlockPos, effect: PrayerEffect) {
        self.played.push(PlayedEffect {
            player,
            altar,
            effect,
        });
    }
}

/// A manually advanced world clock.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalClock {
    hours: f64,
}

impl LocalClock {
    /// Move world time forward. Negative values are ignored.
    pub fn advance(&mut self, hours: f64) {
        if hours > 0.0 {
            self.hours += hours;
        }
    }
}

impl WorldClock for LocalClock {
    fn total_hours(&self) -> f64 {
        self.hours
    }
}

// ---------------------------------------------------------------------------
// Hub and scheduler
// ---------------------------------------------------------------------------

/// Live topic subscriptions.
#[derive(Debug, Clone, Default)]
pub struct LocalHub {
    next_id: u64,
    live: BTreeMap<SubscriptionId, Topic>,
}

impl LocalHub {
    /// Number of live subscriptions to `topic`.
    pub fn subscribers(&self, topic: Topic) -> usize {
        self.live.values().filter(|t| **t == topic).count()
    }
}

impl EventHub for LocalHub {
    fn subscribe(&mut self, topic: Topic) -> SubscriptionId {
        self.next_id = self.next_id.saturating_add(1);
        let id = SubscriptionId(self.next_id);
        self.live.insert(id, topic);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.live.remove(&id).is_some()
    }
}

#[derive(Debug, Clone, Copy)]
struct Periodic {
    interval_ms: u64,
    elapsed_ms: u64,
}

/// Registered callbacks plus a virtual timer for periodic ones.
#[derive(Debug, Clone, Default)]
pub struct LocalScheduler {
    next_id: u64,
    periodic: BTreeMap<CallbackId, Periodic>,
    world_loaded: BTreeSet<CallbackId>,
    disconnect: BTreeSet<CallbackId>,
}

impl LocalScheduler {
    fn next(&mut self) -> CallbackId {
        self.next_id = self.next_id.saturating_add(1);
        CallbackId(self.next_id)
    }

    /// Number of periodic callbacks.
    pub fn periodic_count(&self) -> usize {
        self.periodic.len()
    }

    /// Number of world-loaded callbacks.
    pub fn world_loaded_listeners(&self) -> usize {
        self.world_loaded.len()
    }

    /// Number of player-disconnect callbacks.
    pub fn disconnect_listeners(&self) -> usize {
        self.disconnect.len()
    }

    /// Advance the virtual timer and return how many periodic callbacks
    /// came due, summed over all registrations.
    pub fn advance(&mut self, by: Duration) -> u64 {
        let by_ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let mut fired: u64 = 0;
        for timer in self.periodic.values_mut() {
            let total = timer.elapsed_ms.saturating_add(by_ms);
            let due = total.checked_div(timer.interval_ms).unwrap_or(0);
            timer.elapsed_ms = total.checked_rem(timer.interval_ms).unwrap_or(0);
            fired = fired.saturating_add(due);
        }
        fired
    }
}

impl Scheduler for LocalScheduler {
    fn register_periodic(&mut self, interval: Duration) -> CallbackId {
        let id = self.next();
        let interval_ms = u64::try_from(interval.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self.periodic.insert(
            id,
            Periodic {
                interval_ms,
                elapsed_ms: 0,
            },
        );
        id
    }

    fn register_world_loaded(&mut self) -> CallbackId {
        let id = self.next();
        self.world_loaded.insert(id);
        id
    }

    fn register_player_disconnect(&mut self) -> CallbackId {
        let id = self.next();
        self.disconnect.insert(id);
        id
    }

    fn unregister(&mut self, id: CallbackId) -> bool {
        self.periodic.remove(&id).is_some()
            || self.world_loaded.remove(&id)
            || self.disconnect.remove(&id)
    }
}

// ---------------------------------------------------------------------------
// LocalHost
// ---------------------------------------------------------------------------

/// Every host service, in memory.
#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    /// Religion membership.
    pub religions: LocalReligions,
    /// Online players.
    pub players: LocalPlayers,
    /// Favor and prestige.
    pub ledger: LocalLedger,
    /// Sent chat messages.
    pub mailbox: LocalMailbox,
    /// Played effects.
    pub effects: LocalEffects,
    /// World time.
    pub clock: LocalClock,
    /// Topic subscriptions.
    pub hub: LocalHub,
    /// Callbacks and periodic timer.
    pub scheduler: LocalScheduler,
}

impl LocalHost {
    /// An empty host: no religions, no players, world time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lend the per-call services together with the hub and scheduler.
    pub fn parts<'a>(
        &'a mut self,
        sites: &'a mut dyn SiteDirectory,
    ) -> (HostServices<'a>, &'a mut LocalHub, &'a mut LocalScheduler) {
        let services = HostServices {
            sites,
            religions: &self.religions,
            players: &mut self.players,
            ledger: &mut self.ledger,
            messenger: &mut self.mailbox,
            effects: &mut self.effects,
            clock: &self.clock,
        };
        (services, &mut self.hub, &mut self.scheduler)
    }

    /// Lend the per-call services.
    pub fn services<'a>(&'a mut self, sites: &'a mut dyn SiteDirectory) -> HostServices<'a> {
        self.parts(sites).0
    }
}
