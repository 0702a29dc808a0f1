//! Periodic holy-site presence tracking.
//!
//! Every scan resolves each online player's block position to the site
//! containing it and compares against the previous scan. A change is split
//! into an exit from the old site followed by an entry into the new one, so
//! listeners always see a player leave one site before entering the next.
//! A tracked player missing from the online list is forgotten at the next
//! scan, with an exit if they were inside a site.
//!
//! The tracker does nothing until the world has loaded: construction
//! registers only a world-loaded callback, and [`HolySiteAreaTracker::start`]
//! registers the periodic scan and the disconnect callback.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use hallow_types::{PlayerId, SiteId};
use hallow_world::SiteDirectory;
use tracing::{debug, info, warn};

use crate::events::{EventBus, SiteAreaEvent};
use crate::host::{CallbackId, PlayerDirectory, Scheduler};

/// Default time between scans.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_millis(1000);

/// The boundary crossings implied by a change of containing site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteTransition {
    /// Site the player left, if any.
    pub exited: Option<SiteId>,
    /// Site the player entered, if any.
    pub entered: Option<SiteId>,
}

impl SiteTransition {
    /// Whether nothing changed.
    pub const fn is_empty(&self) -> bool {
        self.exited.is_none() && self.entered.is_none()
    }
}

/// Compute the crossings between two consecutive observations.
pub fn transition(previous: Option<SiteId>, current: Option<SiteId>) -> SiteTransition {
    if previous == current {
        return SiteTransition::default();
    }
    SiteTransition {
        exited: previous,
        entered: current,
    }
}

/// Tracks which holy site each online player stands in.
#[derive(Debug)]
pub struct HolySiteAreaTracker {
    interval: Duration,
    world_loaded: Option<CallbackId>,
    scan: Option<CallbackId>,
    disconnect: Option<CallbackId>,
    tracked: BTreeMap<PlayerId, Option<SiteId>>,
    events: EventBus<SiteAreaEvent>,
}

impl HolySiteAreaTracker {
    /// Create the tracker and register its world-loaded callback.
    pub fn new(interval: Duration, scheduler: &mut dyn Scheduler) -> Self {
        let world_loaded = scheduler.register_world_loaded();
        Self {
            interval,
            world_loaded: Some(world_loaded),
            scan: None,
            disconnect: None,
            tracked: BTreeMap::new(),
            events: EventBus::new(),
        }
    }

    /// Begin scanning. Called once the world has loaded; later calls are
    /// no-ops. Returns whether this call started the tracker.
    pub fn start(&mut self, scheduler: &mut dyn Scheduler) -> bool {
        if self.scan.is_some() || self.world_loaded.is_none() {
            return false;
        }
        self.scan = Some(scheduler.register_periodic(self.interval));
        self.disconnect = Some(scheduler.register_player_disconnect());
        info!(
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "Holy site area tracker started"
        );
        true
    }

    /// Whether scanning has begun.
    pub const fn is_started(&self) -> bool {
        self.scan.is_some()
    }

    /// Whether the tracker has been disposed.
    pub const fn is_disposed(&self) -> bool {
        self.world_loaded.is_none()
    }

    /// The scan interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// The bus carrying [`SiteAreaEvent`]s.
    pub const fn events_mut(&mut self) -> &mut EventBus<SiteAreaEvent> {
        &mut self.events
    }

    /// Scan every online player once. Returns the number of events published.
    pub fn on_tick(&mut self, players: &dyn PlayerDirectory, sites: &dyn SiteDirectory) -> usize {
        if !self.is_started() {
            return 0;
        }

        let online = players.online_players();
        let mut published = self.drop_departed(&online.iter().map(|p| p.id).collect());
        for player in online {
            let pos = match players.position(player.id) {
                Ok(pos) => pos,
                Err(err) => {
                    warn!(player = %player.id, error = %err, "Skipping player in area scan");
                    continue;
                }
            };
            let current = sites.site_at(pos.to_block_pos());
            let previous = self.tracked.get(&player.id).copied().flatten();
            let change = transition(previous, current);

            if let Some(site) = change.exited {
                debug!(player = %player.id, site = %site, "Player left holy site");
                self.events.publish(&SiteAreaEvent::Exited {
                    player: player.id,
                    site,
                });
                published = published.saturating_add(1);
            }
            if let Some(site) = change.entered {
                debug!(player = %player.id, site = %site, "Player entered holy site");
                self.events.publish(&SiteAreaEvent::Entered {
                    player: player.id,
                    site,
                });
                published = published.saturating_add(1);
            }

            self.tracked.insert(player.id, current);
        }
        published
    }

    /// Forget players no longer online whose disconnect was never reported.
    /// Anyone dropped from inside a site gets an exit. Returns the number of
    /// exits published.
    fn drop_departed(&mut self, online: &BTreeSet<PlayerId>) -> usize {
        let departed: Vec<PlayerId> = self
            .tracked
            .keys()
            .filter(|p| !online.contains(p))
            .copied()
            .collect();
        let mut published: usize = 0;
        for player in departed {
            if let Some(Some(site)) = self.tracked.remove(&player) {
                debug!(player = %player, site = %site, "Player went offline inside holy site");
                self.events.publish(&SiteAreaEvent::Exited { player, site });
                published = published.saturating_add(1);
            }
        }
        published
    }

    /// Forget a disconnecting player, emitting an exit if they were inside a
    /// site. Returns whether an exit was published.
    pub fn on_player_disconnect(&mut self, player: PlayerId) -> bool {
        if self.disconnect.is_none() {
            return false;
        }
        let Some(Some(site)) = self.tracked.remove(&player) else {
            return false;
        };
        debug!(player = %player, site = %site, "Player disconnected inside holy site");
        self.events.publish(&SiteAreaEvent::Exited { player, site });
        true
    }

    /// The site the player was in at the last scan.
    pub fn site_of(&self, player: PlayerId) -> Option<SiteId> {
        self.tracked.get(&player).copied().flatten()
    }

    /// Players inside `site` at the last scan.
    pub fn occupants(&self, site: SiteId) -> Vec<PlayerId> {
        self.tracked
            .iter()
            .filter(|(_, s)| **s == Some(site))
            .map(|(p, _)| *p)
            .collect()
    }

    /// Unregister every callback and drop all state and listeners.
    pub fn dispose(&mut self, scheduler: &mut dyn Scheduler) {
        for id in [
            self.world_loaded.take(),
            self.scan.take(),
            self.disconnect.take(),
        ]
        .into_iter()
        .flatten()
        {
            scheduler.unregister(id);
        }
        self.tracked.clear();
        self.events.clear();
        info!("Holy site area tracker disposed");
    }
}
