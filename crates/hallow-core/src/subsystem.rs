//! The holy-site subsystem: the three components wired together behind a
//! single event entry point.

use std::time::Duration;

use hallow_rites::Catalog;
use hallow_types::PlayerId;
use tracing::info;

use crate::config::HallowConfig;
use crate::destruction::{AltarDestructionHandler, DestructionOutcome};
use crate::events::{EventBus, SiteAreaEvent};
use crate::host::{AltarBroken, AltarUsed, EventHub, HostServices, Scheduler};
use crate::prayer::{AltarPrayerHandler, PipelineError, PrayerContext, PrayerPipeline};
use crate::tracker::HolySiteAreaTracker;

/// An event raised by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A player used an altar.
    AltarUsed(AltarUsed),
    /// A player broke an altar.
    AltarBroken(AltarBroken),
    /// The world finished loading.
    WorldLoaded,
    /// A periodic scan came due.
    Tick,
    /// A player disconnected.
    PlayerDisconnected(PlayerId),
}

/// What handling one [`HostEvent`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// A prayer ran.
    Prayer(Box<PrayerContext>),
    /// An altar break was handled.
    Destruction(DestructionOutcome),
    /// The tracker was started (`true`) or was already running (`false`).
    TrackerStarted(bool),
    /// A scan ran and published this many area events.
    Scanned(usize),
    /// A disconnect was handled; `true` if an exit was published.
    Disconnected(bool),
    /// No live component takes this event.
    Ignored,
}

/// Prayer, destruction, and area tracking, sharing one host.
#[derive(Debug)]
pub struct HolySiteSubsystem {
    prayer: AltarPrayerHandler,
    destruction: AltarDestructionHandler,
    tracker: HolySiteAreaTracker,
}

impl HolySiteSubsystem {
    /// Build the standard pipeline and all three components, subscribing and
    /// registering with the host.
    pub fn new(
        config: &HallowConfig,
        catalog: &Catalog,
        hub: &mut dyn EventHub,
        scheduler: &mut dyn Scheduler,
    ) -> Result<Self, PipelineError> {
        let pipeline = PrayerPipeline::standard(catalog, &config.prayer)?;
        let interval = Duration::from_millis(config.tracker.scan_interval_ms);
        let subsystem = Self {
            prayer: AltarPrayerHandler::new(pipeline, hub),
            destruction: AltarDestructionHandler::new(hub),
            tracker: HolySiteAreaTracker::new(interval, scheduler),
        };
        info!(
            offerings = catalog.offering_count(),
            rituals = catalog.ritual_count(),
            scan_interval_ms = config.tracker.scan_interval_ms,
            "Holy site subsystem ready"
        );
        Ok(subsystem)
    }

    /// Route one host event to the component that handles it.
    pub fn dispatch(
        &mut self,
        event: &HostEvent,
        host: &mut HostServices<'_>,
        scheduler: &mut dyn Scheduler,
    ) -> Dispatched {
        match event {
            HostEvent::AltarUsed(used) => self
                .prayer
                .on_altar_used(used, host)
                .map_or(Dispatched::Ignored, |ctx| Dispatched::Prayer(Box::new(ctx))),
            HostEvent::AltarBroken(broken) => {
                match self
                    .destruction
                    .on_altar_broken(broken, &mut *host.sites, &mut *host.messenger)
                {
                    DestructionOutcome::Ignored => Dispatched::Ignored,
                    outcome => Dispatched::Destruction(outcome),
                }
            }
            HostEvent::WorldLoaded if !self.tracker.is_disposed() => {
                Dispatched::TrackerStarted(self.tracker.start(scheduler))
            }
            HostEvent::Tick if self.tracker.is_started() => {
                Dispatched::Scanned(self.tracker.on_tick(&*host.players, &*host.sites))
            }
            HostEvent::PlayerDisconnected(player) if self.tracker.is_started() => {
                Dispatched::Disconnected(self.tracker.on_player_disconnect(*player))
            }
            HostEvent::WorldLoaded | HostEvent::Tick | HostEvent::PlayerDisconnected(_) => {
                Dispatched::Ignored
            }
        }
    }

    /// The area events bus.
    pub const fn area_events(&mut self) -> &mut EventBus<SiteAreaEvent> {
        self.tracker.events_mut()
    }

    /// The area tracker.
    pub const fn tracker(&self) -> &HolySiteAreaTracker {
        &self.tracker
    }

    /// The prayer handler.
    pub const fn prayer(&self) -> &AltarPrayerHandler {
        &self.prayer
    }

    /// Dispose every component.
    pub fn shutdown(&mut self, hub: &mut dyn EventHub, scheduler: &mut dyn Scheduler) {
        self.prayer.dispose(hub);
        self.destruction.dispose(hub);
        self.tracker.dispose(scheduler);
        info!("Holy site subsystem shut down");
    }
}
