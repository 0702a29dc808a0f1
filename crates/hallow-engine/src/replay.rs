//! Builds a world from a [`Scenario`] and replays its steps through the
//! holy-site subsystem.

use std::collections::BTreeMap;
use std::time::Duration;

use hallow_core::host::PlayerDirectory;
use hallow_core::{
    AltarBroken, AltarUsed, Dispatched, HallowConfig, HolySiteSubsystem, HostEvent, LocalHost,
    SiteAreaEvent,
};
use hallow_rites::Catalog;
use hallow_types::{BlockPos, BlockRegion, EntityPos, HolySite, PlayerRef, Side, tier_name};
use hallow_world::SiteRegistry;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::scenario::{Scenario, Step};

/// Counters reported when the replay ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Steps replayed.
    pub steps: usize,
    /// Prayers that ran.
    pub prayers: usize,
    /// Prayers that succeeded.
    pub answered: usize,
    /// Area scans that ran.
    pub scans: u64,
    /// Sites deconsecrated.
    pub deconsecrated: usize,
}

/// A scenario world wired to the subsystem.
pub struct Replay {
    host: LocalHost,
    sites: SiteRegistry,
    subsystem: HolySiteSubsystem,
    delivered: usize,
}

impl Replay {
    /// Found religions, connect players, consecrate sites, and start the
    /// subsystem as if the world had just loaded.
    pub fn build(
        config: &HallowConfig,
        catalog: &Catalog,
        scenario: &Scenario,
    ) -> Result<Self, EngineError> {
        let mut host = LocalHost::new();
        let mut sites = SiteRegistry::with_max_site_columns(config.sites.max_site_columns);

        for religion in &scenario.religions {
            host.religions.found(&religion.name, religion.domain);
        }

        for player in &scenario.players {
            let joined = host.players.connect(&player.name);
            if let Some(name) = &player.religion {
                let religion = host
                    .religions
                    .by_name(name)
                    .ok_or_else(|| EngineError::scenario(format!("unknown religion {name}")))?
                    .id;
                host.religions.join(joined.id, religion);
            }
        }

        for site in &scenario.sites {
            let religion = host
                .religions
                .by_name(&site.religion)
                .ok_or_else(|| {
                    EngineError::scenario(format!("unknown religion {}", site.religion))
                })?
                .id;
            let founder = find_player(&host, &site.founder)?.id;
            let [x, y, z] = site.altar;
            let altar = BlockPos::new(x, y, z);
            sites.consecrate(HolySite::new(
                religion,
                site.name.clone(),
                vec![BlockRegion::around(altar, site.radius)],
                altar,
                founder,
                0.0,
            ))?;
        }

        let mut subsystem =
            HolySiteSubsystem::new(config, catalog, &mut host.hub, &mut host.scheduler)?;

        let names: BTreeMap<_, _> = host
            .players
            .online_players()
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let site_names: BTreeMap<_, _> = sites.iter().map(|s| (s.id, s.name.clone())).collect();
        subsystem.area_events().subscribe(move |event: &SiteAreaEvent| {
            let player = names.get(&event.player()).map_or("?", String::as_str);
            let site = site_names.get(&event.site()).map_or("?", String::as_str);
            match event {
                SiteAreaEvent::Entered { .. } => info!(player, site, "Entered holy site"),
                SiteAreaEvent::Exited { .. } => info!(player, site, "Left holy site"),
            }
        });

        let mut replay = Self {
            host,
            sites,
            subsystem,
            delivered: 0,
        };
        replay.dispatch(&HostEvent::WorldLoaded);
        Ok(replay)
    }

    /// Replay every step in order.
    pub fn run(&mut self, steps: &[Step]) -> Result<ReplaySummary, EngineError> {
        let mut summary = ReplaySummary::default();
        for step in steps {
            self.apply(step, &mut summary)?;
            summary.steps = summary.steps.saturating_add(1);
            self.log_new_messages();
        }
        Ok(summary)
    }

    fn apply(&mut self, step: &Step, summary: &mut ReplaySummary) -> Result<(), EngineError> {
        debug!(?step, "Replaying step");
        match step {
            Step::Move { player, to } => {
                let id = find_player(&self.host, player)?.id;
                let [x, y, z] = *to;
                self.host.players.set_position(id, EntityPos::new(x, y, z));
            }
            Step::Give {
                player,
                item,
                quantity,
            } => {
                let id = find_player(&self.host, player)?.id;
                self.host.players.give(id, item, *quantity);
            }
            Step::EmptyHand { player } => {
                let id = find_player(&self.host, player)?.id;
                self.host.players.empty_hand(id);
            }
            Step::Pray { player, site } => {
                let event = HostEvent::AltarUsed(AltarUsed {
                    player: find_player(&self.host, player)?,
                    altar: self.altar_of(site)?,
                    side: Side::Server,
                });
                if let Dispatched::Prayer(ctx) = self.dispatch(&event) {
                    summary.prayers = summary.prayers.saturating_add(1);
                    if ctx.success {
                        summary.answered = summary.answered.saturating_add(1);
                    }
                }
            }
            Step::Break { player, site } => {
                let event = HostEvent::AltarBroken(AltarBroken {
                    player: find_player(&self.host, player)?,
                    altar: self.altar_of(site)?,
                    side: Side::Server,
                });
                if let Dispatched::Destruction(hallow_core::DestructionOutcome::Deconsecrated(_)) =
                    self.dispatch(&event)
                {
                    summary.deconsecrated = summary.deconsecrated.saturating_add(1);
                }
            }
            Step::Wait { hours } => self.host.clock.advance(*hours),
            Step::Tick { ms } => {
                let due = self.host.scheduler.advance(Duration::from_millis(*ms));
                for _ in 0..due {
                    self.dispatch(&HostEvent::Tick);
                }
                summary.scans = summary.scans.saturating_add(due);
            }
            Step::Disconnect { player } => {
                let id = find_player(&self.host, player)?.id;
                self.host.players.disconnect(id);
                self.dispatch(&HostEvent::PlayerDisconnected(id));
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, event: &HostEvent) -> Dispatched {
        let (mut services, _, scheduler) = self.host.parts(&mut self.sites);
        self.subsystem.dispatch(event, &mut services, scheduler)
    }

    /// The altar of a named, still consecrated site.
    fn altar_of(&self, site: &str) -> Result<BlockPos, EngineError> {
        self.sites
            .iter()
            .find(|s| s.name == site)
            .map(|s| s.altar)
            .ok_or_else(|| EngineError::scenario(format!("unknown or deconsecrated site {site}")))
    }

    fn log_new_messages(&mut self) {
        for message in self.host.mailbox.sent.iter().skip(self.delivered) {
            let player = self
                .host
                .players
                .online_players()
                .into_iter()
                .find(|p| p.id == message.player)
                .map_or_else(|| message.player.to_string(), |p| p.name);
            info!(player, channel = ?message.channel, text = message.text, "Message");
        }
        self.delivered = self.host.mailbox.sent.len();
    }

    /// Log the final state of every site, player, and religion, then shut
    /// the subsystem down.
    pub fn finish(mut self, summary: &ReplaySummary) {
        for site in self.sites.iter() {
            let ritual = site
                .active_ritual
                .as_ref()
                .map(|r| format!("{} {}/{}", r.ritual_name, r.contributed, r.required));
            info!(
                site = site.name,
                tier = site.tier(),
                tier_name = tier_name(site.tier()),
                ritual = ritual.as_deref().unwrap_or("none"),
                occupants = self.subsystem.tracker().occupants(site.id).len(),
                "Site summary"
            );
        }
        for player in self.host.players.online_players() {
            info!(
                player = player.name,
                favor = self.host.ledger.favor_of(player.id),
                "Player summary"
            );
        }
        info!(
            steps = summary.steps,
            prayers = summary.prayers,
            answered = summary.answered,
            scans = summary.scans,
            deconsecrated = summary.deconsecrated,
            "Replay finished"
        );
        if self.sites.is_empty() {
            warn!("No holy sites remain");
        }
        self.subsystem
            .shutdown(&mut self.host.hub, &mut self.host.scheduler);
    }
}

fn find_player(host: &LocalHost, name: &str) -> Result<PlayerRef, EngineError> {
    host.players
        .by_name(name)
        .cloned()
        .ok_or_else(|| EngineError::scenario(format!("unknown or disconnected player {name}")))
}
