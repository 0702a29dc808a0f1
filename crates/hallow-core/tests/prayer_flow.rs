//! End-to-end prayer, ritual, tracking, and destruction flow through
//! [`HolySiteSubsystem`] on an in-memory host.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use hallow_core::host::{PlayerDirectory, Topic};
use hallow_core::{
    AltarBroken, AltarUsed, Dispatched, DestructionOutcome, HallowConfig, HolySiteSubsystem,
    HostEvent, LocalHost, SiteAreaEvent,
};
use hallow_rites::Catalog;
use hallow_types::{
    BlockPos, BlockRegion, DeityDomain, EntityPos, HolySite, MessageChannel, PlayerRef,
    PrayerEffect, Religion, Side, SiteId,
};
use hallow_world::{SiteDirectory, SiteRegistry};

const CONFIG: &str = r#"
prayer:
  base_favor: 1
  cooldown_hours: 1.0
tracker:
  scan_interval_ms: 500
catalog:
  offerings:
    craft:
      - { item: ingot-copper, favor: 5, min_tier: 1 }
      - { item: ingot-steel, favor: 30, min_tier: 3 }
      - { item: plank-oak, favor: 1, min_tier: 1 }
  rituals:
    craft:
      - code: forge-blessing
        name: Blessing of the Forge
        source_tier: 1
        target_tier: 2
        required: 10
        accepted_items: ["ingot-*"]
        reward: { favor: 20, prestige: 100 }
"#;

const ALTAR: BlockPos = BlockPos::new(100, 64, 100);

struct World {
    host: LocalHost,
    sites: SiteRegistry,
    subsystem: HolySiteSubsystem,
    smith: PlayerRef,
    religion: Religion,
    site: SiteId,
}

impl World {
    fn new() -> Self {
        let config = HallowConfig::parse(CONFIG).unwrap();
        let load = Catalog::load(&config.catalog, config.tiers);
        assert!(load.issues.is_empty(), "{:?}", load.issues);

        let mut host = LocalHost::new();
        let mut sites = SiteRegistry::new();
        let religion = host.religions.found("Hearth of Ore", DeityDomain::Craft);
        let smith = host.players.connect("Smith");
        host.religions.join(smith.id, religion.id);
        let site = sites
            .consecrate(HolySite::new(
                religion.id,
                String::from("Anvil Rest"),
                vec![BlockRegion::around(ALTAR, 6)],
                ALTAR,
                smith.id,
                0.0,
            ))
            .unwrap();

        let subsystem =
            HolySiteSubsystem::new(&config, &load.catalog, &mut host.hub, &mut host.scheduler)
                .unwrap();
        Self {
            host,
            sites,
            subsystem,
            smith,
            religion,
            site,
        }
    }

    fn dispatch(&mut self, event: &HostEvent) -> Dispatched {
        let (mut services, _, scheduler) = self.host.parts(&mut self.sites);
        self.subsystem.dispatch(event, &mut services, scheduler)
    }

    fn pray(&mut self, player: &PlayerRef) -> Dispatched {
        let event = HostEvent::AltarUsed(AltarUsed {
            player: player.clone(),
            altar: ALTAR,
            side: Side::Server,
        });
        self.dispatch(&event)
    }

    fn tier(&self) -> u8 {
        self.sites.site(self.site).unwrap().tier()
    }
}

fn prayer(outcome: Dispatched) -> hallow_core::PrayerContext {
    match outcome {
        Dispatched::Prayer(ctx) => *ctx,
        other => panic!("expected a prayer, got {other:?}"),
    }
}

#[test]
fn ten_ingots_raise_shrine_to_temple() {
    let mut w = World::new();
    w.host.players.give(w.smith.id, "ingot-copper", 64);
    let smith = w.smith.clone();

    for round in 1..=9 {
        let ctx = prayer(w.pray(&smith));
        assert!(ctx.success, "round {round}: {}", ctx.message);
        assert!(ctx.offering_consumed);
        let ritual = ctx.ritual.unwrap();
        assert_eq!(ritual.started, round == 1);
        assert!(!ritual.completed);
        assert_eq!(w.tier(), 1);
        w.host.clock.advance(1.0);
    }

    let progress = w.sites.site(w.site).unwrap().active_ritual.clone().unwrap();
    assert_eq!(progress.contributed, 9);
    assert_eq!(progress.contributors.get(&smith.id), Some(&9));

    let ctx = prayer(w.pray(&smith));
    assert!(ctx.success, "{}", ctx.message);
    let ritual = ctx.ritual.clone().unwrap();
    assert!(ritual.completed);
    assert_eq!(ritual.new_tier, Some(2));
    assert_eq!(w.tier(), 2);
    assert!(w.sites.site(w.site).unwrap().active_ritual.is_none());

    // 1 base + 5 offering, nine times, then 1 + 5 + 20 on completion.
    assert_eq!(ctx.favor_awarded, 26);
    assert_eq!(w.host.ledger.favor_of(smith.id), 9 * 6 + 26);
    assert_eq!(w.host.ledger.prestige_of(w.religion.id), 100);
    assert_eq!(w.host.players.held_item(smith.id).unwrap().quantity, 54);
    assert_eq!(
        w.host.effects.played.last().map(|e| e.effect),
        Some(PrayerEffect::RitualComplete)
    );
    assert!(ctx.message.contains("Temple"));
}

#[test]
fn offering_outside_ritual_still_counts_as_prayer() {
    let mut w = World::new();
    w.host.players.give(w.smith.id, "plank-oak", 1);
    let smith = w.smith.clone();

    let ctx = prayer(w.pray(&smith));
    assert!(ctx.success, "{}", ctx.message);
    assert!(!ctx.ritual.unwrap().success);
    assert_eq!(ctx.favor_awarded, 2);
    assert!(w.sites.site(w.site).unwrap().active_ritual.is_none());
    assert!(w.host.players.held_item(smith.id).is_none());
}

#[test]
fn every_prayer_sends_exactly_one_message() {
    let mut w = World::new();
    let smith = w.smith.clone();
    w.host.players.give(smith.id, "stick", 1);
    prayer(w.pray(&smith));
    w.host.players.empty_hand(smith.id);
    prayer(w.pray(&smith));
    prayer(w.pray(&smith));

    let sent = w.host.mailbox.to(smith.id);
    let channels: Vec<_> = sent.iter().map(|m| m.channel).collect();
    assert_eq!(
        channels,
        vec![
            MessageChannel::Error,
            MessageChannel::Success,
            MessageChannel::Error
        ]
    );
    assert!(sent.first().unwrap().text.contains("not a valid offering"));
}

#[test]
fn tracker_waits_for_world_load_then_reports_crossings() {
    let mut w = World::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    w.subsystem
        .area_events()
        .subscribe(move |e: &SiteAreaEvent| sink.borrow_mut().push(*e));

    let smith = w.smith.clone();
    w.host
        .players
        .set_position(smith.id, EntityPos::new(100.5, 64.0, 100.5));

    assert_eq!(w.dispatch(&HostEvent::Tick), Dispatched::Ignored);
    assert_eq!(w.dispatch(&HostEvent::WorldLoaded), Dispatched::TrackerStarted(true));
    assert_eq!(w.dispatch(&HostEvent::WorldLoaded), Dispatched::TrackerStarted(false));

    let due = w.host.scheduler.advance(Duration::from_millis(1000));
    assert_eq!(due, 2);
    assert_eq!(w.dispatch(&HostEvent::Tick), Dispatched::Scanned(1));
    assert_eq!(w.dispatch(&HostEvent::Tick), Dispatched::Scanned(0));
    assert_eq!(w.subsystem.tracker().occupants(w.site), vec![smith.id]);

    w.host.players.disconnect(smith.id);
    assert_eq!(
        w.dispatch(&HostEvent::PlayerDisconnected(smith.id)),
        Dispatched::Disconnected(true)
    );
    assert_eq!(w.dispatch(&HostEvent::Tick), Dispatched::Scanned(0));

    assert_eq!(
        *seen.borrow(),
        vec![
            SiteAreaEvent::Entered {
                player: smith.id,
                site: w.site
            },
            SiteAreaEvent::Exited {
                player: smith.id,
                site: w.site
            },
        ]
    );
}

#[test]
fn breaking_the_altar_ends_the_site() {
    let mut w = World::new();
    let smith = w.smith.clone();
    let event = HostEvent::AltarBroken(AltarBroken {
        player: smith.clone(),
        altar: ALTAR,
        side: Side::Server,
    });
    assert_eq!(
        w.dispatch(&event),
        Dispatched::Destruction(DestructionOutcome::Deconsecrated(w.site))
    );
    assert!(w.sites.is_empty());
    assert_eq!(
        w.dispatch(&event),
        Dispatched::Destruction(DestructionOutcome::NoSite)
    );

    w.host.mailbox.sent.clear();
    let ctx = prayer(w.pray(&smith));
    assert!(!ctx.success);
    assert_eq!(w.host.mailbox.sent.len(), 1);
}

#[test]
fn shutdown_releases_every_registration() {
    let mut w = World::new();
    assert_eq!(w.host.hub.subscribers(Topic::AltarUsed), 1);
    assert_eq!(w.host.hub.subscribers(Topic::AltarBroken), 1);
    w.dispatch(&HostEvent::WorldLoaded);

    w.subsystem.shutdown(&mut w.host.hub, &mut w.host.scheduler);
    assert_eq!(w.host.hub.subscribers(Topic::AltarUsed), 0);
    assert_eq!(w.host.hub.subscribers(Topic::AltarBroken), 0);
    assert_eq!(w.host.scheduler.periodic_count(), 0);
    assert_eq!(w.host.scheduler.world_loaded_listeners(), 0);
    assert_eq!(w.host.scheduler.disconnect_listeners(), 0);

    let smith = w.smith.clone();
    assert_eq!(w.pray(&smith), Dispatched::Ignored);
    assert_eq!(w.dispatch(&HostEvent::WorldLoaded), Dispatched::Ignored);
}
