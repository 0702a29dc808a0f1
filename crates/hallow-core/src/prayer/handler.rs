//! Turns altar-use events into prayers.

use std::collections::BTreeMap;

use hallow_types::{MessageChannel, PlayerId, Side};
use tracing::{debug, info};

use crate::host::{AltarUsed, EventHub, HostServices, SubscriptionId, Topic};
use crate::prayer::context::PrayerContext;
use crate::prayer::pipeline::PrayerPipeline;

const UNANSWERED: &str = "Your prayer went unanswered.";

/// Runs the prayer pipeline for each server-side altar use and reports the
/// outcome to the player.
///
/// Owns the per-player cooldown book: the world time of each player's last
/// successful prayer.
#[derive(Debug)]
pub struct AltarPrayerHandler {
    pipeline: PrayerPipeline,
    subscription: Option<SubscriptionId>,
    last_prayer: BTreeMap<PlayerId, f64>,
}

impl AltarPrayerHandler {
    /// Create the handler and subscribe it to altar-use events.
    pub fn new(pipeline: PrayerPipeline, hub: &mut dyn EventHub) -> Self {
        let subscription = hub.subscribe(Topic::AltarUsed);
        debug!(steps = pipeline.len(), "Altar prayer handler subscribed");
        Self {
            pipeline,
            subscription: Some(subscription),
            last_prayer: BTreeMap::new(),
        }
    }

    /// Whether the handler still receives events.
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// World time of the player's last successful prayer.
    pub fn last_prayer(&self, player: PlayerId) -> Option<f64> {
        self.last_prayer.get(&player).copied()
    }

    /// Handle one altar use.
    ///
    /// Returns the finished context, or `None` when the event was ignored
    /// (client side, or the handler is disposed). Exactly one message is
    /// sent to the player for every prayer run.
    pub fn on_altar_used(
        &mut self,
        event: &AltarUsed,
        host: &mut HostServices<'_>,
    ) -> Option<PrayerContext> {
        if self.subscription.is_none() || event.side == Side::Client {
            return None;
        }

        let player = event.player.id;
        let mut ctx = PrayerContext::new(
            event.player.clone(),
            event.altar,
            host.players.held_item(player),
            host.clock.total_hours(),
        );
        ctx.last_prayer_hours = self.last_prayer(player);

        self.pipeline.execute(&mut ctx, host);

        if ctx.success {
            self.last_prayer.insert(player, ctx.world_hours);
        }

        let channel = if ctx.success {
            MessageChannel::Success
        } else {
            MessageChannel::Error
        };
        let text = if ctx.message.is_empty() {
            UNANSWERED
        } else {
            ctx.message.as_str()
        };
        host.messenger.send(player, channel, text);

        Some(ctx)
    }

    /// Unsubscribe. Later events are ignored.
    pub fn dispose(&mut self, hub: &mut dyn EventHub) {
        if let Some(id) = self.subscription.take() {
            hub.unsubscribe(id);
            self.last_prayer.clear();
            info!("Altar prayer handler disposed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hallow_rites::Catalog;
    use hallow_types::{BlockPos, BlockRegion, DeityDomain, HolySite, PlayerRef};
    use hallow_world::SiteRegistry;

    use super::*;
    use crate::config::PrayerConfig;
    use crate::local::LocalHost;

    const ALTAR: BlockPos = BlockPos::new(4, 70, -4);

    fn setup() -> (LocalHost, SiteRegistry, PlayerRef, AltarPrayerHandler) {
        let mut host = LocalHost::new();
        let mut sites = SiteRegistry::new();
        let religion = host.religions.found("Hearth of Ore", DeityDomain::Craft);
        let player = host.players.connect("Aldric");
        host.religions.join(player.id, religion.id);
        sites
            .consecrate(HolySite::new(
                religion.id,
                String::from("Anvil Rest"),
                vec![BlockRegion::around(ALTAR, 4)],
                ALTAR,
                player.id,
                0.0,
            ))
            .unwrap();
        let pipeline =
            PrayerPipeline::standard(&Catalog::default(), &PrayerConfig::default()).unwrap();
        let handler = AltarPrayerHandler::new(pipeline, &mut host.hub);
        (host, sites, player, handler)
    }

    fn used(player: &PlayerRef, side: Side) -> AltarUsed {
        AltarUsed {
            player: player.clone(),
            altar: ALTAR,
            side,
        }
    }

    #[test]
    fn subscribes_on_construction() {
        let (host, _, _, handler) = setup();
        assert!(handler.is_subscribed());
        assert_eq!(host.hub.subscribers(Topic::AltarUsed), 1);
    }

    #[test]
    fn successful_prayer_sends_one_success_message() {
        let (mut host, mut sites, player, mut handler) = setup();
        let (mut services, _, _) = host.parts(&mut sites);
        let ctx = handler
            .on_altar_used(&used(&player, Side::Server), &mut services)
            .unwrap();
        assert!(ctx.success);
        assert_eq!(host.mailbox.sent.len(), 1);
        assert_eq!(
            host.mailbox.sent.first().map(|m| m.channel),
            Some(MessageChannel::Success)
        );
        assert!(handler.last_prayer(player.id).is_some());
    }

    #[test]
    fn second_prayer_within_cooldown_is_refused() {
        let (mut host, mut sites, player, mut handler) = setup();
        {
            let (mut services, _, _) = host.parts(&mut sites);
            handler.on_altar_used(&used(&player, Side::Server), &mut services);
        }
        host.clock.advance(0.25);
        let (mut services, _, _) = host.parts(&mut sites);
        let ctx = handler
            .on_altar_used(&used(&player, Side::Server), &mut services)
            .unwrap();
        assert!(!ctx.success);
        assert_eq!(
            host.mailbox.sent.last().map(|m| m.channel),
            Some(MessageChannel::Error)
        );
        assert_eq!(host.ledger.favor_of(player.id), 1);
    }

    #[test]
    fn client_side_events_are_ignored() {
        let (mut host, mut sites, player, mut handler) = setup();
        let (mut services, _, _) = host.parts(&mut sites);
        assert!(
            handler
                .on_altar_used(&used(&player, Side::Client), &mut services)
                .is_none()
        );
        assert!(host.mailbox.sent.is_empty());
    }

    #[test]
    fn disposed_handler_ignores_events() {
        let (mut host, mut sites, player, mut handler) = setup();
        handler.dispose(&mut host.hub);
        assert!(!handler.is_subscribed());
        assert_eq!(host.hub.subscribers(Topic::AltarUsed), 0);

        let (mut services, _, _) = host.parts(&mut sites);
        assert!(
            handler
                .on_altar_used(&used(&player, Side::Server), &mut services)
                .is_none()
        );
        assert!(host.mailbox.sent.is_empty());
    }

    #[test]
    fn empty_pipeline_still_answers_once() {
        let mut host = LocalHost::new();
        let mut sites = SiteRegistry::new();
        let player = host.players.connect("Brenna");
        let mut handler =
            AltarPrayerHandler::new(PrayerPipeline::new(Vec::new()).unwrap(), &mut host.hub);
        let (mut services, _, _) = host.parts(&mut sites);
        let ctx = handler
            .on_altar_used(&used(&player, Side::Server), &mut services)
            .unwrap();
        assert!(!ctx.success);
        assert_eq!(host.mailbox.sent.len(), 1);
        assert_eq!(
            host.mailbox.sent.first().map(|m| m.text.as_str()),
            Some(UNANSWERED)
        );
    }
}
