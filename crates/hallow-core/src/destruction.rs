//! Deconsecration when an altar is broken.

use hallow_types::{MessageChannel, Side, SiteId};
use hallow_world::SiteDirectory;
use tracing::{debug, info, warn};

use crate::host::{AltarBroken, EventHub, Messenger, SubscriptionId, Topic};

/// What breaking an altar did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructionOutcome {
    /// The event was not handled (client side, or the handler is disposed).
    Ignored,
    /// The altar anchored no site.
    NoSite,
    /// The site was deconsecrated.
    Deconsecrated(SiteId),
    /// Deconsecration failed; the site is left as it was.
    Failed(SiteId),
}

/// Deconsecrates the holy site anchored by a broken altar.
#[derive(Debug)]
pub struct AltarDestructionHandler {
    subscription: Option<SubscriptionId>,
}

impl AltarDestructionHandler {
    /// Create the handler and subscribe it to altar-broken events.
    pub fn new(hub: &mut dyn EventHub) -> Self {
        Self {
            subscription: Some(hub.subscribe(Topic::AltarBroken)),
        }
    }

    /// Whether the handler still receives events.
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Handle one broken altar. Never fails; problems are logged.
    pub fn on_altar_broken(
        &self,
        event: &AltarBroken,
        sites: &mut dyn SiteDirectory,
        messenger: &mut dyn Messenger,
    ) -> DestructionOutcome {
        if self.subscription.is_none() || event.side == Side::Client {
            return DestructionOutcome::Ignored;
        }

        let Some(site_id) = sites.site_by_altar(event.altar) else {
            debug!(altar = %event.altar, "Broken block anchored no holy site");
            return DestructionOutcome::NoSite;
        };

        match sites.deconsecrate(site_id) {
            Ok(site) => {
                info!(
                    site = %site.id,
                    name = site.name,
                    religion = %site.religion_id,
                    player = %event.player.id,
                    "Holy site deconsecrated by altar destruction"
                );
                messenger.send(
                    event.player.id,
                    MessageChannel::Success,
                    &format!(
                        "You destroyed the altar of {}. The holy site has been deconsecrated.",
                        site.name
                    ),
                );
                DestructionOutcome::Deconsecrated(site_id)
            }
            Err(err) => {
                warn!(
                    site = %site_id,
                    altar = %event.altar,
                    error = %err,
                    "Failed to deconsecrate holy site"
                );
                DestructionOutcome::Failed(site_id)
            }
        }
    }

    /// Unsubscribe. Later events are ignored.
    pub fn dispose(&mut self, hub: &mut dyn EventHub) {
        if let Some(id) = self.subscription.take() {
            hub.unsubscribe(id);
        }
    }
}
