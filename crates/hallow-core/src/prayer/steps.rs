//! The standard prayer steps.
//!
//! | Step                | Stage after         | Fails the prayer when                  |
//! |---------------------|---------------------|----------------------------------------|
//! | `resolve-site`      | Started             | the altar anchors no site              |
//! | `verify-membership` | Started             | the player's religion does not own it  |
//! | `check-cooldown`    | Validated           | the player prayed too recently         |
//! | `evaluate-offering` | `OfferingEvaluated` | the held item is not a usable offering |
//! | `attempt-ritual`    | `RitualAttempted`   | never                                  |
//! | `apply-rewards`     | `RewardsApplied`    | never (host errors abort the run)      |
//! | `play-effects`      | Completed           | never; completes the prayer            |
//!
//! `attempt-ritual` works on a copy of the site; `apply-rewards` writes it back
//! after the ledger and inventory calls succeed.

use hallow_rites::{Catalog, OfferingEvaluator, OfferingVerdict, RitualContributionService};
use hallow_types::{PrayerEffect, PrayerStage, Religion, SiteId, tier_name};
use tracing::{debug, info};

use crate::config::PrayerConfig;
use crate::host::HostServices;
use crate::prayer::context::PrayerContext;
use crate::prayer::pipeline::{PrayerStep, StepError, StepFlow};

/// The standard steps in execution order.
pub fn standard_steps(catalog: &Catalog, config: &PrayerConfig) -> Vec<Box<dyn PrayerStep>> {
    vec![
        Box::new(ResolveSite),
        Box::new(VerifyMembership),
        Box::new(CheckCooldown {
            cooldown_hours: config.cooldown_hours,
        }),
        Box::new(EvaluateOffering {
            evaluator: OfferingEvaluator::new(catalog),
        }),
        Box::new(AttemptRitual {
            service: RitualContributionService::new(catalog),
        }),
        Box::new(ApplyRewards {
            base_favor: config.base_favor,
        }),
        Box::new(PlayEffects),
    ]
}

fn require_site(ctx: &PrayerContext, step: &'static str) -> Result<SiteId, StepError> {
    ctx.site_id.ok_or(StepError::MissingPrerequisite {
        step,
        missing: "a resolved holy site",
    })
}

fn require_religion<'c>(
    ctx: &'c PrayerContext,
    step: &'static str,
) -> Result<&'c Religion, StepError> {
    ctx.religion.as_ref().ok_or(StepError::MissingPrerequisite {
        step,
        missing: "a verified religion",
    })
}

/// Finds the holy site anchored by the altar.
#[derive(Debug)]
pub struct ResolveSite;

impl PrayerStep for ResolveSite {
    fn name(&self) -> &'static str {
        "resolve-site"
    }

    fn run(
        &self,
        ctx: &mut PrayerContext,
        host: &mut HostServices<'_>,
    ) -> Result<StepFlow, StepError> {
        let Some(site_id) = host.sites.site_by_altar(ctx.altar) else {
            return Ok(ctx.fail("This altar is not consecrated to any holy site."));
        };
        ctx.site_id = Some(site_id);
        Ok(StepFlow::Continue)
    }
}

/// Checks the player belongs to the religion that owns the site.
#[derive(Debug)]
pub struct VerifyMembership;

impl PrayerStep for VerifyMembership {
    fn name(&self) -> &'static str {
        "verify-membership"
    }

    fn run(
        &self,
        ctx: &mut PrayerContext,
        host: &mut HostServices<'_>,
    ) -> Result<StepFlow, StepError> {
        let site_id = require_site(ctx, self.name())?;
        let site = host
            .sites
            .site(site_id)
            .ok_or(StepError::SiteVanished(site_id))?;

        let Some(religion) = host.religions.religion_of(ctx.player.id) else {
            return Ok(ctx.fail("You must belong to a religion to pray at a holy site."));
        };

        if religion.id != site.religion_id {
            let owner = host
                .religions
                .religion(site.religion_id)
                .map_or_else(|| String::from("another religion"), |r| r.name);
            let message = format!("{} is a holy site of {owner}, not {}.", site.name, religion.name);
            return Ok(ctx.fail(message));
        }

        ctx.religion = Some(religion);
        Ok(StepFlow::Continue)
    }
}

/// Rejects prayers made before the player's cooldown has elapsed.
#[derive(Debug)]
pub struct CheckCooldown {
    /// World hours between successful prayers.
    pub cooldown_hours: f64,
}

impl PrayerStep for CheckCooldown {
    fn name(&self) -> &'static str {
        "check-cooldown"
    }

    fn run(
        &self,
        ctx: &mut PrayerContext,
        _host: &mut HostServices<'_>,
    ) -> Result<StepFlow, StepError> {
        if let Some(last) = ctx.last_prayer_hours {
            let elapsed = ctx.world_hours - last;
            if elapsed < self.cooldown_hours {
                let remaining = self.cooldown_hours - elapsed;
                debug!(player = %ctx.player.id, remaining, "Prayer on cooldown");
                return Ok(ctx.fail(format!(
                    "Your deity has not yet answered your last prayer. Wait {remaining:.1} more hour(s)."
                )));
            }
        }
        ctx.stage = PrayerStage::Validated;
        Ok(StepFlow::Continue)
    }
}

/// Judges the held item against the religion's offering table.
#[derive(Debug)]
pub struct EvaluateOffering {
    /// Offering lookup.
    pub evaluator: OfferingEvaluator,
}

impl PrayerStep for EvaluateOffering {
    fn name(&self) -> &'static str {
        "evaluate-offering"
    }

    fn run(
        &self,
        ctx: &mut PrayerContext,
        host: &mut HostServices<'_>,
    ) -> Result<StepFlow, StepError> {
        let Some(item) = ctx.held_item.as_ref().map(|h| h.code.clone()) else {
            ctx.stage = PrayerStage::OfferingEvaluated;
            return Ok(StepFlow::Continue);
        };

        let site_id = require_site(ctx, self.name())?;
        let domain = require_religion(ctx, self.name())?.domain;
        let tier = host
            .sites
            .site(site_id)
            .ok_or(StepError::SiteVanished(site_id))?
            .tier();

        match self.evaluator.evaluate(&item, domain, tier) {
            OfferingVerdict::NoMatch => Ok(ctx.fail(format!(
                "{item} is not a valid offering to a {domain} deity."
            ))),
            OfferingVerdict::TierTooLow { required, current } => Ok(ctx.fail(format!(
                "Your holy site is too weak to receive {item}: it needs a {}, but this is a {}.",
                tier_name(required),
                tier_name(current)
            ))),
            OfferingVerdict::Accepted { offering } => {
                ctx.offering = Some(offering);
                ctx.stage = PrayerStage::OfferingEvaluated;
                Ok(StepFlow::Continue)
            }
        }
    }
}

/// Contributes an accepted offering to a staged copy of the site's ritual.
#[derive(Debug)]
pub struct AttemptRitual {
    /// Ritual rules.
    pub service: RitualContributionService,
}

impl PrayerStep for AttemptRitual {
    fn name(&self) -> &'static str {
        "attempt-ritual"
    }

    fn run(
        &self,
        ctx: &mut PrayerContext,
        host: &mut HostServices<'_>,
    ) -> Result<StepFlow, StepError> {
        if let Some(offering) = ctx.offering.as_ref() {
            let site_id = require_site(ctx, self.name())?;
            let religion = require_religion(ctx, self.name())?;
            let mut staged = host
                .sites
                .site(site_id)
                .ok_or(StepError::SiteVanished(site_id))?
                .clone();
            let result = self.service.contribute(
                &mut staged,
                offering,
                religion,
                ctx.player.id,
                &ctx.player.name,
            );
            debug!(
                site = %site_id,
                success = result.success,
                completed = result.completed,
                "Ritual contribution staged"
            );
            ctx.ritual = Some(result);
            ctx.staged_site = Some(staged);
        }
        ctx.stage = PrayerStage::RitualAttempted;
        Ok(StepFlow::Continue)
    }
}

/// Grants favor and prestige, consumes the offering, then commits the staged
/// site.
///
/// Ledger awards run first so a ledger failure leaves the item in hand and the
/// site untouched.
#[derive(Debug)]
pub struct ApplyRewards {
    /// Favor granted for every successful prayer.
    pub base_favor: u32,
}

impl PrayerStep for ApplyRewards {
    fn name(&self) -> &'static str {
        "apply-rewards"
    }

    fn run(
        &self,
        ctx: &mut PrayerContext,
        host: &mut HostServices<'_>,
    ) -> Result<StepFlow, StepError> {
        let player = ctx.player.id;
        let offering_favor = ctx.offering.as_ref().map_or(0, |o| o.favor);
        let (ritual_favor, prestige) = ctx
            .ritual
            .as_ref()
            .filter(|r| r.completed)
            .map_or((0, 0), |r| (r.favor_reward, r.prestige_reward));
        let favor = self
            .base_favor
            .saturating_add(offering_favor)
            .saturating_add(ritual_favor);

        if let Some(staged) = ctx.staged_site.as_ref()
            && host.sites.site(staged.id).is_none()
        {
            return Err(StepError::SiteVanished(staged.id));
        }
        let religion = if prestige > 0 {
            Some(require_religion(ctx, self.name())?.id)
        } else {
            None
        };

        if favor > 0 {
            host.ledger.award_favor(player, favor, "prayer")?;
        }
        if let Some(religion) = religion {
            host.ledger.award_prestige(religion, prestige, "ritual completion")?;
        }
        if ctx.offering.is_some() {
            host.players.consume_held_item(player, 1)?;
            ctx.offering_consumed = true;
        }
        if let Some(staged) = ctx.staged_site.take() {
            let site_id = staged.id;
            let slot = host
                .sites
                .site_mut(site_id)
                .ok_or(StepError::SiteVanished(site_id))?;
            *slot = staged;
        }

        ctx.favor_awarded = favor;
        ctx.prestige_awarded = prestige;
        ctx.stage = PrayerStage::RewardsApplied;
        Ok(StepFlow::Continue)
    }
}

/// Plays the altar effect and completes the prayer.
#[derive(Debug)]
pub struct PlayEffects;

impl PrayerStep for PlayEffects {
    fn name(&self) -> &'static str {
        "play-effects"
    }

    fn run(
        &self,
        ctx: &mut PrayerContext,
        host: &mut HostServices<'_>,
    ) -> Result<StepFlow, StepError> {
        let effect = match ctx.ritual.as_ref() {
            Some(r) if r.completed => PrayerEffect::RitualComplete,
            Some(r) if r.success => PrayerEffect::RitualProgress,
            _ => PrayerEffect::Prayer,
        };
        host.effects.play(ctx.player.id, ctx.altar, effect);
        ctx.stage = PrayerStage::EffectsPlayed;

        info!(
            player = %ctx.player.id,
            site = ?ctx.site_id,
            favor = ctx.favor_awarded,
            prestige = ctx.prestige_awarded,
            ?effect,
            "Prayer answered"
        );
        let message = compose_message(ctx);
        Ok(ctx.succeed(message))
    }
}

fn compose_message(ctx: &PrayerContext) -> String {
    let mut message = ctx.offering.as_ref().map_or_else(
        || format!("Your prayer is heard. (+{} favor)", ctx.favor_awarded),
        |o| {
            format!(
                "Your offering of {} is accepted. (+{} favor)",
                o.item, ctx.favor_awarded
            )
        },
    );
    if let Some(ritual) = ctx.ritual.as_ref().filter(|r| r.success) {
        message.push(' ');
        message.push_str(&ritual.message);
    }
    if ctx.prestige_awarded > 0 {
        message.push_str(&format!(" (+{} prestige)", ctx.prestige_awarded));
    }
    message
}
