//! Ritual contribution: auto-discovers and advances tier-upgrade rituals
//! from accepted offerings.
//!
//! # Contribution algorithm
//!
//! 1. **Discard stale progress**: an active ritual whose definition is gone,
//!    or whose source tier no longer equals the site's tier, is dropped.
//! 2. **Discover**: with no active ritual, the first ritual of the religion's
//!    domain whose source tier equals the site's tier and which accepts the
//!    offered item is started.
//! 3. **Advance**: an offering the active ritual does not accept fails
//!    without touching progress; otherwise the contribution is recorded.
//! 4. **Complete**: reaching the required count raises the site to the
//!    ritual's target tier, clears the progress, and grants the rewards.

use std::collections::BTreeMap;

use hallow_types::{DeityDomain, HolySite, Offering, PlayerId, Religion, Ritual, RitualProgress};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;

/// Immutable outcome of one contribution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RitualAttemptResult {
    /// Whether the offering counted toward a ritual.
    pub success: bool,
    /// Whether this attempt started a new ritual.
    pub started: bool,
    /// Whether this attempt completed the ritual.
    pub completed: bool,
    /// Player-facing description of what happened.
    pub message: String,
    /// Favor granted on completion (0 otherwise).
    pub favor_reward: u32,
    /// Prestige granted on completion (0 otherwise).
    pub prestige_reward: u32,
    /// The site's tier after completion.
    pub new_tier: Option<u8>,
    /// Whether the offered item was used up by the ritual.
    pub consume_offering: bool,
}

impl RitualAttemptResult {
    fn rejected(message: String) -> Self {
        Self {
            success: false,
            started: false,
            completed: false,
            message,
            favor_reward: 0,
            prestige_reward: 0,
            new_tier: None,
            consume_offering: false,
        }
    }

    fn progressed(started: bool, message: String) -> Self {
        Self {
            success: true,
            started,
            completed: false,
            message,
            favor_reward: 0,
            prestige_reward: 0,
            new_tier: None,
            consume_offering: true,
        }
    }

    fn completed(started: bool, ritual: &Ritual, message: String) -> Self {
        Self {
            success: true,
            started,
            completed: true,
            message,
            favor_reward: ritual.reward.favor,
            prestige_reward: ritual.reward.prestige,
            new_tier: Some(ritual.target_tier),
            consume_offering: true,
        }
    }
}

/// Stateless service over the ritual tables; all ritual state lives on the
/// [`HolySite`] passed in.
#[derive(Debug, Clone, Default)]
pub struct RitualContributionService {
    rituals: BTreeMap<DeityDomain, Vec<Ritual>>,
}

impl RitualContributionService {
    /// Index every domain's ritual table from the catalog.
    pub fn new(catalog: &Catalog) -> Self {
        let rituals = DeityDomain::ALL
            .into_iter()
            .map(|domain| (domain, catalog.rituals(domain).to_vec()))
            .collect();
        Self { rituals }
    }

    /// Look up a ritual definition by code.
    pub fn ritual(&self, domain: DeityDomain, code: &str) -> Option<&Ritual> {
        self.rituals
            .get(&domain)?
            .iter()
            .find(|r| r.code == code)
    }

    /// Rituals a site of `tier` could start in `domain`.
    pub fn available_rituals(&self, domain: DeityDomain, tier: u8) -> Vec<&Ritual> {
        self.rituals
            .get(&domain)
            .map(|rs| rs.iter().filter(|r| r.source_tier == tier).collect())
            .unwrap_or_default()
    }

    /// Contribute an accepted offering to the site's ritual.
    ///
    /// Mutates `site` only when the offering counts: starting a ritual,
    /// advancing it, or completing it (tier raise + progress cleared).
    pub fn contribute(
        &self,
        site: &mut HolySite,
        offering: &Offering,
        religion: &Religion,
        player_id: PlayerId,
        player_name: &str,
    ) -> RitualAttemptResult {
        if religion.id != site.religion_id {
            return RitualAttemptResult::rejected(format!(
                "{} is not a holy site of {}.",
                site.name, religion.name
            ));
        }

        self.discard_stale_progress(site, religion.domain);

        let mut started = false;
        if site.active_ritual.is_none() {
            let Some(ritual) = self.discover(religion.domain, site.tier(), &offering.item) else {
                return RitualAttemptResult::rejected(format!(
                    "No ritual of a {} accepts {}.",
                    site.tier_name(),
                    offering.item
                ));
            };
            info!(
                site = %site.id,
                ritual = ritual.code,
                source_tier = ritual.source_tier,
                target_tier = ritual.target_tier,
                player = player_name,
                "Ritual started"
            );
            site.active_ritual = Some(RitualProgress::start(ritual));
            started = true;
        }

        let Some(progress) = site.active_ritual.as_mut() else {
            return RitualAttemptResult::rejected(String::from("No ritual is in progress."));
        };
        let Some(ritual) = self.ritual(religion.domain, &progress.ritual_code) else {
            return RitualAttemptResult::rejected(String::from("No ritual is in progress."));
        };

        if !ritual.accepts(&offering.item) {
            debug!(
                site = %site.id,
                ritual = ritual.code,
                item = offering.item,
                "Offering does not fit the active ritual"
            );
            return RitualAttemptResult::rejected(format!(
                "The {} does not call for {}.",
                ritual.name, offering.item
            ));
        }

        progress.record(player_id);

        if progress.is_complete() {
            site.active_ritual = None;
            site.raise_tier(ritual.target_tier);
            info!(
                site = %site.id,
                ritual = ritual.code,
                tier = site.tier(),
                player = player_name,
                "Ritual completed"
            );
            return RitualAttemptResult::completed(
                started,
                ritual,
                format!(
                    "{player_name} completed the {}! {} is now a {}.",
                    ritual.name,
                    site.name,
                    site.tier_name()
                ),
            );
        }

        let message = format!(
            "{player_name} {} the {} ({}/{}).",
            if started { "began" } else { "contributed to" },
            ritual.name,
            progress.contributed,
            progress.required
        );
        RitualAttemptResult::progressed(started, message)
    }

    fn discover(&self, domain: DeityDomain, tier: u8, item: &str) -> Option<&Ritual> {
        self.rituals
            .get(&domain)?
            .iter()
            .find(|r| r.source_tier == tier && r.accepts(item))
    }

    fn discard_stale_progress(&self, site: &mut HolySite, domain: DeityDomain) {
        let Some(progress) = &site.active_ritual else {
            return;
        };
        let current = self
            .ritual(domain, &progress.ritual_code)
            .is_some_and(|r| r.source_tier == site.tier() && progress.source_tier == site.tier());
        if !current {
            warn!(
                site = %site.id,
                ritual = progress.ritual_code,
                progress_tier = progress.source_tier,
                site_tier = site.tier(),
                "Discarding stale ritual progress"
            );
            site.active_ritual = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hallow_types::{BlockPos, BlockRegion, ReligionId, RitualReward};

    use super::*;

    fn forge_ritual() -> Ritual {
        Ritual {
            code: String::from("forge-blessing"),
            name: String::from("Blessing of the Forge"),
            domain: DeityDomain::Craft,
            source_tier: 1,
            target_tier: 2,
            required: 10,
            accepted_items: vec![String::from("ingot-*")],
            reward: RitualReward {
                favor: 25,
                prestige: 100,
            },
        }
    }

    fn service() -> RitualContributionService {
        let mut rituals = BTreeMap::new();
        rituals.insert(DeityDomain::Craft, vec![forge_ritual()]);
        RitualContributionService::new(&Catalog::from_parts(BTreeMap::new(), rituals))
    }

    fn religion() -> Religion {
        Religion {
            id: ReligionId::new(),
            name: String::from("Order of the Anvil"),
            domain: DeityDomain::Craft,
        }
    }

    fn site_for(religion: &Religion) -> HolySite {
        HolySite::new(
            religion.id,
            "Anvil Rock",
            vec![BlockRegion::around(BlockPos::new(0, 64, 0), 4)],
            BlockPos::new(0, 64, 0),
            PlayerId::new(),
            0.0,
        )
    }

    fn offering(item: &str) -> Offering {
        Offering {
            item: item.to_owned(),
            favor: 5,
            min_tier: 1,
        }
    }

    #[test]
    fn first_matching_offering_starts_ritual() {
        let service = service();
        let religion = religion();
        let mut site = site_for(&religion);

        let result = service.contribute(
            &mut site,
            &offering("ingot-copper"),
            &religion,
            PlayerId::new(),
            "Aldra",
        );

        assert!(result.success);
        assert!(result.started);
        assert!(!result.completed);
        assert!(result.consume_offering);
        let progress = site.active_ritual.as_ref().unwrap();
        assert_eq!(progress.ritual_code, "forge-blessing");
        assert_eq!(progress.contributed, 1);
    }

    #[test]
    fn unmatched_offering_does_not_start_ritual() {
        let service = service();
        let religion = religion();
        let mut site = site_for(&religion);
        let before = site.clone();

        let result = service.contribute(
            &mut site,
            &offering("plank-oak"),
            &religion,
            PlayerId::new(),
            "Aldra",
        );

        assert!(!result.success);
        assert!(!result.started);
        assert!(!result.consume_offering);
        assert_eq!(site, before);
    }

    #[test]
    fn ritual_for_another_tier_does_not_start() {
        let service = service();
        let religion = religion();
        let mut site = site_for(&religion);
        site.raise_tier(2);
        let before = site.clone();

        let result = service.contribute(
            &mut site,
            &offering("ingot-copper"),
            &religion,
            PlayerId::new(),
            "Aldra",
        );

        assert!(!result.success);
        assert_eq!(site, before);
    }

    #[test]
    fn mismatched_offering_leaves_active_progress_untouched() {
        let mut rituals = BTreeMap::new();
        let mut open = forge_ritual();
        open.code = String::from("open-hearth");
        open.accepted_items.clear();
        rituals.insert(DeityDomain::Craft, vec![forge_ritual(), open]);
        let service =
            RitualContributionService::new(&Catalog::from_parts(BTreeMap::new(), rituals));
        let religion = religion();
        let mut site = site_for(&religion);
        let player = PlayerId::new();

        service.contribute(&mut site, &offering("ingot-copper"), &religion, player, "Aldra");
        let before = site.clone();

        // The open-hearth ritual would accept it, but forge-blessing is active.
        let result = service.contribute(&mut site, &offering("plank-oak"), &religion, player, "Aldra");

        assert!(!result.success);
        assert!(!result.started);
        assert_eq!(site, before);
    }

    #[test]
    fn tenth_contribution_completes_and_raises_tier() {
        let service = service();
        let religion = religion();
        let mut site = site_for(&religion);
        let player = PlayerId::new();

        for call in 1..=9 {
            let result =
                service.contribute(&mut site, &offering("ingot-copper"), &religion, player, "Aldra");
            assert!(result.success, "call {call} failed");
            assert!(!result.completed, "call {call} completed early");
            assert_eq!(site.tier(), 1);
        }

        let result =
            service.contribute(&mut site, &offering("ingot-tin"), &religion, player, "Aldra");
        assert!(result.completed);
        assert_eq!(result.new_tier, Some(2));
        assert_eq!(result.favor_reward, 25);
        assert_eq!(result.prestige_reward, 100);
        assert_eq!(site.tier(), 2);
        assert!(site.active_ritual.is_none());
    }

    #[test]
    fn ritual_of_required_one_starts_and_completes_in_one_call() {
        let mut ritual = forge_ritual();
        ritual.required = 1;
        let mut rituals = BTreeMap::new();
        rituals.insert(DeityDomain::Craft, vec![ritual]);
        let service =
            RitualContributionService::new(&Catalog::from_parts(BTreeMap::new(), rituals));
        let religion = religion();
        let mut site = site_for(&religion);

        let result = service.contribute(
            &mut site,
            &offering("ingot-gold"),
            &religion,
            PlayerId::new(),
            "Aldra",
        );
        assert!(result.started);
        assert!(result.completed);
        assert_eq!(site.tier(), 2);
    }

    #[test]
    fn stale_progress_from_another_tier_is_discarded() {
        let service = service();
        let religion = religion();
        let mut site = site_for(&religion);
        site.active_ritual = Some(RitualProgress::start(&forge_ritual()));
        site.raise_tier(2);

        let result = service.contribute(
            &mut site,
            &offering("ingot-copper"),
            &religion,
            PlayerId::new(),
            "Aldra",
        );

        assert!(!result.success);
        assert!(site.active_ritual.is_none());
        assert_eq!(site.tier(), 2);
    }

    #[test]
    fn other_religion_cannot_contribute() {
        let service = service();
        let owner = religion();
        let outsider = religion();
        let mut site = site_for(&owner);
        let before = site.clone();

        let result = service.contribute(
            &mut site,
            &offering("ingot-copper"),
            &outsider,
            PlayerId::new(),
            "Aldra",
        );
        assert!(!result.success);
        assert_eq!(site, before);
    }

    #[test]
    fn available_rituals_filters_by_tier() {
        let service = service();
        assert_eq!(service.available_rituals(DeityDomain::Craft, 1).len(), 1);
        assert!(service.available_rituals(DeityDomain::Craft, 2).is_empty());
        assert!(service.available_rituals(DeityDomain::Wild, 1).is_empty());
    }
}
