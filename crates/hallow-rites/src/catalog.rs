//! The offering and ritual catalog, loaded once at startup.
//!
//! The raw form mirrors the `catalog` section of `hallow-config.yaml`:
//!
//! ```yaml
//! catalog:
//!   offerings:
//!     craft:
//!       - { item: ingot-copper, favor: 5, min_tier: 1 }
//!   rituals:
//!     craft:
//!       - code: forge-blessing
//!         name: Blessing of the Forge
//!         source_tier: 1
//!         target_tier: 2
//!         required: 10
//!         accepted_items: ["ingot-*"]
//!         reward: { favor: 25, prestige: 100 }
//! ```
//!
//! Each domain's table is parsed and validated on its own. A table that
//! fails to parse, or that contains a single invalid entry, is logged at
//! error level and replaced by an empty table, so the domain simply has no
//! offerings or rituals until the configuration is fixed.

use std::collections::{BTreeMap, BTreeSet};

use hallow_types::{DeityDomain, Offering, Ritual, RitualReward};
use serde::Deserialize;
use tracing::{error, info};

use crate::config::TierConfig;
use crate::error::CatalogError;

const OFFERINGS: &str = "offerings";
const RITUALS: &str = "rituals";

/// Unvalidated catalog as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCatalog {
    /// Domain key -> list of offering entries.
    #[serde(default)]
    pub offerings: BTreeMap<String, serde_yml::Value>,

    /// Domain key -> list of ritual entries.
    #[serde(default)]
    pub rituals: BTreeMap<String, serde_yml::Value>,
}

#[derive(Debug, Deserialize)]
struct OfferingEntry {
    item: String,
    favor: u32,
    #[serde(default = "default_min_tier")]
    min_tier: u8,
}

#[derive(Debug, Deserialize)]
struct RitualEntry {
    code: String,
    #[serde(default)]
    name: Option<String>,
    source_tier: u8,
    target_tier: u8,
    required: u32,
    #[serde(default)]
    accepted_items: Vec<String>,
    #[serde(default)]
    reward: RewardEntry,
}

#[derive(Debug, Default, Deserialize)]
struct RewardEntry {
    #[serde(default)]
    favor: u32,
    #[serde(default)]
    prestige: u32,
}

const fn default_min_tier() -> u8 {
    1
}

/// Validated, immutable offering and ritual tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    offerings: BTreeMap<DeityDomain, Vec<Offering>>,
    rituals: BTreeMap<DeityDomain, Vec<Ritual>>,
}

/// Outcome of [`Catalog::load`]: the usable catalog plus every problem found.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    /// The catalog with invalid domain tables emptied.
    pub catalog: Catalog,
    /// Problems found while loading, in discovery order.
    pub issues: Vec<CatalogError>,
}

impl Catalog {
    /// Build a catalog directly from already-validated parts.
    pub const fn from_parts(
        offerings: BTreeMap<DeityDomain, Vec<Offering>>,
        rituals: BTreeMap<DeityDomain, Vec<Ritual>>,
    ) -> Self {
        Self { offerings, rituals }
    }

    /// Validate a raw catalog.
    ///
    /// Never fails: every problem is logged and reported in
    /// [`CatalogLoad::issues`], and the affected domain table is left empty.
    pub fn load(raw: &RawCatalog, tiers: TierConfig) -> CatalogLoad {
        let mut issues = Vec::new();
        let mut offerings = BTreeMap::new();
        let mut rituals = BTreeMap::new();

        for (key, value) in &raw.offerings {
            let Some(domain) = parse_domain(key, OFFERINGS, &mut issues) else {
                continue;
            };
            let table = load_offering_table(domain, value, tiers).unwrap_or_else(|mut found| {
                issues.append(&mut found);
                Vec::new()
            });
            offerings.insert(domain, table);
        }

        for (key, value) in &raw.rituals {
            let Some(domain) = parse_domain(key, RITUALS, &mut issues) else {
                continue;
            };
            let table = load_ritual_table(domain, value, tiers).unwrap_or_else(|mut found| {
                issues.append(&mut found);
                Vec::new()
            });
            rituals.insert(domain, table);
        }

        for issue in &issues {
            error!(%issue, "Catalog entry rejected");
        }

        let catalog = Self { offerings, rituals };
        info!(
            offerings = catalog.offering_count(),
            rituals = catalog.ritual_count(),
            issues = issues.len(),
            "Offering and ritual catalog loaded"
        );
        CatalogLoad { catalog, issues }
    }

    /// The offering table for a domain (empty if none configured).
    pub fn offerings(&self, domain: DeityDomain) -> &[Offering] {
        self.offerings.get(&domain).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The ritual table for a domain (empty if none configured).
    pub fn rituals(&self, domain: DeityDomain) -> &[Ritual] {
        self.rituals.get(&domain).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of offerings across all domains.
    pub fn offering_count(&self) -> usize {
        self.offerings.values().map(Vec::len).sum()
    }

    /// Total number of rituals across all domains.
    pub fn ritual_count(&self) -> usize {
        self.rituals.values().map(Vec::len).sum()
    }
}

fn parse_domain(
    key: &str,
    table: &'static str,
    issues: &mut Vec<CatalogError>,
) -> Option<DeityDomain> {
    match key.parse::<DeityDomain>() {
        Ok(domain) => Some(domain),
        Err(_) => {
            issues.push(CatalogError::UnknownDomain {
                key: key.to_owned(),
                table,
            });
            None
        }
    }
}

fn load_offering_table(
    domain: DeityDomain,
    value: &serde_yml::Value,
    tiers: TierConfig,
) -> Result<Vec<Offering>, Vec<CatalogError>> {
    let entries: Vec<OfferingEntry> = serde_yml::from_value(value.clone()).map_err(|e| {
        vec![CatalogError::MalformedTable {
            domain,
            table: OFFERINGS,
            message: e.to_string(),
        }]
    })?;

    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();
    let mut table = Vec::with_capacity(entries.len());

    for entry in entries {
        let reason = if entry.item.trim().is_empty() {
            Some(String::from("item code is empty"))
        } else if entry.favor == 0 {
            Some(String::from("favor must be positive"))
        } else if entry.min_tier == 0 || entry.min_tier > tiers.max_tier {
            Some(format!(
                "min_tier {} outside 1..={}",
                entry.min_tier, tiers.max_tier
            ))
        } else if !seen.insert(entry.item.clone()) {
            Some(String::from("item listed twice"))
        } else {
            None
        };

        if let Some(reason) = reason {
            issues.push(CatalogError::InvalidOffering {
                domain,
                item: entry.item,
                reason,
            });
            continue;
        }

        table.push(Offering {
            item: entry.item,
            favor: entry.favor,
            min_tier: entry.min_tier,
        });
    }

    if issues.is_empty() { Ok(table) } else { Err(issues) }
}

fn load_ritual_table(
    domain: DeityDomain,
    value: &serde_yml::Value,
    tiers: TierConfig,
) -> Result<Vec<Ritual>, Vec<CatalogError>> {
    let entries: Vec<RitualEntry> = serde_yml::from_value(value.clone()).map_err(|e| {
        vec![CatalogError::MalformedTable {
            domain,
            table: RITUALS,
            message: e.to_string(),
        }]
    })?;

    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();
    let mut table = Vec::with_capacity(entries.len());

    for entry in entries {
        let reason = if entry.code.trim().is_empty() {
            Some(String::from("code is empty"))
        } else if entry.source_tier == 0 {
            Some(String::from("source_tier must be at least 1"))
        } else if entry.target_tier <= entry.source_tier {
            Some(format!(
                "target_tier {} must be above source_tier {}",
                entry.target_tier, entry.source_tier
            ))
        } else if entry.target_tier > tiers.max_tier {
            Some(format!(
                "target_tier {} exceeds max tier {}",
                entry.target_tier, tiers.max_tier
            ))
        } else if entry.required == 0 {
            Some(String::from("required must be positive"))
        } else if entry.accepted_items.iter().any(|p| p.trim().is_empty()) {
            Some(String::from("accepted_items contains an empty pattern"))
        } else if !seen.insert(entry.code.clone()) {
            Some(String::from("code listed twice"))
        } else {
            None
        };

        if let Some(reason) = reason {
            issues.push(CatalogError::InvalidRitual {
                domain,
                code: entry.code,
                reason,
            });
            continue;
        }

        let name = entry.name.unwrap_or_else(|| entry.code.clone());
        table.push(Ritual {
            code: entry.code,
            name,
            domain,
            source_tier: entry.source_tier,
            target_tier: entry.target_tier,
            required: entry.required,
            accepted_items: entry.accepted_items,
            reward: RitualReward {
                favor: entry.reward.favor,
                prestige: entry.reward.prestige,
            },
        });
    }

    if issues.is_empty() { Ok(table) } else { Err(issues) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw(yaml: &str) -> RawCatalog {
        serde_yml::from_str(yaml).unwrap()
    }

    const VALID: &str = r#"
offerings:
  craft:
    - { item: ingot-copper, favor: 5, min_tier: 1 }
    - { item: ingot-iron, favor: 12, min_tier: 2 }
  wild:
    - { item: hide-raw, favor: 3 }
rituals:
  craft:
    - code: forge-blessing
      name: Blessing of the Forge
      source_tier: 1
      target_tier: 2
      required: 10
      accepted_items: ["ingot-*"]
      reward: { favor: 25, prestige: 100 }
"#;

    #[test]
    fn loads_valid_catalog() {
        let load = Catalog::load(&raw(VALID), TierConfig::default());
        assert!(load.issues.is_empty(), "{:?}", load.issues);
        assert_eq!(load.catalog.offering_count(), 3);
        assert_eq!(load.catalog.ritual_count(), 1);

        let wild = load.catalog.offerings(DeityDomain::Wild);
        assert_eq!(wild.first().map(|o| o.min_tier), Some(1));

        let ritual = load.catalog.rituals(DeityDomain::Craft).first().unwrap();
        assert_eq!(ritual.name, "Blessing of the Forge");
        assert_eq!(ritual.reward.prestige, 100);
        assert_eq!(ritual.domain, DeityDomain::Craft);
    }

    #[test]
    fn unconfigured_domain_has_empty_tables() {
        let load = Catalog::load(&raw(VALID), TierConfig::default());
        assert!(load.catalog.offerings(DeityDomain::Conquest).is_empty());
        assert!(load.catalog.rituals(DeityDomain::Wild).is_empty());
    }

    #[test]
    fn one_invalid_offering_empties_the_domain() {
        let yaml = r#"
offerings:
  craft:
    - { item: ingot-copper, favor: 5 }
    - { item: ingot-tin, favor: 0 }
  wild:
    - { item: hide-raw, favor: 3 }
"#;
        let load = Catalog::load(&raw(yaml), TierConfig::default());
        assert!(load.catalog.offerings(DeityDomain::Craft).is_empty());
        assert_eq!(load.catalog.offerings(DeityDomain::Wild).len(), 1);
        assert!(matches!(
            load.issues.as_slice(),
            [CatalogError::InvalidOffering { item, .. }] if item == "ingot-tin"
        ));
    }

    #[test]
    fn malformed_table_is_reported_not_fatal() {
        let yaml = r#"
offerings:
  stone:
    - { item: block-granite, favor: lots }
rituals:
  stone: "not a list"
"#;
        let load = Catalog::load(&raw(yaml), TierConfig::default());
        assert_eq!(load.catalog.offering_count(), 0);
        assert_eq!(load.catalog.ritual_count(), 0);
        assert_eq!(load.issues.len(), 2);
        assert!(
            load.issues
                .iter()
                .all(|i| matches!(i, CatalogError::MalformedTable { .. }))
        );
    }

    #[test]
    fn rejects_non_ascending_ritual() {
        let yaml = r#"
rituals:
  harvest:
    - { code: sheaf, source_tier: 2, target_tier: 2, required: 5 }
"#;
        let load = Catalog::load(&raw(yaml), TierConfig::default());
        assert!(load.catalog.rituals(DeityDomain::Harvest).is_empty());
        assert!(matches!(
            load.issues.first(),
            Some(CatalogError::InvalidRitual { code, .. }) if code == "sheaf"
        ));
    }

    #[test]
    fn rejects_tiers_beyond_max() {
        let yaml = r#"
offerings:
  craft:
    - { item: gear-temporal, favor: 50, min_tier: 4 }
rituals:
  craft:
    - { code: ascend, source_tier: 3, target_tier: 4, required: 1 }
"#;
        let load = Catalog::load(&raw(yaml), TierConfig::default());
        assert_eq!(load.issues.len(), 2);

        let relaxed = Catalog::load(&raw(yaml), TierConfig { max_tier: 4 });
        assert!(relaxed.issues.is_empty());
    }

    #[test]
    fn unknown_domain_is_skipped() {
        let yaml = r#"
offerings:
  thunder:
    - { item: rod-copper, favor: 5 }
"#;
        let load = Catalog::load(&raw(yaml), TierConfig::default());
        assert_eq!(load.catalog.offering_count(), 0);
        assert!(matches!(
            load.issues.first(),
            Some(CatalogError::UnknownDomain { key, table: "offerings" }) if key == "thunder"
        ));
    }

    #[test]
    fn duplicate_items_are_rejected() {
        let yaml = r#"
offerings:
  wild:
    - { item: hide-raw, favor: 3 }
    - { item: hide-raw, favor: 4 }
"#;
        let load = Catalog::load(&raw(yaml), TierConfig::default());
        assert!(load.catalog.offerings(DeityDomain::Wild).is_empty());
        assert_eq!(load.issues.len(), 1);
    }
}
