//! Offering evaluation: is an item a valid, tier-acceptable offering for a
//! domain?
//!
//! The verdict is three-way so callers can tell a wrong item apart from a
//! right item at a site that is too weak for it, without a second lookup.

use std::collections::BTreeMap;

use hallow_types::{DeityDomain, Offering};

use crate::catalog::Catalog;

/// Result of evaluating one item against a domain's offering table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferingVerdict {
    /// The item is not an offering for this domain.
    NoMatch,
    /// The item is an offering, but the site's tier is below its minimum.
    TierTooLow {
        /// The offering's minimum tier.
        required: u8,
        /// The site's current tier.
        current: u8,
    },
    /// The offering is accepted.
    Accepted {
        /// The matched offering definition.
        offering: Offering,
    },
}

impl OfferingVerdict {
    /// Favor granted by an accepted offering.
    pub const fn favor(&self) -> Option<u32> {
        match self {
            Self::Accepted { offering } => Some(offering.favor),
            Self::NoMatch | Self::TierTooLow { .. } => None,
        }
    }

    /// Whether the offering was accepted.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Pure lookup over the per-domain offering tables.
#[derive(Debug, Clone, Default)]
pub struct OfferingEvaluator {
    tables: BTreeMap<DeityDomain, BTreeMap<String, Offering>>,
}

impl OfferingEvaluator {
    /// Index every domain's offering table from the catalog.
    pub fn new(catalog: &Catalog) -> Self {
        let tables = DeityDomain::ALL
            .into_iter()
            .map(|domain| {
                let table = catalog
                    .offerings(domain)
                    .iter()
                    .map(|o| (o.item.clone(), o.clone()))
                    .collect();
                (domain, table)
            })
            .collect();
        Self { tables }
    }

    /// Evaluate `item` as an offering to `domain` at a site of `site_tier`.
    pub fn evaluate(&self, item: &str, domain: DeityDomain, site_tier: u8) -> OfferingVerdict {
        let Some(offering) = self.tables.get(&domain).and_then(|t| t.get(item)) else {
            return OfferingVerdict::NoMatch;
        };

        if site_tier < offering.min_tier {
            return OfferingVerdict::TierTooLow {
                required: offering.min_tier,
                current: site_tier,
            };
        }

        OfferingVerdict::Accepted {
            offering: offering.clone(),
        }
    }

    /// Every offering a site of `site_tier` currently accepts, by item code.
    pub fn offerings_for(&self, domain: DeityDomain, site_tier: u8) -> Vec<&Offering> {
        self.tables
            .get(&domain)
            .map(|t| t.values().filter(|o| o.min_tier <= site_tier).collect())
            .unwrap_or_default()
    }
}
