//! Offering evaluation and ritual progression for the Hallow holy-site engine.
//!
//! This crate contains the pure rules layer: it never touches the host, the
//! registry, or the pipeline. It sits between `hallow-types` (the data
//! model) and `hallow-core` (which wires these rules into prayers).
//!
//! # Modules
//!
//! - [`catalog`] -- Offering and ritual tables with load-time validation
//! - [`config`] -- Tier limits ([`TierConfig`])
//! - [`error`] -- Catalog load problems ([`CatalogError`])
//! - [`offering`] -- [`OfferingEvaluator`] and its three-way [`OfferingVerdict`]
//! - [`ritual`] -- [`RitualContributionService`] and [`RitualAttemptResult`]

pub mod catalog;
pub mod config;
pub mod error;
pub mod offering;
pub mod ritual;

// Re-export primary types at crate root for convenience.
pub use catalog::{Catalog, CatalogLoad, RawCatalog};
pub use config::{DEFAULT_MAX_TIER, TierConfig};
pub use error::CatalogError;
pub use offering::{OfferingEvaluator, OfferingVerdict};
pub use ritual::{RitualAttemptResult, RitualContributionService};
