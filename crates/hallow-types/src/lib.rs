//! Shared type definitions for the Hallow holy-site engine.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace: identifiers, world geometry, deity domains, holy sites,
//! and the offering/ritual catalog entries.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Deity domains, message channels, effects, prayer stages
//! - [`geometry`] -- Block/entity positions and inclusive block regions
//! - [`structs`] -- Holy sites, ritual progress, offerings, rituals, religions

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DeityDomain, MessageChannel, PrayerEffect, PrayerStage, Side, UnknownDomain};
pub use geometry::{BlockPos, BlockRegion, CHUNK_SIZE, ChunkColumn, EntityPos};
pub use ids::{PlayerId, ReligionId, SiteId};
pub use structs::{
    HeldItem, HolySite, Offering, PlayerRef, Religion, Ritual, RitualProgress, RitualReward,
    STARTING_TIER, item_matches, tier_name,
};
