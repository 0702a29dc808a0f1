//! Holy-site registry and spatial index for the Hallow holy-site engine.
//!
//! # Modules
//!
//! - [`directory`] -- The [`SiteDirectory`] trait: the site-manager seam the
//!   rest of the engine consumes.
//! - [`error`] -- Error types for registry operations.
//! - [`registry`] -- [`SiteRegistry`], the in-process site store with altar
//!   and chunk-column indexes.

pub mod directory;
pub mod error;
pub mod registry;

// Re-export primary types at crate root.
pub use directory::SiteDirectory;
pub use error::WorldError;
pub use registry::{DEFAULT_MAX_SITE_COLUMNS, SiteRegistry};
