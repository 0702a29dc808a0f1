//! Error types for the `hallow-world` crate.
//!
//! All fallible registry operations return [`WorldError`].

use hallow_types::{BlockPos, BlockRegion, SiteId};

/// Errors that can occur while consecrating or deconsecrating holy sites.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// No site with the given ID is registered.
    #[error("holy site not found: {0}")]
    SiteNotFound(SiteId),

    /// A site with the same ID is already registered.
    #[error("duplicate holy site id: {0}")]
    DuplicateSite(SiteId),

    /// The site has no regions.
    #[error("holy site {0} has no regions")]
    NoRegions(SiteId),

    /// A region's minimum corner lies above its maximum corner.
    #[error("malformed region {region:?} in holy site {site}")]
    MalformedRegion {
        /// The site being consecrated.
        site: SiteId,
        /// The offending region.
        region: BlockRegion,
    },

    /// The site's regions touch more chunk columns than the registry indexes
    /// for one site.
    #[error("holy site {site} spans {columns} chunk columns, limit is {limit}")]
    RegionTooLarge {
        /// The site being consecrated.
        site: SiteId,
        /// Chunk columns touched, summed over regions.
        columns: u64,
        /// The registry's limit.
        limit: u64,
    },

    /// The altar is not inside any of the site's regions.
    #[error("altar at {altar} lies outside holy site {site}")]
    AltarOutsideSite {
        /// The site being consecrated.
        site: SiteId,
        /// The altar position.
        altar: BlockPos,
    },

    /// The altar already anchors another site.
    #[error("altar at {altar} already anchors holy site {existing}")]
    AltarAlreadyConsecrated {
        /// The altar position.
        altar: BlockPos,
        /// The site the altar belongs to.
        existing: SiteId,
    },

    /// A region overlaps a region of another site.
    #[error("holy site {site} overlaps existing holy site {existing}")]
    RegionOverlap {
        /// The site being consecrated.
        site: SiteId,
        /// The site it overlaps.
        existing: SiteId,
    },
}
