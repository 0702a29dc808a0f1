//! The site-manager seam consumed by the prayer pipeline, the area tracker,
//! and the altar destruction handler.
//!
//! [`SiteRegistry`](crate::SiteRegistry) is the in-process implementation.
//! A host that keeps its own site store implements this trait instead.

use hallow_types::{BlockPos, HolySite, SiteId};

use crate::error::WorldError;

/// Lookup and lifecycle operations on consecrated holy sites.
pub trait SiteDirectory {
    /// The site whose regions contain `pos`, if any.
    fn site_at(&self, pos: BlockPos) -> Option<SiteId>;

    /// The site anchored by the altar at `altar`, if any.
    fn site_by_altar(&self, altar: BlockPos) -> Option<SiteId>;

    /// Borrow a site by ID.
    fn site(&self, id: SiteId) -> Option<&HolySite>;

    /// Mutably borrow a site by ID.
    ///
    /// Callers may change the tier and active ritual. Regions and altar must
    /// not be changed through this borrow since the spatial index is not
    /// rebuilt.
    fn site_mut(&mut self, id: SiteId) -> Option<&mut HolySite>;

    /// Remove a site, returning it.
    fn deconsecrate(&mut self, id: SiteId) -> Result<HolySite, WorldError>;
}
