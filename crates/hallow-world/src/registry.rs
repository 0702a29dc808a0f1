//! Holy-site registry: the site store plus its spatial and altar indexes.
//!
//! Sites are indexed two ways besides their ID:
//!
//! - `by_altar`: altar position -> site, for altar interactions.
//! - `columns`: chunk column -> sites touching that column, for "which site
//!   contains this block" queries from the area tracker.
//!
//! Regions of distinct sites never overlap, so a containment query has at
//! most one answer. The column index costs one entry per column, so a site
//! may touch at most `max_site_columns` of them.

use std::collections::BTreeMap;

use hallow_types::{BlockPos, ChunkColumn, HolySite, ReligionId, SiteId};
use tracing::{debug, info};

use crate::directory::SiteDirectory;
use crate::error::WorldError;

/// Default cap on chunk columns per site: a 64 x 64 chunk square.
pub const DEFAULT_MAX_SITE_COLUMNS: u64 = 4096;

/// All consecrated holy sites with their lookup indexes.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    /// All sites indexed by their identifier.
    sites: BTreeMap<SiteId, HolySite>,
    /// Altar position -> site anchored there.
    by_altar: BTreeMap<BlockPos, SiteId>,
    /// Chunk column -> sites with a region touching that column.
    columns: BTreeMap<ChunkColumn, Vec<SiteId>>,
    /// Most chunk columns one site may touch.
    max_site_columns: u64,
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteRegistry {
    /// Create an empty registry with [`DEFAULT_MAX_SITE_COLUMNS`].
    pub const fn new() -> Self {
        Self::with_max_site_columns(DEFAULT_MAX_SITE_COLUMNS)
    }

    /// Create an empty registry admitting sites that touch at most
    /// `max_site_columns` chunk columns.
    pub const fn with_max_site_columns(max_site_columns: u64) -> Self {
        Self {
            sites: BTreeMap::new(),
            by_altar: BTreeMap::new(),
            columns: BTreeMap::new(),
            max_site_columns,
        }
    }

    /// Most chunk columns one site may touch.
    pub const fn max_site_columns(&self) -> u64 {
        self.max_site_columns
    }

    /// Register a newly consecrated site.
    ///
    /// # Errors
    ///
    /// - [`WorldError::DuplicateSite`] if the ID is taken.
    /// - [`WorldError::NoRegions`] / [`WorldError::MalformedRegion`] for bad geometry.
    /// - [`WorldError::RegionTooLarge`] if the regions touch too many chunk columns.
    /// - [`WorldError::AltarOutsideSite`] if the altar is not inside a region.
    /// - [`WorldError::AltarAlreadyConsecrated`] if the altar anchors another site.
    /// - [`WorldError::RegionOverlap`] if any region overlaps another site.
    pub fn consecrate(&mut self, site: HolySite) -> Result<SiteId, WorldError> {
        let id = site.id;
        self.validate_new_site(&site)?;

        for region in &site.regions {
            for column in region.chunk_columns() {
                let bucket = self.columns.entry(column).or_default();
                if !bucket.contains(&id) {
                    bucket.push(id);
                }
            }
        }
        self.by_altar.insert(site.altar, id);

        info!(
            site = %id,
            name = site.name,
            religion = %site.religion_id,
            altar = %site.altar,
            regions = site.regions.len(),
            "Holy site consecrated"
        );
        self.sites.insert(id, site);
        Ok(id)
    }

    fn validate_new_site(&self, site: &HolySite) -> Result<(), WorldError> {
        let id = site.id;
        if self.sites.contains_key(&id) {
            return Err(WorldError::DuplicateSite(id));
        }
        if site.regions.is_empty() {
            return Err(WorldError::NoRegions(id));
        }
        if let Some(region) = site.regions.iter().find(|r| !r.is_well_formed()) {
            return Err(WorldError::MalformedRegion {
                site: id,
                region: *region,
            });
        }
        let columns = site
            .regions
            .iter()
            .fold(0u64, |total, r| total.saturating_add(r.column_count()));
        if columns > self.max_site_columns {
            return Err(WorldError::RegionTooLarge {
                site: id,
                columns,
                limit: self.max_site_columns,
            });
        }
        if !site.contains(site.altar) {
            return Err(WorldError::AltarOutsideSite {
                site: id,
                altar: site.altar,
            });
        }
        if let Some(existing) = self.by_altar.get(&site.altar) {
            return Err(WorldError::AltarAlreadyConsecrated {
                altar: site.altar,
                existing: *existing,
            });
        }
        for region in &site.regions {
            for column in region.chunk_columns() {
                let Some(bucket) = self.columns.get(&column) else {
                    continue;
                };
                for other_id in bucket {
                    let overlaps = self
                        .sites
                        .get(other_id)
                        .is_some_and(|other| other.regions.iter().any(|r| r.intersects(region)));
                    if overlaps {
                        return Err(WorldError::RegionOverlap {
                            site: id,
                            existing: *other_id,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Return the number of registered sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether no sites are registered.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Iterate over all sites in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &HolySite> {
        self.sites.values()
    }

    /// All sites owned by `religion`.
    pub fn sites_of_religion(&self, religion: ReligionId) -> Vec<&HolySite> {
        self.sites
            .values()
            .filter(|s| s.religion_id == religion)
            .collect()
    }
}

impl SiteDirectory for SiteRegistry {
    fn site_at(&self, pos: BlockPos) -> Option<SiteId> {
        self.columns
            .get(&pos.chunk_column())?
            .iter()
            .find(|id| self.sites.get(*id).is_some_and(|s| s.contains(pos)))
            .copied()
    }

    fn site_by_altar(&self, altar: BlockPos) -> Option<SiteId> {
        self.by_altar.get(&altar).copied()
    }

    fn site(&self, id: SiteId) -> Option<&HolySite> {
        self.sites.get(&id)
    }

    fn site_mut(&mut self, id: SiteId) -> Option<&mut HolySite> {
        self.sites.get_mut(&id)
    }

    fn deconsecrate(&mut self, id: SiteId) -> Result<HolySite, WorldError> {
        let site = self.sites.remove(&id).ok_or(WorldError::SiteNotFound(id))?;

        self.by_altar.remove(&site.altar);
        for region in &site.regions {
            for column in region.chunk_columns() {
                if let Some(bucket) = self.columns.get_mut(&column) {
                    bucket.retain(|other| *other != id);
                    if bucket.is_empty() {
                        self.columns.remove(&column);
                    }
                }
            }
        }

        if let Some(progress) = &site.active_ritual {
            debug!(
                site = %id,
                ritual = progress.ritual_code,
                contributed = progress.contributed,
                "Active ritual abandoned by deconsecration"
            );
        }
        info!(site = %id, name = site.name, tier = site.tier(), "Holy site deconsecrated");
        Ok(site)
    }
}
