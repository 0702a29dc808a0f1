//! World-space geometry: block positions, entity positions, and inclusive
//! axis-aligned block regions.
//!
//! Holy sites are made of one or more [`BlockRegion`]s. The registry buckets
//! regions by [`ChunkColumn`] so a containment query only has to look at the
//! handful of sites overlapping the queried column.

use serde::{Deserialize, Serialize};

/// Horizontal edge length of a chunk column in blocks.
pub const CHUNK_SIZE: i32 = 32;

/// An integer block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl BlockPos {
    /// Create a block position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The chunk column containing this block.
    pub const fn chunk_column(self) -> ChunkColumn {
        ChunkColumn {
            x: self.x.div_euclid(CHUNK_SIZE),
            z: self.z.div_euclid(CHUNK_SIZE),
        }
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A continuous entity position, as reported by the host for players.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityPos {
    /// East-west axis.
    pub x: f64,
    /// Vertical axis.
    pub y: f64,
    /// North-south axis.
    pub z: f64,
}

impl EntityPos {
    /// Create an entity position.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The block this position lies in.
    ///
    /// Coordinates are floored, so `-0.5` maps to block `-1`. Values outside
    /// the `i32` range saturate and NaN maps to `0`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_block_pos(self) -> BlockPos {
        BlockPos {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }
}

/// Key of a vertical chunk column in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkColumn {
    /// Chunk index along x.
    pub x: i32,
    /// Chunk index along z.
    pub z: i32,
}

/// An axis-aligned box of blocks. Both corners are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRegion {
    /// Lowest corner (inclusive).
    pub min: BlockPos,
    /// Highest corner (inclusive).
    pub max: BlockPos,
}

impl BlockRegion {
    /// Build a region spanning two arbitrary corners.
    pub fn spanning(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Build a cube of `radius` blocks around `center` (clamped at `i32` bounds).
    pub const fn around(center: BlockPos, radius: i32) -> Self {
        Self {
            min: BlockPos::new(
                center.x.saturating_sub(radius),
                center.y.saturating_sub(radius),
                center.z.saturating_sub(radius),
            ),
            max: BlockPos::new(
                center.x.saturating_add(radius),
                center.y.saturating_add(radius),
                center.z.saturating_add(radius),
            ),
        }
    }

    /// Whether `min` is component-wise at or below `max`.
    pub const fn is_well_formed(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Whether the block lies inside the region.
    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// Whether the two regions share at least one block.
    pub const fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// Number of chunk columns the region touches, without listing them.
    /// Saturates at `u64::MAX`.
    pub fn column_count(&self) -> u64 {
        let low = self.min.chunk_column();
        let high = self.max.chunk_column();
        let width = i64::from(high.x).abs_diff(i64::from(low.x)).saturating_add(1);
        let depth = i64::from(high.z).abs_diff(i64::from(low.z)).saturating_add(1);
        width.saturating_mul(depth)
    }

    /// Every chunk column the region touches.
    pub fn chunk_columns(&self) -> Vec<ChunkColumn> {
        let low = self.min.chunk_column();
        let high = self.max.chunk_column();
        let mut columns = Vec::new();
        for x in low.x..=high.x {
            for z in low.z..=high.z {
                columns.push(ChunkColumn { x, z });
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_pos_floors_negative_coordinates() {
        let pos = EntityPos::new(-0.5, 64.9, 10.0).to_block_pos();
        assert_eq!(pos, BlockPos::new(-1, 64, 10));
    }

    #[test]
    fn region_bounds_are_inclusive() {
        let region = BlockRegion::spanning(BlockPos::new(10, 0, 10), BlockPos::new(0, 5, 0));
        assert_eq!(region.min, BlockPos::new(0, 0, 0));
        assert!(region.contains(BlockPos::new(0, 0, 0)));
        assert!(region.contains(BlockPos::new(10, 5, 10)));
        assert!(!region.contains(BlockPos::new(11, 5, 10)));
        assert!(!region.contains(BlockPos::new(5, -1, 5)));
    }

    #[test]
    fn touching_regions_intersect_but_adjacent_do_not() {
        let a = BlockRegion::spanning(BlockPos::new(0, 0, 0), BlockPos::new(4, 4, 4));
        let touching = BlockRegion::spanning(BlockPos::new(4, 4, 4), BlockPos::new(8, 8, 8));
        let adjacent = BlockRegion::spanning(BlockPos::new(5, 0, 0), BlockPos::new(8, 4, 4));
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&adjacent));
    }

    #[test]
    fn chunk_columns_cover_negative_space() {
        let region = BlockRegion::spanning(BlockPos::new(-1, 0, 0), BlockPos::new(32, 0, 0));
        let columns = region.chunk_columns();
        assert_eq!(columns.len(), 3);
        assert!(columns.contains(&ChunkColumn { x: -1, z: 0 }));
        assert!(columns.contains(&ChunkColumn { x: 1, z: 0 }));
    }

    #[test]
    fn column_count_matches_listed_columns() {
        let region = BlockRegion::spanning(BlockPos::new(-40, 0, -1), BlockPos::new(70, 10, 31));
        assert_eq!(region.column_count(), 10);
        assert_eq!(region.column_count(), region.chunk_columns().len() as u64);

        let huge = BlockRegion::around(BlockPos::new(0, 64, 0), i32::MAX);
        assert_eq!(huge.column_count(), 1u64 << 54);
    }

    #[test]
    fn around_builds_symmetric_cube() {
        let region = BlockRegion::around(BlockPos::new(0, 64, 0), 3);
        assert!(region.is_well_formed());
        assert!(region.contains(BlockPos::new(-3, 61, 3)));
        assert!(!region.contains(BlockPos::new(-4, 64, 0)));
    }
}
