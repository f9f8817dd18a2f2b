//! Uniform-grid spatial hashing for neighborhood candidate queries.
//!
//! Positions are floor-divided into integer cells and bucketed lazily, so
//! only occupied cells cost memory.

use crate::error::{KernelError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Anything with a 2D world position that can be bucketed.
pub trait Positioned {
    fn position(&self) -> (f64, f64);
}

impl Positioned for (f64, f64) {
    #[inline]
    fn position(&self) -> (f64, f64) {
        *self
    }
}

impl Positioned for [f64; 2] {
    #[inline]
    fn position(&self) -> (f64, f64) {
        (self[0], self[1])
    }
}

impl Positioned for glam::DVec2 {
    #[inline]
    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl<T: Positioned + ?Sized> Positioned for &T {
    #[inline]
    fn position(&self) -> (f64, f64) {
        (**self).position()
    }
}

/// Two signed cell coordinates packed into one `u128`.
///
/// The high half holds `cx`, the low half `cy`, each as the raw bits of an
/// `i64`, so the packing is bijective and `(1, -2)` never meets `(-1, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellKey(u128);

impl CellKey {
    #[inline]
    #[must_use]
    pub const fn new(cx: i64, cy: i64) -> Self {
        Self(((cx as u64 as u128) << 64) | cy as u64 as u128)
    }

    /// Recovers `(cx, cy)`.
    #[inline]
    #[must_use]
    pub const fn coords(self) -> (i64, i64) {
        ((self.0 >> 64) as u64 as i64, self.0 as u64 as i64)
    }

    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// The cell `(dx, dy)` away, or `None` past the edge of the `i64` grid.
    #[inline]
    #[must_use]
    pub fn checked_offset(self, dx: i64, dy: i64) -> Option<Self> {
        let (cx, cy) = self.coords();
        Some(Self::new(cx.checked_add(dx)?, cy.checked_add(dy)?))
    }
}

/// Floor-divides a world position into integer cell coordinates.
///
/// Coordinates past `i64` range clamp to the outermost cell.
#[inline]
#[must_use]
pub fn cell_coords(x: f64, y: f64, cell_size: f64) -> (i64, i64) {
    ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
}

/// Key of the cell containing `entity`.
#[inline]
#[must_use]
pub fn cell_key<P: Positioned + ?Sized>(entity: &P, cell_size: f64) -> CellKey {
    let (x, y) = entity.position();
    let (cx, cy) = cell_coords(x, y, cell_size);
    CellKey::new(cx, cy)
}

/// Uniform-cell spatial hash over borrowed entities.
///
/// Built fresh from a snapshot every tick and thrown away afterwards; there is
/// no incremental insert or remove. Buckets are created lazily, so the grid
/// is unbounded and negative coordinates are ordinary cells.
///
/// Queries return the 3x3 block of cells around a position. That is a
/// superset of the entities within `cell_size` of it, so callers still apply
/// an exact distance check (see [`SpatialHash::neighbors_within`]).
///
/// # Examples
/// ```
/// use swarmfield_core::spatial_hash::SpatialHash;
///
/// let positions = vec![(25.0, 25.0), (75.0, 25.0), (25.0, 75.0), (400.0, 400.0)];
/// let index = SpatialHash::build(&positions, 50.0);
///
/// assert_eq!(index.cell_count(), 4);
/// assert_eq!(index.query(&positions[0]).len(), 3);
/// ```
#[derive(Debug)]
pub struct SpatialHash<'a, T> {
    cell_size: f64,
    buckets: HashMap<CellKey, Vec<&'a T>>,
    entity_count: usize,
}

impl<'a, T: Positioned> SpatialHash<'a, T> {
    /// Buckets every entity by its cell. Order within a bucket follows the
    /// input order.
    pub fn build<I>(entities: I, cell_size: f64) -> Self
    where
        I: IntoIterator<Item = &'a T>,
    {
        debug_assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive"
        );
        let mut buckets: HashMap<CellKey, Vec<&'a T>> = HashMap::new();
        let mut entity_count = 0;
        for entity in entities {
            buckets
                .entry(cell_key(entity, cell_size))
                .or_default()
                .push(entity);
            entity_count += 1;
        }
        tracing::debug!(
            entities = entity_count,
            cells = buckets.len(),
            cell_size,
            "spatial hash built"
        );
        Self {
            cell_size,
            buckets,
            entity_count,
        }
    }

    /// [`SpatialHash::build`] with the cell size validated up front.
    pub fn try_build<I>(entities: I, cell_size: f64) -> Result<Self>
    where
        I: IntoIterator<Item = &'a T>,
    {
        KernelError::check_cell_size(cell_size)?;
        Ok(Self::build(entities, cell_size))
    }

    /// Computes cell keys with Rayon, then buckets sequentially so bucket
    /// order still matches input order.
    #[cfg(feature = "parallel")]
    pub fn build_parallel(entities: &'a [T], cell_size: f64) -> Self
    where
        T: Sync,
    {
        use rayon::prelude::*;

        let keys: Vec<CellKey> = entities
            .par_iter()
            .map(|e| cell_key(e, cell_size))
            .collect();

        let mut buckets: HashMap<CellKey, Vec<&'a T>> = HashMap::new();
        for (key, entity) in keys.into_iter().zip(entities) {
            buckets.entry(key).or_default().push(entity);
        }
        tracing::debug!(
            entities = entities.len(),
            cells = buckets.len(),
            "spatial hash built in parallel"
        );
        Self {
            cell_size,
            buckets,
            entity_count: entities.len(),
        }
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Contents of a single bucket; empty for cells nobody occupies.
    #[must_use]
    pub fn bucket(&self, key: CellKey) -> &[&'a T] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys of every non-empty bucket, in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.buckets.keys().copied()
    }

    /// Candidates around `entity`: its own cell plus the eight adjacent ones.
    /// The entity itself is included when it is in the index.
    #[must_use]
    pub fn query(&self, entity: &T) -> Vec<&'a T> {
        let (x, y) = entity.position();
        self.query_point(x, y)
    }

    #[must_use]
    pub fn query_point(&self, x: f64, y: f64) -> Vec<&'a T> {
        let mut result = Vec::new();
        self.query_into(x, y, &mut result);
        result
    }

    /// Allocation-reusing form of [`SpatialHash::query_point`].
    #[inline]
    pub fn query_into(&self, x: f64, y: f64, result: &mut Vec<&'a T>) {
        result.clear();
        let (cx, cy) = cell_coords(x, y, self.cell_size);
        let center = CellKey::new(cx, cy);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(key) = center.checked_offset(dx, dy) else {
                    continue;
                };
                if let Some(bucket) = self.buckets.get(&key) {
                    result.extend_from_slice(bucket);
                }
            }
        }
    }

    /// Candidates filtered to those within `radius` (inclusive) of `entity`.
    ///
    /// Only exact for `radius <= cell_size`. Self is not excluded.
    #[must_use]
    pub fn neighbors_within(&self, entity: &T, radius: f64) -> Vec<&'a T> {
        let (x, y) = entity.position();
        let radius_sq = radius * radius;
        let mut result = self.query_point(x, y);
        result.retain(|other| {
            let (ox, oy) = other.position();
            let (dx, dy) = (ox - x, oy - y);
            dx * dx + dy * dy <= radius_sq
        });
        result
    }

    /// Every indexed entity in bucket-iteration order.
    #[must_use]
    pub fn all_entities(&self) -> Vec<&'a T> {
        self.buckets.values().flatten().copied().collect()
    }
}
