//! Spatial hash grid for tolerance-based point lookup.
//!
//! Points are bucketed by `floor(coord / cell_size)`. With `cell_size` equal to
//! the lookup tolerance, every point within that tolerance of a query lies in
//! the query's cell or one of its 26 neighbours, so a lookup only has to visit
//! the 3³ Moore neighbourhood.
//!
//! The index refuses to key coordinates it cannot represent with unit cell
//! resolution (non-finite values, or magnitudes so large that
//! `cell + 1 == cell`). In that case it marks itself unusable and callers fall
//! back to a linear scan.

use super::{FastHashMap, SmallBuffer};

const BUCKET_INLINE_CAPACITY: usize = 8;

/// Hashable grid-cell key: the bit patterns of the floored cell coordinates.
type GridKey = [u64; 3];

/// A spatial hash grid mapping grid cells to the indices of the points in them.
#[derive(Clone, Debug)]
pub(crate) struct HashGridIndex {
    cell_size: f64,
    usable: bool,
    cells: FastHashMap<GridKey, SmallBuffer<usize, BUCKET_INLINE_CAPACITY>>,
}

impl HashGridIndex {
    /// Creates an empty grid with the given cell size.
    pub(crate) fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            usable: cell_size.is_finite() && cell_size > 0.0,
            cells: FastHashMap::default(),
        }
    }

    pub(crate) const fn is_usable(&self) -> bool {
        self.usable
    }

    pub(crate) const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Inserts `index` into the cell containing `coords`.
    ///
    /// A point that cannot be keyed disables the whole index.
    pub(crate) fn insert(&mut self, index: usize, coords: [f64; 3]) {
        if !self.usable {
            return;
        }
        let Some(cell) = self.cell_coords(coords) else {
            self.usable = false;
            return;
        };
        self.cells.entry(key(cell)).or_default().push(index);
    }

    /// Visits every index stored in the 3³ neighbourhood of `coords`.
    ///
    /// The visitor returns `false` to stop early. Returns `false` if the index
    /// could not be used for this query.
    pub(crate) fn for_each_candidate<F>(&self, coords: [f64; 3], mut f: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        if !self.usable {
            return false;
        }
        let Some(base) = self.cell_coords(coords) else {
            return false;
        };

        let mut current = base;
        Self::visit_neighbor_cells(0, &base, &mut current, &mut |cell| {
            if let Some(bucket) = self.cells.get(&key(cell)) {
                for &index in bucket {
                    if !f(index) {
                        return false;
                    }
                }
            }
            true
        });
        true
    }

    fn cell_coords(&self, coords: [f64; 3]) -> Option<[f64; 3]> {
        let mut cell = [0.0; 3];
        for (slot, coord) in cell.iter_mut().zip(coords) {
            if !coord.is_finite() {
                return None;
            }
            let c = (coord / self.cell_size).floor();
            // Neighbour enumeration needs unit resolution.
            if !c.is_finite() || c + 1.0 == c {
                return None;
            }
            *slot = c;
        }
        Some(cell)
    }

    fn visit_neighbor_cells<F>(axis: usize, base: &[f64; 3], current: &mut [f64; 3], f: &mut F) -> bool
    where
        F: FnMut([f64; 3]) -> bool,
    {
        if axis == 3 {
            return f(*current);
        }
        for offset in [-1.0, 0.0, 1.0] {
            current[axis] = base[axis] + offset;
            if !Self::visit_neighbor_cells(axis + 1, base, current, f) {
                return false;
            }
        }
        true
    }
}

fn key(cell: [f64; 3]) -> GridKey {
    // -0.0 + 0.0 == +0.0, so both zeros share a bucket.
    cell.map(|c| (c + 0.0).to_bits())
}
