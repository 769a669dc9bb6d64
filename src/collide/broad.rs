//! Broad phase: group/mask filtering and bounding-box candidate pairs
//!
//! Small scenes use a per-group-bit index and test every matching pair.
//! Past a size threshold a uniform spatial hash takes over; both paths
//! produce the same candidate set.

use std::collections::HashMap;

use super::shape::Aabb;

/// Largest cell span an entry may cover before it is tested against everything
const MAX_CELLS_PER_ENTRY: i64 = 1024;

/// Group/mask filter; passes when either side accepts the other
#[inline]
pub fn groups_interact(group_a: u32, mask_a: u32, group_b: u32, mask_b: u32) -> bool {
    group_a & mask_b != 0 || group_b & mask_a != 0
}

/// Broad-phase view of one collidable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadEntry {
    pub group: u32,
    pub mask: u32,
    pub aabb: Aabb,
}

impl BroadEntry {
    #[inline]
    fn accepts(&self, other: &BroadEntry) -> bool {
        groups_interact(self.group, self.mask, other.group, other.mask)
            && self.aabb.overlaps(&other.aabb)
    }
}

/// Candidate pairs as index pairs `(i, j)` with `i < j`, sorted and unique.
///
/// `entries` must already be in canonical (handle) order.
pub fn candidate_pairs(entries: &[BroadEntry]) -> Vec<(usize, usize)> {
    // Entries holding each group bit
    let mut by_bit: [Vec<usize>; 32] = std::array::from_fn(|_| Vec::new());
    for (i, entry) in entries.iter().enumerate() {
        for bit in set_bits(entry.group) {
            by_bit[bit].push(i);
        }
    }

    let mut pairs = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        // Pairs where `entry` accepts the other's group; the reverse
        // direction is found while visiting the other entry
        for bit in set_bits(entry.mask) {
            for &j in &by_bit[bit] {
                if i != j && entry.aabb.overlaps(&entries[j].aabb) {
                    pairs.push((i.min(j), i.max(j)));
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Uniform spatial hash over entry bounding boxes
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    /// Entries too large to bin; paired with everything
    oversized: Vec<usize>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.oversized.clear();
    }

    #[inline]
    fn cell_of(&self, v: f32) -> i32 {
        (v / self.cell_size).floor() as i32
    }

    pub fn insert(&mut self, index: usize, aabb: &Aabb) {
        let (x0, x1) = (self.cell_of(aabb.min.x), self.cell_of(aabb.max.x));
        let (y0, y1) = (self.cell_of(aabb.min.y), self.cell_of(aabb.max.y));
        let span = (x1 as i64 - x0 as i64 + 1) * (y1 as i64 - y0 as i64 + 1);
        if span > MAX_CELLS_PER_ENTRY {
            self.oversized.push(index);
            return;
        }
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(index);
            }
        }
    }

    /// Rebuild from `entries` and return their candidate pairs
    pub fn candidate_pairs(&mut self, entries: &[BroadEntry]) -> Vec<(usize, usize)> {
        self.clear();
        for (i, entry) in entries.iter().enumerate() {
            self.insert(i, &entry.aabb);
        }

        let mut pairs = Vec::new();
        for bucket in self.cells.values() {
            for (n, &i) in bucket.iter().enumerate() {
                for &j in &bucket[n + 1..] {
                    if entries[i].accepts(&entries[j]) {
                        pairs.push((i.min(j), i.max(j)));
                    }
                }
            }
        }
        for &i in &self.oversized {
            for j in 0..entries.len() {
                if i != j && entries[i].accepts(&entries[j]) {
                    pairs.push((i.min(j), i.max(j)));
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

fn set_bits(mut bits: u32) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let bit = bits.trailing_zeros() as usize;
        bits &= bits - 1;
        Some(bit)
    })
}
