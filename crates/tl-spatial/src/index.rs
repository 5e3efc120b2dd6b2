//! Vehicle occupancy index.
//!
//! # Data layout
//!
//! An R-tree (via `rstar`) holds one `[x, y]` entry per placed vehicle and
//! answers radius queries in O(log N + local density).  A side table maps
//! `VehicleId → Point` so that `remove`/`update` can locate the exact entry
//! the tree has to drop without a scan.
//!
//! Occupancy is a two-stage query: over-fetch every vehicle within
//! [`SEARCH_RADIUS`] of the probe, then keep only those strictly closer than
//! [`OCCUPANCY_RADIUS`].

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use tl_core::{Point, VehicleId};

/// Two vehicles closer than this collide.
pub const OCCUPANCY_RADIUS: f64 = 1.0;

/// Neighbour-search radius used by [`SpatialIndex::occupied`].
pub const SEARCH_RADIUS: f64 = 1.5;

#[cfg(feature = "fx-hash")]
type PositionMap = rustc_hash::FxHashMap<VehicleId, Point>;
#[cfg(not(feature = "fx-hash"))]
type PositionMap = std::collections::HashMap<VehicleId, Point>;

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D `[x, y]` point with its vehicle.
#[derive(Clone, Debug, PartialEq)]
struct VehicleEntry {
    point: [f64; 2],
    id:    VehicleId,
}

impl RTreeObject for VehicleEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VehicleEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Position store for every vehicle currently on the plane.
///
/// Traffic lights are fixed and few, so they are not indexed here.
pub struct SpatialIndex {
    tree:      RTree<VehicleEntry>,
    positions: PositionMap,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new(), positions: PositionMap::default() }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Last indexed position of `id`.
    pub fn position(&self, id: VehicleId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Insert `id` at `pos`.  Placing an already-indexed vehicle moves it.
    pub fn place(&mut self, id: VehicleId, pos: Point) {
        if self.positions.contains_key(&id) {
            self.update(id, pos);
            return;
        }
        self.tree.insert(VehicleEntry { point: pos.to_array(), id });
        self.positions.insert(id, pos);
    }

    /// Drop `id` from the index, returning its last position.
    pub fn remove(&mut self, id: VehicleId) -> Option<Point> {
        let pos = self.positions.remove(&id)?;
        self.tree.remove(&VehicleEntry { point: pos.to_array(), id });
        Some(pos)
    }

    /// Move `id` to `pos`.  No-op if the position is unchanged; inserts the
    /// vehicle if it was not indexed yet.
    pub fn update(&mut self, id: VehicleId, pos: Point) {
        match self.positions.get(&id) {
            Some(&old) if old == pos => {}
            Some(&old) => {
                self.tree.remove(&VehicleEntry { point: old.to_array(), id });
                self.tree.insert(VehicleEntry { point: pos.to_array(), id });
                self.positions.insert(id, pos);
            }
            None => self.place(id, pos),
        }
    }

    /// Every vehicle within `radius` (inclusive) of `pos`, in no particular
    /// order.
    pub fn neighbors_within(
        &self,
        pos:    Point,
        radius: f64,
    ) -> impl Iterator<Item = (VehicleId, Point)> + '_ {
        self.tree
            .locate_within_distance(pos.to_array(), radius * radius)
            .map(|e| (e.id, Point::new(e.point[0], e.point[1])))
    }

    /// `true` iff any vehicle other than `exclude` lies strictly closer than
    /// [`OCCUPANCY_RADIUS`] to `pos`.
    pub fn occupied(&self, pos: Point, exclude: Option<VehicleId>) -> bool {
        self.neighbors_within(pos, SEARCH_RADIUS)
            .filter(|&(id, _)| Some(id) != exclude)
            .any(|(_, p)| p.distance(pos) < OCCUPANCY_RADIUS)
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
