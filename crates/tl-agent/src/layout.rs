//! The single-intersection road layout.
//!
//! Integer grid dimensions, integer-divided centre.  Vehicles enter and
//! leave at the four edge midpoints; four lights sit 10 units out from the
//! centre along each approach.

use tl_core::{Direction, LightId, Point};

/// Distance from the intersection centre to each light.
pub const LIGHT_OFFSET: f64 = 10.0;

/// Geometry of one four-way crossroad on a `width × height` plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Crossroad {
    pub width:  u32,
    pub height: u32,
}

impl Crossroad {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(f64::from(self.width / 2), f64::from(self.height / 2))
    }

    /// West, east, south, north edge midpoints.
    pub fn spawn_points(&self) -> [Point; 4] {
        let (w, h) = (self.width, self.height);
        [
            Point::new(0.0, f64::from(h / 2)),
            Point::new(f64::from(w.saturating_sub(1)), f64::from(h / 2)),
            Point::new(f64::from(w / 2), 0.0),
            Point::new(f64::from(w / 2), f64::from(h.saturating_sub(1))),
        ]
    }

    /// Every spawn point other than `spawn`.
    pub fn destinations_from(&self, spawn: Point) -> Vec<Point> {
        self.spawn_points().into_iter().filter(|&p| p != spawn).collect()
    }

    /// Id, position and controlled axis of the four lights.
    pub fn lights(&self) -> [(LightId, Point, Direction); 4] {
        let c = self.center();
        [
            (LightId(0), Point::new(c.x - LIGHT_OFFSET, c.y), Direction::Horizontal),
            (LightId(1), Point::new(c.x + LIGHT_OFFSET, c.y), Direction::Horizontal),
            (LightId(2), Point::new(c.x, c.y - LIGHT_OFFSET), Direction::Vertical),
            (LightId(3), Point::new(c.x, c.y + LIGHT_OFFSET), Direction::Vertical),
        ]
    }
}
