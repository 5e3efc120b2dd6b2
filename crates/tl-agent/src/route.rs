//! Fixed vehicle routes.

use tl_core::Point;

/// An ordered list of waypoints a vehicle visits.
///
/// `approach_leg` is the index of the waypoint that sits on the governed
/// intersection.  While a vehicle is heading for that waypoint it reacts to
/// the light ahead; on every other leg it drives through.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    waypoints:    Vec<Point>,
    approach_leg: usize,
}

impl Route {
    /// `start → center → end`, braking on the way into `center`.
    pub fn through(start: Point, center: Point, end: Point) -> Self {
        Self { waypoints: vec![start, center, end], approach_leg: 1 }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint `i`, or `None` past the end of the route.
    #[inline]
    pub fn waypoint(&self, i: usize) -> Option<Point> {
        self.waypoints.get(i).copied()
    }

    #[inline]
    pub fn approach_leg(&self) -> usize {
        self.approach_leg
    }
}
