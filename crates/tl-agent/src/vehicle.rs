//! Vehicle kinematics and stop/go reaction.

use tl_control::VehicleData;
use tl_core::{LightState, Point, VehicleId};

use crate::Route;

/// A waypoint counts as reached once the vehicle is closer than this.
pub const WAYPOINT_RADIUS: f64 = 1.0;

/// Vehicles start braking for a non-green light closer than this.
pub const BRAKING_DISTANCE: f64 = 8.0;

/// Display palette; purely cosmetic.
pub const VEHICLE_COLORS: [&str; 6] =
    ["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD"];

/// The light a vehicle is reacting to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Signal {
    pub position: Point,
    pub state:    LightState,
}

/// What a vehicle may ask of the world during its activation.
pub trait Surroundings {
    /// The light controlling movement from `position` toward `target`, if
    /// any.
    fn governing_light(&self, position: Point, target: Point) -> Option<Signal>;

    /// `true` if a vehicle other than `exclude` is within collision range
    /// of `position`.
    fn is_occupied(&self, position: Point, exclude: VehicleId) -> bool;
}

/// Result of one [`Vehicle::activate`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleOutcome {
    /// The last waypoint was reached; the engine must remove the vehicle.
    Completed,
    /// Slowed for a non-green light; did not move.
    Braking,
    /// Moved to a new position.
    Moved,
    /// The proposed position was occupied; stayed put at the new speed.
    Blocked,
    /// Already at the current waypoint's exact position; nothing to do.
    Idle,
    /// Route already exhausted before this activation.
    Finished,
}

#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id:       VehicleId,
    pub position: Point,
    pub speed:    f64,

    pub max_speed:    f64,
    pub acceleration: f64,
    pub deceleration: f64,

    pub spawn_point: Point,
    pub destination: Point,
    pub route:       Route,

    /// Index of the waypoint currently being driven toward.  Never
    /// decreases; equals `route.len()` once the route is finished.
    pub current_segment: usize,

    /// Steps spent stopped at a light, decaying while moving again.
    pub waiting_time: u64,

    /// Activations that did not end in braking.
    pub total_travel_time: u64,

    pub stopped: bool,
    pub color:   &'static str,
}

impl Vehicle {
    pub const MAX_SPEED:    f64 = 1.0;
    pub const ACCELERATION: f64 = 0.1;
    pub const DECELERATION: f64 = 0.2;

    /// A stationary vehicle at `spawn` routed through `center` to
    /// `destination`.
    pub fn new(
        id:          VehicleId,
        spawn:       Point,
        center:      Point,
        destination: Point,
        color:       &'static str,
    ) -> Self {
        Self {
            id,
            position: spawn,
            speed: 0.0,
            max_speed: Self::MAX_SPEED,
            acceleration: Self::ACCELERATION,
            deceleration: Self::DECELERATION,
            spawn_point: spawn,
            destination,
            route: Route::through(spawn, center, destination),
            current_segment: 0,
            waiting_time: 0,
            total_travel_time: 0,
            stopped: false,
            color,
        }
    }

    /// Run one activation.
    ///
    /// 1. Advance past the current waypoint if it is within
    ///    [`WAYPOINT_RADIUS`]; finishing the route ends the activation.
    /// 2. On the route's approach leg, brake for a non-green governing light
    ///    within [`BRAKING_DISTANCE`] and end the activation.
    /// 3. Accelerate toward the waypoint and move unless the target spot is
    ///    occupied.
    /// 4. Count one step of travel time.
    pub fn activate<S: Surroundings + ?Sized>(&mut self, env: &S) -> VehicleOutcome {
        let Some(mut target) = self.route.waypoint(self.current_segment) else {
            return VehicleOutcome::Finished;
        };

        if self.position.distance(target) < WAYPOINT_RADIUS {
            self.current_segment += 1;
            match self.route.waypoint(self.current_segment) {
                Some(next) => target = next,
                None => return VehicleOutcome::Completed,
            }
        }

        if self.current_segment == self.route.approach_leg() {
            if let Some(signal) = env.governing_light(self.position, target) {
                if signal.position.distance(self.position) < BRAKING_DISTANCE
                    && !signal.state.is_green()
                {
                    self.brake();
                    return VehicleOutcome::Braking;
                }
                self.stopped = false;
                if self.speed > 0.0 {
                    self.waiting_time = self.waiting_time.saturating_sub(1);
                }
            }
        }

        let outcome = match (target - self.position).normalized() {
            Some(dir) => {
                self.speed = (self.speed + self.acceleration).min(self.max_speed);
                let proposed = self.position + dir * self.speed;
                if env.is_occupied(proposed, self.id) {
                    VehicleOutcome::Blocked
                } else {
                    self.position = proposed;
                    VehicleOutcome::Moved
                }
            }
            None => VehicleOutcome::Idle,
        };

        self.total_travel_time += 1;
        outcome
    }

    fn brake(&mut self) {
        self.speed = (self.speed - self.deceleration).max(0.0);
        if self.speed == 0.0 {
            self.stopped = true;
            self.waiting_time += 1;
        }
    }

    /// Travel time on an uncongested run: 10 steps per waypoint.
    pub fn ideal_travel_time(&self) -> u64 {
        self.route.len() as u64 * 10
    }

    /// Steps beyond the ideal travel time, never negative.
    pub fn delay(&self) -> u64 {
        self.total_travel_time.saturating_sub(self.ideal_travel_time())
    }

    pub fn data(&self) -> VehicleData {
        VehicleData {
            id:           self.id,
            position:     self.position,
            destination:  self.destination,
            speed:        self.speed,
            stopped:      self.stopped,
            waiting_time: self.waiting_time,
        }
    }
}
