//! Traffic-light agent.

use tl_control::{AlgorithmKind, ControlAlgorithm, LightData, SimulationContext, VehicleData};
use tl_core::{Direction, LightId, LightState, Point};

/// Stopped vehicles within this distance across the controlled axis count
/// toward the queue.
pub const QUEUE_TOLERANCE: f64 = 5.0;

/// Moving vehicles closer than this to a GREEN light count as passing it.
pub const PASSING_RADIUS: f64 = 3.0;

/// Vehicles further than this across the axis are not governed by a light.
pub const GOVERNING_TOLERANCE: f64 = 3.0;

/// A signal at a fixed position, controlling one axis.
///
/// The light owns its control strategy and the mutable timing record the
/// strategy reads and rewrites.  Everything else it needs (other lights,
/// vehicles, the step counter) arrives through the activation context.
pub struct TrafficLight {
    pub id:        LightId,
    pub position:  Point,
    pub direction: Direction,
    pub state:     LightState,

    algorithm: Box<dyn ControlAlgorithm>,

    pub timer:           u64,
    pub steps_in_state:  u64,
    pub green_duration:  u32,
    pub yellow_duration: u32,
    pub red_duration:    u32,

    pub queue_length:       u32,
    pub max_queue_observed: u32,
    pub total_passed:       u64,

    pub neighbors: Vec<LightId>,
}

impl TrafficLight {
    pub const GREEN_DURATION:  u32 = 30;
    pub const YELLOW_DURATION: u32 = 5;
    pub const RED_DURATION:    u32 = 35;

    /// A RED light with default durations and no neighbours.
    pub fn new(
        id:        LightId,
        position:  Point,
        direction: Direction,
        algorithm: Box<dyn ControlAlgorithm>,
    ) -> Self {
        Self {
            id,
            position,
            direction,
            state: LightState::Red,
            algorithm,
            timer: 0,
            steps_in_state: 0,
            green_duration: Self::GREEN_DURATION,
            yellow_duration: Self::YELLOW_DURATION,
            red_duration: Self::RED_DURATION,
            queue_length: 0,
            max_queue_observed: 0,
            total_passed: 0,
            neighbors: Vec::new(),
        }
    }

    pub fn algorithm_kind(&self) -> AlgorithmKind {
        self.algorithm.kind()
    }

    /// Swap the control strategy.  Timing state is kept; the new strategy
    /// takes over at the next activation.
    pub fn set_algorithm(&mut self, algorithm: Box<dyn ControlAlgorithm>) {
        self.algorithm = algorithm;
    }

    /// `vehicle` is stopped on this light's approach: close to the
    /// controlled axis, with the light ahead of it and its destination in
    /// the same direction.
    pub fn is_queued(&self, vehicle: &VehicleData) -> bool {
        if !vehicle.stopped {
            return false;
        }
        let dir = self.direction;
        if (dir.across(vehicle.position) - dir.across(self.position)).abs() >= QUEUE_TOLERANCE {
            return false;
        }
        let here  = dir.along(vehicle.position);
        let light = dir.along(self.position);
        let dest  = dir.along(vehicle.destination);
        (light > here && dest > here) || (light < here && dest < here)
    }

    pub fn queue_length_for(&self, vehicles: &[VehicleData]) -> u32 {
        vehicles.iter().filter(|v| self.is_queued(v)).count() as u32
    }

    /// Recount the queue and fold it into the observed maximum.
    pub fn refresh_queue(&mut self, vehicles: &[VehicleData]) {
        self.queue_length       = self.queue_length_for(vehicles);
        self.max_queue_observed = self.max_queue_observed.max(self.queue_length);
    }

    /// Moving vehicles within [`PASSING_RADIUS`].
    pub fn passing_count(&self, vehicles: &[VehicleData]) -> u32 {
        vehicles
            .iter()
            .filter(|v| !v.stopped && v.position.distance(self.position) < PASSING_RADIUS)
            .count() as u32
    }

    pub fn to_data(&self) -> LightData {
        LightData {
            id:              self.id,
            state:           self.state,
            position:        self.position,
            direction:       self.direction,
            timer:           self.timer,
            steps_in_state:  self.steps_in_state,
            green_duration:  self.green_duration,
            yellow_duration: self.yellow_duration,
            red_duration:    self.red_duration,
            queue_length:    self.queue_length,
            neighbors:       self.neighbors.clone(),
        }
    }

    /// Copy the mutable timing fields back from a strategy's result.
    pub fn apply(&mut self, data: LightData) {
        self.state           = data.state;
        self.timer           = data.timer;
        self.steps_in_state  = data.steps_in_state;
        self.green_duration  = data.green_duration;
        self.yellow_duration = data.yellow_duration;
        self.red_duration    = data.red_duration;
    }

    /// Run the strategy once and apply its result.  The caller refreshes
    /// `queue_length` first.  Returns the number of vehicles counted as
    /// passing (zero unless the new state is GREEN).
    pub fn activate(&mut self, ctx: &SimulationContext<'_>) -> u32 {
        let next = self.algorithm.update_light(&self.to_data(), ctx);
        self.apply(next);

        if !self.state.is_green() {
            return 0;
        }
        let passing = self.passing_count(ctx.vehicles);
        self.total_passed += u64::from(passing);
        passing
    }
}

/// The light governing travel from `position` toward `target`.
///
/// Mostly-horizontal travel is governed by horizontal lights on the same
/// row, mostly-vertical travel by vertical lights on the same column.  The
/// closest along the travel axis wins; ties go to the lower index.
pub fn governing_light(lights: &[TrafficLight], position: Point, target: Point) -> Option<&TrafficLight> {
    let d = target - position;
    let axis = if d.x.abs() > d.y.abs() { Direction::Horizontal } else { Direction::Vertical };

    let mut best: Option<(&TrafficLight, f64)> = None;
    for light in lights.iter().filter(|l| l.direction == axis) {
        if (axis.across(light.position) - axis.across(position)).abs() >= GOVERNING_TOLERANCE {
            continue;
        }
        let dist = (axis.along(light.position) - axis.along(position)).abs();
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((light, dist));
        }
    }
    best.map(|(light, _)| light)
}
