//! Read-only simulation state passed to every control algorithm.

use tl_core::{Direction, LightId, LightState, Point, Tick, VehicleId};

use crate::AlgorithmConfig;

/// A traffic light as seen by a control algorithm.
///
/// This is both the input and the output of
/// [`ControlAlgorithm::update_light`][crate::ControlAlgorithm::update_light]:
/// the algorithm returns the successor record and the owning light copies
/// the mutable fields back.
#[derive(Clone, Debug, PartialEq)]
pub struct LightData {
    pub id:        LightId,
    pub state:     LightState,
    pub position:  Point,
    pub direction: Direction,

    /// Number of times this light has been activated.  Monotonic.
    pub timer: u64,

    /// Consecutive activations the current `state` has been displayed for.
    /// Reset to 0 whenever the display changes.
    pub steps_in_state: u64,

    pub green_duration:  u32,
    pub yellow_duration: u32,
    pub red_duration:    u32,

    /// Stopped vehicles on this light's approach, refreshed by the light
    /// immediately before the algorithm runs.
    pub queue_length: u32,

    /// Lights this one may coordinate with.
    pub neighbors: Vec<LightId>,
}

impl LightData {
    /// `green + yellow + red`.
    #[inline]
    pub fn cycle_length(&self) -> u32 {
        self.green_duration + self.yellow_duration + self.red_duration
    }

    /// The record one activation later, displaying `state` with the given
    /// green duration.  Every algorithm funnels its result through here so
    /// `timer` and `steps_in_state` advance identically.
    pub fn advanced(&self, state: LightState, green_duration: u32) -> LightData {
        let steps_in_state = if state == self.state { self.steps_in_state + 1 } else { 0 };
        LightData {
            state,
            timer: self.timer + 1,
            steps_in_state,
            green_duration,
            neighbors: self.neighbors.clone(),
            ..*self
        }
    }
}

/// A vehicle as seen by a control algorithm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleData {
    pub id:           VehicleId,
    pub position:     Point,
    pub destination:  Point,
    pub speed:        f64,
    pub stopped:      bool,
    pub waiting_time: u64,
}

/// A read-only snapshot of the simulation passed to every
/// [`ControlAlgorithm`][crate::ControlAlgorithm] call.
///
/// # Lifetimes
///
/// All borrows live for the duration of one light activation.  tl-sim never
/// allows mutable access to the borrowed slices while a context is live.
pub struct SimulationContext<'a> {
    /// Step counter at the time of the activation.
    pub current_step: Tick,

    /// Every vehicle currently on the plane.
    pub vehicles: &'a [VehicleData],

    /// Every traffic light, including the one being activated.
    pub lights: &'a [LightData],

    /// The algorithm configuration currently selected for the simulation.
    pub config: &'a AlgorithmConfig,
}

impl<'a> SimulationContext<'a> {
    #[inline]
    pub fn new(
        current_step: Tick,
        vehicles:     &'a [VehicleData],
        lights:       &'a [LightData],
        config:       &'a AlgorithmConfig,
    ) -> Self {
        Self { current_step, vehicles, lights, config }
    }

    /// Lights declared as neighbours of `light`, in context order.
    pub fn neighbors_of<'b>(&self, light: &'b LightData) -> impl Iterator<Item = &'a LightData> + 'b
    where
        'a: 'b,
    {
        let lights: &'a [LightData] = self.lights;
        lights.iter().filter(move |l| light.neighbors.contains(&l.id))
    }
}
