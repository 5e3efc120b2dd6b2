//! Step observer trait for progress reporting and data collection.

use tl_core::{Tick, VehicleId};

use crate::Metrics;

/// Callbacks invoked by [`Simulation::run_steps`][crate::Simulation::run_steps].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: throughput printer
///
/// ```rust,ignore
/// struct Throughput { every: u64 }
///
/// impl SimObserver for Throughput {
///     fn on_step_end(&mut self, step: Tick, metrics: &Metrics) {
///         if step.0 % self.every == 0 {
///             println!("{step}: {} completed", metrics.throughput);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before any agent is activated.
    fn on_step_start(&mut self, _step: Tick) {}

    /// Called after the step's metrics are recorded.  `step` is the step that
    /// just ran; `metrics.current_step` is already one past it.
    fn on_step_end(&mut self, _step: Tick, _metrics: &Metrics) {}

    /// A vehicle entered the plane, either as a replacement or a retried
    /// deferred spawn.
    fn on_vehicle_spawned(&mut self, _step: Tick, _vehicle: VehicleId) {}

    /// A vehicle reached its destination and was removed.
    fn on_vehicle_completed(&mut self, _step: Tick, _vehicle: VehicleId, _travel_time: u64) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
