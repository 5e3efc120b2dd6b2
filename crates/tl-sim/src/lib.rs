//! `tl-sim`: the engine that owns every agent and drives the step loop.
//!
//! # One step
//!
//! ```text
//! step():
//!   ① Spawns    retry spawns deferred because every entry was occupied.
//!   ② Shuffle   all vehicles and lights, in SimRng order.
//!   ③ Activate  each agent once:
//!                 Vehicle → Surroundings (governing light + occupancy),
//!                           move, update index; completion removes it and
//!                           may spawn a replacement (not activated until
//!                           the next step).
//!                 Light   → refresh queue, build SimulationContext,
//!                           ControlAlgorithm::update_light, count passing.
//!   ④ Metrics   refresh queues, recompute aggregates from scratch, append
//!               to the bounded history, advance the step counter.
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`config`]    | `SimulationConfig`, `ConfigUpdate`, `RoadLayout`          |
//! | [`metrics`]   | `Metrics`, `MetricsHistory`, `AggregateMetrics`           |
//! | [`snapshot`]  | `SimulationState` and the per-agent snapshot rows         |
//! | [`sim`]       | `Simulation` and its step loop                            |
//! | [`builder`]   | `SimulationBuilder`                                       |
//! | [`observer`]  | `SimObserver`, `NoopObserver`                             |
//! | [`registry`]  | `SimulationRegistry`, `SimulationId`, `SimulationSummary` |
//! | [`error`]     | `SimError`, `ErrorKind`, `SimResult<T>`                   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tl_sim::{NoopObserver, SimulationBuilder, SimulationConfig};
//!
//! let mut sim = SimulationBuilder::new(SimulationConfig::default())
//!     .seed(42)
//!     .build()?;
//! sim.run_steps(500, &mut NoopObserver);
//! println!("{}", serde_json::to_string(&sim.get_simulation_state())?);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod registry;
pub mod sim;
pub mod snapshot;


pub use builder::SimulationBuilder;
pub use config::{ConfigUpdate, RoadLayout, SimulationConfig};
pub use error::{ErrorKind, SimError, SimResult};
pub use metrics::{AggregateMetrics, HISTORY_CAPACITY, Metrics, MetricsHistory, MetricsReport};
pub use observer::{NoopObserver, SimObserver};
pub use registry::{SimulationId, SimulationRegistry, SimulationSummary};
pub use sim::Simulation;
pub use snapshot::{LightSnapshot, SimulationState, VehicleSnapshot};
