//! `tl-core`: foundational types for the traffic-light simulator.
//!
//! This crate is a dependency of every other `tl-*` crate.  It has no `tl-*`
//! dependencies and minimal external ones (only `rand`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                       |
//! |-------------|------------------------------------------------|
//! | [`ids`]     | `VehicleId`, `LightId`                         |
//! | [`geo`]     | `Point` on the continuous 2-D plane            |
//! | [`time`]    | `Tick` step counter                            |
//! | [`rng`]     | `SimRng` (seeded, per-simulation)              |
//! | [`signal`]  | `LightState`, `Direction`                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod rng;
pub mod signal;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::Point;
pub use ids::{LightId, VehicleId};
pub use rng::SimRng;
pub use signal::{Direction, LightState};
pub use time::Tick;
