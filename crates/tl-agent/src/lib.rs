//! `tl-agent`: the two kinds of agent that share the plane.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`route`]   | `Route`: fixed waypoint list with a marked approach leg         |
//! | [`layout`]  | `Crossroad`: spawn points, destinations, light placement        |
//! | [`vehicle`] | `Vehicle`, `Surroundings` capability trait, `VehicleOutcome`     |
//! | [`light`]   | `TrafficLight`: wraps one `ControlAlgorithm`, queue + throughput |
//!
//! # Activation model
//!
//! Agents never hold a reference to the engine.  A vehicle sees the world
//! through the [`Surroundings`] trait (governing light + occupancy); a light
//! sees it through a [`SimulationContext`][tl_control::SimulationContext].
//! Both are assembled by tl-sim right before the activation and dropped
//! right after, so the engine keeps exclusive ownership of every agent.

pub mod layout;
pub mod light;
pub mod route;
pub mod vehicle;


pub use layout::Crossroad;
pub use light::{TrafficLight, governing_light};
pub use route::Route;
pub use vehicle::{Signal, Surroundings, Vehicle, VehicleOutcome, VEHICLE_COLORS};
