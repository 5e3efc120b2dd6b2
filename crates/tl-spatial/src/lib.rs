//! `tl-spatial`: continuous-plane occupancy index.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`index`]   | `SpatialIndex` (R-tree + id lookup), occupancy constants    |
//!
//! Spatial queries never fail: an empty neighbour set is a normal result,
//! so this crate has no error type.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | Use FxHash for the `VehicleId → Point` lookup table.       |

pub mod index;


pub use index::{OCCUPANCY_RADIUS, SEARCH_RADIUS, SpatialIndex};
