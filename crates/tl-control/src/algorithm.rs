//! The `ControlAlgorithm` trait: the extension point for signal timing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tl_core::LightState;

use crate::{ControlError, LightData, SimulationContext};

/// Identifier of a built-in control algorithm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    #[default]
    Static,
    Adaptive,
    Coordinated,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 3] =
        [AlgorithmKind::Static, AlgorithmKind::Adaptive, AlgorithmKind::Coordinated];

    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmKind::Static      => "static",
            AlgorithmKind::Adaptive    => "adaptive",
            AlgorithmKind::Coordinated => "coordinated",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ControlError::UnknownAlgorithm(s.to_owned()))
    }
}

/// Pluggable signal timing.
///
/// Both methods are pure: they read the light's record and the context and
/// return a value.  No hidden state may change between calls, so the same
/// algorithm instance can serve every light in a simulation.
///
/// # Thread safety
///
/// Simulations live behind a mutex in the registry and may move between
/// threads, so implementations must be `Send + Sync`.
pub trait ControlAlgorithm: Send + Sync + 'static {
    /// Which built-in this is.  Reported in snapshots and logs.
    fn kind(&self) -> AlgorithmKind;

    /// The display state `light` should show at `ctx.current_step`.
    fn calculate_state(&self, light: &LightData, ctx: &SimulationContext<'_>) -> LightState;

    /// The light's record after this activation: new state, possibly a new
    /// green duration, `timer` advanced by one.
    fn update_light(&self, light: &LightData, ctx: &SimulationContext<'_>) -> LightData;
}

/// Map a position inside a GREEN → YELLOW → RED cycle to a display state.
#[inline]
pub fn state_in_cycle(step_in_cycle: u64, green: u32, yellow: u32) -> LightState {
    let green = u64::from(green);
    if step_in_cycle < green {
        LightState::Green
    } else if step_in_cycle < green + u64::from(yellow) {
        LightState::Yellow
    } else {
        LightState::Red
    }
}
