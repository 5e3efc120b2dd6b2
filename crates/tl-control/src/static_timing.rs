//! Fixed-duration round-robin timing.

use serde::{Deserialize, Serialize};
use tl_core::{Direction, LightState};

use crate::registry::check_range;
use crate::{AlgorithmKind, ControlAlgorithm, ControlResult, LightData, SimulationContext, state_in_cycle};

/// Tunables for [`StaticAlgorithm`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticConfig {
    pub green_duration:  u32,
    pub yellow_duration: u32,
    pub red_duration:    u32,
    /// Per-light phase shift: light `i` runs `cycle_offset * i` steps ahead.
    pub cycle_offset:    u32,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            green_duration:  30,
            yellow_duration: 5,
            red_duration:    35,
            cycle_offset:    0,
        }
    }
}

impl StaticConfig {
    pub fn cycle_length(&self) -> u32 {
        self.green_duration + self.yellow_duration + self.red_duration
    }

    pub fn validate(&self) -> ControlResult<()> {
        let kind = AlgorithmKind::Static;
        check_range(kind, "green_duration", f64::from(self.green_duration))?;
        check_range(kind, "yellow_duration", f64::from(self.yellow_duration))?;
        check_range(kind, "red_duration", f64::from(self.red_duration))?;
        check_range(kind, "cycle_offset", f64::from(self.cycle_offset))
    }
}

/// Every light runs the same fixed cycle.  Vertical lights are shifted by
/// `green + yellow`, so with a shared phase a horizontal and a vertical light
/// are never GREEN together.  Durations are never adapted.
#[derive(Clone, Debug, Default)]
pub struct StaticAlgorithm {
    pub config: StaticConfig,
}

impl StaticAlgorithm {
    pub fn new(config: StaticConfig) -> Self {
        Self { config }
    }
}

impl ControlAlgorithm for StaticAlgorithm {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Static
    }

    fn calculate_state(&self, light: &LightData, ctx: &SimulationContext<'_>) -> LightState {
        let cfg   = &self.config;
        let total = u64::from(cfg.cycle_length().max(1));
        let shift = u64::from(cfg.cycle_offset) * u64::from(light.id.0);
        let phase = (ctx.current_step.0 + shift) % total;

        let phase = match light.direction {
            Direction::Horizontal => phase,
            Direction::Vertical => {
                (phase + u64::from(cfg.green_duration + cfg.yellow_duration)) % total
            }
        };
        state_in_cycle(phase, cfg.green_duration, cfg.yellow_duration)
    }

    /// Stamps the configured durations onto the light, so its record
    /// matches the cycle it is actually running.
    fn update_light(&self, light: &LightData, ctx: &SimulationContext<'_>) -> LightData {
        let cfg = &self.config;
        LightData {
            yellow_duration: cfg.yellow_duration,
            red_duration:    cfg.red_duration,
            ..light.advanced(self.calculate_state(light, ctx), cfg.green_duration)
        }
    }
}
