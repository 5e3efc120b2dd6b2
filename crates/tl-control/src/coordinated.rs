//! Adaptive timing with neighbour-aware phase offsets.
//!
//! The adaptive strategy decides whether a light is GREEN at all.  While it
//! is, this strategy reshapes the green window:
//!
//! - **extend**: this light has a queue (> [`EXTEND_QUEUE_THRESHOLD`]) and a
//!   neighbour is about to leave RED.  The window grows by
//!   [`EXTENSION_STEPS`] and the duration is nudged up, capped at
//!   [`EXTENDED_GREEN_CAP`].
//! - **trim**: otherwise the last [`EXTENSION_STEPS`] of the window turn
//!   YELLOW early.
//!
//! Both windows are shifted by an offset derived from the average travel
//! time to nearby neighbours at the configured green-wave speed.

use serde::{Deserialize, Serialize};
use tl_core::LightState;

use crate::registry::check_range;
use crate::{
    AdaptiveAlgorithm, AdaptiveConfig, AlgorithmKind, ControlAlgorithm, ControlError,
    ControlResult, LightData, SimulationContext,
};

/// Steps added to (or trimmed from) the green window.
pub const EXTENSION_STEPS: u32 = 5;

/// Queue length above which a light asks for an extension.
pub const EXTEND_QUEUE_THRESHOLD: u32 = 3;

/// Absolute ceiling on an extended green duration.
pub const EXTENDED_GREEN_CAP: u32 = 60;

/// How the phase offset between neighbouring lights is derived.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetCalculation {
    /// Average neighbour travel time at `green_wave_speed`.
    #[default]
    DistanceBased,
    /// No offset.
    None,
}

/// Tunables for [`CoordinatedAlgorithm`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatedConfig {
    /// Neighbours farther than this are ignored entirely.
    pub coordination_radius: f64,
    pub green_wave_speed:    f64,
    pub offset_calculation:  OffsetCalculation,
    pub min_offset:          u32,
    pub max_offset:          u32,
    /// Settings of the underlying adaptive strategy.
    pub adaptive:            AdaptiveConfig,

    // Accepted and range-checked; the green wave is timed from the nested
    // adaptive settings and `EXTENSION_STEPS`.
    pub base_green_time:     u32,
    pub sync_tolerance:      u32,
}

impl Default for CoordinatedConfig {
    fn default() -> Self {
        Self {
            coordination_radius: 50.0,
            green_wave_speed:    10.0,
            offset_calculation:  OffsetCalculation::DistanceBased,
            min_offset:          5,
            max_offset:          30,
            adaptive:            AdaptiveConfig::default(),
            base_green_time:     25,
            sync_tolerance:      3,
        }
    }
}

impl CoordinatedConfig {
    pub fn validate(&self) -> ControlResult<()> {
        let kind = AlgorithmKind::Coordinated;
        check_range(kind, "coordination_radius", self.coordination_radius)?;
        check_range(kind, "green_wave_speed", self.green_wave_speed)?;
        check_range(kind, "min_offset", f64::from(self.min_offset))?;
        check_range(kind, "max_offset", f64::from(self.max_offset))?;
        check_range(kind, "base_green_time", f64::from(self.base_green_time))?;
        check_range(kind, "sync_tolerance", f64::from(self.sync_tolerance))?;
        if self.min_offset > self.max_offset {
            return Err(ControlError::invalid(kind, "min_offset exceeds max_offset"));
        }
        self.adaptive.validate_as(kind)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CoordinatedAlgorithm {
    pub config: CoordinatedConfig,
    base:       AdaptiveAlgorithm,
}

impl CoordinatedAlgorithm {
    pub fn new(config: CoordinatedConfig) -> Self {
        let base = AdaptiveAlgorithm::new(config.adaptive.clone());
        Self { config, base }
    }

    /// Declared neighbours of `light` within `coordination_radius`.
    fn nearby<'a>(&self, light: &LightData, ctx: &SimulationContext<'a>) -> Vec<&'a LightData> {
        let radius = self.config.coordination_radius;
        ctx.neighbors_of(light)
            .filter(|n| n.position.distance(light.position) <= radius)
            .collect()
    }

    /// Phase offset in steps; 0 when there is no neighbour in range.
    pub fn offset(&self, light: &LightData, nearby: &[&LightData]) -> u32 {
        let cfg = &self.config;
        if nearby.is_empty() || cfg.offset_calculation == OffsetCalculation::None {
            return 0;
        }
        let speed = cfg.green_wave_speed.max(f64::EPSILON);
        let total: f64 = nearby
            .iter()
            .map(|n| n.position.distance(light.position) / speed)
            .sum();
        let avg = (total / nearby.len() as f64) as u32;
        (avg % light.green_duration.max(1)).clamp(cfg.min_offset, cfg.max_offset)
    }

    /// A queue is waiting here and some neighbour is within
    /// [`EXTENSION_STEPS`] of the end of its red window.
    pub fn should_extend(&self, light: &LightData, nearby: &[&LightData]) -> bool {
        light.queue_length > EXTEND_QUEUE_THRESHOLD
            && nearby.iter().any(|n| {
                n.state == LightState::Red
                    && n.steps_in_state + u64::from(EXTENSION_STEPS) > u64::from(n.red_duration)
            })
    }
}

impl ControlAlgorithm for CoordinatedAlgorithm {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Coordinated
    }

    fn calculate_state(&self, light: &LightData, ctx: &SimulationContext<'_>) -> LightState {
        let base = self.base.calculate_state(light, ctx);
        if base != LightState::Green {
            return base;
        }

        let nearby = self.nearby(light, ctx);
        let step   = ctx.current_step.0 + u64::from(self.offset(light, &nearby));
        let green  = u64::from(light.green_duration);
        let ext    = u64::from(EXTENSION_STEPS);

        let in_window = if self.should_extend(light, &nearby) {
            step % (green + ext) < green
        } else {
            step % green.max(1) < green.saturating_sub(ext)
        };
        if in_window { LightState::Green } else { LightState::Yellow }
    }

    fn update_light(&self, light: &LightData, ctx: &SimulationContext<'_>) -> LightData {
        let state  = self.calculate_state(light, ctx);
        let nearby = self.nearby(light, ctx);
        let mut green = self.config.adaptive.green_time(light.queue_length, light.green_duration);
        if self.should_extend(light, &nearby) {
            green = (green + EXTENSION_STEPS).min(EXTENDED_GREEN_CAP);
        }
        light.advanced(state, green)
    }
}
