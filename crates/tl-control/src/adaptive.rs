//! Queue-driven green-time smoothing.

use serde::{Deserialize, Serialize};
use tl_core::LightState;

use crate::registry::check_range;
use crate::{
    AlgorithmKind, ControlAlgorithm, ControlError, ControlResult, LightData, SimulationContext,
    state_in_cycle,
};

/// Growth factor applied when the queue sits between the medium and high
/// thresholds.
pub const MEDIUM_INCREASE_FACTOR: f64 = 1.2;

/// Tunables for [`AdaptiveAlgorithm`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdaptiveConfig {
    /// Listed for clients that send it; smoothing always starts from the
    /// light's current green, so the value is range-checked and not read.
    pub base_green_time:        u32,
    pub max_green_time:         u32,
    pub min_green_time:         u32,
    pub queue_threshold_high:   u32,
    pub queue_threshold_medium: u32,
    pub queue_increase_factor:  f64,
    pub queue_decrease_factor:  f64,
    /// Fraction of the gap to the target green time closed per activation.
    pub adaptation_rate:        f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            base_green_time:        20,
            max_green_time:         60,
            min_green_time:         10,
            queue_threshold_high:   15,
            queue_threshold_medium: 8,
            queue_increase_factor:  1.5,
            queue_decrease_factor:  0.7,
            adaptation_rate:        0.1,
        }
    }
}

impl AdaptiveConfig {
    pub fn validate(&self) -> ControlResult<()> {
        self.validate_as(AlgorithmKind::Adaptive)
    }

    /// Range checks reported under `kind`, so a nested config inside the
    /// coordinated strategy names the right algorithm.
    pub(crate) fn validate_as(&self, kind: AlgorithmKind) -> ControlResult<()> {
        let a = AlgorithmKind::Adaptive;
        check_range(a, "base_green_time", f64::from(self.base_green_time))?;
        check_range(a, "max_green_time", f64::from(self.max_green_time))?;
        check_range(a, "min_green_time", f64::from(self.min_green_time))?;
        check_range(a, "queue_threshold_high", f64::from(self.queue_threshold_high))?;
        check_range(a, "queue_threshold_medium", f64::from(self.queue_threshold_medium))?;
        check_range(a, "queue_increase_factor", self.queue_increase_factor)?;
        check_range(a, "queue_decrease_factor", self.queue_decrease_factor)?;
        check_range(a, "adaptation_rate", self.adaptation_rate)?;

        if self.min_green_time > self.max_green_time {
            return Err(ControlError::invalid(kind, "min_green_time exceeds max_green_time"));
        }
        if self.queue_threshold_medium > self.queue_threshold_high {
            return Err(ControlError::invalid(
                kind,
                "queue_threshold_medium exceeds queue_threshold_high",
            ));
        }
        Ok(())
    }

    /// Next green duration for a light currently holding `current` steps of
    /// green with `queue` stopped vehicles waiting.
    ///
    /// Moves `adaptation_rate` of the way toward a queue-dependent target,
    /// truncates, and clamps into `[min_green_time, max_green_time]`.
    pub fn green_time(&self, queue: u32, current: u32) -> u32 {
        let max = f64::from(self.max_green_time);
        let min = f64::from(self.min_green_time);
        let cur = f64::from(current);

        let target = if queue > self.queue_threshold_high {
            (cur * self.queue_increase_factor).min(max)
        } else if queue > self.queue_threshold_medium {
            (cur * MEDIUM_INCREASE_FACTOR).min(max)
        } else {
            (cur * self.queue_decrease_factor).max(min)
        };

        let next = (cur + (target - cur) * self.adaptation_rate).trunc();
        (next.max(0.0) as u32).clamp(self.min_green_time, self.max_green_time)
    }
}

/// Stretches green while the approach is congested and shrinks it while it
/// is clear.  All lights share one phase; yellow and red stay fixed.
#[derive(Clone, Debug, Default)]
pub struct AdaptiveAlgorithm {
    pub config: AdaptiveConfig,
}

impl AdaptiveAlgorithm {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self { config }
    }
}

impl ControlAlgorithm for AdaptiveAlgorithm {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Adaptive
    }

    fn calculate_state(&self, light: &LightData, ctx: &SimulationContext<'_>) -> LightState {
        let green = self.config.green_time(light.queue_length, light.green_duration);
        let total = u64::from((green + light.yellow_duration + light.red_duration).max(1));
        state_in_cycle(ctx.current_step.0 % total, green, light.yellow_duration)
    }

    fn update_light(&self, light: &LightData, ctx: &SimulationContext<'_>) -> LightData {
        let green = self.config.green_time(light.queue_length, light.green_duration);
        light.advanced(self.calculate_state(light, ctx), green)
    }
}
