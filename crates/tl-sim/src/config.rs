//! Simulation configuration and runtime updates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tl_control::{AlgorithmConfig, AlgorithmKind};

use crate::{SimError, SimResult};

/// Road network generator.  Only the single crossroad exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadLayout {
    #[default]
    Crossroad,
}

/// Everything needed to build a [`Simulation`][crate::Simulation].
///
/// Deserialises from the JSON mapping an API client would send; every key is
/// optional and unknown keys are rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub grid_width:   u32,
    pub grid_height:  u32,
    pub num_vehicles: u32,

    pub algorithm: AlgorithmKind,

    /// Raw per-algorithm settings as supplied; validated by
    /// [`algorithm_settings`][Self::algorithm_settings].
    pub algorithm_config: Value,

    /// Probability in `[0, 1]` that a completed vehicle is replaced.
    pub spawn_rate: f64,

    /// Pacing hint for whoever drives `step()`; the engine ignores it.
    pub simulation_speed: f64,

    pub road_config: RoadLayout,

    /// RNG seed.  `None` draws one from OS entropy at build time; the built
    /// simulation's config always carries the seed actually used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width:       50,
            grid_height:      50,
            num_vehicles:     20,
            algorithm:        AlgorithmKind::Static,
            algorithm_config: Value::Object(Default::default()),
            spawn_rate:       0.1,
            simulation_speed: 1.0,
            road_config:      RoadLayout::Crossroad,
            seed:             None,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON mapping.  `null` yields the defaults.
    pub fn from_json(value: &Value) -> SimResult<Self> {
        let config = if value.is_null() {
            Self::default()
        } else {
            Self::deserialize(value).map_err(|e| SimError::invalid(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SimError::invalid(format!(
                "grid must be non-empty, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if !(0.0..=1.0).contains(&self.spawn_rate) {
            return Err(SimError::invalid(format!(
                "spawn_rate must be in [0, 1], got {}",
                self.spawn_rate
            )));
        }
        if !self.simulation_speed.is_finite() || self.simulation_speed < 0.0 {
            return Err(SimError::invalid(format!(
                "simulation_speed must be finite and non-negative, got {}",
                self.simulation_speed
            )));
        }
        self.algorithm_settings().map(|_| ())
    }

    /// The parsed, validated settings for `algorithm`.
    pub fn algorithm_settings(&self) -> SimResult<AlgorithmConfig> {
        Ok(AlgorithmConfig::from_json(self.algorithm, &self.algorithm_config)?)
    }

    /// A copy with every field present in `update` overwritten.
    pub fn merged(&self, update: &ConfigUpdate) -> Self {
        let mut next = self.clone();
        if let Some(n) = update.num_vehicles {
            next.num_vehicles = n;
        }
        if let Some(rate) = update.spawn_rate {
            next.spawn_rate = rate;
        }
        if let Some(speed) = update.simulation_speed {
            next.simulation_speed = speed;
        }
        if let Some(layout) = update.road_config {
            next.road_config = layout;
        }
        if let Some(kind) = update.algorithm {
            next.algorithm = kind;
            // A new algorithm without settings starts from its defaults.
            if update.algorithm_config.is_none() && kind != self.algorithm {
                next.algorithm_config = Value::Object(Default::default());
            }
        }
        if let Some(cfg) = &update.algorithm_config {
            next.algorithm_config = cfg.clone();
        }
        next
    }
}

/// A partial config applied to a running simulation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigUpdate {
    pub num_vehicles:     Option<u32>,
    pub spawn_rate:       Option<f64>,
    pub simulation_speed: Option<f64>,
    pub road_config:      Option<RoadLayout>,
    pub algorithm:        Option<AlgorithmKind>,
    pub algorithm_config: Option<Value>,
}

impl ConfigUpdate {
    pub fn from_json(value: &Value) -> SimResult<Self> {
        Self::deserialize(value).map_err(|e| SimError::invalid(e.to_string()))
    }
}
