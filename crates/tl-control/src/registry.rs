//! Algorithm lookup by identifier and the declarative parameter table.
//!
//! The table in [`ALGORITHMS`] is what a configuration UI renders.  It is
//! also the single source of truth for parameter ranges: every config's
//! `validate()` checks its fields against it through [`check_range`].

use serde::Serialize;
use serde_json::Value;

use crate::{
    AdaptiveAlgorithm, AdaptiveConfig, AlgorithmKind, ControlAlgorithm, ControlError,
    ControlResult, CoordinatedAlgorithm, CoordinatedConfig, StaticAlgorithm, StaticConfig,
};

// ── Parsed configuration ──────────────────────────────────────────────────────

/// A validated configuration for one of the built-in algorithms.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlgorithmConfig {
    Static(StaticConfig),
    Adaptive(AdaptiveConfig),
    Coordinated(CoordinatedConfig),
}

impl AlgorithmConfig {
    pub fn default_for(kind: AlgorithmKind) -> Self {
        match kind {
            AlgorithmKind::Static      => AlgorithmConfig::Static(StaticConfig::default()),
            AlgorithmKind::Adaptive    => AlgorithmConfig::Adaptive(AdaptiveConfig::default()),
            AlgorithmKind::Coordinated => AlgorithmConfig::Coordinated(CoordinatedConfig::default()),
        }
    }

    /// Parse and validate a JSON mapping for `kind`.  `null` and `{}` select
    /// the defaults; missing keys take their default; unknown keys are
    /// rejected.
    pub fn from_json(kind: AlgorithmKind, value: &Value) -> ControlResult<Self> {
        let config = match value {
            Value::Null => Self::default_for(kind),
            Value::Object(map) if map.is_empty() => Self::default_for(kind),
            Value::Object(_) => match kind {
                AlgorithmKind::Static      => AlgorithmConfig::Static(parse(kind, value)?),
                AlgorithmKind::Adaptive    => AlgorithmConfig::Adaptive(parse(kind, value)?),
                AlgorithmKind::Coordinated => AlgorithmConfig::Coordinated(parse(kind, value)?),
            },
            other => {
                return Err(ControlError::invalid(
                    kind,
                    format!("expected a mapping, got {other}"),
                ));
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            AlgorithmConfig::Static(_)      => AlgorithmKind::Static,
            AlgorithmConfig::Adaptive(_)    => AlgorithmKind::Adaptive,
            AlgorithmConfig::Coordinated(_) => AlgorithmKind::Coordinated,
        }
    }

    pub fn validate(&self) -> ControlResult<()> {
        match self {
            AlgorithmConfig::Static(c)      => c.validate(),
            AlgorithmConfig::Adaptive(c)    => c.validate(),
            AlgorithmConfig::Coordinated(c) => c.validate(),
        }
    }

    /// Instantiate the strategy this config describes.
    pub fn build(&self) -> Box<dyn ControlAlgorithm> {
        match self {
            AlgorithmConfig::Static(c)      => Box::new(StaticAlgorithm::new(c.clone())),
            AlgorithmConfig::Adaptive(c)    => Box::new(AdaptiveAlgorithm::new(c.clone())),
            AlgorithmConfig::Coordinated(c) => Box::new(CoordinatedAlgorithm::new(c.clone())),
        }
    }
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self::default_for(AlgorithmKind::default())
    }
}

fn parse<T: serde::de::DeserializeOwned>(kind: AlgorithmKind, value: &Value) -> ControlResult<T> {
    T::deserialize(value).map_err(|e| ControlError::invalid(kind, e.to_string()))
}

/// Look up an algorithm by identifier and build it from a JSON config.
pub fn create_algorithm(id: &str, config: &Value) -> ControlResult<Box<dyn ControlAlgorithm>> {
    let kind: AlgorithmKind = id.parse()?;
    Ok(AlgorithmConfig::from_json(kind, config)?.build())
}

// ── Parameter metadata ────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Int,
    Float,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub name:    &'static str,
    #[serde(rename = "type")]
    pub kind:    ParamType,
    pub default: f64,
    pub min:     f64,
    pub max:     f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlgorithmInfo {
    pub id:          AlgorithmKind,
    pub name:        &'static str,
    pub description: &'static str,
    pub parameters:  &'static [ParameterInfo],
}

const fn int(name: &'static str, default: u32, min: u32, max: u32) -> ParameterInfo {
    ParameterInfo {
        name,
        kind:    ParamType::Int,
        default: default as f64,
        min:     min as f64,
        max:     max as f64,
    }
}

const fn float(name: &'static str, default: f64, min: f64, max: f64) -> ParameterInfo {
    ParameterInfo { name, kind: ParamType::Float, default, min, max }
}

const STATIC_PARAMS: &[ParameterInfo] = &[
    int("green_duration",  30, 10, 60),
    int("yellow_duration",  5,  3, 10),
    int("red_duration",    35, 20, 70),
    int("cycle_offset",     0,  0, 60),
];

const ADAPTIVE_PARAMS: &[ParameterInfo] = &[
    int("base_green_time",        20, 10, 40),
    int("max_green_time",         60, 30, 90),
    int("min_green_time",         10,  5, 30),
    int("queue_threshold_high",   15,  5, 30),
    int("queue_threshold_medium",  8,  3, 20),
    float("queue_increase_factor", 1.5, 1.0, 3.0),
    float("queue_decrease_factor", 0.7, 0.1, 1.0),
    float("adaptation_rate",       0.1, 0.01, 1.0),
];

const COORDINATED_PARAMS: &[ParameterInfo] = &[
    float("coordination_radius", 50.0, 10.0, 200.0),
    float("green_wave_speed",    10.0,  5.0,  20.0),
    int("min_offset",             5,  0, 20),
    int("max_offset",            30, 10, 60),
    int("base_green_time",       25, 10, 40),
    int("sync_tolerance",         3,  0, 10),
];

/// Every built-in algorithm, in [`AlgorithmKind::ALL`] order.
pub static ALGORITHMS: [AlgorithmInfo; 3] = [
    AlgorithmInfo {
        id:          AlgorithmKind::Static,
        name:        "Static Algorithm",
        description: "Fixed time cycles without adaptation",
        parameters:  STATIC_PARAMS,
    },
    AlgorithmInfo {
        id:          AlgorithmKind::Adaptive,
        name:        "Adaptive Algorithm",
        description: "Adjusts green time based on queue length",
        parameters:  ADAPTIVE_PARAMS,
    },
    AlgorithmInfo {
        id:          AlgorithmKind::Coordinated,
        name:        "Coordinated Algorithm",
        description: "Coordinates multiple traffic lights for green waves",
        parameters:  COORDINATED_PARAMS,
    },
];

/// The full metadata table.
pub fn algorithm_info() -> &'static [AlgorithmInfo] {
    &ALGORITHMS
}

impl AlgorithmKind {
    /// This algorithm's row in [`ALGORITHMS`].
    pub fn info(self) -> &'static AlgorithmInfo {
        match self {
            AlgorithmKind::Static      => &ALGORITHMS[0],
            AlgorithmKind::Adaptive    => &ALGORITHMS[1],
            AlgorithmKind::Coordinated => &ALGORITHMS[2],
        }
    }
}

/// Reject `value` if it lies outside the documented range of parameter
/// `name`.  Parameters absent from the table are not checked.
pub(crate) fn check_range(kind: AlgorithmKind, name: &'static str, value: f64) -> ControlResult<()> {
    let Some(p) = kind.info().parameters.iter().find(|p| p.name == name) else {
        return Ok(());
    };
    if value.is_finite() && value >= p.min && value <= p.max {
        Ok(())
    } else {
        Err(ControlError::OutOfRange { algorithm: kind, name, value, min: p.min, max: p.max })
    }
}
