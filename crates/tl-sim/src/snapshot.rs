//! Serialisable views of the whole simulation.
//!
//! Key names match what API clients and the streaming channel expect, so a
//! snapshot can be sent with `serde_json::to_string` as is.

use serde::Serialize;
use tl_agent::{TrafficLight, Vehicle};
use tl_control::AlgorithmKind;
use tl_core::{Direction, LightId, LightState, VehicleId};

use crate::{Metrics, MetricsHistory, SimulationConfig};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub id:              VehicleId,
    pub x:               f64,
    pub y:               f64,
    pub color:           &'static str,
    pub speed:           f64,
    pub waiting_time:    u64,
    pub current_segment: usize,
}

impl From<&Vehicle> for VehicleSnapshot {
    fn from(v: &Vehicle) -> Self {
        Self {
            id:              v.id,
            x:               v.position.x,
            y:               v.position.y,
            color:           v.color,
            speed:           v.speed,
            waiting_time:    v.waiting_time,
            current_segment: v.current_segment,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LightSnapshot {
    pub id:             LightId,
    pub x:              f64,
    pub y:              f64,
    pub state:          LightState,
    pub queue_length:   u32,
    pub direction:      Direction,
    pub green_duration: u32,
    pub max_queue:      u32,
    pub total_passed:   u64,
    pub algorithm:      AlgorithmKind,
    pub timer:          u64,
}

impl From<&TrafficLight> for LightSnapshot {
    fn from(l: &TrafficLight) -> Self {
        Self {
            id:             l.id,
            x:              l.position.x,
            y:              l.position.y,
            state:          l.state,
            queue_length:   l.queue_length,
            direction:      l.direction,
            green_duration: l.green_duration,
            max_queue:      l.max_queue_observed,
            total_passed:   l.total_passed,
            algorithm:      l.algorithm_kind(),
            timer:          l.timer,
        }
    }
}

/// Everything an observer needs to render one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationState {
    /// Filled in by the registry; a bare simulation has no handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation_id:      Option<String>,
    pub steps:              u64,
    pub vehicles:           Vec<VehicleSnapshot>,
    pub traffic_lights:     Vec<LightSnapshot>,
    pub metrics:            Metrics,
    pub historical_metrics: MetricsHistory,
    pub config:             SimulationConfig,
    pub timestamp:          u64,
}
