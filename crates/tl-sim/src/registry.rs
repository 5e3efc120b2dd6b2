//! Process-wide map of live simulations.
//!
//! # Locking
//!
//! The map itself sits behind an `RwLock` held only long enough to look up,
//! insert or remove an entry.  Each simulation has its own `Mutex`, held for
//! the whole of a step (or a batch of steps) and any snapshot taken right
//! after it, so a reader never sees a half-finished step.  Independent
//! simulations never contend.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::info;
use serde::Serialize;
use serde_json::Value;
use tl_control::AlgorithmKind;

use crate::{
    ConfigUpdate, Metrics, MetricsReport, RoadLayout, SimError, SimResult, Simulation,
    SimulationBuilder, SimulationConfig, SimulationState,
};

/// Handle to a simulation in a [`SimulationRegistry`].  Displays as `sim_N`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimulationId(pub u64);

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sim_{}", self.0)
    }
}

impl FromStr for SimulationId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("sim_")
            .and_then(|n| n.parse().ok())
            .map(SimulationId)
            .ok_or_else(|| SimError::invalid(format!("malformed simulation id {s:?}")))
    }
}

impl Serialize for SimulationId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of [`SimulationRegistry::list`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub id:               SimulationId,
    pub steps:            u64,
    pub algorithm:        AlgorithmKind,
    /// Vehicles currently on the plane.
    pub num_vehicles:     usize,
    pub road_config:      RoadLayout,
    pub avg_waiting_time: f64,
}

type Shared = Arc<Mutex<Simulation>>;

/// Owns every live simulation behind a handle.
///
/// Ids are allocated monotonically and never reused, so a deleted id keeps
/// failing with [`SimError::NotFound`].
#[derive(Default)]
pub struct SimulationRegistry {
    sims:    RwLock<BTreeMap<SimulationId, Shared>>,
    next_id: AtomicU64,
}

impl SimulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register a simulation.  The config is validated first;
    /// nothing is registered on error.
    pub fn create(&self, config: SimulationConfig) -> SimResult<SimulationId> {
        let sim = SimulationBuilder::new(config).build()?;
        let id  = SimulationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sims
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(sim)));
        info!("{id} created");
        Ok(id)
    }

    /// [`create`][Self::create] from a raw JSON config mapping.
    pub fn create_from_json(&self, config: &Value) -> SimResult<SimulationId> {
        self.create(SimulationConfig::from_json(config)?)
    }

    /// The shared handle, for callers that need to hold the lock across
    /// several operations.
    pub fn get(&self, id: SimulationId) -> SimResult<Shared> {
        self.sims
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(SimError::NotFound(id))
    }

    /// Run `f` with exclusive access to simulation `id`.
    pub fn with<R>(&self, id: SimulationId, f: impl FnOnce(&mut Simulation) -> R) -> SimResult<R> {
        let shared = self.get(id)?;
        let mut sim = shared.lock().map_err(|_| SimError::LockPoisoned(id))?;
        Ok(f(&mut sim))
    }

    pub fn step(&self, id: SimulationId) -> SimResult<Metrics> {
        self.step_n(id, 1)
    }

    /// Advance `n` steps under one lock and return the final metrics.
    pub fn step_n(&self, id: SimulationId, n: u64) -> SimResult<Metrics> {
        self.with(id, |sim| {
            for _ in 0..n {
                sim.step();
            }
            sim.metrics().clone()
        })
    }

    /// An unknown `id` is reported before an unknown `algorithm`.
    pub fn change_algorithm(&self, id: SimulationId, algorithm: &str, config: &Value) -> SimResult<()> {
        let shared = self.get(id)?;
        let kind: AlgorithmKind = algorithm.parse()?;
        let mut sim = shared.lock().map_err(|_| SimError::LockPoisoned(id))?;
        sim.change_algorithm(kind, config)
    }

    pub fn update_config(&self, id: SimulationId, update: &ConfigUpdate) -> SimResult<()> {
        self.with(id, |sim| sim.update_config(update))?
    }

    pub fn get_state(&self, id: SimulationId) -> SimResult<SimulationState> {
        self.with(id, |sim| {
            let mut state = sim.get_simulation_state();
            state.simulation_id = Some(id.to_string());
            state
        })
    }

    pub fn metrics(&self, id: SimulationId) -> SimResult<MetricsReport> {
        self.with(id, |sim| MetricsReport {
            current_step: sim.current_step().0,
            algorithm:    sim.config().algorithm,
            metrics:      sim.metrics().clone(),
            aggregated:   sim.history().aggregate(),
        })
    }

    /// Summaries of every live simulation, in id order.  Simulations whose
    /// lock is poisoned are skipped.
    pub fn list(&self) -> Vec<SimulationSummary> {
        let sims: Vec<(SimulationId, Shared)> = self
            .sims
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(&id, sim)| (id, Arc::clone(sim)))
            .collect();

        sims.into_iter()
            .filter_map(|(id, shared)| {
                let sim = shared.lock().ok()?;
                Some(SimulationSummary {
                    id,
                    steps:            sim.current_step().0,
                    algorithm:        sim.config().algorithm,
                    num_vehicles:     sim.metrics().total_vehicles,
                    road_config:      sim.config().road_config,
                    avg_waiting_time: sim.metrics().avg_waiting_time,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sims.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop simulation `id`.  A caller still holding its handle from
    /// [`get`][Self::get] keeps it alive until released.
    pub fn delete(&self, id: SimulationId) -> SimResult<()> {
        self.sims
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| info!("{id} deleted"))
            .ok_or(SimError::NotFound(id))
    }
}
