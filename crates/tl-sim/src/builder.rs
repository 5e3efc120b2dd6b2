//! Fluent builder for constructing a [`Simulation`].

use std::collections::BTreeMap;

use log::info;
use tl_agent::{Crossroad, TrafficLight};
use tl_core::{SimRng, Tick};
use tl_spatial::SpatialIndex;

use crate::{MetricsHistory, RoadLayout, SimResult, Simulation, SimulationConfig};

/// Fluent builder for [`Simulation`].
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                   |
/// |------------------------|-------------------------------------------|
/// | `.seed(s)`             | `config.seed`, else drawn from OS entropy |
/// | `.history_capacity(n)` | [`HISTORY_CAPACITY`][crate::HISTORY_CAPACITY] |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimulationBuilder::new(config).seed(7).build()?;
/// sim.run_steps(100, &mut NoopObserver);
/// ```
pub struct SimulationBuilder {
    config:           SimulationConfig,
    seed:             Option<u64>,
    history_capacity: Option<usize>,
}

impl SimulationBuilder {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config, seed: None, history_capacity: None }
    }

    /// Fix the RNG seed, overriding `config.seed`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Validate the config, lay out the road network and lights, place the
    /// initial vehicles, and return a simulation at step 0.
    pub fn build(self) -> SimResult<Simulation> {
        let mut config = self.config;
        config.validate()?;
        let algorithm = config.algorithm_settings()?;

        let seed = self.seed.or(config.seed).unwrap_or_else(SimRng::entropy_seed);
        config.seed = Some(seed);

        // ── Road network and lights ───────────────────────────────────────
        let layout = match config.road_config {
            RoadLayout::Crossroad => Crossroad::new(config.grid_width, config.grid_height),
        };
        let placements = layout.lights();
        let lights: Vec<TrafficLight> = placements
            .iter()
            .map(|&(id, position, direction)| {
                let mut light = TrafficLight::new(id, position, direction, algorithm.build());
                light.neighbors = placements
                    .iter()
                    .map(|&(other, _, _)| other)
                    .filter(|&other| other != id)
                    .collect();
                light
            })
            .collect();

        let history = match self.history_capacity {
            Some(n) => MetricsHistory::with_capacity(n),
            None => MetricsHistory::new(),
        };

        let mut sim = Simulation {
            algorithm,
            layout,
            vehicles: BTreeMap::new(),
            lights,
            index: SpatialIndex::new(),
            rng: SimRng::new(seed),
            step: Tick::ZERO,
            next_vehicle_id: 0,
            completed: 0,
            spawned: 0,
            pending_spawns: 0,
            metrics: Default::default(),
            history,
            config,
        };

        // ── Initial vehicles ──────────────────────────────────────────────
        for _ in 0..sim.config.num_vehicles {
            sim.spawn_or_defer();
        }
        sim.metrics = sim.compute_metrics();

        info!(
            "simulation built: {}x{} {:?}, {} control, seed {seed}, {} vehicles placed, {} deferred",
            sim.config.grid_width,
            sim.config.grid_height,
            sim.config.road_config,
            sim.algorithm.kind(),
            sim.vehicles.len(),
            sim.pending_spawns,
        );
        Ok(sim)
    }
}
