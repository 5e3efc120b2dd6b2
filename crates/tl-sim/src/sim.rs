//! The `Simulation` struct and its step loop.

use std::collections::BTreeMap;

use log::{debug, info, trace, warn};
use serde_json::Value;
use tl_agent::{
    Crossroad, Signal, Surroundings, TrafficLight, VEHICLE_COLORS, Vehicle, VehicleOutcome,
    governing_light,
};
use tl_control::{AlgorithmConfig, AlgorithmKind, LightData, SimulationContext, VehicleData};
use tl_core::{Point, SimRng, Tick, VehicleId};
use tl_spatial::SpatialIndex;

use crate::{
    ConfigUpdate, LightSnapshot, Metrics, MetricsHistory, NoopObserver, SimObserver, SimResult,
    SimulationConfig, SimulationState, VehicleSnapshot,
};

// ── Activation order ──────────────────────────────────────────────────────────

/// One entry of the shuffled per-step activation list.
#[derive(Copy, Clone, Debug)]
enum AgentRef {
    Vehicle(VehicleId),
    Light(usize),
}

// ── What a vehicle sees ───────────────────────────────────────────────────────

/// Borrowed view handed to [`Vehicle::activate`].  Split from the vehicle
/// map so the active vehicle can be borrowed mutably alongside it.
struct Environment<'a> {
    lights: &'a [TrafficLight],
    index:  &'a SpatialIndex,
}

impl Surroundings for Environment<'_> {
    fn governing_light(&self, position: Point, target: Point) -> Option<Signal> {
        governing_light(self.lights, position, target)
            .map(|l| Signal { position: l.position, state: l.state })
    }

    fn is_occupied(&self, position: Point, exclude: VehicleId) -> bool {
        self.index.occupied(position, Some(exclude))
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// One self-contained intersection simulation.
///
/// Owns every agent, the occupancy index and the RNG; nothing else holds a
/// reference into it.  Not reentrant: callers sharing a simulation across
/// threads wrap it in a mutex (see [`SimulationRegistry`][crate::SimulationRegistry]).
///
/// Create via [`SimulationBuilder`][crate::SimulationBuilder] or
/// [`Simulation::new`].
pub struct Simulation {
    /// Echoed in snapshots; `seed` is always `Some` after construction.
    pub(crate) config: SimulationConfig,

    /// Parsed form of `config.algorithm_config`, shared by every light.
    pub(crate) algorithm: AlgorithmConfig,

    pub(crate) layout:   Crossroad,
    pub(crate) vehicles: BTreeMap<VehicleId, Vehicle>,
    pub(crate) lights:   Vec<TrafficLight>,
    pub(crate) index:    SpatialIndex,
    pub(crate) rng:      SimRng,

    /// Steps completed so far.
    pub(crate) step: Tick,

    pub(crate) next_vehicle_id: u32,
    pub(crate) completed:       u64,
    pub(crate) spawned:         u64,

    /// Spawns that found every entry point occupied; retried each step.
    pub(crate) pending_spawns: u32,

    pub(crate) metrics: Metrics,
    pub(crate) history: MetricsHistory,
}

impl Simulation {
    /// Build from `config`, seeding from `config.seed` or OS entropy.
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        crate::SimulationBuilder::new(config).build()
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance exactly one step.
    pub fn step(&mut self) {
        self.process_step(&mut NoopObserver);
    }

    /// Advance `n` steps, reporting to `observer`.
    pub fn run_steps<O: SimObserver + ?Sized>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.process_step(observer);
        }
    }

    fn process_step<O: SimObserver + ?Sized>(&mut self, observer: &mut O) {
        let now = self.step;
        observer.on_step_start(now);

        // ── ① Deferred spawns ─────────────────────────────────────────────
        let pending = std::mem::take(&mut self.pending_spawns);
        for _ in 0..pending {
            if let Some(id) = self.spawn_or_defer() {
                observer.on_vehicle_spawned(now, id);
            }
        }

        // ── ② Shuffle ─────────────────────────────────────────────────────
        //
        // Vehicles spawned during ③ are not in this list and first move
        // next step.
        let mut order: Vec<AgentRef> = self
            .vehicles
            .keys()
            .map(|&id| AgentRef::Vehicle(id))
            .chain((0..self.lights.len()).map(AgentRef::Light))
            .collect();
        self.rng.shuffle(&mut order);

        // ── ③ Activate ────────────────────────────────────────────────────
        for agent in order {
            match agent {
                AgentRef::Vehicle(id) => self.activate_vehicle(id, observer),
                AgentRef::Light(i)    => self.activate_light(i),
            }
        }

        // ── ④ Metrics ─────────────────────────────────────────────────────
        let vehicles = self.vehicle_data();
        for light in &mut self.lights {
            light.refresh_queue(&vehicles);
        }
        self.step.advance();
        self.metrics = self.compute_metrics();
        self.history.push(&self.metrics);

        trace!(
            "step {} done: {} vehicles, {} completed, avg wait {:.2}",
            now,
            self.metrics.total_vehicles,
            self.completed,
            self.metrics.avg_waiting_time
        );
        observer.on_step_end(now, &self.metrics);
    }

    fn activate_vehicle<O: SimObserver + ?Sized>(&mut self, id: VehicleId, observer: &mut O) {
        let env = Environment { lights: &self.lights, index: &self.index };
        let Some(vehicle) = self.vehicles.get_mut(&id) else {
            // Removed earlier this step.
            return;
        };

        let outcome = vehicle.activate(&env);
        match outcome {
            VehicleOutcome::Moved => {
                let pos = vehicle.position;
                self.index.update(id, pos);
            }
            VehicleOutcome::Completed | VehicleOutcome::Finished => {
                self.complete_vehicle(id, observer);
            }
            VehicleOutcome::Braking | VehicleOutcome::Blocked | VehicleOutcome::Idle => {}
        }
    }

    fn activate_light(&mut self, i: usize) {
        let vehicles = self.vehicle_data();
        match self.lights.get_mut(i) {
            Some(light) => light.refresh_queue(&vehicles),
            None => return,
        }

        // Rebuilt per activation so each light sees the lights activated
        // before it this step.
        let lights: Vec<LightData> = self.lights.iter().map(TrafficLight::to_data).collect();
        let ctx = SimulationContext::new(self.step, &vehicles, &lights, &self.algorithm);
        if let Some(light) = self.lights.get_mut(i) {
            light.activate(&ctx);
        }
    }

    fn complete_vehicle<O: SimObserver + ?Sized>(&mut self, id: VehicleId, observer: &mut O) {
        let Some(vehicle) = self.vehicles.remove(&id) else {
            return;
        };
        self.index.remove(id);
        self.completed += 1;
        debug!("{id} completed after {} steps", vehicle.total_travel_time);
        observer.on_vehicle_completed(self.step, id, vehicle.total_travel_time);

        if self.rng.gen_bool(self.config.spawn_rate) {
            match self.spawn_or_defer() {
                Some(new) => observer.on_vehicle_spawned(self.step, new),
                None => warn!("replacement for {id} deferred: every entry point is occupied"),
            }
        }
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Spawn at a random entry point, or queue the spawn for the next step
    /// if every entry point is occupied.
    pub(crate) fn spawn_or_defer(&mut self) -> Option<VehicleId> {
        let id = self.spawn_random();
        if id.is_none() {
            self.pending_spawns += 1;
        }
        id
    }

    /// Try a random entry point first, then the others in order.
    fn spawn_random(&mut self) -> Option<VehicleId> {
        let points = self.layout.spawn_points();
        let first  = self.rng.gen_range(0..points.len());
        let spawn  = (0..points.len())
            .map(|k| points[(first + k) % points.len()])
            .find(|&p| !self.index.occupied(p, None))?;
        self.insert_vehicle(spawn)
    }

    /// Place a new vehicle at `position` with a random destination.
    ///
    /// Returns `None` without side effects if another vehicle is within
    /// collision range of `position`.
    pub fn spawn_vehicle_at(&mut self, position: Point) -> Option<VehicleId> {
        if self.index.occupied(position, None) {
            return None;
        }
        self.insert_vehicle(position)
    }

    fn insert_vehicle(&mut self, spawn: Point) -> Option<VehicleId> {
        let destinations = self.layout.destinations_from(spawn);
        let destination  = *self.rng.choose(&destinations)?;
        let color        = *self.rng.choose(&VEHICLE_COLORS)?;

        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;

        let vehicle = Vehicle::new(id, spawn, self.layout.center(), destination, color);
        self.index.place(id, spawn);
        self.vehicles.insert(id, vehicle);
        self.spawned += 1;
        debug!("{id} spawned at {spawn} heading for {destination}");
        Some(id)
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Switch every light to `kind` configured by `config` (`null` or `{}`
    /// for defaults).  Light timers, states and durations are untouched; the
    /// new strategy runs from each light's next activation.
    pub fn change_algorithm(&mut self, kind: AlgorithmKind, config: &Value) -> SimResult<()> {
        let settings = AlgorithmConfig::from_json(kind, config)?;
        self.config.algorithm        = kind;
        self.config.algorithm_config = normalized(config);
        self.install(settings);
        Ok(())
    }

    /// Apply a partial config.  Everything is validated before anything
    /// changes; an algorithm change goes through the same path as
    /// [`change_algorithm`][Self::change_algorithm].
    pub fn update_config(&mut self, update: &ConfigUpdate) -> SimResult<()> {
        let mut next = self.config.merged(update);
        next.validate()?;
        let settings = next.algorithm_settings()?;
        next.algorithm_config = normalized(&next.algorithm_config);

        self.config = next;
        if settings != self.algorithm {
            self.install(settings);
        }
        Ok(())
    }

    fn install(&mut self, settings: AlgorithmConfig) {
        for light in &mut self.lights {
            light.set_algorithm(settings.build());
        }
        info!("step {}: lights now run {} control", self.step, settings.kind());
        self.algorithm = settings;
    }

    // ── Metrics ───────────────────────────────────────────────────────────

    fn vehicle_data(&self) -> Vec<VehicleData> {
        self.vehicles.values().map(Vehicle::data).collect()
    }

    pub(crate) fn compute_metrics(&self) -> Metrics {
        let n = self.vehicles.len();
        let mean = |sum: f64| if n == 0 { 0.0 } else { sum / n as f64 };

        let waiting: u64 = self.vehicles.values().map(|v| v.waiting_time).sum();
        let delay: u64   = self.vehicles.values().map(Vehicle::delay).sum();
        let speed: f64   = self.vehicles.values().map(|v| v.speed).sum();

        Metrics {
            total_vehicles:     n,
            avg_waiting_time:   mean(waiting as f64),
            total_delay:        delay as f64,
            throughput:         self.completed,
            avg_speed:          mean(speed),
            completed_vehicles: self.completed,
            spawned_vehicles:   self.spawned,
            current_step:       self.step.0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn current_step(&self) -> Tick {
        self.step
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn algorithm(&self) -> &AlgorithmConfig {
        &self.algorithm
    }

    /// The seed this simulation was built with.
    pub fn seed(&self) -> Option<u64> {
        self.config.seed
    }

    /// Vehicles on the plane, in id order.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles.values()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn lights(&self) -> &[TrafficLight] {
        &self.lights
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }

    pub fn pending_spawns(&self) -> u32 {
        self.pending_spawns
    }

    /// Full serialisable state.
    pub fn get_simulation_state(&self) -> SimulationState {
        SimulationState {
            simulation_id:      None,
            steps:              self.step.0,
            vehicles:           self.vehicles.values().map(VehicleSnapshot::from).collect(),
            traffic_lights:     self.lights.iter().map(LightSnapshot::from).collect(),
            metrics:            self.metrics.clone(),
            historical_metrics: self.history.clone(),
            config:             self.config.clone(),
            timestamp:          self.step.0,
        }
    }
}

/// `null` and `{}` both mean "defaults"; store them as `{}`.
fn normalized(config: &Value) -> Value {
    match config {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    }
}
