//! Per-step aggregates and their bounded history.

use std::collections::VecDeque;

use serde::Serialize;

/// Entries kept per history series.  Older entries are evicted first.
pub const HISTORY_CAPACITY: usize = 100;

/// System-level indicators, recomputed from scratch after every step.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total_vehicles:     usize,
    /// Mean `waiting_time` over vehicles on the plane; 0 when empty.
    pub avg_waiting_time:   f64,
    /// Sum of per-vehicle delay beyond the ideal travel time.
    pub total_delay:        f64,
    /// Cumulative completed vehicles (not a rate).
    pub throughput:         u64,
    pub avg_speed:          f64,
    pub completed_vehicles: u64,
    pub spawned_vehicles:   u64,
    pub current_step:       u64,
}

/// The last [`HISTORY_CAPACITY`] values of each metric, oldest first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsHistory {
    pub waiting_time_history:  VecDeque<f64>,
    pub delay_history:         VecDeque<f64>,
    pub throughput_history:    VecDeque<u64>,
    pub speed_history:         VecDeque<f64>,
    pub vehicle_count_history: VecDeque<usize>,
    #[serde(skip)]
    capacity: usize,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            waiting_time_history:  VecDeque::with_capacity(capacity),
            delay_history:         VecDeque::with_capacity(capacity),
            throughput_history:    VecDeque::with_capacity(capacity),
            speed_history:         VecDeque::with_capacity(capacity),
            vehicle_count_history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of entries in each series.
    pub fn len(&self) -> usize {
        self.waiting_time_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting_time_history.is_empty()
    }

    /// Append one entry to every series, evicting the oldest beyond capacity.
    pub fn push(&mut self, m: &Metrics) {
        bounded_push(&mut self.waiting_time_history, m.avg_waiting_time, self.capacity);
        bounded_push(&mut self.delay_history, m.total_delay, self.capacity);
        bounded_push(&mut self.throughput_history, m.throughput, self.capacity);
        bounded_push(&mut self.speed_history, m.avg_speed, self.capacity);
        bounded_push(&mut self.vehicle_count_history, m.total_vehicles, self.capacity);
    }

    /// Summary statistics over the retained window, or `None` before the
    /// first step.
    pub fn aggregate(&self) -> Option<AggregateMetrics> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        let mean = |s: &VecDeque<f64>| s.iter().sum::<f64>() / n;
        let max  = |s: &VecDeque<f64>| s.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min  = |s: &VecDeque<f64>| s.iter().copied().fold(f64::INFINITY, f64::min);

        Some(AggregateMetrics {
            avg_waiting_time: mean(&self.waiting_time_history),
            max_waiting_time: max(&self.waiting_time_history),
            min_waiting_time: min(&self.waiting_time_history),
            avg_delay:        mean(&self.delay_history),
            max_delay:        max(&self.delay_history),
            total_throughput: self.throughput_history.iter().sum(),
            avg_speed:        mean(&self.speed_history),
            avg_vehicles:     self.vehicle_count_history.iter().sum::<usize>() as f64 / n,
        })
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn bounded_push<T>(series: &mut VecDeque<T>, value: T, capacity: usize) {
    series.push_back(value);
    while series.len() > capacity {
        series.pop_front();
    }
}

/// Window statistics returned by [`MetricsHistory::aggregate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub avg_waiting_time: f64,
    pub max_waiting_time: f64,
    pub min_waiting_time: f64,
    pub avg_delay:        f64,
    pub max_delay:        f64,
    /// Sum of the cumulative throughput series over the window.
    pub total_throughput: u64,
    pub avg_speed:        f64,
    pub avg_vehicles:     f64,
}

/// Current metrics plus the window aggregate, as served to API clients.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsReport {
    pub current_step: u64,
    pub algorithm:    tl_control::AlgorithmKind,
    pub metrics:      Metrics,
    pub aggregated:   Option<AggregateMetrics>,
}
