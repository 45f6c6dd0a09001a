use std::collections::HashMap;
use std::time::Instant;

const METRIC_CAPACITY: usize = 100;
const SLOW_OPERATION_MS: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct PerformanceMetric {
    pub name: String,
    pub duration_ms: f64,
    pub timestamp_ms: f64,
    pub metadata: Option<String>,
    pub error: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricStats {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
}

#[derive(Clone, Debug)]
pub struct PerformanceReport {
    pub timestamp_ms: f64,
    pub metrics: HashMap<String, MetricStats>,
}

/// Wall-clock cost of named operations in a fixed 100-entry ring. The buffer
/// is an index-wrapping array: writing past capacity overwrites the oldest
/// slot, nothing is ever shifted.
pub struct PerformanceMonitor {
    started: Instant,
    metrics: Vec<PerformanceMetric>,
    cursor: usize,
    capacity: usize,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::with_capacity(METRIC_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            started: Instant::now(),
            metrics: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub fn measure<T>(&mut self, name: &str, operation: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = operation();
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.record(name, duration_ms, None, false);
        value
    }

    /// Times a fallible operation. The metric is recorded whether or not the
    /// operation fails; failures are flagged and the error is handed back.
    pub fn measure_fallible<T, E>(
        &mut self,
        name: &str,
        operation: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let start = Instant::now();
        let outcome = operation();
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.record(name, duration_ms, None, outcome.is_err());
        outcome
    }

    pub fn record(&mut self, name: &str, duration_ms: f64, metadata: Option<String>, error: bool) {
        if duration_ms > SLOW_OPERATION_MS {
            log::warn!("slow operation {name:?} took {duration_ms:.1} ms");
        }

        let metric = PerformanceMetric {
            name: name.to_string(),
            duration_ms,
            timestamp_ms: self.now_ms(),
            metadata,
            error,
        };

        if self.metrics.len() < self.capacity {
            self.metrics.push(metric);
        } else {
            self.metrics[self.cursor] = metric;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    /// Stored metrics, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PerformanceMetric> {
        let split = if self.metrics.len() < self.capacity {
            0
        } else {
            self.cursor
        };
        self.metrics[split..].iter().chain(self.metrics[..split].iter())
    }

    pub fn report(&self) -> PerformanceReport {
        let mut durations_by_name: HashMap<&str, Vec<f64>> = HashMap::new();
        for metric in self.iter() {
            durations_by_name
                .entry(metric.name.as_str())
                .or_default()
                .push(metric.duration_ms);
        }

        let mut metrics = HashMap::with_capacity(durations_by_name.len());
        for (name, mut durations) in durations_by_name {
            durations.sort_by(f64::total_cmp);

            let count = durations.len();
            let sum: f64 = durations.iter().sum();
            // Nearest-rank percentile, not interpolated.
            let p95_index = ((count as f64) * 0.95).floor() as usize;
            let p95 = durations[p95_index.min(count - 1)];

            metrics.insert(
                name.to_string(),
                MetricStats {
                    count,
                    average: sum / count as f64,
                    min: durations[0],
                    max: durations[count - 1],
                    p95,
                },
            );
        }

        PerformanceReport {
            timestamp_ms: self.now_ms(),
            metrics,
        }
    }

    pub fn clear(&mut self) {
        self.metrics.clear();
        self.cursor = 0;
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}
