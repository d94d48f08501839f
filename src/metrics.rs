//! Timing observability for the pipeline's network round-trips.
//! Histograms track p50/p95/p99 over a bounded sample window per metric.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// Samples kept per metric; older samples fall out of the window.
const WINDOW: usize = 1024;

/// Well-known metric names.
pub mod metric_names {
    pub const TRANSLATE_DONE: &str = "t_translate_done";
    pub const HISTORY_APPEND: &str = "t_history_append";
    pub const HISTORY_LOAD: &str = "t_history_load";
    pub const HISTORY_CLEAR: &str = "t_history_clear";
}

struct Window {
    samples: Vec<f64>,
    pos: usize,
}

impl Window {
    fn push(&mut self, value: f64) {
        if self.samples.len() < WINDOW {
            self.samples.push(value);
        } else {
            self.samples[self.pos] = value;
            self.pos = (self.pos + 1) % WINDOW;
        }
    }

    fn percentile(&self, p: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let idx = ((p / 100.0) * (sorted.len() as f64 - 1.0)).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }
}

/// Histogram registry for all named timing metrics.
pub struct MetricsRegistry {
    windows: Mutex<HashMap<&'static str, Window>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a sample (milliseconds) for the named metric.
    pub fn record(&self, name: &'static str, value_ms: f64) {
        let mut windows = self.windows.lock();
        windows
            .entry(name)
            .or_insert_with(|| Window {
                samples: Vec::new(),
                pos: 0,
            })
            .push(value_ms);
        tracing::debug!(metric = name, value_ms, "metric_recorded");
    }

    /// Start a timing span that records into this registry on finish.
    pub fn span(self: &Arc<Self>, name: &'static str) -> TimingSpan {
        TimingSpan {
            name,
            start: Instant::now(),
            registry: Arc::clone(self),
        }
    }

    /// p50/p95/p99 summary across all recorded metrics.
    pub fn summary(&self) -> HashMap<String, MetricSummary> {
        let windows = self.windows.lock();
        windows
            .iter()
            .map(|(&name, w)| {
                (
                    name.to_string(),
                    MetricSummary {
                        p50_ms: w.percentile(50.0),
                        p95_ms: w.percentile(95.0),
                        p99_ms: w.percentile(99.0),
                        count: w.samples.len(),
                    },
                )
            })
            .collect()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Measures elapsed time from creation until [`TimingSpan::finish`].
pub struct TimingSpan {
    name: &'static str,
    start: Instant,
    registry: Arc<MetricsRegistry>,
}

impl TimingSpan {
    /// End the span, recording the elapsed duration in milliseconds.
    pub fn finish(self) -> f64 {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.registry.record(self.name, elapsed_ms);
        elapsed_ms
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricSummary {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub count: usize,
}
