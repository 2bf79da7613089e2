//! In-memory `metrics` recorder for asserting what the relay publishes

use metrics::{
    Counter, CounterFn, Gauge, GaugeFn, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
    SharedString, Unit,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

type Values = Arc<Mutex<HashMap<String, f64>>>;

/// Captures counters, gauges and histogram sample counts by metric name.
///
/// Installed per thread, so async code under test must run on the
/// current-thread runtime started by [`MetricsCapture::block_on`].
#[derive(Default)]
pub struct MetricsCapture {
    counters: Values,
    gauges: Values,
    histograms: Values,
}

struct Slot {
    name: String,
    values: Values,
}

impl Slot {
    fn update(&self, f: impl FnOnce(&mut f64)) {
        if let Ok(mut values) = self.values.lock() {
            f(values.entry(self.name.clone()).or_insert(0.0));
        }
    }
}

impl CounterFn for Slot {
    fn increment(&self, value: u64) {
        self.update(|v| *v += value as f64);
    }

    fn absolute(&self, value: u64) {
        self.update(|v| *v = v.max(value as f64));
    }
}

impl GaugeFn for Slot {
    fn increment(&self, value: f64) {
        self.update(|v| *v += value);
    }

    fn decrement(&self, value: f64) {
        self.update(|v| *v -= value);
    }

    fn set(&self, value: f64) {
        self.update(|v| *v = value);
    }
}

impl HistogramFn for Slot {
    fn record(&self, _value: f64) {
        self.update(|v| *v += 1.0);
    }
}

impl Recorder for MetricsCapture {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(Slot { name: key.name().to_string(), values: self.counters.clone() }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(Slot { name: key.name().to_string(), values: self.gauges.clone() }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(Slot {
            name: key.name().to_string(),
            values: self.histograms.clone(),
        }))
    }
}

impl MetricsCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `future` to completion on a fresh current-thread runtime with
    /// this recorder installed
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");
        metrics::with_local_recorder(self, || runtime.block_on(future))
    }

    pub fn counter(&self, name: &str) -> u64 {
        read(&self.counters, name).unwrap_or(0.0) as u64
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        read(&self.gauges, name)
    }

    /// Number of samples recorded into a histogram
    pub fn histogram_samples(&self, name: &str) -> usize {
        read(&self.histograms, name).unwrap_or(0.0) as usize
    }
}

fn read(values: &Values, name: &str) -> Option<f64> {
    values.lock().ok().and_then(|values| values.get(name).copied())
}
