//! Run metrics.
//!
//! Verdicts and pipeline timings go through the `metrics` facade. With
//! `--metrics` the CLI installs [`SummaryRecorder`], which keeps running totals
//! in memory and prints them once the batch is done.

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics::{
    Counter, CounterFn, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
    SharedString, Unit, counter, describe_counter, describe_histogram, histogram,
};
use parking_lot::Mutex;

pub const FILES_PASSED: &str = "frontdiff_files_passed_total";
pub const FILES_FAILED: &str = "frontdiff_files_failed_total";
pub const PIPELINE_SECONDS: &str = "frontdiff_pipeline_duration_seconds";

/// Register metric descriptions with the installed recorder.
pub fn init() {
    describe_counter!(FILES_PASSED, Unit::Count, "Source files whose outputs matched");
    describe_counter!(
        FILES_FAILED,
        Unit::Count,
        "Source files that mismatched or errored, by reason"
    );
    describe_histogram!(
        PIPELINE_SECONDS,
        Unit::Seconds,
        "Wall-clock time of one pipeline run, by toolchain"
    );
}

/// Record the verdict for one file.
///
/// `reason` is the failure category (`stdout-mismatch`, `launch`, ...).
pub fn record_file(passed: bool, reason: Option<&'static str>) {
    if passed {
        counter!(FILES_PASSED).increment(1);
    } else {
        counter!(FILES_FAILED, "reason" => reason.unwrap_or("unknown")).increment(1);
    }
}

/// Record how long one toolchain's pipeline took.
pub fn record_pipeline(toolchain: &str, secs: f64) {
    histogram!(PIPELINE_SECONDS, "toolchain" => toolchain.to_string()).record(secs);
}

/// Running statistics for one histogram series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

impl Timing {
    const fn first(value: f64) -> Self {
        Self {
            count: 1,
            min: value,
            max: value,
            sum: value,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

#[derive(Default)]
struct Totals {
    counters: BTreeMap<String, u64>,
    timings: BTreeMap<String, Timing>,
}

type SharedTotals = Arc<Mutex<Totals>>;

/// One registered series. Counters and histograms share the same handle.
struct Series {
    key: String,
    totals: SharedTotals,
}

impl CounterFn for Series {
    fn increment(&self, value: u64) {
        *self.totals.lock().counters.entry(self.key.clone()).or_default() += value;
    }

    fn absolute(&self, value: u64) {
        self.totals.lock().counters.insert(self.key.clone(), value);
    }
}

impl HistogramFn for Series {
    fn record(&self, value: f64) {
        self.totals
            .lock()
            .timings
            .entry(self.key.clone())
            .and_modify(|t| t.add(value))
            .or_insert_with(|| Timing::first(value));
    }
}

/// Render a key as `name{label=value,...}`.
fn series_name(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|label| format!("{}={}", label.key(), label.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

/// In-memory recorder for the end-of-run summary.
#[derive(Default)]
pub struct SummaryRecorder {
    totals: SharedTotals,
}

impl SummaryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self) -> MetricsSummary {
        MetricsSummary {
            totals: Arc::clone(&self.totals),
        }
    }

    fn series(&self, key: &Key) -> Arc<Series> {
        Arc::new(Series {
            key: series_name(key),
            totals: Arc::clone(&self.totals),
        })
    }

    /// Install as the global recorder.
    ///
    /// Returns `None` if a global recorder is already installed.
    #[must_use]
    pub fn install(self) -> Option<MetricsSummary> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }
}

impl Recorder for SummaryRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(self.series(key))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(self.series(key))
    }
}

/// Read side of an installed [`SummaryRecorder`].
pub struct MetricsSummary {
    totals: SharedTotals,
}

impl MetricsSummary {
    #[must_use]
    pub fn counter(&self, series: &str) -> Option<u64> {
        self.totals.lock().counters.get(series).copied()
    }

    #[must_use]
    pub fn timing(&self, series: &str) -> Option<Timing> {
        self.totals.lock().timings.get(series).copied()
    }

    /// Print every series, sorted by name.
    pub fn print_summary(&self) {
        let totals = self.totals.lock();
        println!();
        println!("=== Metrics ===");
        if totals.counters.is_empty() && totals.timings.is_empty() {
            println!("(none recorded)");
            return;
        }
        for (name, value) in &totals.counters {
            println!("  {name}: {value}");
        }
        for (name, t) in &totals.timings {
            println!(
                "  {name}: n={} min={:.3}s mean={:.3}s max={:.3}s",
                t.count,
                t.min,
                t.mean(),
                t.max
            );
        }
    }
}
