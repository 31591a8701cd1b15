//! Thin wrapper around the `prometheus` crate.
//!
//! Every `try_create_*` function registers the metric with the global
//! default registry and swallows duplicate-registration errors, so call
//! sites can be written as `lazy_static! { pub static ref X: Result<..> =
//! try_create_foo(..); }` without caring whether some other crate in the
//! process already created the same metric.

pub use prometheus::{
    Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramTimer, HistogramVec, IntCounter,
    IntCounterVec, IntGauge, IntGaugeVec, Opts, Result, TextEncoder,
};

/// Collect all metrics registered on the default registry and encode them as text.
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    prometheus::gather()
}

pub fn try_create_int_counter(name: &str, help: &str) -> Result<IntCounter> {
    let opts = Opts::new(name, help);
    let counter = IntCounter::with_opts(opts)?;
    prometheus::register(Box::new(counter.clone()))
        .or_else(|_| Result::Ok(()))
        .map(|_| counter)
}

pub fn try_create_int_counter_vec(
    name: &str,
    help: &str,
    label_names: &[&str],
) -> Result<IntCounterVec> {
    let opts = Opts::new(name, help);
    let counter = IntCounterVec::new(opts, label_names)?;
    prometheus::register(Box::new(counter.clone()))
        .or_else(|_| Result::Ok(()))
        .map(|_| counter)
}

pub fn try_create_int_gauge(name: &str, help: &str) -> Result<IntGauge> {
    let opts = Opts::new(name, help);
    let gauge = IntGauge::with_opts(opts)?;
    prometheus::register(Box::new(gauge.clone()))
        .or_else(|_| Result::Ok(()))
        .map(|_| gauge)
}

pub fn try_create_float_gauge(name: &str, help: &str) -> Result<Gauge> {
    let opts = Opts::new(name, help);
    let gauge = Gauge::with_opts(opts)?;
    prometheus::register(Box::new(gauge.clone()))
        .or_else(|_| Result::Ok(()))
        .map(|_| gauge)
}

pub fn try_create_histogram(name: &str, help: &str) -> Result<Histogram> {
    let opts = HistogramOpts::new(name, help);
    let histogram = Histogram::with_opts(opts)?;
    prometheus::register(Box::new(histogram.clone()))
        .or_else(|_| Result::Ok(()))
        .map(|_| histogram)
}

/// Starts a timer that records the elapsed duration to `histogram` when dropped.
///
/// Returns `None` if `histogram` failed to register; callers use
/// `let _timer = start_timer(&FOO);` and never have to unwrap.
pub fn start_timer(histogram: &Result<Histogram>) -> Option<HistogramTimer> {
    histogram.as_ref().ok().map(|h| h.start_timer())
}

pub fn inc_counter(counter: &Result<IntCounter>) {
    if let Ok(counter) = counter {
        counter.inc();
    }
}

pub fn inc_counter_vec(counter: &Result<IntCounterVec>, label_values: &[&str]) {
    if let Ok(counter) = counter {
        counter.with_label_values(label_values).inc();
    }
}

pub fn set_gauge(gauge: &Result<IntGauge>, value: i64) {
    if let Ok(gauge) = gauge {
        gauge.set(value);
    }
}
