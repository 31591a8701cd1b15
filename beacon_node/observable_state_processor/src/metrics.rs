//! Prometheus metrics for the processor (SPEC_FULL.md §1 ambient stack,
//! §2 "Metrics" row), in the teacher's `lighthouse_metrics` idiom.
//!
//! Registration is cheap and unconditional. `participation_metrics` is
//! declared as a default Cargo feature, matching the teacher's own
//! `beacon_chain/Cargo.toml`, which likewise carries the feature without
//! any `cfg`-gated call site in its crate.

use lazy_static::lazy_static;
pub use lighthouse_metrics::*;

lazy_static! {
    pub static ref TUPLE_CACHE_LEN: Result<IntGauge> = try_create_int_gauge(
        "observable_state_tuple_cache_len",
        "Number of block tuples held in the tuple-details cache"
    );
    pub static ref TUPLE_CACHE_EVICTED_TOTAL: Result<IntCounter> = try_create_int_counter(
        "observable_state_tuple_cache_evicted_total",
        "Total number of tuples evicted from the tuple-details cache by capacity"
    );
    pub static ref HEAD_CHANGES_TOTAL: Result<IntCounter> = try_create_int_counter(
        "observable_state_head_changes_total",
        "Total number of times the published head block changed"
    );
    pub static ref OBSERVABLE_STATE_PUBLISHED_TOTAL: Result<IntCounter> = try_create_int_counter(
        "observable_state_published_total",
        "Total number of observable-state values published"
    );
    pub static ref PENDING_OPERATIONS_PUBLISHED_TOTAL: Result<IntCounter> = try_create_int_counter(
        "observable_state_pending_operations_published_total",
        "Total number of pending-operations snapshots published"
    );
    pub static ref CHANNEL_LAGGED_TOTAL: Result<IntCounterVec> = try_create_int_counter_vec(
        "observable_state_channel_lagged_total",
        "Total number of subscribers dropped for falling behind, by channel",
        &["channel"]
    );
    pub static ref STATE_PROJECTION_TIME: Result<Histogram> = try_create_histogram(
        "observable_state_projection_seconds",
        "Time taken to project a state forward to a target slot"
    );
}
