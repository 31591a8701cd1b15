pub use lighthouse_metrics::*;
use lazy_static::lazy_static;

lazy_static! {
    pub static ref ATTESTATION_POOL_BUFFER_LEN: Result<IntGauge> = try_create_int_gauge(
        "attestation_pool_buffer_len",
        "Number of attestations waiting to be expanded into the latest-attestation cache"
    );
    pub static ref ATTESTATION_POOL_CACHE_LEN: Result<IntGauge> = try_create_int_gauge(
        "attestation_pool_cache_len",
        "Number of (pubkey, slot) entries in the latest-attestation cache"
    );
    pub static ref ATTESTATION_POOL_PURGED_TOTAL: Result<IntCounter> = try_create_int_counter(
        "attestation_pool_purged_total",
        "Total number of latest-attestation cache entries purged by TTL"
    );
    pub static ref ATTESTATION_POOL_FORGOTTEN_TOTAL: Result<IntCounter> = try_create_int_counter(
        "attestation_pool_forgotten_total",
        "Total number of latest-attestation cache entries removed because they were included on-chain"
    );
    pub static ref ATTESTATION_POOL_DRAIN_TIME: Result<Histogram> = try_create_histogram(
        "attestation_pool_drain_seconds",
        "Time taken to drain the attestation buffer up to a slot"
    );
}
