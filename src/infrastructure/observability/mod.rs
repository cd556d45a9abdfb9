//! Observability infrastructure - Metrics

mod metrics;

pub use metrics::{record_cache_lookup, record_memory_write, record_provider_call};
