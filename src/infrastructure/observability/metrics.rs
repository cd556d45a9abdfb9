//! Counters for cache effectiveness, provider traffic and memory writes
//!
//! Counters are no-ops until a recorder is installed by the host process.

use metrics::counter;

fn status_label(success: bool) -> &'static str {
    if success { "success" } else { "error" }
}

/// Record the outcome of a cache lookup pass
pub fn record_cache_lookup(model: &str, hits: usize, misses: usize) {
    let labels = [("model", model.to_string())];

    if hits > 0 {
        counter!("embedding_cache_hits_total", &labels).increment(hits as u64);
    }

    if misses > 0 {
        counter!("embedding_cache_misses_total", &labels).increment(misses as u64);
    }
}

/// Record one request to the embedding provider
pub fn record_provider_call(model: &str, texts: usize, success: bool) {
    let labels = [
        ("model", model.to_string()),
        ("status", status_label(success).to_string()),
    ];

    counter!("embedding_provider_requests_total", &labels).increment(1);
    counter!("embedding_provider_texts_total", &labels).increment(texts as u64);
}

/// Record memory records sent to the vector store
pub fn record_memory_write(count: usize, success: bool) {
    counter!("memory_writes_total", "status" => status_label(success)).increment(count as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(true), "success");
        assert_eq!(status_label(false), "error");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_cache_lookup("text-embedding-ada-002", 2, 1);
        record_provider_call("text-embedding-ada-002", 3, false);
        record_memory_write(0, true);
    }
}
