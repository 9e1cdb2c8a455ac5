use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

pub static LLM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "fluxora_llm_requests_total",
        "LLM API requests by model and outcome",
        &["model", "outcome"]
    )
    .expect("fluxora_llm_requests_total registers once")
});

pub static LLM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "fluxora_llm_request_duration_seconds",
        "LLM API request latency",
        &["model"],
        vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    )
    .expect("fluxora_llm_request_duration_seconds registers once")
});

pub static DOCUMENTS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "fluxora_documents_processed_total",
        "PDF documents partitioned, by outcome",
        &["outcome"]
    )
    .expect("fluxora_documents_processed_total registers once")
});

pub static ELEMENTS_INDEXED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "fluxora_elements_indexed_total",
        "Elements written to the vector store"
    )
    .expect("fluxora_elements_indexed_total registers once")
});

pub static TRANSCRIPTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "fluxora_transcriptions_total",
        "Speech-to-text transcriptions, by outcome",
        &["outcome"]
    )
    .expect("fluxora_transcriptions_total registers once")
});

pub fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Prometheus text exposition of the default registry.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_else(|_| "Error encoding metrics".to_string())
}

pub async fn metrics_handler() -> String {
    gather_metrics()
}
