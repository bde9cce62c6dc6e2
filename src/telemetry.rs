use lazy_static::lazy_static;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

lazy_static! {
    pub static ref CODED_SYMBOLS: IntCounter =
        register_int_counter!("seedfec_coded_symbols_total", "Number of coded symbols produced").unwrap();
    pub static ref PAYLOADS_RECEIVED: IntCounter =
        register_int_counter!("seedfec_payloads_received_total", "Number of payloads fed to decoders").unwrap();
    pub static ref REDUNDANT_PAYLOADS: IntCounter =
        register_int_counter!("seedfec_redundant_payloads_total", "Number of linearly dependent payloads discarded").unwrap();
    pub static ref DECODERS_COMPLETED: IntCounter =
        register_int_counter!("seedfec_decoders_completed_total", "Number of decoders that reached full rank").unwrap();
}

/// Renders every registered metric in the text exposition format.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        log::error!("metrics encoding failed: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
