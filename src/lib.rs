// seedfec: seeded random linear network coding
//
// Encoder and decoder for erasure-resilient block transfer, the finite field
// arithmetic they run on, codec configuration, and codec metrics.

pub mod config;
pub mod error;
pub mod fec;
pub mod optimize;
pub mod telemetry;

pub use config::CodecConfig;
pub use error::{CodecError, ConfigError, Result};
pub use fec::{
    Binary, Binary16, Binary4, Binary8, CodedPayload, Decoder, DecoderVariant, Encoder,
    EncoderVariant, Field, FieldKind, SeedGenerator, SymbolBlock,
};
pub use optimize::{CpuFeature, FeatureDetector};

/// Provides global access to detected CPU features.
pub fn cpu_features() -> &'static FeatureDetector {
    FeatureDetector::instance()
}
