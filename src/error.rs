use thiserror::Error;

/// Errors surfaced by the codec. All of them are caller contract violations
/// or premature requests; a linearly dependent payload is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error(
        "size mismatch: expected {expected_symbols} symbols of {expected_size} bytes, \
         got {actual_symbols} symbols of {actual_size} bytes"
    )]
    SizeMismatch {
        expected_symbols: usize,
        expected_size: usize,
        actual_symbols: usize,
        actual_size: usize,
    },
    #[error("decoding not complete: rank {rank} of {symbols}")]
    NotComplete { rank: usize, symbols: usize },
    #[error("decoder is already complete")]
    AlreadyComplete,
    #[error("no source block bound to the encoder")]
    SourceNotBound,
    #[error("invalid codec parameters: {0}")]
    InvalidParameters(String),
    #[error("malformed payload: expected {expected} bytes, got {actual}")]
    MalformedPayload { expected: usize, actual: usize },
}

impl CodecError {
    pub(crate) fn symbol_mismatch(expected: usize, actual: usize) -> Self {
        CodecError::SizeMismatch {
            expected_symbols: 1,
            expected_size: expected,
            actual_symbols: 1,
            actual_size: actual,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
