use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Fatal pipeline failures. Malformed individual records are never errors;
/// they are dropped where found and the scan continues.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Network or filesystem access failure while opening a source.
    #[error("transport error for '{address}': {reason}")]
    Transport { address: String, reason: String },

    /// Corrupt or truncated compressed framing, or a read failure surfacing
    /// through the decoder mid-stream.
    #[error("decompression error: {reason}")]
    Decompression { reason: String },

    /// Sink write or flush failure. Fatal immediately.
    #[error("output error for '{path}': {source}")]
    Output {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
