use crate::error::{ExtractError, Result};
use crate::source::ByteStream;
use zstd::stream::read::Decoder as ZstdDecoder;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMode {
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else if normalized.eq_ignore_ascii_case("plain") {
            Ok(Self::Plain)
        } else {
            Err(ExtractError::Config(format!(
                "invalid compression value '{normalized}'; supported values: 'plain' or 'zstd'"
            )))
        }
    }

    /// Lichess dumps carry a `.zst` suffix; anything else is assumed plain.
    pub fn infer(address: &str) -> Self {
        if address.ends_with(".zst") || address.ends_with(".zstd") {
            Self::Zstd
        } else {
            Self::Plain
        }
    }
}

/// Wrap a transport stream with the archive's compression framing.
///
/// Decompression is block-incremental: the decoder never needs the total
/// compressed length, and corrupt or truncated frames surface as read errors
/// on the returned stream rather than at construction.
pub fn decode_stream(input: ByteStream, mode: CompressionMode, address: &str) -> Result<ByteStream> {
    match mode {
        CompressionMode::Plain => Ok(input),
        CompressionMode::Zstd => ZstdDecoder::new(input)
            .map(|decoder| Box::new(decoder) as ByteStream)
            .map_err(|e| ExtractError::Decompression {
                reason: format!("failed to initialize zstd decoder for '{address}': {e}"),
            }),
    }
}
