//! Streaming extraction of low-rated, engine-annotated games from Lichess
//! PGN dumps. The archive is pulled as a compressed byte stream, decompressed
//! and reassembled incrementally, and matching records are re-emitted
//! byte-for-byte; at no point is the full archive materialized.

mod decode;
mod error;
mod filter;
mod log;
mod pipeline;
mod reassemble;
mod sink;
mod source;
mod types;

pub use decode::CompressionMode;
pub use error::{ExtractError, Result};
pub use filter::{DEFAULT_EVAL_MARKER, DEFAULT_MAX_RATING, FilterCriteria, matches};
pub use pipeline::{DEFAULT_SOURCE, ExtractConfig, run};
pub use reassemble::RecordReader;
pub use sink::RecordSink;
pub use types::{GameRecord, PipelineStats};
