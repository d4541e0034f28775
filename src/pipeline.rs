use crate::decode::{self, CompressionMode};
use crate::error::{ExtractError, Result};
use crate::filter::{self, FilterCriteria};
use crate::log;
use crate::reassemble::RecordReader;
use crate::sink::RecordSink;
use crate::source;
use crate::types::PipelineStats;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The dump the reference behavior was built against.
pub const DEFAULT_SOURCE: &str =
    "https://database.lichess.org/standard/lichess_db_standard_rated_2025-11.pgn.zst";

const PROGRESS_INTERVAL: u64 = 1000;

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Archive URL or local path; local paths may be glob patterns.
    pub source: String,
    pub output: PathBuf,
    pub criteria: FilterCriteria,
    /// Override; inferred from the address suffix when `None`.
    pub compression: Option<CompressionMode>,
    /// Stop cleanly after this many matched games.
    pub max_games: Option<u64>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            output: PathBuf::from("filtered_games.pgn"),
            criteria: FilterCriteria::default(),
            compression: None,
            max_games: None,
        }
    }
}

/// Drive one forward pass: transport → decompression → reassembly → filter →
/// emit. Returns the final counters on completion; on a fatal stage error the
/// output written so far stays flushed and valid, and the error reports the
/// approximate stream position.
pub fn run(config: &ExtractConfig) -> Result<PipelineStats> {
    let inputs = source::resolve_inputs(&config.source)?;
    let mut sink = RecordSink::create(&config.output)?;
    let bytes_read = Arc::new(AtomicU64::new(0));
    let mut stats = PipelineStats::default();

    let outcome = scan_inputs(&inputs, config, &mut sink, &bytes_read, &mut stats);
    stats.bytes_read = bytes_read.load(Ordering::Relaxed);

    match outcome {
        Ok(()) => {
            sink.finish()?;
            log::info(format!(
                "completed: {} games scanned, {} matched, {} compressed bytes",
                stats.games_seen, stats.games_matched, stats.bytes_read
            ));
            Ok(stats)
        }
        Err(err) => {
            // Already-matched output stays valid; flush what we have.
            let _ = sink.finish();
            log::error(format!(
                "failed after ~{} compressed bytes, {} games seen, {} matched: {}",
                stats.bytes_read, stats.games_seen, stats.games_matched, err
            ));
            Err(err)
        }
    }
}

fn scan_inputs<W: Write>(
    inputs: &[String],
    config: &ExtractConfig,
    sink: &mut RecordSink<W>,
    bytes_read: &Arc<AtomicU64>,
    stats: &mut PipelineStats,
) -> Result<()> {
    for address in inputs {
        log::info(format!("scanning {address}"));
        let mode = config
            .compression
            .unwrap_or_else(|| CompressionMode::infer(address));
        let transport = source::open_transport(address, Arc::clone(bytes_read))?;
        let decoded = decode::decode_stream(transport, mode, address)?;
        let mut reader = RecordReader::new(decoded);

        loop {
            let record = match reader.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                // A plain stream is the raw transport, so its read failures
                // are transport failures; through zstd they surface as
                // decoder errors.
                Err(e) => {
                    return Err(match mode {
                        CompressionMode::Plain => ExtractError::Transport {
                            address: address.clone(),
                            reason: e.to_string(),
                        },
                        CompressionMode::Zstd => ExtractError::Decompression {
                            reason: format!("'{address}': {e}"),
                        },
                    });
                }
            };

            stats.games_seen += 1;

            if filter::matches(&record, &config.criteria) {
                sink.emit(&record)?;
                stats.games_matched += 1;
                log::info(format!(
                    "match #{}: {} ({}) vs {} ({}) {}",
                    stats.games_matched,
                    record.white.as_deref().unwrap_or("?"),
                    record.white_elo.map_or_else(|| "?".to_string(), |e| e.to_string()),
                    record.black.as_deref().unwrap_or("?"),
                    record.black_elo.map_or_else(|| "?".to_string(), |e| e.to_string()),
                    record.site.as_deref().unwrap_or(""),
                ));

                if let Some(limit) = config.max_games
                    && stats.games_matched >= limit
                {
                    log::info(format!("reached match limit ({limit}), stopping"));
                    return Ok(());
                }
            }

            if stats.games_seen.is_multiple_of(PROGRESS_INTERVAL) {
                stats.bytes_read = bytes_read.load(Ordering::Relaxed);
                log::info(format!(
                    "scanned {} games, matched {}, {} compressed bytes",
                    stats.games_seen, stats.games_matched, stats.bytes_read
                ));
            }
        }
    }

    Ok(())
}
