use serde_json::json;

/// One reassembled game from the dump.
///
/// Recognized header tags are lifted into typed fields; `raw_text` keeps the
/// exact serialized span (header block, separator line, movetext body) so a
/// matched record can be re-emitted byte-for-byte.
#[derive(Debug, Clone, Default)]
pub struct GameRecord {
    pub white: Option<String>,
    pub black: Option<String>,
    pub site: Option<String>,
    pub white_elo: Option<u32>,
    pub black_elo: Option<u32>,
    pub movetext: String,
    pub raw_text: String,
}

/// Counters owned by the pipeline driver, updated once per record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub games_seen: u64,
    pub games_matched: u64,
    /// Compressed bytes pulled from the transport so far.
    pub bytes_read: u64,
}

impl PipelineStats {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "games_seen": self.games_seen,
            "games_matched": self.games_matched,
            "bytes_read": self.bytes_read,
        })
    }
}
