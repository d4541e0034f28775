use crate::log;
use crate::types::GameRecord;
use regex::Regex;
use std::io::{BufRead, BufReader, Read};
use std::sync::LazyLock;

/// `[Tag "value"]` header line.
static TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[(\w+)\s+"(.*)"\]\s*$"#).unwrap());

/// Records larger than this are assumed to be broken framing (input with no
/// blank-line boundaries) and are dropped to keep memory bounded.
const MAX_RECORD_BYTES: usize = 16 * 1024 * 1024;

/// Reconstitutes discrete game records from a decoded text stream.
///
/// Line-oriented and incremental: a header or move token split across two
/// transport chunks is invisible here because lines are reassembled by the
/// buffered reader. A record is a header block of `[Tag "value"]` lines, a
/// blank separator line, and a movetext body; it ends at the blank line
/// following the body, at a new header block, or at end of stream.
pub struct RecordReader<R> {
    input: BufReader<R>,
    line_buffer: Vec<u8>,
    /// Pushback for a header line that turned out to start the next record.
    pending: Option<String>,
    records_yielded: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: BufReader::new(input),
            line_buffer: Vec::with_capacity(256),
            pending: None,
            records_yielded: 0,
        }
    }

    /// Pull the next complete record, or `None` once the stream is exhausted.
    ///
    /// A final record cut off mid-body is discarded rather than yielded: the
    /// body must end with a game outcome token for the record to count as
    /// complete when the stream ends without a closing blank line.
    pub fn next_record(&mut self) -> std::io::Result<Option<GameRecord>> {
        'record: loop {
            let mut record = GameRecord::default();
            let mut raw = String::new();
            let mut movetext = String::new();
            let mut in_body = false;
            let mut saw_body = false;

            loop {
                let Some(line) = self.next_line()? else {
                    if raw.is_empty() {
                        return Ok(None);
                    }
                    if saw_body && ends_with_outcome(&movetext) {
                        return Ok(Some(self.finish_record(record, raw, movetext)));
                    }
                    log::warn(format!(
                        "dropping truncated final record after {} complete games",
                        self.records_yielded
                    ));
                    return Ok(None);
                };

                let content = line.trim_end_matches(['\r', '\n']);

                if content.is_empty() {
                    if raw.is_empty() {
                        // stray blank lines between records
                        continue;
                    }
                    if in_body {
                        // blank line closes the record; the canonical
                        // separator is re-added on emit
                        return Ok(Some(self.finish_record(record, raw, movetext)));
                    }
                    in_body = true;
                    raw.push_str(&line);
                } else if !in_body {
                    if let Some(caps) = TAG_LINE.captures(content) {
                        capture_tag(&mut record, &caps[1], &caps[2]);
                        raw.push_str(&line);
                    } else if content.starts_with('[') {
                        // unrecognized header line: kept verbatim, no tag
                        raw.push_str(&line);
                    } else {
                        // movetext with no separating blank line
                        in_body = true;
                        saw_body = true;
                        raw.push_str(&line);
                        movetext.push_str(content);
                        movetext.push('\n');
                    }
                } else if saw_body && TAG_LINE.is_match(content) {
                    // next header block began without a separating blank line
                    self.pending = Some(line);
                    return Ok(Some(self.finish_record(record, raw, movetext)));
                } else {
                    saw_body = true;
                    raw.push_str(&line);
                    movetext.push_str(content);
                    movetext.push('\n');
                }

                if raw.len() > MAX_RECORD_BYTES {
                    log::warn(format!(
                        "dropping oversized record (> {MAX_RECORD_BYTES} bytes) after {} complete games",
                        self.records_yielded
                    ));
                    loop {
                        let Some(line) = self.next_line()? else {
                            return Ok(None);
                        };
                        if line.trim_end_matches(['\r', '\n']).is_empty() {
                            continue 'record;
                        }
                    }
                }
            }
        }
    }

    fn next_line(&mut self) -> std::io::Result<Option<String>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        self.line_buffer.clear();
        let n = self.input.read_until(b'\n', &mut self.line_buffer)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.line_buffer).into_owned()))
    }

    fn finish_record(&mut self, mut record: GameRecord, raw: String, movetext: String) -> GameRecord {
        self.records_yielded += 1;
        record.raw_text = raw;
        record.movetext = movetext.trim().to_string();
        record
    }
}

fn capture_tag(record: &mut GameRecord, name: &str, value: &str) {
    // First value wins on duplicated tags.
    match name {
        "White" if record.white.is_none() => record.white = Some(value.to_string()),
        "Black" if record.black.is_none() => record.black = Some(value.to_string()),
        "Site" if record.site.is_none() => record.site = Some(value.to_string()),
        "WhiteElo" if record.white_elo.is_none() => {
            record.white_elo = value.trim().parse().ok();
        }
        "BlackElo" if record.black_elo.is_none() => {
            record.black_elo = value.trim().parse().ok();
        }
        _ => {}
    }
}

fn ends_with_outcome(movetext: &str) -> bool {
    matches!(
        movetext.split_whitespace().next_back(),
        Some("1-0" | "0-1" | "1/2-1/2" | "*")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_GAMES: &str = "[Event \"Rated Blitz game\"]\n\
[Site \"https://lichess.org/abcd1234\"]\n\
[White \"alice\"]\n\
[Black \"bob\"]\n\
[WhiteElo \"1200\"]\n\
[BlackElo \"1300\"]\n\
\n\
1. e4 { [%eval 0.25] [%clk 0:03:00] } e5 { [%eval 0.22] } 2. Nf3 1-0\n\
\n\
[Event \"Rated Blitz game\"]\n\
[White \"carol\"]\n\
[Black \"dave\"]\n\
[WhiteElo \"1600\"]\n\
[BlackElo \"1400\"]\n\
\n\
1. d4 d5 0-1\n\
\n";

    fn read_all<R: Read>(input: R) -> Vec<GameRecord> {
        let mut reader = RecordReader::new(input);
        let mut records = Vec::new();
        while let Some(record) = reader.next_record().unwrap() {
            records.push(record);
        }
        records
    }

    /// Yields at most `chunk` bytes per read, to exercise chunk-boundary
    /// handling in everything downstream.
    struct ChunkedReader<R> {
        inner: R,
        chunk: usize,
    }

    impl<R: Read> Read for ChunkedReader<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.chunk);
            self.inner.read(&mut buf[..n])
        }
    }

    #[test]
    fn test_reassembles_two_records() {
        let records = read_all(Cursor::new(TWO_GAMES));
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.white.as_deref(), Some("alice"));
        assert_eq!(first.black.as_deref(), Some("bob"));
        assert_eq!(first.site.as_deref(), Some("https://lichess.org/abcd1234"));
        assert_eq!(first.white_elo, Some(1200));
        assert_eq!(first.black_elo, Some(1300));
        assert!(first.movetext.starts_with("1. e4"));
        assert!(first.movetext.ends_with("1-0"));

        let second = &records[1];
        assert_eq!(second.white_elo, Some(1600));
        assert_eq!(second.movetext, "1. d4 d5 0-1");
    }

    #[test]
    fn test_raw_text_is_exact_span() {
        let records = read_all(Cursor::new(TWO_GAMES));
        let expected: &str = &TWO_GAMES[..TWO_GAMES.find("\n\n[Event").unwrap() + 1];
        assert_eq!(records[0].raw_text, expected);
    }

    #[test]
    fn test_chunk_boundary_invariance() {
        let whole = read_all(Cursor::new(TWO_GAMES));
        for chunk in [1, 2, 3, 7, 64 * 1024] {
            let chunked = read_all(ChunkedReader {
                inner: Cursor::new(TWO_GAMES),
                chunk,
            });
            assert_eq!(chunked.len(), whole.len());
            for (a, b) in whole.iter().zip(chunked.iter()) {
                assert_eq!(a.raw_text, b.raw_text);
                assert_eq!(a.movetext, b.movetext);
                assert_eq!(a.white_elo, b.white_elo);
            }
        }
    }

    #[test]
    fn test_truncated_final_record_is_dropped() {
        let cut = &TWO_GAMES[..TWO_GAMES.len() - 8]; // mid-body of game two
        let records = read_all(Cursor::new(cut));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].white.as_deref(), Some("alice"));
    }

    #[test]
    fn test_final_record_without_trailing_blank_line_is_kept() {
        let trimmed = TWO_GAMES.trim_end();
        let records = read_all(Cursor::new(trimmed.to_string()));
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].movetext, "1. d4 d5 0-1");
    }

    #[test]
    fn test_headers_only_at_eof_is_dropped() {
        let input = "[Event \"x\"]\n[White \"a\"]\n";
        assert!(read_all(Cursor::new(input)).is_empty());
    }

    #[test]
    fn test_missing_blank_line_before_next_header_block() {
        let input = "[Event \"a\"]\n\n1. e4 1-0\n[Event \"b\"]\n\n1. d4 *\n\n";
        let records = read_all(Cursor::new(input));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].movetext, "1. e4 1-0");
        assert_eq!(records[1].movetext, "1. d4 *");
    }

    #[test]
    fn test_unparsable_elo_fails_closed() {
        let input = "[WhiteElo \"?\"]\n[BlackElo \"1800\"]\n\n1. e4 1-0\n\n";
        let records = read_all(Cursor::new(input));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].white_elo, None);
        assert_eq!(records[0].black_elo, Some(1800));
    }

    #[test]
    fn test_duplicate_tags_preserve_first_value() {
        let input = "[WhiteElo \"1000\"]\n[WhiteElo \"2000\"]\n\n1. e4 1-0\n\n";
        let records = read_all(Cursor::new(input));
        assert_eq!(records[0].white_elo, Some(1000));
    }

    #[test]
    fn test_unrecognized_header_line_kept_in_raw_only() {
        let input = "[Event \"a\"]\n[broken header line\n\n1. e4 1-0\n\n";
        let records = read_all(Cursor::new(input));
        assert_eq!(records.len(), 1);
        assert!(records[0].raw_text.contains("[broken header line\n"));
    }

    #[test]
    fn test_crlf_lines_preserved_in_raw_text() {
        let input = "[WhiteElo \"1100\"]\r\n[BlackElo \"1200\"]\r\n\r\n1. e4 1-0\r\n\r\n";
        let records = read_all(Cursor::new(input));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].white_elo, Some(1100));
        assert_eq!(
            records[0].raw_text,
            "[WhiteElo \"1100\"]\r\n[BlackElo \"1200\"]\r\n\r\n1. e4 1-0\r\n"
        );
        assert_eq!(records[0].movetext, "1. e4 1-0");
    }

    #[test]
    fn test_leading_blank_lines_skipped() {
        let input = "\n\n\n[WhiteElo \"900\"]\n[BlackElo \"900\"]\n\n1. c4 *\n\n";
        let records = read_all(Cursor::new(input));
        assert_eq!(records.len(), 1);
        assert!(records[0].raw_text.starts_with("[WhiteElo"));
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        assert!(read_all(Cursor::new("")).is_empty());
        assert!(read_all(Cursor::new("\n\n\n")).is_empty());
    }
}
