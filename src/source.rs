use crate::error::{ExtractError, Result};
use std::fs::File;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Pull-based compressed byte stream. No seeking; the origin may be a live
/// network connection.
pub type ByteStream = Box<dyn Read + Send>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn is_remote(address: &str) -> bool {
    address.starts_with("http://") || address.starts_with("https://")
}

/// Expand a source address into the ordered list of inputs to scan.
/// Local addresses containing `*` or `?` are treated as glob patterns;
/// remote addresses are always a single input.
pub fn resolve_inputs(address: &str) -> Result<Vec<String>> {
    if is_remote(address) || !(address.contains('*') || address.contains('?')) {
        return Ok(vec![address.to_string()]);
    }

    let paths: Vec<String> = glob::glob(address)
        .map_err(|e| ExtractError::Config(format!("invalid glob pattern '{address}': {e}")))?
        .filter_map(|entry| entry.ok())
        .map(|path| path.display().to_string())
        .collect();

    if paths.is_empty() {
        return Err(ExtractError::Transport {
            address: address.to_string(),
            reason: "no files match pattern".to_string(),
        });
    }

    Ok(paths)
}

/// Counts bytes as they are pulled from the transport, so the driver can
/// report an approximate stream position.
pub struct CountingReader<R> {
    inner: R,
    count: Arc<AtomicU64>,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R, count: Arc<AtomicU64>) -> Self {
        Self { inner, count }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Open one input as a raw compressed byte stream.
///
/// Remote addresses stream the response body directly; the overall request
/// timeout is disabled because a dump read legitimately runs for hours.
pub fn open_transport(address: &str, counter: Arc<AtomicU64>) -> Result<ByteStream> {
    if is_remote(address) {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| transport_error(address, &e.to_string()))?;

        let response = client
            .get(address)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| transport_error(address, &e.to_string()))?;

        Ok(Box::new(CountingReader::new(response, counter)))
    } else {
        let file = File::open(address).map_err(|e| transport_error(address, &e.to_string()))?;
        Ok(Box::new(CountingReader::new(file, counter)))
    }
}

fn transport_error(address: &str, reason: &str) -> ExtractError {
    ExtractError::Transport {
        address: address.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_is_remote_schemes() {
        assert!(is_remote("https://database.lichess.org/standard/x.pgn.zst"));
        assert!(is_remote("http://localhost/x.pgn"));
        assert!(!is_remote("/data/x.pgn.zst"));
        assert!(!is_remote("games/*.pgn"));
    }

    #[test]
    fn test_resolve_inputs_plain_path_passes_through() {
        let inputs = resolve_inputs("/data/games.pgn.zst").unwrap();
        assert_eq!(inputs, vec!["/data/games.pgn.zst".to_string()]);
    }

    #[test]
    fn test_resolve_inputs_remote_url_never_globs() {
        let inputs = resolve_inputs("https://example.com/a?b=*").unwrap();
        assert_eq!(inputs.len(), 1);
    }

    #[test]
    fn test_resolve_inputs_glob_expands() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pgn"), "x").unwrap();
        std::fs::write(dir.path().join("b.pgn"), "x").unwrap();
        std::fs::write(dir.path().join("c.txt"), "x").unwrap();

        let pattern = format!("{}/*.pgn", dir.path().display());
        let mut inputs = resolve_inputs(&pattern).unwrap();
        inputs.sort();
        assert_eq!(inputs.len(), 2);
        assert!(inputs[0].ends_with("a.pgn"));
        assert!(inputs[1].ends_with("b.pgn"));
    }

    #[test]
    fn test_resolve_inputs_glob_without_matches_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.pgn", dir.path().display());
        let err = resolve_inputs(&pattern).unwrap_err();
        assert!(matches!(err, ExtractError::Transport { .. }));
    }

    #[test]
    fn test_counting_reader_tracks_bytes() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut reader = CountingReader::new(Cursor::new(vec![0u8; 100]), Arc::clone(&counter));

        let mut buf = [0u8; 64];
        let mut total = 0;
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            total += n;
        }

        assert_eq!(total, 100);
        assert_eq!(counter.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_open_transport_missing_file_is_transport_error() {
        let counter = Arc::new(AtomicU64::new(0));
        let Err(err) = open_transport("/no/such/file.pgn", counter) else {
            panic!("expected a transport error");
        };
        assert!(matches!(err, ExtractError::Transport { .. }));
    }
}
