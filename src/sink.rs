use crate::error::{ExtractError, Result};
use crate::types::GameRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends matched records to the output destination, byte-for-byte.
///
/// Wraps a `BufWriter`, so partially written output is flushed on drop even
/// when the pipeline aborts; `finish` flushes explicitly so write errors are
/// still observable on the happy path.
pub struct RecordSink<W: Write> {
    writer: BufWriter<W>,
    label: String,
}

impl RecordSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let label = path.display().to_string();
        let file = File::create(path).map_err(|e| ExtractError::Output {
            path: label.clone(),
            source: e,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            label,
        })
    }
}

impl<W: Write> RecordSink<W> {
    pub fn from_writer(writer: W, label: &str) -> Self {
        Self {
            writer: BufWriter::new(writer),
            label: label.to_string(),
        }
    }

    /// Byte-for-byte passthrough of the matched span plus the canonical
    /// blank-line record separator. No re-serialization from parsed fields.
    pub fn emit(&mut self, record: &GameRecord) -> Result<()> {
        self.write(record.raw_text.as_bytes())?;
        if !record.raw_text.ends_with('\n') {
            self.write(b"\n")?;
        }
        self.write(b"\n")
    }

    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| ExtractError::Output {
            path: self.label.clone(),
            source: e,
        })
    }

    pub fn into_inner(self) -> std::io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).map_err(|e| ExtractError::Output {
            path: self.label.clone(),
            source: e,
        })
    }
}
