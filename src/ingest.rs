use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input file does not exist: {}", path.display())]
    MissingFile { path: PathBuf },
    #[error("failed reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Line counts for one ingested file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: usize,
    /// Non-blank lines that did not have the expected field shape.
    pub skipped: usize,
    /// Templates inserted, or samples appended.
    pub accepted: usize,
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, IngestError> {
    if !path.exists() {
        return Err(IngestError::MissingFile { path: path.to_path_buf() });
    }
    let f = File::open(path).map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
    Ok(BufReader::new(f))
}

/// Feeds every line to `on_line` (1-based number, trimmed text). Invalid
/// UTF-8 is replaced rather than rejected. `origin` names the source in
/// read errors.
pub(crate) fn for_each_line<R, F>(mut reader: R, origin: &Path, mut on_line: F) -> Result<(), IngestError>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<(), IngestError>,
{
    let mut buf = Vec::with_capacity(256);
    let mut n = 0usize;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| IngestError::Io { path: origin.to_path_buf(), source })?;
        if read == 0 {
            return Ok(());
        }
        n += 1;
        let text = String::from_utf8_lossy(&buf);
        on_line(n, text.trim())?;
    }
}
