// Output sink - append-only line stream for rendered service messages

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Where service messages go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SinkTarget {
    #[default]
    Stderr,
    Stdout,
    File(PathBuf),
}

impl std::str::FromStr for SinkTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "stderr" | "-" => Self::Stderr,
            "stdout" => Self::Stdout,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

impl std::fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes each line whole and flushes it before returning
pub struct OutputSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl OutputSink {
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stderr() -> Self {
        Self::from_writer(io::stderr())
    }

    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn open(target: &SinkTarget) -> io::Result<Self> {
        Ok(match target {
            SinkTarget::Stderr => Self::stderr(),
            SinkTarget::Stdout => Self::stdout(),
            SinkTarget::File(path) => Self::from_writer(File::create(path)?),
        })
    }

    /// In-memory sink plus a handle to read back what was written
    pub fn memory() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

/// Cloneable in-memory writer
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
