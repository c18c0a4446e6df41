//! Pretty-printed JSON document on disk

use async_trait::async_trait;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::time::timeout;
use tracing::debug;

use super::ResultSink;
use crate::errors::SinkError;
use crate::types::ExtractionResult;

/// Upper bound for serializing and writing one document
const BLOCKING_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Writes the result to a fixed path.
///
/// The document is written to a temporary file next to the destination,
/// synced, then renamed over it: readers see either the previous file or the
/// complete new one.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn emit(&self, result: &ExtractionResult) -> Result<(), SinkError> {
        let path = self.path.clone();
        let result = result.clone();

        let blocking_task = tokio::task::spawn_blocking(move || write_atomic(&path, &result));

        match timeout(BLOCKING_WRITE_TIMEOUT, blocking_task).await {
            Ok(Ok(outcome)) => outcome?,
            Ok(Err(e)) => return Err(SinkError::Task(format!("JSON writer panicked: {e}"))),
            Err(_) => {
                return Err(SinkError::Task(format!(
                    "JSON write timed out after {BLOCKING_WRITE_TIMEOUT:?}"
                )));
            }
        }

        debug!(path = %self.path.display(), "result written");
        Ok(())
    }
}

fn write_atomic(path: &Path, result: &ExtractionResult) -> Result<(), SinkError> {
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(SinkError::NoParent(path.display().to_string())),
    };
    std::fs::create_dir_all(parent)?;

    // Same directory as the destination so the rename cannot cross filesystems
    let temp_file = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, result)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;
    Ok(())
}

/// Load a document previously written by [`JsonFileSink`]
pub async fn read_result(path: impl AsRef<Path>) -> Result<ExtractionResult, SinkError> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
