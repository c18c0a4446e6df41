use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use super::ResultSink;
use crate::errors::SinkError;
use crate::types::ExtractionResult;

/// Keeps the most recent result in memory.
///
/// Clones share the same slot, so a clone handed to the pipeline can be read
/// back through the original.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    slot: Arc<Mutex<Option<ExtractionResult>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the stored result, leaving the sink empty
    #[must_use]
    pub fn take(&self) -> Option<ExtractionResult> {
        self.slot.lock().take()
    }

    #[must_use]
    pub fn latest(&self) -> Option<ExtractionResult> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn emit(&self, result: &ExtractionResult) -> Result<(), SinkError> {
        *self.slot.lock() = Some(result.clone());
        Ok(())
    }
}
