//! Destinations for extraction results

pub mod callback;
pub mod console;
pub mod json_file;
pub mod memory;

use async_trait::async_trait;

use crate::errors::SinkError;
use crate::types::ExtractionResult;

pub use callback::CallbackSink;
pub use console::ConsoleSink;
pub use json_file::{JsonFileSink, read_result};
pub use memory::MemorySink;

/// Receives the finished result of a run
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn emit(&self, result: &ExtractionResult) -> Result<(), SinkError>;
}
