use async_trait::async_trait;
use std::fmt::Write as _;
use std::io::Write as _;

use super::ResultSink;
use crate::errors::SinkError;
use crate::types::ExtractionResult;
use crate::utils::truncate_for_display;

const MAX_VALUE_CHARS: usize = 160;

/// Prints a numbered, human-readable listing to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Text that [`emit`](ResultSink::emit) prints
    #[must_use]
    pub fn render(result: &ExtractionResult) -> String {
        let mut out = String::new();
        if let Some(title) = &result.page_title {
            let _ = writeln!(out, "{title}");
            let _ = writeln!(out);
        }

        for (index, record) in result.records.iter().enumerate() {
            let mut fields = record.fields();
            match fields.next() {
                Some((key, value)) => {
                    let _ = writeln!(
                        out,
                        "{:>3}. {key}: {}",
                        index + 1,
                        truncate_for_display(value, MAX_VALUE_CHARS)
                    );
                }
                None => {
                    let _ = writeln!(out, "{:>3}. (empty record)", index + 1);
                }
            }
            for (key, value) in fields {
                let _ = writeln!(
                    out,
                    "     {key}: {}",
                    truncate_for_display(value, MAX_VALUE_CHARS)
                );
            }
        }
        out
    }
}

#[async_trait]
impl ResultSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn emit(&self, result: &ExtractionResult) -> Result<(), SinkError> {
        let text = Self::render(result);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
