use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::ResultSink;
use crate::errors::SinkError;
use crate::types::ExtractionResult;

type Callback = dyn Fn(&ExtractionResult) -> Result<(), String> + Send + Sync;

/// Hands the result to a caller-supplied closure.
///
/// An `Err` from the closure becomes [`SinkError::Callback`].
#[derive(Clone)]
pub struct CallbackSink {
    name: String,
    callback: Arc<Callback>,
}

impl CallbackSink {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&ExtractionResult) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: "callback".to_string(),
            callback: Arc::new(callback),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSink").field("name", &self.name).finish()
    }
}

#[async_trait]
impl ResultSink for CallbackSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn emit(&self, result: &ExtractionResult) -> Result<(), SinkError> {
        (self.callback)(result).map_err(SinkError::Callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn closure_sees_result_and_errors_propagate() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let ok = CallbackSink::new(move |r| {
            counter.store(r.len(), Ordering::SeqCst);
            Ok(())
        });
        let result = ExtractionResult::new(vec![Default::default(); 3], None);
        ok.emit(&result).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        let failing = CallbackSink::new(|_| Err("disk full".into())).named("upload");
        assert_eq!(failing.name(), "upload");
        assert!(matches!(
            failing.emit(&result).await,
            Err(SinkError::Callback(msg)) if msg == "disk full"
        ));
    }
}
