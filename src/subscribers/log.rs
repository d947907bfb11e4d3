//! # LogWriter: simple message logger
//!
//! A minimal handler that logs every delivered payload through `tracing` and
//! acks it. Use it for tests, demos, or to trace a topic while debugging.
//!
//! ## Example output
//! ```text
//! INFO tidings::subscribers::log: message payload=42
//! ```

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::info;

use crate::error::BoxError;
use crate::subscribers::Subscribe;

/// Message writer handler.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T> Subscribe<T> for LogWriter
where
    T: Debug + Send + Sync + 'static,
{
    async fn on_message(&self, message: &T) -> Result<(), BoxError> {
        info!(payload = ?message, "message");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
