//! Execution options for bulk operations

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Caller-supplied log sink invoked with step messages
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Options bag for a bulk delete
///
/// Configured through [`BulkDeleteBuilder::configure_options`].
///
/// [`BulkDeleteBuilder::configure_options`]: crate::BulkDeleteBuilder::configure_options
#[derive(Clone)]
pub struct BulkOptions {
    /// Number of staged rows flushed per bulk-copy batch
    pub batch_size: usize,
    /// Per-statement deadline; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Collation applied to both sides of text-column join comparisons
    pub collation: Option<String>,
    /// Log sink invoked with a message per pipeline step
    pub log_to: Option<LogSink>,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            timeout: None,
            collation: None,
            log_to: None,
        }
    }
}

impl fmt::Debug for BulkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkOptions")
            .field("batch_size", &self.batch_size)
            .field("timeout", &self.timeout)
            .field("collation", &self.collation)
            .field("log_to", &self.log_to.as_ref().map(|_| "..."))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BulkOptions::default();
        assert_eq!(options.batch_size, 1000);
        assert!(options.timeout.is_none());
        assert!(options.collation.is_none());
        assert!(options.log_to.is_none());
    }

    #[test]
    fn test_debug_hides_sink() {
        let mut options = BulkOptions::default();
        options.log_to = Some(Arc::new(|_message| {}));
        let rendered = format!("{options:?}");
        assert!(rendered.contains("log_to"));
        assert!(!rendered.contains("Fn("));
    }
}
