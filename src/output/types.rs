// src/output/types.rs
//! Output plans and their execution reports.

use crate::types::RenderedFeed;
use std::path::PathBuf;

/// An ordered list of delivery operations.
#[derive(Debug, Clone, Default)]
pub struct OutputPlan {
    pub operations: Vec<DeliveryTarget>,
}

impl OutputPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, operation: DeliveryTarget) -> Self {
        self.operations.push(operation);
        self
    }

    /// Writes the feed to `output_file`, or prints it when there is none.
    pub fn for_feed(feed: RenderedFeed, output_file: Option<PathBuf>) -> Self {
        let content = feed.into_string();
        let target = match output_file {
            Some(path) => DeliveryTarget::WriteFile { path, content },
            None => DeliveryTarget::PrintToStdout { content },
        };
        Self::new().with_operation(target)
    }
}

/// A single output operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// Write content to a file, creating parent directories
    WriteFile { path: PathBuf, content: String },
    /// Print to stdout
    PrintToStdout { content: String },
}

/// Result of executing an output plan.
#[derive(Debug, Clone, Default)]
pub struct OutputReport {
    pub completed: Vec<CompletedOperation>,
    pub failed: Vec<FailedOperation>,
    pub bytes_written: usize,
    pub total_duration_ms: u64,
}

impl OutputReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completed(mut self, operation: CompletedOperation) -> Self {
        self.bytes_written += operation.bytes_written;
        self.completed.push(operation);
        self
    }

    pub fn with_failed(mut self, operation: FailedOperation) -> Self {
        self.failed.push(operation);
        self
    }

    /// Checks if all operations succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether anything went to stdout.
    pub fn printed_to_stdout(&self) -> bool {
        self.completed
            .iter()
            .any(|c| matches!(c.operation, DeliveryTarget::PrintToStdout { .. }))
    }
}

/// A successfully completed operation.
#[derive(Debug, Clone)]
pub struct CompletedOperation {
    pub operation: DeliveryTarget,
    pub bytes_written: usize,
    pub duration_ms: u64,
}

/// A failed operation with error information.
#[derive(Debug, Clone)]
pub struct FailedOperation {
    pub operation: DeliveryTarget,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_plan_targets_file_or_stdout() {
        let to_file = OutputPlan::for_feed(
            RenderedFeed::new("{}".into()),
            Some(PathBuf::from("out/feed.json")),
        );
        assert_eq!(
            to_file.operations,
            vec![DeliveryTarget::WriteFile {
                path: PathBuf::from("out/feed.json"),
                content: "{}".into()
            }]
        );

        let to_stdout = OutputPlan::for_feed(RenderedFeed::new("{}".into()), None);
        assert_eq!(
            to_stdout.operations,
            vec![DeliveryTarget::PrintToStdout { content: "{}".into() }]
        );
    }
}
