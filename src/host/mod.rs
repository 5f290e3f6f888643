//! Host document boundary
//!
//! The minimal set of mutations the assistant performs on the active
//! document. Each host implements the capabilities it has; the rest report
//! `Unsupported`. Calls are awaited one at a time by the writer, so
//! implementations never see concurrent mutations from this crate.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::materialize::{ChartKind, DataGrid, HostKind, TextFormat};

pub use memory::{FailureRule, HostOperation, MemoryDocument};

/// Errors reported by a host when a mutation is rejected
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type", content = "details")]
pub enum HostError {
    /// The host refused the write (API error, protected content, ...)
    #[error("Host rejected {operation}: {message}")]
    Rejected { operation: String, message: String },

    /// The host has no such capability (e.g. charts in a text editor)
    #[error("{operation} is not supported by {host}")]
    Unsupported { operation: String, host: String },

    /// The current selection cannot take this write
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl HostError {
    pub fn unsupported(operation: &str, host: HostKind) -> Self {
        Self::Unsupported {
            operation: operation.to_string(),
            host: host.display_name().to_string(),
        }
    }
}

/// Write operations on the active host document
#[async_trait]
pub trait HostDocument: Send + Sync {
    /// Which application this document lives in
    fn kind(&self) -> HostKind;

    /// Insert text at the current selection
    async fn insert_text(&self, text: &str, format: TextFormat) -> Result<(), HostError>;

    /// Put a formula into the active cell
    async fn insert_formula(&self, formula: &str) -> Result<(), HostError> {
        let _ = formula;
        Err(HostError::unsupported("insert_formula", self.kind()))
    }

    /// Write `grid` starting at the selection's top-left cell, sized
    /// row_count x column_count, in one batch
    async fn insert_grid(&self, grid: &DataGrid) -> Result<(), HostError> {
        let _ = grid;
        Err(HostError::unsupported("insert_grid", self.kind()))
    }

    /// Autofit the first `column_count` columns from the selection
    async fn autofit_columns(&self, column_count: usize) -> Result<(), HostError> {
        let _ = column_count;
        Err(HostError::unsupported("autofit_columns", self.kind()))
    }

    /// Create a chart over the current selection
    async fn insert_chart(&self, kind: ChartKind, title: &str) -> Result<(), HostError> {
        let _ = (kind, title);
        Err(HostError::unsupported("insert_chart", self.kind()))
    }

    /// Append one slide at the end of the deck
    async fn append_slide(&self, title: &str, body: &str) -> Result<(), HostError> {
        let _ = (title, body);
        Err(HostError::unsupported("append_slide", self.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Host that only knows how to take text
    struct NotepadHost;

    #[async_trait]
    impl HostDocument for NotepadHost {
        fn kind(&self) -> HostKind {
            HostKind::TextEditor
        }

        async fn insert_text(&self, _text: &str, _format: TextFormat) -> Result<(), HostError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_capabilities_report_unsupported() {
        let host = NotepadHost;
        assert!(host.insert_text("hi", TextFormat::Plain).await.is_ok());

        let err = host.append_slide("t", "b").await.unwrap_err();
        assert_eq!(
            err,
            HostError::Unsupported {
                operation: "append_slide".to_string(),
                host: "Word".to_string(),
            }
        );
        assert_eq!(err.to_string(), "append_slide is not supported by Word");
    }
}
