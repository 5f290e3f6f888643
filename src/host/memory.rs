//! In-memory host document
//!
//! Records every accepted mutation instead of touching a real application.
//! Failures can be injected per operation to exercise fallback paths.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{HostDocument, HostError};
use crate::materialize::{ChartKind, DataGrid, HostKind, TextFormat};

/// A mutation accepted by the document
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum HostOperation {
    InsertText { text: String, format: TextFormat },
    InsertFormula { formula: String },
    InsertGrid { rows: Vec<Vec<String>> },
    AutofitColumns { column_count: usize },
    InsertChart { kind: ChartKind, title: String },
    AppendSlide { title: String, body: String },
}

/// When an injected failure fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureRule {
    /// Every attempt fails
    Always,
    /// The first `n` attempts succeed, later ones fail
    AfterSuccesses(usize),
}

#[derive(Debug, Default)]
struct MemoryState {
    operations: Vec<HostOperation>,
    attempts: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, FailureRule>,
}

/// Recording host for one application kind
#[derive(Debug)]
pub struct MemoryDocument {
    kind: HostKind,
    state: Mutex<MemoryState>,
}

impl MemoryDocument {
    pub fn new(kind: HostKind) -> Self {
        Self {
            kind,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Make `operation` (e.g. "insert_grid", "insert_rich_text") fail according to `rule`
    pub fn failing(mut self, operation: &'static str, rule: FailureRule) -> Self {
        self.state.get_mut().failures.insert(operation, rule);
        self
    }

    /// Accepted mutations in order
    pub async fn operations(&self) -> Vec<HostOperation> {
        self.state.lock().await.operations.clone()
    }

    /// How many times `operation` was attempted, successful or not
    pub async fn attempts(&self, operation: &str) -> usize {
        self.state
            .lock()
            .await
            .attempts
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Total attempts across all operations
    pub async fn total_attempts(&self) -> usize {
        self.state.lock().await.attempts.values().sum()
    }

    fn supports(&self, operation: &str) -> bool {
        match self.kind {
            HostKind::Spreadsheet => matches!(
                operation,
                "insert_text" | "insert_formula" | "insert_grid" | "autofit_columns" | "insert_chart"
            ),
            HostKind::Presentation => matches!(operation, "insert_text" | "append_slide"),
            HostKind::TextEditor => matches!(operation, "insert_text" | "insert_rich_text"),
            HostKind::Unknown => operation == "insert_text",
        }
    }

    /// Count the attempt, apply capability and injected failures, then record
    async fn apply(&self, operation: &'static str, record: HostOperation) -> Result<(), HostError> {
        let mut state = self.state.lock().await;
        let attempt = {
            let count = state.attempts.entry(operation).or_insert(0);
            *count += 1;
            *count
        };

        if !self.supports(operation) {
            return Err(HostError::unsupported(operation, self.kind));
        }

        let injected = match state.failures.get(operation) {
            Some(FailureRule::Always) => true,
            Some(FailureRule::AfterSuccesses(n)) => attempt > *n,
            None => false,
        };
        if injected {
            return Err(HostError::Rejected {
                operation: operation.to_string(),
                message: format!("injected failure on attempt {}", attempt),
            });
        }

        validate(&record)?;
        state.operations.push(record);
        Ok(())
    }
}

/// Shape checks a real host makes before accepting a write
///
/// Ragged grids are rejected, like a range whose size does not match its values.
fn validate(record: &HostOperation) -> Result<(), HostError> {
    if let HostOperation::InsertGrid { rows } = record {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return Err(HostError::InvalidSelection(format!(
                "range is {}x{} but rows differ in length",
                rows.len(),
                width
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl HostDocument for MemoryDocument {
    fn kind(&self) -> HostKind {
        self.kind
    }

    /// Rich inserts are tracked as "insert_rich_text"; only text editors take them
    async fn insert_text(&self, text: &str, format: TextFormat) -> Result<(), HostError> {
        let operation = match format {
            TextFormat::Rich => "insert_rich_text",
            TextFormat::Plain => "insert_text",
        };
        self.apply(
            operation,
            HostOperation::InsertText {
                text: text.to_string(),
                format,
            },
        )
        .await
    }

    async fn insert_formula(&self, formula: &str) -> Result<(), HostError> {
        self.apply(
            "insert_formula",
            HostOperation::InsertFormula {
                formula: formula.to_string(),
            },
        )
        .await
    }

    async fn insert_grid(&self, grid: &DataGrid) -> Result<(), HostError> {
        self.apply(
            "insert_grid",
            HostOperation::InsertGrid {
                rows: grid.rows().to_vec(),
            },
        )
        .await
    }

    async fn autofit_columns(&self, column_count: usize) -> Result<(), HostError> {
        self.apply("autofit_columns", HostOperation::AutofitColumns { column_count })
            .await
    }

    async fn insert_chart(&self, kind: ChartKind, title: &str) -> Result<(), HostError> {
        self.apply(
            "insert_chart",
            HostOperation::InsertChart {
                kind,
                title: title.to_string(),
            },
        )
        .await
    }

    async fn append_slide(&self, title: &str, body: &str) -> Result<(), HostError> {
        self.apply(
            "append_slide",
            HostOperation::AppendSlide {
                title: title.to_string(),
                body: body.to_string(),
            },
        )
        .await
    }
}
