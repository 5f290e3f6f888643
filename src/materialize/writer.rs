//! Host writes with outcome reporting
//!
//! Every operation performs one host mutation (plus the rich-to-plain retry
//! for text) and converts host errors into a failed `WriteOutcome`. Nothing
//! here returns an error to the caller.

use super::types::{ChartSpec, DataGrid, SlideDeck, TextFormat, WriteOutcome};
use crate::host::HostDocument;

pub struct HostWriter<'a, D: HostDocument + ?Sized> {
    document: &'a D,
    untitled_slide: String,
}

impl<'a, D: HostDocument + ?Sized> HostWriter<'a, D> {
    pub fn new(document: &'a D, untitled_slide: impl Into<String>) -> Self {
        Self {
            document,
            untitled_slide: untitled_slide.into(),
        }
    }

    /// Insert text at the selection; rich text falls back to plain once
    pub async fn write_text(&self, content: &str, format: TextFormat) -> WriteOutcome {
        match self.document.insert_text(content, format).await {
            Ok(()) => WriteOutcome::success(),
            Err(e) if format == TextFormat::Rich => {
                tracing::warn!("[HostWriter] Rich text insert failed, retrying as plain: {}", e);
                match self.document.insert_text(content, TextFormat::Plain).await {
                    Ok(()) => WriteOutcome::success(),
                    Err(e) => WriteOutcome::failure(e.to_string()),
                }
            }
            Err(e) => WriteOutcome::failure(e.to_string()),
        }
    }

    /// Formula into the active cell; no retry
    pub async fn write_formula(&self, formula: &str) -> WriteOutcome {
        let formula = formula.trim();
        if !formula.starts_with('=') {
            tracing::debug!("[HostWriter] Formula without leading '=': {}", formula);
        }
        match self.document.insert_formula(formula).await {
            Ok(()) => WriteOutcome::success(),
            Err(e) => WriteOutcome::failure(e.to_string()),
        }
    }

    /// Batch write from the selection's corner, then autofit
    ///
    /// Autofit is cosmetic: its failure is logged and the write still counts.
    pub async fn write_grid(&self, grid: &DataGrid) -> WriteOutcome {
        if let Err(e) = self.document.insert_grid(grid).await {
            return WriteOutcome::failure(e.to_string());
        }

        tracing::debug!(
            "[HostWriter] Wrote {}x{} grid",
            grid.row_count(),
            grid.column_count()
        );

        if let Err(e) = self.document.autofit_columns(grid.column_count()).await {
            tracing::warn!("[HostWriter] Autofit failed: {}", e);
        }
        WriteOutcome::success()
    }

    /// Chart over the selection; failures are terminal
    pub async fn write_chart(&self, spec: &ChartSpec) -> WriteOutcome {
        match self.document.insert_chart(spec.kind, &spec.title).await {
            Ok(()) => WriteOutcome::success(),
            Err(e) => WriteOutcome::failure(e.to_string()),
        }
    }

    /// Append slides in order
    ///
    /// Stops at the first failure. Slides already appended stay in the deck.
    pub async fn write_slides(&self, deck: &SlideDeck) -> WriteOutcome {
        for (index, slide) in deck.iter().enumerate() {
            let title = if slide.title.trim().is_empty() {
                self.untitled_slide.as_str()
            } else {
                slide.title.as_str()
            };

            if let Err(e) = self.document.append_slide(title, &slide.body()).await {
                return WriteOutcome::failure(format!(
                    "slide {} of {}: {}",
                    index + 1,
                    deck.len(),
                    e
                ));
            }
        }

        tracing::debug!("[HostWriter] Appended {} slides", deck.len());
        WriteOutcome::success()
    }
}
