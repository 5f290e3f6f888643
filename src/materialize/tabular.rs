//! Delimited text to DataGrid
//!
//! Handles the two shapes models return for "give me a table":
//! CSV-ish lines and markdown pipe tables.

use super::lines::{content_lines, PreambleTokens};
use super::types::DataGrid;
use crate::config::MaterializeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Pipe,
    Comma,
}

#[derive(Debug, Clone)]
pub struct TabularParser {
    preamble: PreambleTokens,
}

impl TabularParser {
    pub fn new(config: &MaterializeConfig) -> Self {
        Self {
            preamble: PreambleTokens::new(&config.preamble_tokens)
                .whole_word(config.preamble_whole_word),
        }
    }

    /// Parse `text` into rows of trimmed cells
    ///
    /// Returns an empty grid when nothing but preamble is left.
    pub fn parse(&self, text: &str) -> DataGrid {
        let lines = content_lines(text, &self.preamble);
        if lines.is_empty() {
            return DataGrid::default();
        }

        let delimiter = if lines.iter().any(|line| line.contains('|')) {
            Delimiter::Pipe
        } else {
            Delimiter::Comma
        };

        let rows = lines
            .into_iter()
            .filter(|line| delimiter == Delimiter::Comma || !is_separator_row(line))
            .map(|line| split_row(line, delimiter))
            .collect();

        DataGrid::new(rows)
    }
}

impl Default for TabularParser {
    fn default() -> Self {
        Self::new(&MaterializeConfig::default())
    }
}

/// Markdown table rule such as `|---|:---:|` or `---|---`
fn is_separator_row(line: &str) -> bool {
    line.contains('-')
        && line
            .chars()
            .all(|c| c.is_whitespace() || matches!(c, '-' | '|' | ':' | '+' | '='))
}

fn split_row(line: &str, delimiter: Delimiter) -> Vec<String> {
    match delimiter {
        Delimiter::Comma => line.split(',').map(|cell| cell.trim().to_string()).collect(),
        Delimiter::Pipe => {
            let trimmed = line.trim();
            let mut cells: Vec<&str> = trimmed.split('|').collect();

            // Boundary pipes leave one empty field at either end
            if trimmed.starts_with('|') && cells.len() > 1 {
                cells.remove(0);
            }
            if trimmed.ends_with('|') && cells.len() > 1 {
                cells.pop();
            }

            cells.into_iter().map(|cell| cell.trim().to_string()).collect()
        }
    }
}
