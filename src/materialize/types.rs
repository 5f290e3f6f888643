//! Shared types for the materialization pipeline

use serde::{Deserialize, Serialize};

/// The document-editing application hosting the assistant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    TextEditor,
    Spreadsheet,
    Presentation,
    Unknown,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextEditor => "text_editor",
            Self::Spreadsheet => "spreadsheet",
            Self::Presentation => "presentation",
            Self::Unknown => "unknown",
        }
    }

    /// Product name used when talking to the model about its surroundings
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TextEditor => "Word",
            Self::Spreadsheet => "Excel",
            Self::Presentation => "PowerPoint",
            Self::Unknown => "Office",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "text_editor" | "texteditor" | "text" | "word" | "document" => Self::TextEditor,
            "spreadsheet" | "excel" | "sheet" | "workbook" => Self::Spreadsheet,
            "presentation" | "powerpoint" | "slides" | "ppt" => Self::Presentation,
            _ => Self::Unknown,
        }
    }
}

/// What shape of content a response represents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Formula,
    TabularData,
    ChartRequest,
    SlideDeck,
    PlainText,
}

impl ContentKind {
    /// Whether a failed primary write is retried as a plain-text insert
    /// of the original response
    pub fn falls_back_to_text(&self) -> bool {
        matches!(self, Self::TabularData | Self::SlideDeck)
    }
}

/// How text is inserted into the host
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    Plain,
    Rich,
}

/// Rows of cell strings parsed from delimited text
///
/// The first row's length is the column count. Other rows keep their
/// own length; nothing is padded or truncated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataGrid {
    rows: Vec<Vec<String>>,
}

impl DataGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether every row matches the first row's width
    pub fn is_rectangular(&self) -> bool {
        let width = self.column_count();
        self.rows.iter().all(|row| row.len() == width)
    }

    /// Comma-joined rows, newline-joined
    pub fn to_csv(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// One slide's content before it is written
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlideRecord {
    pub title: String,
    pub bullets: Vec<String>,
}

impl SlideRecord {
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            bullets,
        }
    }

    /// Body placeholder text: bullets joined by newlines
    pub fn body(&self) -> String {
        self.bullets.join("\n")
    }
}

/// Slides in presentation order
pub type SlideDeck = Vec<SlideRecord>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Column,
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

/// Where a chart takes its data from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RangeRef {
    /// Whatever range is selected in the host when the write happens
    ActiveSelection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub source: RangeRef,
    pub title: String,
}

/// Result of one write attempt (including any fallback)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

impl WriteOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            error_detail: Some(detail.into()),
        }
    }
}

/// What the pipeline would write for a response, before touching the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type", content = "payload")]
pub enum MaterializePlan {
    Formula(String),
    Grid(DataGrid),
    Chart(ChartSpec),
    Slides(SlideDeck),
    Text { content: String, format: TextFormat },
    /// Empty response, error reply, or a parse that produced nothing
    Nothing,
}

impl MaterializePlan {
    /// Content kind this plan realizes, if any
    pub fn content_kind(&self) -> Option<ContentKind> {
        match self {
            Self::Formula(_) => Some(ContentKind::Formula),
            Self::Grid(_) => Some(ContentKind::TabularData),
            Self::Chart(_) => Some(ContentKind::ChartRequest),
            Self::Slides(_) => Some(ContentKind::SlideDeck),
            Self::Text { .. } => Some(ContentKind::PlainText),
            Self::Nothing => None,
        }
    }
}
