//! Content classification
//!
//! Decides what a response is for the active host. Rules are an ordered
//! table and the first matching rule wins; every host ends in a catch-all,
//! so classification always produces a kind.

use super::types::{ContentKind, HostKind};
use crate::config::MaterializeConfig;

type Predicate = fn(&ContentClassifier, &str, HostKind) -> bool;

/// Rules in evaluation order
const RULES: &[(Predicate, ContentKind)] = &[
    (ContentClassifier::is_spreadsheet_formula, ContentKind::Formula),
    (ContentClassifier::is_spreadsheet_chart, ContentKind::ChartRequest),
    (ContentClassifier::is_spreadsheet, ContentKind::TabularData),
    (ContentClassifier::is_presentation, ContentKind::SlideDeck),
];

#[derive(Debug, Clone)]
pub struct ContentClassifier {
    /// Lower-cased chart keywords
    chart_keywords: Vec<String>,
}

impl ContentClassifier {
    pub fn new(config: &MaterializeConfig) -> Self {
        Self {
            chart_keywords: config
                .chart_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn classify(&self, text: &str, host: HostKind) -> ContentKind {
        RULES
            .iter()
            .find(|(predicate, _)| predicate(self, text, host))
            .map(|(_, kind)| *kind)
            .unwrap_or(ContentKind::PlainText)
    }

    fn is_spreadsheet_formula(&self, text: &str, host: HostKind) -> bool {
        host == HostKind::Spreadsheet && text.trim().starts_with('=')
    }

    fn is_spreadsheet_chart(&self, text: &str, host: HostKind) -> bool {
        if host != HostKind::Spreadsheet {
            return false;
        }
        let lowered = text.to_lowercase();
        self.chart_keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    fn is_spreadsheet(&self, _text: &str, host: HostKind) -> bool {
        host == HostKind::Spreadsheet
    }

    fn is_presentation(&self, _text: &str, host: HostKind) -> bool {
        host == HostKind::Presentation
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(&MaterializeConfig::default())
    }
}
