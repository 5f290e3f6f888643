//! Chart kind selection from keyword cues

use super::types::{ChartKind, ChartSpec, RangeRef};
use crate::config::MaterializeConfig;

#[derive(Debug, Clone)]
pub struct ChartIntentDetector {
    /// (lower-cased keywords, kind) in priority order
    table: Vec<(Vec<String>, ChartKind)>,
    default_title: String,
}

impl ChartIntentDetector {
    pub fn new(config: &MaterializeConfig) -> Self {
        let with_synonyms = |base: &str, synonyms: &[String]| -> Vec<String> {
            std::iter::once(base.to_string())
                .chain(synonyms.iter().map(|s| s.trim().to_lowercase()))
                .filter(|s| !s.is_empty())
                .collect()
        };

        Self {
            table: vec![
                (vec!["pie".to_string()], ChartKind::Pie),
                (with_synonyms("line", &config.line_synonyms), ChartKind::Line),
                (with_synonyms("bar", &config.bar_synonyms), ChartKind::Bar),
            ],
            default_title: config.chart_title.clone(),
        }
    }

    /// First keyword group found in the text decides; Column otherwise
    pub fn detect_kind(&self, text: &str) -> ChartKind {
        let lowered = text.to_lowercase();
        self.table
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|(_, kind)| *kind)
            .unwrap_or(ChartKind::Column)
    }

    /// Chart over the active selection with the default title
    pub fn detect(&self, text: &str) -> ChartSpec {
        self.detect_with_title(text, None)
    }

    pub fn detect_with_title(&self, text: &str, title: Option<&str>) -> ChartSpec {
        ChartSpec {
            kind: self.detect_kind(text),
            source: RangeRef::ActiveSelection,
            title: title.unwrap_or(&self.default_title).to_string(),
        }
    }
}

impl Default for ChartIntentDetector {
    fn default() -> Self {
        Self::new(&MaterializeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pie_beats_line() {
        let detector = ChartIntentDetector::default();
        assert_eq!(
            detector.detect_kind("A PIE chart, or maybe a line chart"),
            ChartKind::Pie
        );
        assert_eq!(detector.detect_kind("line chart with a pie slice"), ChartKind::Pie);
    }

    #[test]
    fn test_line_beats_bar() {
        let detector = ChartIntentDetector::default();
        assert_eq!(detector.detect_kind("Bar or Line?"), ChartKind::Line);
    }

    #[test]
    fn test_localized_synonyms() {
        let detector = ChartIntentDetector::default();
        assert_eq!(detector.detect_kind("Çizgi grafik oluştur"), ChartKind::Line);
        assert_eq!(detector.detect_kind("çubuk grafik"), ChartKind::Bar);
    }

    #[test]
    fn test_default_column() {
        let detector = ChartIntentDetector::default();
        let spec = detector.detect("make me a chart");
        assert_eq!(spec.kind, ChartKind::Column);
        assert_eq!(spec.title, "Generated Chart");
        assert_eq!(spec.source, RangeRef::ActiveSelection);
    }

    #[test]
    fn test_title_override() {
        let detector = ChartIntentDetector::default();
        let spec = detector.detect_with_title("bar chart", Some("Revenue"));
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.title, "Revenue");
    }
}
