//! Materialization pipeline
//!
//! classify -> parse -> write -> (one fallback) for a single response.

use super::chart::ChartIntentDetector;
use super::classifier::ContentClassifier;
use super::slides::SlideDeckParser;
use super::tabular::TabularParser;
use super::types::{ContentKind, HostKind, MaterializePlan, TextFormat, WriteOutcome};
use super::writer::HostWriter;
use crate::ai::session::ERROR_GLYPH;
use crate::config::MaterializeConfig;
use crate::host::HostDocument;
use crate::utils::preview;

pub struct MaterializationPipeline {
    classifier: ContentClassifier,
    tabular: TabularParser,
    slides: SlideDeckParser,
    chart: ChartIntentDetector,
    config: MaterializeConfig,
}

impl MaterializationPipeline {
    pub fn new(config: MaterializeConfig) -> Self {
        Self {
            classifier: ContentClassifier::new(&config),
            tabular: TabularParser::new(&config),
            slides: SlideDeckParser::new(&config),
            chart: ChartIntentDetector::new(&config),
            config,
        }
    }

    /// Whether the text is an error reply rendered by the chat layer
    ///
    /// The session's own glyph always counts, whatever markers are configured.
    pub fn is_error_reply(&self, text: &str) -> bool {
        let text = text.trim_start();
        text.starts_with(ERROR_GLYPH)
            || self
                .config
                .error_markers
                .iter()
                .any(|marker| !marker.is_empty() && text.starts_with(marker.as_str()))
    }

    /// What would be written for `response` on `host`, without writing
    pub fn plan(&self, response: &str, host: HostKind) -> MaterializePlan {
        if response.trim().is_empty() || self.is_error_reply(response) {
            return MaterializePlan::Nothing;
        }

        match self.classifier.classify(response, host) {
            ContentKind::Formula => MaterializePlan::Formula(response.trim().to_string()),
            ContentKind::ChartRequest => MaterializePlan::Chart(self.chart.detect(response)),
            ContentKind::TabularData => {
                let grid = self.tabular.parse(response);
                if grid.is_empty() {
                    MaterializePlan::Nothing
                } else {
                    MaterializePlan::Grid(grid)
                }
            }
            ContentKind::SlideDeck => {
                let deck = self.slides.parse(response);
                if deck.is_empty() {
                    MaterializePlan::Nothing
                } else {
                    MaterializePlan::Slides(deck)
                }
            }
            ContentKind::PlainText => MaterializePlan::Text {
                content: response.to_string(),
                format: self.text_format_for(host),
            },
        }
    }

    /// Write `response` into `document` as whatever it classifies as
    ///
    /// Grid and slide writes that fail are retried exactly once as a plain
    /// text insert of the original response. Nothing to write counts as success.
    pub async fn materialize<D>(&self, document: &D, response: &str, host: HostKind) -> WriteOutcome
    where
        D: HostDocument + ?Sized,
    {
        let plan = self.plan(response, host);
        let Some(kind) = plan.content_kind() else {
            tracing::debug!(
                "[Pipeline] Nothing to write for: {}",
                preview(response.trim(), 80)
            );
            return WriteOutcome::success();
        };

        tracing::info!("[Pipeline] Materializing {:?} into {}", kind, host.as_str());

        let writer = HostWriter::new(document, self.config.untitled_slide.as_str());
        let outcome = match &plan {
            MaterializePlan::Formula(formula) => writer.write_formula(formula).await,
            MaterializePlan::Grid(grid) => writer.write_grid(grid).await,
            MaterializePlan::Chart(spec) => writer.write_chart(spec).await,
            MaterializePlan::Slides(deck) => writer.write_slides(deck).await,
            MaterializePlan::Text { content, format } => writer.write_text(content, *format).await,
            MaterializePlan::Nothing => WriteOutcome::success(),
        };

        if outcome.succeeded || !kind.falls_back_to_text() {
            if let Some(detail) = &outcome.error_detail {
                tracing::warn!("[Pipeline] {:?} write failed: {}", kind, detail);
            }
            return outcome;
        }

        tracing::warn!(
            "[Pipeline] {:?} write failed ({}), inserting as plain text",
            kind,
            outcome.error_detail.as_deref().unwrap_or("unknown error")
        );
        let fallback = writer.write_text(response, TextFormat::Plain).await;
        if let Some(detail) = &fallback.error_detail {
            tracing::warn!("[Pipeline] Plain text fallback failed: {}", detail);
        }
        fallback
    }

    fn text_format_for(&self, host: HostKind) -> TextFormat {
        if host == HostKind::TextEditor && self.config.prefer_rich_text {
            TextFormat::Rich
        } else {
            TextFormat::Plain
        }
    }
}

impl Default for MaterializationPipeline {
    fn default() -> Self {
        Self::new(MaterializeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FailureRule, HostOperation, MemoryDocument};
    use crate::materialize::{ChartKind, DataGrid, SlideRecord};

    #[test]
    fn test_plan_error_reply_is_nothing() {
        let pipeline = MaterializationPipeline::default();
        assert_eq!(
            pipeline.plan("❌ **Error**: boom", HostKind::Spreadsheet),
            MaterializePlan::Nothing
        );
        assert_eq!(
            pipeline.plan("  ⚠️ **No Internet Connection**", HostKind::TextEditor),
            MaterializePlan::Nothing
        );
        assert_eq!(pipeline.plan("", HostKind::TextEditor), MaterializePlan::Nothing);
    }

    #[test]
    fn test_plan_per_host() {
        let pipeline = MaterializationPipeline::default();

        assert_eq!(
            pipeline.plan(" =AVERAGE(B2:B9) ", HostKind::Spreadsheet),
            MaterializePlan::Formula("=AVERAGE(B2:B9)".to_string())
        );
        assert_eq!(
            pipeline.plan("Name,Age\nJohn,25", HostKind::Spreadsheet),
            MaterializePlan::Grid(DataGrid::new(vec![
                vec!["Name".into(), "Age".into()],
                vec!["John".into(), "25".into()],
            ]))
        );
        match pipeline.plan("Here is a pie chart", HostKind::Spreadsheet) {
            MaterializePlan::Chart(spec) => assert_eq!(spec.kind, ChartKind::Pie),
            other => panic!("expected chart, got {:?}", other),
        }
        assert_eq!(
            pipeline.plan("Hello **world**", HostKind::TextEditor),
            MaterializePlan::Text {
                content: "Hello **world**".to_string(),
                format: TextFormat::Rich
            }
        );
        assert_eq!(
            pipeline.plan("Hello", HostKind::Unknown),
            MaterializePlan::Text {
                content: "Hello".to_string(),
                format: TextFormat::Plain
            }
        );
    }

    #[test]
    fn test_plan_empty_parse_is_nothing() {
        let pipeline = MaterializationPipeline::default();
        assert_eq!(pipeline.plan("Sure!", HostKind::Spreadsheet), MaterializePlan::Nothing);
        assert_eq!(pipeline.plan("Here you go", HostKind::Presentation), MaterializePlan::Nothing);
    }

    #[tokio::test]
    async fn test_error_reply_never_touches_host() {
        let pipeline = MaterializationPipeline::default();
        for host in [
            HostKind::TextEditor,
            HostKind::Spreadsheet,
            HostKind::Presentation,
            HostKind::Unknown,
        ] {
            let doc = MemoryDocument::new(host);
            let outcome = pipeline
                .materialize(&doc, "❌ **Error**: API Error (403): Forbidden", host)
                .await;
            assert!(outcome.succeeded);
            assert_eq!(doc.total_attempts().await, 0);
        }
    }

    #[tokio::test]
    async fn test_grid_failure_falls_back_once() {
        let pipeline = MaterializationPipeline::default();
        let doc = MemoryDocument::new(HostKind::Spreadsheet)
            .failing("insert_grid", FailureRule::Always);
        let response = "a,b\n1,2";

        let outcome = pipeline.materialize(&doc, response, HostKind::Spreadsheet).await;
        assert!(outcome.succeeded);
        assert_eq!(doc.attempts("insert_grid").await, 1);
        assert_eq!(doc.attempts("insert_text").await, 1);
        assert_eq!(
            doc.operations().await,
            vec![HostOperation::InsertText {
                text: response.to_string(),
                format: TextFormat::Plain
            }]
        );
    }

    #[tokio::test]
    async fn test_fallback_failure_is_terminal() {
        let pipeline = MaterializationPipeline::default();
        let doc = MemoryDocument::new(HostKind::Presentation)
            .failing("append_slide", FailureRule::Always)
            .failing("insert_text", FailureRule::Always);

        let outcome = pipeline
            .materialize(&doc, "TITLE: Plan\n- a", HostKind::Presentation)
            .await;
        assert!(!outcome.succeeded);
        assert_eq!(doc.attempts("append_slide").await, 1);
        assert_eq!(doc.attempts("insert_text").await, 1);
    }

    #[tokio::test]
    async fn test_session_error_reply_rejected_without_configured_markers() {
        let pipeline = MaterializationPipeline::new(MaterializeConfig {
            error_markers: vec!["[error]".to_string()],
            ..MaterializeConfig::default()
        });
        let doc = MemoryDocument::new(HostKind::TextEditor);
        let reply = crate::ai::render_error(&crate::ai::AssistantError::MissingCredential);

        assert!(pipeline.is_error_reply(&reply));
        assert!(pipeline.is_error_reply("[error] quota"));
        let outcome = pipeline.materialize(&doc, &reply, HostKind::TextEditor).await;
        assert!(outcome.succeeded);
        assert_eq!(doc.total_attempts().await, 0);
    }

    #[tokio::test]
    async fn test_formula_written_trimmed() {
        let pipeline = MaterializationPipeline::default();
        let doc = MemoryDocument::new(HostKind::Spreadsheet);

        let outcome = pipeline
            .materialize(&doc, "  =AVERAGE(B2:B9)\n", HostKind::Spreadsheet)
            .await;
        assert!(outcome.succeeded);
        assert_eq!(
            doc.operations().await,
            vec![HostOperation::InsertFormula {
                formula: "=AVERAGE(B2:B9)".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_formula_failure_has_no_fallback() {
        let pipeline = MaterializationPipeline::default();
        let doc = MemoryDocument::new(HostKind::Spreadsheet)
            .failing("insert_formula", FailureRule::Always);

        let outcome = pipeline.materialize(&doc, "=SUM(A1)", HostKind::Spreadsheet).await;
        assert!(!outcome.succeeded);
        assert_eq!(doc.attempts("insert_formula").await, 1);
        assert_eq!(doc.attempts("insert_text").await, 0);
        assert_eq!(doc.total_attempts().await, 1);
    }

    #[tokio::test]
    async fn test_chart_failure_has_no_fallback() {
        let pipeline = MaterializationPipeline::default();
        let doc = MemoryDocument::new(HostKind::Spreadsheet)
            .failing("insert_chart", FailureRule::Always);

        let outcome = pipeline
            .materialize(&doc, "bar chart please", HostKind::Spreadsheet)
            .await;
        assert!(!outcome.succeeded);
        assert_eq!(doc.total_attempts().await, 1);
    }

    #[tokio::test]
    async fn test_slides_appended_in_order() {
        let pipeline = MaterializationPipeline::default();
        let doc = MemoryDocument::new(HostKind::Presentation);
        let response = r#"[{"title":"Intro","points":["A","B"]},{"title":"Next","bullets":["C"]}]"#;

        let outcome = pipeline.materialize(&doc, response, HostKind::Presentation).await;
        assert!(outcome.succeeded);
        let deck: Vec<SlideRecord> = doc
            .operations()
            .await
            .into_iter()
            .filter_map(|op| match op {
                HostOperation::AppendSlide { title, body } => Some(SlideRecord::new(
                    title,
                    body.lines().map(String::from).collect(),
                )),
                _ => None,
            })
            .collect();
        assert_eq!(
            deck,
            vec![
                SlideRecord::new("Intro", vec!["A".into(), "B".into()]),
                SlideRecord::new("Next", vec!["C".into()]),
            ]
        );
    }
}
