//! Response text to SlideDeck
//!
//! Two strategies, first success wins:
//! 1. a JSON array of `{title, points|bullets}` objects anywhere in the text
//! 2. a single slide: first line is the title, the rest are bullets

use regex::Regex;
use serde_json::Value;

use super::lines::{content_lines, PreambleTokens};
use super::types::{SlideDeck, SlideRecord};
use crate::ai::json_parser::find_map_json;
use crate::config::MaterializeConfig;

const BULLET_MARKERS: &[char] = &['-', '*', '•'];
const HEADING_MARKUP: &[char] = &['#', '*', '-', '•', '>'];

#[derive(Debug, Clone)]
pub struct SlideDeckParser {
    preamble: PreambleTokens,
    /// `^(title|başlık)\s*:` for the configured labels
    title_label: Option<Regex>,
}

impl SlideDeckParser {
    pub fn new(config: &MaterializeConfig) -> Self {
        let labels: Vec<String> = config
            .title_labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(regex::escape)
            .collect();

        let title_label = if labels.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i)^(?:{})\s*:\s*", labels.join("|"))).ok()
        };

        Self {
            preamble: PreambleTokens::new(&config.preamble_tokens)
                .whole_word(config.preamble_whole_word),
            title_label,
        }
    }

    pub fn parse(&self, text: &str) -> SlideDeck {
        if let Some(deck) = parse_structured(text) {
            tracing::debug!("[SlideParser] Structured deck with {} slides", deck.len());
            return deck;
        }
        self.parse_single_slide(text)
    }

    fn parse_single_slide(&self, text: &str) -> SlideDeck {
        let lines = content_lines(text, &self.preamble);
        let Some((first, rest)) = lines.split_first() else {
            return SlideDeck::new();
        };

        let title = self.clean_title(first);
        let bullets: Vec<String> = rest
            .iter()
            .map(|line| strip_bullet(line))
            .filter(|bullet| !bullet.is_empty())
            .collect();

        if title.is_empty() && bullets.is_empty() {
            return SlideDeck::new();
        }
        vec![SlideRecord::new(title, bullets)]
    }

    /// "## **TITLE: Results**" -> "Results"
    fn clean_title(&self, line: &str) -> String {
        let mut title = line.trim().trim_start_matches(HEADING_MARKUP).trim_start();
        if let Some(label) = &self.title_label {
            if let Some(found) = label.find(title) {
                title = &title[found.end()..];
            }
        }
        title
            .trim_start_matches(HEADING_MARKUP)
            .trim_end_matches(['*', '#'])
            .trim()
            .to_string()
    }
}

impl Default for SlideDeckParser {
    fn default() -> Self {
        Self::new(&MaterializeConfig::default())
    }
}

/// Strategy 1: JSON array of slide objects
fn parse_structured(text: &str) -> Option<SlideDeck> {
    find_map_json(text, |items: Vec<Value>| {
        let deck: SlideDeck = items.iter().filter_map(slide_from_value).collect();
        if deck.is_empty() {
            None
        } else {
            Some(deck)
        }
    })
}

/// Objects with neither a title nor bullets are skipped
fn slide_from_value(value: &Value) -> Option<SlideRecord> {
    let object = value.as_object()?;

    let title = object
        .get("title")
        .map(value_to_text)
        .unwrap_or_default()
        .trim()
        .to_string();

    let bullets: Vec<String> = object
        .get("points")
        .or_else(|| object.get("bullets"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| value_to_text(item).trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if title.is_empty() && bullets.is_empty() {
        None
    } else {
        Some(SlideRecord { title, bullets })
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn strip_bullet(line: &str) -> String {
    let trimmed = line.trim();
    trimmed
        .strip_prefix(BULLET_MARKERS)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
