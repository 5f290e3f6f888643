use crate::materialize::HostKind;
use crate::utils::truncate_chars;

/// Output instructions for spreadsheets, matched to how responses are parsed
const SPREADSHEET_INSTRUCTIONS: &str = r#"When the user asks for a formula, reply with ONLY the formula, starting with "=".
When the user asks for data or a table, reply with comma-separated rows, the first row being the headers. No explanations.
When the user asks for a chart, say which chart type fits (pie, line, bar or column) and mention the word "chart"."#;

/// Output instructions for presentations: the JSON deck format
const PRESENTATION_INSTRUCTIONS: &str = r#"When the user asks for slides, reply with ONLY a JSON array, one object per slide:
[{"title": "Slide title", "points": ["First point", "Second point"]}]
For a single slide you may instead write "TITLE: <title>" followed by one "- <point>" line per bullet."#;

const DEFAULT_INSTRUCTIONS: &str = "Format usage: Markdown.";

/// Build the system context for the active host
pub fn build_system_context(host: HostKind) -> String {
    let instructions = match host {
        HostKind::Spreadsheet => SPREADSHEET_INSTRUCTIONS,
        HostKind::Presentation => PRESENTATION_INSTRUCTIONS,
        HostKind::TextEditor | HostKind::Unknown => DEFAULT_INSTRUCTIONS,
    };

    format!(
        r#"You are a helpful assistant living inside Microsoft {}.
Keep answers concise and relevant to document creation.
If the user asks to generate text, table, or content, provide it clearly.
{}"#,
        host.display_name(),
        instructions
    )
}

/// Build the full text part sent to the model
///
/// Document context is optional and cut to `max_context_chars`.
pub fn build_user_prompt(
    host: HostKind,
    question: &str,
    document_context: Option<&str>,
    max_context_chars: usize,
) -> String {
    let mut prompt = build_system_context(host);

    if let Some(context) = document_context.map(str::trim).filter(|c| !c.is_empty()) {
        let clipped = truncate_chars(context, max_context_chars);
        prompt.push_str(&format!(
            r#"

Document Context:
---
{}
---"#,
            clipped
        ));
        if clipped.len() < context.len() {
            prompt.push_str("\n(context truncated)");
        }
    }

    prompt.push_str("\n\nUser Question: ");
    prompt.push_str(question.trim());
    prompt
}
