use serde::de::DeserializeOwned;

/// Robustly finds JSON inside an LLM response.
/// Handles: Markdown code blocks, conversational intro/outro, and bracket-counting for nested JSON.
///
/// Candidates are tried in order and each one that deserializes into `T` is
/// handed to `accept`; the first `Some` it returns wins. Malformed JSON is
/// never an error, it just moves on to the next candidate.
pub fn find_map_json<T, R, F>(response: &str, mut accept: F) -> Option<R>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Option<R>,
{
    let trimmed = response.trim();
    let blocks = fenced_blocks(trimmed);

    // Stage 1: whole response, then each code block on its own
    // Stage 2: balanced [...] then {...} spans inside each code block
    // Stage 3: balanced spans anywhere in the response (JSON after or outside a fence)
    let candidates = std::iter::once(trimmed)
        .chain(blocks.iter().copied())
        .chain(blocks.iter().copied().flat_map(|block| balanced_spans(block, '[', ']')))
        .chain(blocks.iter().copied().flat_map(|block| balanced_spans(block, '{', '}')))
        .chain(balanced_spans(trimmed, '[', ']'))
        .chain(balanced_spans(trimmed, '{', '}'));

    for candidate in candidates {
        if let Ok(parsed) = serde_json::from_str::<T>(candidate) {
            if let Some(result) = accept(parsed) {
                return Some(result);
            }
        }
    }
    None
}

/// First candidate that deserializes into `T`
pub fn extract_json<T: DeserializeOwned>(response: &str) -> Option<T> {
    find_map_json(response, Some)
}

/// Bodies of every markdown code block (```json ... ``` or ``` ... ```), in order
///
/// An unclosed fence runs to the end of the text.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        // Skip the fence line itself (```json)
        let after_open = &rest[open + 3..];
        let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(after_open.len());
        let body = &after_open[body_start..];

        match body.find("```") {
            Some(close) => {
                blocks.push(body[..close].trim());
                rest = &body[close + 3..];
            }
            None => {
                blocks.push(body.trim());
                break;
            }
        }
    }
    blocks
}

/// Top-level bracket-balanced spans, skipping brackets inside JSON strings
fn balanced_spans(text: &str, open: char, close: char) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start_idx: Option<usize> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if depth > 0 => in_string = true,
            c if c == open => {
                if depth == 0 {
                    start_idx = Some(i);
                }
                depth += 1;
            }
            c if c == close && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(start) = start_idx.take() {
                        spans.push(&text[start..i + close.len_utf8()]);
                    }
                }
            }
            _ => {}
        }
    }
    spans
}
