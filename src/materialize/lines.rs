//! Line-level cleanup shared by the tabular and slide parsers

/// Lower-cased preamble tokens ("sure", "here", ...)
#[derive(Debug, Clone, Default)]
pub struct PreambleTokens {
    tokens: Vec<String>,
    whole_word: bool,
}

impl PreambleTokens {
    pub fn new<'a, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            whole_word: false,
        }
    }

    /// Require the token to end at a word boundary ("Hereford,12" is then data)
    pub fn whole_word(mut self, whole_word: bool) -> Self {
        self.whole_word = whole_word;
        self
    }

    /// Whether `line` starts with one of the tokens, ignoring case
    pub fn matches(&self, line: &str) -> bool {
        let lowered = line.trim_start().to_lowercase();
        self.tokens.iter().any(|token| match lowered.strip_prefix(token.as_str()) {
            Some(rest) if self.whole_word => {
                rest.chars().next().map_or(true, |c| !c.is_alphanumeric())
            }
            Some(_) => true,
            None => false,
        })
    }
}

/// Markdown code fence line (```, ```csv, ```json)
pub fn is_code_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Non-blank, non-fence lines with the first one dropped if it is
/// conversational preamble
pub fn content_lines<'a>(text: &'a str, preamble: &PreambleTokens) -> Vec<&'a str> {
    let mut lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty() && !is_code_fence(line))
        .collect();

    if lines.first().is_some_and(|first| preamble.matches(first)) {
        lines.remove(0);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_tokens() -> PreambleTokens {
        PreambleTokens::new(&["sure".to_string(), "here".to_string()])
    }

    #[test]
    fn test_preamble_prefix_match() {
        let tokens = default_tokens();
        assert!(tokens.matches("Sure, here is your data:"));
        assert!(tokens.matches("  HERE is the table"));
        assert!(tokens.matches("sure"));
        assert!(tokens.matches("Heres your data:"));
        assert!(tokens.matches("Surely, this helps"));
        assert!(!tokens.matches("Name,Age"));
        assert!(!tokens.matches("The data is here"));
    }

    #[test]
    fn test_preamble_whole_word_opt_in() {
        let tokens = default_tokens().whole_word(true);
        assert!(tokens.matches("Sure, here is your data:"));
        assert!(tokens.matches("here"));
        assert!(!tokens.matches("Hereford,12"));
        assert!(!tokens.matches("Heres your data:"));
    }

    #[test]
    fn test_content_lines_drops_one_preamble() {
        let tokens = default_tokens();
        let lines = content_lines("Sure!\n\nHere we go\nA,B\n", &tokens);
        assert_eq!(lines, vec!["Here we go", "A,B"]);
    }

    #[test]
    fn test_content_lines_skips_fences() {
        let tokens = default_tokens();
        let lines = content_lines("```csv\nA,B\n1,2\n```", &tokens);
        assert_eq!(lines, vec!["A,B", "1,2"]);
    }
}
