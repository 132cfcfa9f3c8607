//! Tokenisation and window-boundary helpers used by the chunker.

/// A whitespace-delimited word and its byte span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub start: usize,
    pub end: usize,
}

/// Approximate token count via whitespace splitting.
pub(crate) fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split `text` into whitespace-delimited tokens, keeping byte spans.
pub(crate) fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token { start: s, end: i });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token { start: s, end: text.len() });
    }
    tokens
}

/// True when the token closes a sentence (`.`, `!`, `?`, optionally followed
/// by closing quotes or brackets).
pub(crate) fn ends_sentence(token: &str) -> bool {
    token
        .trim_end_matches(['"', '\'', ')', ']', '\u{201D}', '\u{2019}'])
        .ends_with(['.', '!', '?'])
}

/// Pull the window end `end` back to a sentence boundary when one exists in
/// the second half of the window `[start, end)` and the shortened window
/// still holds more than `overlap` tokens. Returns the (possibly unchanged)
/// end.
pub(crate) fn snap_to_sentence(
    text: &str,
    tokens: &[Token],
    start: usize,
    end: usize,
    overlap: usize,
) -> usize {
    let window = end - start;
    let min_len = (window / 2).max(overlap + 1);
    let mut candidate = end;
    while candidate > start && candidate - start >= min_len {
        let tok = tokens[candidate - 1];
        if ends_sentence(&text[tok.start..tok.end]) {
            return candidate;
        }
        candidate -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_spans() {
        let text = "  alpha beta\n\ngamma ";
        let tokens = tokenize(text);
        let words: Vec<&str> = tokens.iter().map(|t| &text[t.start..t.end]).collect();
        assert_eq!(words, vec!["alpha", "beta", "gamma"]);
        assert_eq!(tokens.len(), count_tokens(text));
    }

    #[test]
    fn tokenize_handles_multibyte() {
        let text = "café naïve\u{00A0}résumé";
        let tokens = tokenize(text);
        // NBSP counts as whitespace.
        assert_eq!(tokens.len(), 3);
        assert_eq!(&text[tokens[2].start..tokens[2].end], "résumé");
    }

    #[test]
    fn sentence_endings() {
        assert!(ends_sentence("Paris."));
        assert!(ends_sentence("really?"));
        assert!(ends_sentence("done!\""));
        assert!(ends_sentence("(see above.)"));
        assert!(!ends_sentence("e.g"));
        assert!(!ends_sentence("word,"));
    }

    #[test]
    fn snap_prefers_late_sentence_boundary() {
        let text = "a b c d. e f g h";
        let tokens = tokenize(text);
        // Window covers all 8 tokens; boundary after token 4 ("d.").
        assert_eq!(snap_to_sentence(text, &tokens, 0, 8, 0), 4);
    }

    #[test]
    fn snap_ignores_early_boundary() {
        let text = "a. b c d e f g h";
        let tokens = tokenize(text);
        assert_eq!(snap_to_sentence(text, &tokens, 0, 8, 0), 8);
    }

    #[test]
    fn snap_keeps_more_than_overlap_tokens() {
        let text = "a b c d. e f g h";
        let tokens = tokenize(text);
        // With overlap 4 the window must keep at least 5 tokens.
        assert_eq!(snap_to_sentence(text, &tokens, 0, 8, 4), 8);
    }
}
