//! Whitespace normalisation and heuristic metadata extraction for extracted text.

/// Collapse runs of three or more newlines to a blank line, squeeze runs of
/// spaces to a single space, and trim the result.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0usize;
    let mut prev_space = false;

    for ch in text.chars() {
        match ch {
            '\n' => {
                newlines += 1;
                prev_space = false;
                if newlines <= 2 {
                    out.push('\n');
                }
            }
            ' ' => {
                newlines = 0;
                if !prev_space {
                    out.push(' ');
                }
                prev_space = true;
            }
            other => {
                newlines = 0;
                prev_space = false;
                out.push(other);
            }
        }
    }

    out.trim().to_string()
}

/// Title and author heuristics: the title is the first non-empty line, the
/// author is the first line mentioning "author" or starting with "by".
pub fn extract_metadata(text: &str) -> (Option<String>, Option<String>) {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let title = lines.first().map(|l| l.to_string());
    let authors = lines
        .iter()
        .find(|l| is_author_line(l))
        .map(|l| l.to_string());

    (title, authors)
}

fn is_author_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    if lower.contains("author") {
        return true;
    }
    match lower.strip_prefix("by") {
        Some(rest) => rest.is_empty() || !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'),
        None => false,
    }
}
