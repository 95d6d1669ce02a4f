//! Line-oriented `.env` parser.
//!
//! Supported syntax:
//!
//! ```text
//! # comment
//! export APP_ENV=local
//! APP_NAME="Keel App"      # inline comments are stripped outside quotes
//! APP_KEY='base64:abc#def'
//! ```

/// Parse `.env` content into ordered `(key, value)` pairs.
///
/// Blank lines, `#` comments, lines without `=` and lines with an empty key
/// are skipped. A later duplicate key is kept; the loader decides which one
/// wins.
pub fn parse(content: &str) -> Vec<(String, String)> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
    let (key, raw) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), parse_value(raw)))
}

fn parse_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(quote) = trimmed.chars().next().filter(|c| *c == '"' || *c == '\'') {
        if let Some(end) = closing_quote(trimmed, quote) {
            let inner = &trimmed[1..end];
            return if quote == '"' { unescape(inner) } else { inner.to_string() };
        }
        // Unterminated quote, keep the value verbatim
        return trimmed.to_string();
    }
    strip_inline_comment(raw).trim().to_string()
}

/// Byte index of the quote closing the one at index 0. Backslash escapes
/// are honored inside double quotes only.
fn closing_quote(raw: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in raw.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' && quote == '"' {
            escaped = true;
        } else if c == quote {
            return Some(i);
        }
    }
    None
}

/// Inline comments start at a `#` preceded by whitespace.
fn strip_inline_comment(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return &raw[..i];
        }
    }
    raw
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
