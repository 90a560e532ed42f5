use super::{detect_delimiter, strip_bom};

/// Result of an auto-detected parse: filtered rows plus the delimiter that
/// produced them. The delimiter is reused later as the export delimiter.
#[derive(Clone, Debug)]
pub struct ParsedTable {
    pub rows: Vec<Vec<String>>,
    pub delimiter: char,
}

/// Tokenize `text` into rows of raw fields.
///
/// Character state machine with a single `in_quote` bit:
/// - `"` toggles the quote state; `""` while quoted emits a literal quote
/// - the delimiter closes a field when unquoted
/// - `\n` / `\r` close a row when unquoted, with `\r\n` folded into one
///   terminator; a terminator with nothing buffered is a no-op, so runs of
///   blank lines produce no phantom rows
/// - everything else accumulates into the current field
///
/// Trailing content without a final newline still closes the last row.
/// Malformed quoting never fails; it falls through as literal content.
pub fn parse(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let clean = strip_bom(text);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quote = false;

    let mut chars = clean.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quote && chars.peek() == Some(&'"') {
                field.push('"');
                chars.next();
            } else {
                in_quote = !in_quote;
            }
        } else if ch == delimiter && !in_quote {
            row.push(std::mem::take(&mut field));
        } else if (ch == '\n' || ch == '\r') && !in_quote {
            if ch == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            if !field.is_empty() || !row.is_empty() {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
        } else {
            field.push(ch);
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Detect the delimiter, parse, and drop rows whose every cell trims to
/// empty.
pub fn parse_auto(text: &str) -> ParsedTable {
    let delimiter = detect_delimiter(text);
    let rows = parse(text, delimiter)
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();
    ParsedTable { rows, delimiter }
}
