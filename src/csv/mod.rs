//! CSV import pipeline.
//!
//! Inventory files arrive as raw text in whatever dialect the exporting
//! tool produced. This module sniffs the field delimiter from the first
//! non-blank line, tokenizes the text with a quote-aware state machine, and
//! cleans up the header row:
//!
//! - `dialect`: delimiter detection over a fixed candidate set
//! - `parser`: RFC-4180-style tokenizer + blank-row elision
//! - `columns`: header de-duplication and cell normalization
//!
//! Parsing is best-effort by construction: malformed quoting degrades to
//! literal content and never returns an error.

mod columns;
mod dialect;
mod parser;

pub use columns::{normalize_cell, unique_column_names};
pub use dialect::detect_delimiter;
pub use parser::{parse, parse_auto, ParsedTable};

/// Strip a single leading byte-order mark.
pub(crate) fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}
