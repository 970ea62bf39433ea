use crate::protocol::{HeaderField, ParseError};

const SEPARATOR: &str = ": ";

/// Splits a header line on the first `": "`.
///
/// Both sides must be non-empty; any later `": "` belongs to the value.
pub(crate) fn parse_header(line: &str) -> Result<HeaderField, ParseError> {
    match line.split_once(SEPARATOR) {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok(HeaderField::new(key, value)),
        _ => Err(ParseError::header_syntax(line)),
    }
}
