use std::{error::Error, fmt};

use rentroll_store::models::RentRollRow;

/// A line of a JSONL export that is not a valid row.
#[derive(Debug)]
pub struct JsonlParseError {
    line: usize,
    message: String,
}

impl JsonlParseError {
    fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// 1-based line number of the offending record.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for JsonlParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSONL parse error on line {}: {}", self.line, self.message)
    }
}

impl Error for JsonlParseError {}

/// Parser for newline-delimited rent roll exports.
pub struct RentRollJsonlParser;

impl RentRollJsonlParser {
    /// Parses every non-blank line as one [`RentRollRow`].
    ///
    /// # Errors
    /// Returns `JsonlParseError` for the first line that is not a valid row; no
    /// rows are returned in that case.
    pub fn parse(input: &str) -> Result<Vec<RentRollRow>, JsonlParseError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut rows = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let row = serde_json::from_str::<RentRollRow>(trimmed)
                .map_err(|err| JsonlParseError::at_line(index + 1, err.to_string()))?;
            rows.push(row);
        }
        Ok(rows)
    }
}
