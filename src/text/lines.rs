//! Line normalization for PDF-extracted text

use serde::{Deserialize, Serialize};

/// A single trimmed, non-empty line with its position in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub index: usize,
    pub text: String,
}

impl Line {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for Line {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Split extractor output into trimmed, non-empty lines.
///
/// Indices are assigned after empty lines are dropped, so they are dense
/// and match the position of each line in the returned vector.
pub fn normalize_pdf_text(raw: &str) -> Vec<Line> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, text)| Line::new(index, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_blank_lines_and_trims() {
        let lines = normalize_pdf_text("  Presidente: Ana  \n\n\t\n3 AGOSTO | Salmo 1\r\n  ");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], Line::new(0, "Presidente: Ana"));
        assert_eq!(lines[1], Line::new(1, "3 AGOSTO | Salmo 1"));
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_pdf_text("").is_empty());
        assert!(normalize_pdf_text("\n \n").is_empty());
    }
}
