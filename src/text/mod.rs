//! Text normalization
//!
//! Turns raw extractor output into the inputs the parsers consume:
//! - PDF text becomes an ordered sequence of trimmed, non-empty [`Line`]s
//! - edition HTML becomes a plain-text blob with block elements on their own lines
//!
//! HTML stripping uses lol_html streaming rewrites.

mod html;
mod lines;

pub use html::{collapse_whitespace, element_text, html_title_text, strip_html, TextError};
pub use lines::{normalize_pdf_text, Line};
