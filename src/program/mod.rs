//! Week programs from workbook web pages
//!
//! - `weekly`: one weekly program page to one [`WeekProgram`]
//! - `monthly`: the plain text of an edition page to one week per period phrase
//! - `edition`: edition keys, URLs and link discovery

pub mod edition;
mod monthly;
mod types;
mod weekly;

pub use edition::{
    bimester_start, edition_url, extract_edition_pdf_url, extract_weekly_links, issue_key,
    next_issue,
};
pub use monthly::parse_month_text;
pub use types::{merge_weeks, ProgramPart, ProgramRoom, Songs, WeekProgram};
pub use weekly::parse_weekly_html;
