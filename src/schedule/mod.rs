//! Meeting schedule extraction
//!
//! Converts the normalized text of a workbook PDF into dated meetings with
//! per-room assignments:
//! - `types`: parts, assignments, meetings and parse warnings
//! - `names`: the name-shaped predicate list and name cleanup helpers
//! - `pool`: the name pool threaded between consecutive meetings
//! - `parser`: the block-by-block schedule parser

pub mod names;
pub mod parser;
pub mod pool;
pub mod types;

pub use names::{is_name_shaped, split_camel_case};
pub use parser::{parse_schedule, ParseOptions, ParseOutcome, ParseStrategy, ScheduleParser};
pub use pool::{Drained, NamePool};
pub use types::{Assignment, Meeting, ParseWarning, Part, PartType, Role, Room, Section};
