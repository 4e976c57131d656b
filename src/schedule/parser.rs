//! Schedule parser
//!
//! Walks the normalized lines of a workbook PDF and produces one [`Meeting`]
//! per date header. Each header opens a block that runs until the next
//! header. Within a block the parser finds the president, the numbered
//! parts and the names printed around them, then assigns names to parts
//! room by room.
//!
//! Two heuristics exist for locating principal-room names:
//! - [`ParseStrategy::FooterScan`] reads them from the lines printed just
//!   above the date header
//! - [`ParseStrategy::PoolCarryover`] carries the loose names of one block
//!   over to the next meeting
//!
//! Parsing never fails. Anything that could not be resolved is left out of
//! the output and reported as a [`ParseWarning`].

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::names::{
    clean_study_name, collapse_repeated, footer_disposition, is_name_shaped, split_camel_case,
    strip_main_hall, FooterLine,
};
use super::pool::{loose_names, Drained, NamePool};
use super::types::{
    is_part_line, Assignment, Meeting, ParseWarning, Part, Role, Room, Section, READING_POINT,
};
use crate::period::month_number;
use crate::text::Line;

static DATE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(\d{1,2})\s+(Janeiro|Fevereiro|Março|Abril|Maio|Junho|Julho|Agosto|Setembro|Outubro|Novembro|Dezembro)\s+\|",
    )
    .expect("valid regex")
});
static STUDY_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&| e ").expect("valid regex"));
static STUDY_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Dirigente/Leitor:\s*(.+)").expect("valid regex"));

const PRESIDENT_LABEL: &str = "Presidente:";
const SALA_B_LABEL: &str = "Sala B:";

/// How principal-room names are located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Names printed above each date header
    FooterScan,
    /// Loose names carried from the previous block
    #[default]
    PoolCarryover,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub strategy: ParseStrategy,
    /// Year of the first meeting; later meetings roll over when the month decreases
    pub first_year: i32,
    /// Lines after the header searched first for the president
    pub header_window: usize,
    /// Lines scanned backward from a header by [`ParseStrategy::FooterScan`]
    pub footer_scan_limit: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strategy: ParseStrategy::default(),
            first_year: Utc::now().year(),
            header_window: 20,
            footer_scan_limit: 30,
        }
    }
}

impl ParseOptions {
    pub fn with_strategy(mut self, strategy: ParseStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_first_year(mut self, year: i32) -> Self {
        self.first_year = year;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseOutcome {
    pub meetings: Vec<Meeting>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse with default options, discarding warnings
pub fn parse_schedule(lines: &[Line]) -> Vec<Meeting> {
    ScheduleParser::default().parse(lines).meetings
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleParser {
    options: ParseOptions,
}

struct DateHeader {
    position: usize,
    date: Option<NaiveDate>,
}

/// Parts of one meeting grouped the way names are assigned
struct Program<'a> {
    treasures: Vec<&'a Part>,
    reading: Option<&'a Part>,
    ministry: Vec<&'a Part>,
    christian_life: Vec<&'a Part>,
    study: Option<&'a Part>,
}

impl<'a> Program<'a> {
    fn from_parts(parts: &'a [Part]) -> Self {
        let study = parts.iter().find(|p| p.is_congregation_study());
        let not_study = |p: &&Part| !p.is_congregation_study();
        Self {
            treasures: parts.iter().filter(|p| (1..=2).contains(&p.number)).collect(),
            reading: parts.iter().find(|p| p.number == 3),
            // part 7 lands in both ministry and christian life
            ministry: parts
                .iter()
                .filter(|p| (4..=7).contains(&p.number))
                .filter(not_study)
                .collect(),
            christian_life: parts.iter().filter(|p| p.number >= 7).filter(not_study).collect(),
            study,
        }
    }
}

/// A meeting under construction plus the shared warning sink
struct MeetingDraft<'w> {
    meeting: Meeting,
    warnings: &'w mut Vec<ParseWarning>,
}

impl MeetingDraft<'_> {
    fn push(&mut self, assignment: Assignment) {
        self.meeting.assignments.push(assignment);
    }

    fn warn(&mut self, warning: ParseWarning) {
        tracing::debug!(date = %self.meeting.date, ?warning, "schedule parse warning");
        self.warnings.push(warning);
    }
}

impl ScheduleParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, lines: &[Line]) -> ParseOutcome {
        let headers = self.find_date_headers(lines);
        let Some(first) = headers.first() else {
            tracing::debug!(lines = lines.len(), "no date headers found");
            return ParseOutcome {
                meetings: Vec::new(),
                warnings: vec![ParseWarning::NoDateHeaders],
            };
        };

        let initial_pool = match self.options.strategy {
            ParseStrategy::PoolCarryover => NamePool::from_preamble(&lines[..first.position]),
            ParseStrategy::FooterScan => NamePool::default(),
        };

        let (outcome, _) = headers.iter().enumerate().fold(
            (ParseOutcome::default(), initial_pool),
            |(mut outcome, pool), (i, header)| {
                let end = headers.get(i + 1).map_or(lines.len(), |next| next.position);
                let block = &lines[header.position + 1..end];

                let Some(date) = header.date else {
                    let line = &lines[header.position];
                    tracing::debug!(line = %line.text, "skipping unresolvable date header");
                    outcome.warnings.push(ParseWarning::InvalidHeaderDate {
                        line: line.index,
                        text: line.text.clone(),
                    });
                    return (outcome, pool);
                };

                let mut draft = MeetingDraft {
                    meeting: Meeting::new(date),
                    warnings: &mut outcome.warnings,
                };
                let next_pool = self.parse_block(lines, header.position, block, pool, &mut draft);
                let meeting = draft.meeting;
                outcome.meetings.push(meeting);
                (outcome, next_pool)
            },
        );

        tracing::debug!(
            meetings = outcome.meetings.len(),
            warnings = outcome.warnings.len(),
            strategy = ?self.options.strategy,
            "schedule parsed"
        );
        outcome
    }

    /// Date headers in document order, with years rolled forward on month decrease
    fn find_date_headers(&self, lines: &[Line]) -> Vec<DateHeader> {
        let mut year = self.options.first_year;
        let mut previous_month = 0;

        lines
            .iter()
            .enumerate()
            .filter_map(|(position, line)| {
                let caps = DATE_HEADER_RE.captures(line.as_str())?;
                let day: u32 = caps.get(1)?.as_str().parse().ok()?;
                let month = month_number(caps.get(2)?.as_str())?;
                if month < previous_month {
                    year += 1;
                }
                previous_month = month;
                Some(DateHeader {
                    position,
                    date: NaiveDate::from_ymd_opt(year, month, day),
                })
            })
            .collect()
    }

    /// Fill in one meeting and return the pool for the next one
    fn parse_block(
        &self,
        lines: &[Line],
        header_position: usize,
        block: &[Line],
        pool: NamePool,
        draft: &mut MeetingDraft<'_>,
    ) -> NamePool {
        let date = draft.meeting.date;

        let window = &block[..block.len().min(self.options.header_window)];
        let president = find_president(window).or_else(|| find_president(block));
        match &president {
            Some(name) => draft.push(Assignment::role(name.clone(), Role::President)),
            None => draft.warn(ParseWarning::MissingPresident { date }),
        }

        let parts = identify_parts(block);
        let program = Program::from_parts(&parts);

        let mut principal = match self.options.strategy {
            ParseStrategy::FooterScan => NamePool::new(footer_names(
                lines,
                header_position,
                self.options.footer_scan_limit,
            )),
            ParseStrategy::PoolCarryover => pool,
        };

        for part in program.ministry.iter().chain(&program.treasures) {
            match principal.pop() {
                Some(name) => draft.push(Assignment::part(name, &part.title, Room::Principal)),
                None => draft.warn(ParseWarning::PoolExhausted {
                    date,
                    point: part.title.clone(),
                }),
            }
        }

        for part in &program.christian_life {
            let inline = part
                .inline_fragment()
                .filter(|name| name.chars().count() > 2)
                .map(str::to_string);
            match inline.or_else(|| principal.pop()) {
                Some(name) => draft.push(Assignment::part(name, &part.title, Room::Principal)),
                None => draft.warn(ParseWarning::PoolExhausted {
                    date,
                    point: part.title.clone(),
                }),
            }
        }

        if let Some(candidate) = principal.peek() {
            if !candidate.contains('&') && Some(candidate) != president.as_deref() {
                if let Some(name) = principal.pop() {
                    draft.push(Assignment::role(name, Role::ClosingPrayer));
                }
            }
        }

        let (sala_b, next_pool) = match self.options.strategy {
            ParseStrategy::FooterScan => (sala_b_after_christian_life(block), NamePool::default()),
            ParseStrategy::PoolCarryover => {
                let Drained {
                    consumed,
                    remaining,
                } = NamePool::new(loose_names(block)).drain(program.ministry.len());
                (consumed, remaining)
            }
        };

        if sala_b.len() < program.ministry.len() {
            draft.warn(ParseWarning::SalaBShortfall {
                date,
                expected: program.ministry.len(),
                found: sala_b.len(),
            });
        }
        for (part, name) in program.ministry.iter().zip(sala_b) {
            draft.push(Assignment::part(name, &part.title, Room::SalaB));
        }

        if let Some(reading) = program.reading {
            let (sala_b_reader, principal_reader) = reading_names(block, reading);
            if sala_b_reader.is_none() && principal_reader.is_none() {
                draft.warn(ParseWarning::ReadingNamesUnresolved { date });
            }
            if let Some(name) = sala_b_reader {
                draft.push(Assignment::part(name, READING_POINT, Room::SalaB));
            }
            if let Some(name) = principal_reader {
                draft.push(Assignment::part(name, READING_POINT, Room::Principal));
            }
        }

        if let Some(study) = program.study {
            let (conductor, reader) = study_names(block, study);
            if let Some(name) = conductor {
                draft.push(Assignment::role(name, Role::Conductor));
            }
            if let Some(name) = reader {
                draft.push(Assignment::role(name, Role::Reader));
            }
        }

        next_pool
    }
}

/// President named after the `Presidente:` label, or on the following line
fn find_president(lines: &[Line]) -> Option<String> {
    let position = lines
        .iter()
        .position(|l| l.as_str().contains(PRESIDENT_LABEL))?;
    let line = lines[position].as_str();
    let label_end = line.find(PRESIDENT_LABEL)? + PRESIDENT_LABEL.len();
    let name = collapse_repeated(&line[label_end..]);

    if !name.is_empty() {
        return Some(name);
    }
    lines
        .get(position + 1)
        .map(Line::as_str)
        .filter(|next| is_name_shaped(next))
        .map(collapse_repeated)
}

/// Numbered parts of a block, sectioned by the headers that precede them
fn identify_parts(block: &[Line]) -> Vec<Part> {
    let mut section: Option<Section> = None;
    block
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            if let Some(header) = Section::from_header(line.as_str()) {
                section = Some(header);
            }
            Part::from_line(line, index, section)
        })
        .collect()
}

/// Names printed above a date header, in document order
fn footer_names(lines: &[Line], header_position: usize, limit: usize) -> Vec<String> {
    let start = header_position.saturating_sub(limit);
    let mut names: Vec<String> = lines[start..header_position]
        .iter()
        .rev()
        .map(|line| (line.as_str(), footer_disposition(line.as_str())))
        .take_while(|(_, disposition)| *disposition != FooterLine::Stop)
        .filter(|(_, disposition)| *disposition == FooterLine::Accept)
        .map(|(line, _)| line.to_string())
        .collect();
    names.reverse();
    names
}

/// Loose lines between the christian-life header and its first part
fn sala_b_after_christian_life(block: &[Line]) -> Vec<String> {
    let Some(header) = block
        .iter()
        .position(|l| l.as_str().contains("NOSSA VIDA CRISTÃ"))
    else {
        return Vec::new();
    };

    block[header + 1..]
        .iter()
        .map(Line::as_str)
        .take_while(|l| !is_part_line(l) && !l.contains("Oração:"))
        .filter(|l| l.chars().count() > 2 && !l.contains("NOSSA VIDA"))
        .map(str::to_string)
        .collect()
}

/// Sala B and principal readers for the Bible reading
fn reading_names(block: &[Line], part: &Part) -> (Option<String>, Option<String>) {
    let window_end = (part.index + 5).min(block.len());
    let sala_b_line = block[part.index..window_end]
        .iter()
        .map(Line::as_str)
        .find(|l| l.contains(SALA_B_LABEL));
    let inline = part
        .inline_fragment()
        .and_then(|text| text.split(SALA_B_LABEL).next())
        .unwrap_or_default()
        .trim();

    let (sala_b, principal) = match sala_b_line {
        Some(line) => {
            let after_label = line
                .find(SALA_B_LABEL)
                .map_or("", |i| &line[i + SALA_B_LABEL.len()..]);
            let principal = if inline.chars().count() > 2 {
                split_camel_case(inline).pop()
            } else {
                None
            };
            (Some(after_label.to_string()), principal)
        }
        None => {
            let mut names = split_camel_case(inline);
            if names.is_empty() {
                names = block
                    .iter()
                    .skip(part.index + 1)
                    .take(3)
                    .map(Line::as_str)
                    .filter(|l| is_name_shaped(l))
                    .map(str::to_string)
                    .collect();
            }
            let mut names = names.into_iter();
            (names.next(), names.next())
        }
    };

    let clean = |name: Option<String>| {
        name.map(|n| strip_main_hall(&n))
            .filter(|n| !n.is_empty())
    };
    (clean(sala_b), clean(principal))
}

/// Conductor and reader for the congregation Bible study
fn study_names(block: &[Line], part: &Part) -> (Option<String>, Option<String>) {
    let label = |text: &str| {
        STUDY_LABEL_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    let text = match part.inline_fragment().filter(|t| !t.is_empty()) {
        Some(inline) => label(inline).unwrap_or_else(|| inline.to_string()),
        None => {
            let following: Vec<&str> = block
                .iter()
                .skip(part.index + 1)
                .take(3)
                .map(Line::as_str)
                .take_while(|l| !is_part_line(l))
                .collect();
            match label(&following.join(" ")) {
                Some(text) => text,
                None => return (None, None),
            }
        }
    };

    let names: Vec<String> = STUDY_SPLIT_RE.split(&text).map(clean_study_name).collect();
    let pick = |i: usize| names.get(i).filter(|n| n.chars().count() > 2).cloned();
    (pick(0), pick(1))
}
