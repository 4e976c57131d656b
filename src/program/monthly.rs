//! Week programs from the plain text of a whole edition page
//!
//! Used for weeks that have no weekly page of their own (typically the
//! week crossing into the next edition) and as a fallback when a weekly
//! page yields nothing usable.

use std::cmp::Reverse;

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{ProgramPart, Songs, WeekProgram};
use crate::period::{format_period, resolve_period};
use crate::schedule::Section;

/// Characters of context inspected on each side of a part for section headings
const SECTION_CONTEXT: usize = 200;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static MINUTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\((\d{1,2})\s*min\.?\)").expect("valid regex"));

static PERIOD_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        r"(?i)\d{1,2}\s*(?:[–—-]|\s+a\s+)\s*\d{1,2}\s*de\s*[A-Za-zÀ-ÿ]+",
        r"(?i)\d{1,2}(?:\s*(?:\.º|º|°))?\s*de\s*[A-Za-zÀ-ÿ.]+\s*(?:[–—-]|\s+a\s+)\s*\d{1,2}(?:\s*(?:\.º|º|°))?\s*de\s*[A-Za-zÀ-ÿ.]+(?:\s*de\s*(?:20)?\d{2})?",
        r"(?i)[A-Za-z]+\s+\d{1,2}\s*[–—-]\s*\d{1,2},?\s*\d{4}",
    ]
    .map(|p| Regex::new(p).expect("valid regex"))
});

static LABELED_READING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:Leitura\s+da\s+B[ií]blia|Bible\s+Reading)\s*:?\s*([A-ZÁÀÂÃÉÈÊÍÌÓÒÔÕÚÙÇ]{3,}[^\n]+?\d+(?:[-–—]\d+)?)",
    )
    .expect("valid regex")
});
static BARE_READING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-ZÁÀÂÃÉÈÊÍÌÓÒÔÕÚÙÇ]{3,}(?:\s+\d+)?\s+\d+(?:[-–—]\d+)?)").expect("valid regex")
});
static SONG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:C[âa]ntico[s]?|Song)\s*:?\s*(\d{1,3})").expect("valid regex")
});
static PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d+\.?\s*)?([^()]{3,}?)\s*(?:\((\d{1,2})\s*(?:min\.?|minutos?)\)|[-–—]?\s*(\d{1,2})\s*(?:min\.?|minutos?))",
    )
    .expect("valid regex")
});
static LEADING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s*").expect("valid regex"));

static TREASURES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TESOUROS|TREASURES").expect("valid regex"));
static MINISTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)MINIST[ÉE]RIO|APPLY\s+YOURSELF").expect("valid regex"));
static CHRISTIAN_LIFE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)VIDA\s+CRIST[ÃA]|OUR\s+CHRISTIAN\s+LIFE").expect("valid regex")
});

/// A period phrase found in the text, as a byte span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PeriodMatch {
    start: usize,
    end: usize,
}

/// Split edition text into weeks, one per period phrase found.
///
/// Each week spans from its period phrase to the next one. `year` is used
/// for phrases that do not carry their own year.
pub fn parse_month_text(text: &str, year: i32) -> Vec<WeekProgram> {
    let normalized = normalize(text);
    let periods = find_periods(&normalized);

    periods
        .iter()
        .enumerate()
        .map(|(i, period)| {
            let window_end = periods.get(i + 1).map_or(normalized.len(), |next| next.start);
            let phrase = &normalized[period.start..period.end];
            let window = &normalized[period.start..window_end];
            let body = &normalized[period.end..window_end];
            let range = resolve_period(phrase, year);

            WeekProgram {
                period: format_period(&range),
                range,
                bible_reading: window_reading(window),
                songs: Songs::from_numbers(&window_songs(window)),
                parts: window_parts(body, window),
            }
        })
        .collect()
}

fn normalize(text: &str) -> String {
    let text = text.replace('\u{a0}', " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    MINUTES_RE.replace_all(&text, " ($1 min)").into_owned()
}

/// Period phrases ordered by position; overlapping matches keep the earlier, longer one
fn find_periods(text: &str) -> Vec<PeriodMatch> {
    let mut found: Vec<PeriodMatch> = PERIOD_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| PeriodMatch {
            start: m.start(),
            end: m.end(),
        })
        .collect();
    found.sort_by_key(|m| (m.start, Reverse(m.end)));

    let mut kept: Vec<PeriodMatch> = Vec::with_capacity(found.len());
    for m in found {
        if kept.last().map_or(true, |last| m.start >= last.end) {
            kept.push(m);
        }
    }
    kept
}

fn window_reading(window: &str) -> String {
    LABELED_READING_RE
        .captures(window)
        .or_else(|| BARE_READING_RE.captures(window))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn window_songs(window: &str) -> Vec<u32> {
    SONG_RE
        .captures_iter(window)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .take(3)
        .collect()
}

/// Section a window starts in, from the headings it mentions
fn initial_section(window: &str) -> Section {
    let treasures = TREASURES_RE.is_match(window);
    let ministry = MINISTRY_RE.is_match(window);
    let christian_life = CHRISTIAN_LIFE_RE.is_match(window);
    if ministry && !treasures {
        Section::Ministry
    } else if christian_life && !treasures && !ministry {
        Section::ChristianLife
    } else {
        Section::Treasures
    }
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Text within `SECTION_CONTEXT` bytes of `at`, clipped to char boundaries
fn context_around(text: &str, at: usize) -> &str {
    let start = floor_boundary(text, at.saturating_sub(SECTION_CONTEXT));
    let end = floor_boundary(text, at + SECTION_CONTEXT);
    &text[start..end]
}

fn window_parts(body: &str, window: &str) -> Vec<ProgramPart> {
    let mut section = initial_section(window);
    let mut parts = Vec::new();

    for caps in PART_RE.captures_iter(body) {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let Some(duration) = caps
            .get(3)
            .or_else(|| caps.get(4))
            .and_then(|m| m.as_str().parse().ok())
        else {
            continue;
        };
        let title = WHITESPACE_RE.replace_all(title.as_str(), " ");
        let title = LEADING_NUMBER_RE.replace(title.trim(), "").into_owned();

        let around = context_around(body, whole.start());
        if MINISTRY_RE.is_match(around) {
            section = Section::Ministry;
        } else if CHRISTIAN_LIFE_RE.is_match(around) {
            section = Section::ChristianLife;
        }

        parts.push(ProgramPart::new(parts.len() as u32 + 1, title, duration, section));
    }
    parts
}
