//! Week program records as stored per issue

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::PeriodRange;
use crate::schedule::{PartType, Section};

/// Room a program part is held in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramRoom {
    #[serde(rename = "Principal")]
    Principal,
    #[serde(rename = "Sala B")]
    SalaB,
    #[serde(rename = "Ambas")]
    Both,
}

/// Opening, middle and closing song numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Songs {
    #[serde(rename = "inicial")]
    pub opening: Option<u32>,
    #[serde(rename = "meio")]
    pub middle: Option<u32>,
    #[serde(rename = "final")]
    pub closing: Option<u32>,
}

impl Songs {
    /// First three numbers in order
    pub fn from_numbers(numbers: &[u32]) -> Self {
        Self {
            opening: numbers.first().copied(),
            middle: numbers.get(1).copied(),
            closing: numbers.get(2).copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramPart {
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "duracao")]
    pub duration: u32,
    #[serde(rename = "secao")]
    pub section: Section,
    #[serde(rename = "tipo")]
    pub part_type: PartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(rename = "cenario", default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "sala", default, skip_serializing_if = "Option::is_none")]
    pub room: Option<ProgramRoom>,
}

impl ProgramPart {
    pub fn new(number: u32, title: impl Into<String>, duration: u32, section: Section) -> Self {
        let title = title.into();
        Self {
            number,
            part_type: PartType::classify(section, &title),
            title,
            duration,
            section,
            material: None,
            scenario: None,
            description: None,
            room: (section == Section::Ministry).then_some(ProgramRoom::Both),
        }
    }
}

/// Program of one meeting week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekProgram {
    #[serde(rename = "periodo")]
    pub period: String,
    #[serde(flatten)]
    pub range: PeriodRange,
    #[serde(rename = "leituraBiblica")]
    pub bible_reading: String,
    #[serde(rename = "canticos")]
    pub songs: Songs,
    #[serde(rename = "partes")]
    pub parts: Vec<ProgramPart>,
}

impl WeekProgram {
    /// Key the week is stored under
    pub fn week_date(&self) -> NaiveDate {
        self.range.start
    }

    /// Period could not be resolved and the dates are the January 1st placeholder
    pub fn has_placeholder_dates(&self) -> bool {
        self.range.is_placeholder()
    }
}

/// Merge weekly-page weeks with weeks parsed from the edition text.
///
/// `primary` weeks always win; an extra week is added only when no week
/// with the same start date exists. The result is sorted by start date.
pub fn merge_weeks(primary: Vec<WeekProgram>, extra: Vec<WeekProgram>) -> Vec<WeekProgram> {
    let mut merged = primary;
    for week in extra {
        if !merged.iter().any(|w| w.week_date() == week.week_date()) {
            merged.push(week);
        }
    }
    merged.sort_by_key(WeekProgram::week_date);
    merged
}
