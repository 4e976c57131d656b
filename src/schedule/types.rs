//! Schedule data model

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::Line;

static PART_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s+([^(]+)").expect("valid regex"));
static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d+)\s*min\.?\)").expect("valid regex"));

/// Workbook section a part belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "tesouros", alias = "treasures")]
    Treasures,
    #[serde(rename = "ministerio", alias = "ministry")]
    Ministry,
    #[serde(rename = "vida_crista", alias = "christian_life")]
    ChristianLife,
}

impl Section {
    /// Section implied by the part number alone
    pub fn from_number(number: u32) -> Self {
        match number {
            0..=3 => Section::Treasures,
            4..=6 => Section::Ministry,
            _ => Section::ChristianLife,
        }
    }

    /// Section whose header starts on this line, if any
    pub fn from_header(line: &str) -> Option<Self> {
        let upper = line.to_uppercase();
        if upper.contains("TESOUROS DA PALAVRA") || upper.contains("TREASURES FROM") {
            Some(Section::Treasures)
        } else if upper.contains("FAÇA SEU MELHOR") || upper.contains("APPLY YOURSELF") {
            Some(Section::Ministry)
        } else if upper.contains("NOSSA VIDA CRISTÃ") || upper.contains("LIVING AS CHRISTIANS") {
            Some(Section::ChristianLife)
        } else {
            None
        }
    }
}

/// Kind of program part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartType {
    #[serde(rename = "discurso", alias = "talk")]
    Talk,
    #[serde(rename = "leitura", alias = "reading")]
    Reading,
    #[serde(rename = "demonstracao", alias = "demonstration")]
    Demonstration,
    #[serde(rename = "perguntas_respostas", alias = "qna")]
    Qna,
    #[serde(rename = "estudo_congregacao", alias = "congregation_study")]
    CongregationStudy,
    #[serde(rename = "consideracao_anciao", alias = "elder_consideration")]
    ElderConsideration,
}

impl PartType {
    /// Classify a part from its section and title
    pub fn classify(section: Section, title: &str) -> Self {
        let lower = title.to_lowercase();
        match section {
            Section::Treasures => {
                if lower.contains("leitura") || lower.contains("bible reading") {
                    PartType::Reading
                } else if lower.contains("joias") || lower.contains("jóias") || lower.contains("gems") {
                    PartType::Qna
                } else {
                    PartType::Talk
                }
            }
            Section::Ministry => {
                if lower.starts_with("discurso") || lower.starts_with("talk") {
                    PartType::Talk
                } else {
                    PartType::Demonstration
                }
            }
            Section::ChristianLife => {
                if is_congregation_study_title(title) {
                    PartType::CongregationStudy
                } else if lower.contains("necessidades") || lower.contains("local needs") {
                    PartType::ElderConsideration
                } else {
                    PartType::Talk
                }
            }
        }
    }
}

/// Whether a title names the congregation Bible study
pub fn is_congregation_study_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    (lower.contains("estudo") && lower.contains("congrega"))
        || lower.contains("congregation bible study")
}

/// A numbered program item found in a meeting block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub number: u32,
    pub title: String,
    pub duration_minutes: Option<u32>,
    pub section: Section,
    pub part_type: PartType,
    pub line: Line,
    /// Position of the part line inside its meeting block
    pub index: usize,
}

impl Part {
    /// Recognize a `N. Title (M min)` line.
    ///
    /// `section` overrides the number-based section when a header was seen.
    pub fn from_line(line: &Line, index: usize, section: Option<Section>) -> Option<Self> {
        let caps = PART_RE.captures(line.as_str())?;
        let number: u32 = caps.get(1)?.as_str().parse().ok()?;
        let title = caps.get(2)?.as_str().trim();
        let title = title.strip_suffix(':').unwrap_or(title).trim_end().to_string();
        let section = section.unwrap_or_else(|| Section::from_number(number));

        Some(Self {
            number,
            part_type: PartType::classify(section, &title),
            duration_minutes: DURATION_RE
                .captures(line.as_str())
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok()),
            title,
            section,
            line: line.clone(),
            index,
        })
    }

    pub fn is_congregation_study(&self) -> bool {
        is_congregation_study_title(&self.title)
    }

    /// Text after the first `(N min)` marker on the part line
    pub fn inline_fragment(&self) -> Option<&str> {
        after_duration(self.line.as_str())
    }
}

/// Text after the first `(N min)` marker, trimmed
pub fn after_duration(text: &str) -> Option<&str> {
    let m = DURATION_RE.find(text)?;
    Some(text[m.end()..].trim())
}

/// Whether a line starts a numbered part
pub fn is_part_line(text: &str) -> bool {
    PART_RE.is_match(text)
}

/// Room an assignment takes place in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Room {
    #[serde(rename = "Principal")]
    Principal,
    #[serde(rename = "Sala B")]
    SalaB,
}

/// Named role for assignments that are not numbered parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Presidente")]
    President,
    #[serde(rename = "Oração Final")]
    ClosingPrayer,
    #[serde(rename = "Condutor")]
    Conductor,
    #[serde(rename = "Leitor")]
    Reader,
}

impl Role {
    /// Point label stored with the assignment
    pub fn point(&self) -> &'static str {
        match self {
            Role::President => "Presidente",
            Role::ClosingPrayer => "Oração Final",
            Role::Conductor => "Estudo Bíblico de Congregação",
            Role::Reader => "Leitor",
        }
    }
}

/// Point label for the Bible reading
pub const READING_POINT: &str = "Leitura da Bíblia";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub student_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub point: String,
    pub room: Room,
}

impl Assignment {
    pub fn part(name: impl Into<String>, point: impl Into<String>, room: Room) -> Self {
        Self {
            student_name: name.into(),
            role: None,
            point: point.into(),
            room,
        }
    }

    pub fn role(name: impl Into<String>, role: Role) -> Self {
        Self {
            student_name: name.into(),
            role: Some(role),
            point: role.point().to_string(),
            room: Room::Principal,
        }
    }
}

/// One dated midweek meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub date: NaiveDate,
    pub assignments: Vec<Assignment>,
}

impl Meeting {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            assignments: Vec::new(),
        }
    }

    /// Assignments of a given room, in emission order
    pub fn in_room(&self, room: Room) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(move |a| a.room == room)
    }

    pub fn with_role(&self, role: Role) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.role == Some(role))
    }
}

/// A silent degradation noticed while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    NoDateHeaders,
    InvalidHeaderDate { line: usize, text: String },
    MissingPresident { date: NaiveDate },
    PoolExhausted { date: NaiveDate, point: String },
    ReadingNamesUnresolved { date: NaiveDate },
    SalaBShortfall { date: NaiveDate, expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_from_line() {
        let line = Line::new(4, "5. Iniciando conversas: (3 min) DE CASA EM CASA");
        let part = Part::from_line(&line, 2, None).unwrap();
        assert_eq!(part.number, 5);
        assert_eq!(part.title, "Iniciando conversas");
        assert_eq!(part.duration_minutes, Some(3));
        assert_eq!(part.section, Section::Ministry);
        assert_eq!(part.part_type, PartType::Demonstration);
        assert_eq!(part.inline_fragment(), Some("DE CASA EM CASA"));
        assert_eq!(part.index, 2);
    }

    #[test]
    fn test_part_rejects_unnumbered() {
        assert!(Part::from_line(&Line::new(0, "Cântico 12"), 0, None).is_none());
        assert!(Part::from_line(&Line::new(0, "12.Sem espaço"), 0, None).is_none());
    }

    #[test]
    fn test_study_detection() {
        let line = Line::new(0, "9. Estudo Bíblico de Congregação (30 min.) Ana & Rui");
        let part = Part::from_line(&line, 0, None).unwrap();
        assert!(part.is_congregation_study());
        assert_eq!(part.part_type, PartType::CongregationStudy);
        assert_eq!(part.inline_fragment(), Some("Ana & Rui"));
    }

    #[test]
    fn test_header_overrides_number_section() {
        let line = Line::new(0, "7. Necessidades locais (15 min)");
        let part = Part::from_line(&line, 0, Some(Section::ChristianLife)).unwrap();
        assert_eq!(part.section, Section::ChristianLife);
        assert_eq!(part.part_type, PartType::ElderConsideration);
    }

    #[test]
    fn test_assignment_serialization() {
        let json = serde_json::to_value(Assignment::role("Ana Souza", Role::ClosingPrayer)).unwrap();
        assert_eq!(json["studentName"], "Ana Souza");
        assert_eq!(json["role"], "Oração Final");
        assert_eq!(json["room"], "Principal");

        let json = serde_json::to_value(Assignment::part("Rui", "Leitura da Bíblia", Room::SalaB)).unwrap();
        assert!(json.get("role").is_none());
        assert_eq!(json["room"], "Sala B");
    }
}
