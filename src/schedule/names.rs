//! Name predicates and name cleanup
//!
//! Deciding whether a loose line is a person's name is done by an ordered
//! list of exclusion predicates. A line is name-shaped only when none of
//! them rejects it.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::is_part_line;

/// Returns `true` when the line must not be treated as a name
pub type NamePredicate = fn(&str) -> bool;

const SECTION_HEADERS: [&str; 3] = ["TESOUROS", "FAÇA SEU", "NOSSA VIDA"];
const PROGRAM_MARKERS: [&str; 4] = ["Cântico", "Oração", "Comentários", "Presidente"];
const ROOM_MARKERS: [&str; 2] = ["Sala B:", "Salão principal"];
const FOOTER_BOILERPLATE: [&str; 3] = ["Vida e Ministério", "Impresso", "Noroeste"];
const STUDY_LABEL: &str = "Dirigente/Leitor";

/// Exclusion predicates, applied in order
pub const NAME_EXCLUSIONS: &[(&str, NamePredicate)] = &[
    ("too_short", too_short),
    ("numbered_part", is_part_line),
    ("section_header", has_section_header),
    ("program_marker", starts_with_program_marker),
    ("room_marker", has_room_marker),
    ("footer_boilerplate", has_footer_boilerplate),
    ("study_label", has_study_label),
];

static STUDY_NAME_CUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Comentários|Cântico|Oração|\d{1,2}\s+[A-Za-zç]+\s+\|").expect("valid regex")
});
static SALAO_PRINCIPAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Salão principal").expect("valid regex"));

fn too_short(line: &str) -> bool {
    line.chars().count() <= 2
}

fn has_section_header(line: &str) -> bool {
    SECTION_HEADERS.iter().any(|h| line.contains(h))
}

fn starts_with_program_marker(line: &str) -> bool {
    PROGRAM_MARKERS.iter().any(|m| line.starts_with(m))
}

fn has_room_marker(line: &str) -> bool {
    ROOM_MARKERS.iter().any(|m| line.contains(m))
}

fn has_footer_boilerplate(line: &str) -> bool {
    FOOTER_BOILERPLATE.iter().any(|m| line.contains(m))
}

fn has_study_label(line: &str) -> bool {
    line.contains(STUDY_LABEL)
}

/// Name of the first predicate rejecting the line, if any
pub fn rejection(line: &str) -> Option<&'static str> {
    let line = line.trim();
    NAME_EXCLUSIONS
        .iter()
        .find(|(_, rejects)| rejects(line))
        .map(|(name, _)| *name)
}

pub fn is_name_shaped(line: &str) -> bool {
    rejection(line).is_none()
}

/// How the backward footer scan treats a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterLine {
    Stop,
    Skip,
    Accept,
}

/// Classify a line seen while scanning backward from a date header.
///
/// Stop wins over skip, skip over accept.
pub fn footer_disposition(line: &str) -> FooterLine {
    const STOP: [&str; 5] = ["TESOUROS", "FAÇA SEU", "NOSSA VIDA", "Vida e Ministério", "Impresso"];
    const SKIP: [&str; 4] = ["Sala B:", "Salão principal", "Comentários", "Oração:"];

    if is_part_line(line) || STOP.iter().any(|m| line.contains(m)) {
        FooterLine::Stop
    } else if line.starts_with("Cântico") || SKIP.iter().any(|m| line.contains(m)) {
        FooterLine::Skip
    } else if line.chars().count() > 2 {
        FooterLine::Accept
    } else {
        FooterLine::Skip
    }
}

fn is_split_tail(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || ('à'..='ú').contains(&c)
}

fn is_split_head(c: char) -> bool {
    c.is_ascii_uppercase() || ('À'..='Ú').contains(&c)
}

/// Split names glued together by the PDF extractor.
///
/// A boundary is a lowercase letter, digit or dot directly followed by an
/// uppercase letter: `"Ana SouzaRui Lima"` becomes `["Ana Souza", "Rui Lima"]`.
pub fn split_camel_case(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if prev.is_some_and(is_split_tail) && is_split_head(c) {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    pieces.push(current);

    pieces
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Collapse a name the extractor duplicated (`"Ana SouzaAna Souza"`).
pub fn collapse_repeated(text: &str) -> String {
    let pieces = split_camel_case(text);
    match pieces.as_slice() {
        [first, second, ..] if first == second => first.clone(),
        _ => text.trim().to_string(),
    }
}

/// Cut a study name at trailing program text or the next date header
pub fn clean_study_name(text: &str) -> String {
    STUDY_NAME_CUT_RE
        .split(text)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Remove the `Salão principal` room label from a name
pub fn strip_main_hall(text: &str) -> String {
    SALAO_PRINCIPAL_RE
        .replace_all(text, "")
        .trim_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_shaped() {
        assert!(is_name_shaped("Ana Souza"));
        assert!(is_name_shaped("  Rui Lima  "));
        assert!(!is_name_shaped("Al"));
        assert!(!is_name_shaped("4. Iniciando conversas"));
        assert!(!is_name_shaped("TESOUROS DA PALAVRA DE DEUS"));
        assert!(!is_name_shaped("Cântico 12 e oração"));
        assert!(!is_name_shaped("Presidente: Ana"));
        assert!(!is_name_shaped("Sala B: Rui"));
        assert!(!is_name_shaped("Congregação Noroeste"));
        assert!(!is_name_shaped("Dirigente/Leitor: Ana & Rui"));
    }

    #[test]
    fn test_rejection_order() {
        assert_eq!(rejection("Oi"), Some("too_short"));
        assert_eq!(rejection("3. TESOUROS"), Some("numbered_part"));
        assert_eq!(rejection("Impresso no Brasil"), Some("footer_boilerplate"));
        assert_eq!(rejection("Ana Souza"), None);
    }

    #[test]
    fn test_footer_disposition() {
        assert_eq!(footer_disposition("6. Discurso"), FooterLine::Stop);
        assert_eq!(footer_disposition("Impresso no Brasil"), FooterLine::Stop);
        assert_eq!(footer_disposition("Cântico 8 e oração"), FooterLine::Skip);
        assert_eq!(footer_disposition("Oração: Rui"), FooterLine::Skip);
        assert_eq!(footer_disposition("Ana Souza"), FooterLine::Accept);
    }

    #[test]
    fn test_split_camel_case() {
        assert_eq!(split_camel_case("Ana SouzaRui Lima"), vec!["Ana Souza", "Rui Lima"]);
        assert_eq!(split_camel_case("João SilvaÉrico Dias"), vec!["João Silva", "Érico Dias"]);
        assert_eq!(split_camel_case("Ana"), vec!["Ana"]);
        assert!(split_camel_case("").is_empty());
    }

    #[test]
    fn test_collapse_repeated() {
        assert_eq!(collapse_repeated("João SilvaJoão Silva"), "João Silva");
        assert_eq!(collapse_repeated("João SilvaRui Lima"), "João SilvaRui Lima");
        assert_eq!(collapse_repeated(" Ana "), "Ana");
    }

    #[test]
    fn test_clean_study_name() {
        assert_eq!(clean_study_name("João SantosCântico 15"), "João Santos");
        assert_eq!(clean_study_name(" Rui Lima 10 Agosto | Salmo"), "Rui Lima");
        assert_eq!(clean_study_name("Ana"), "Ana");
    }

    #[test]
    fn test_strip_main_hall() {
        assert_eq!(strip_main_hall("Salão principal: Ana"), "Ana");
        assert_eq!(strip_main_hall("Rui Lima salão principal"), "Rui Lima");
    }
}
