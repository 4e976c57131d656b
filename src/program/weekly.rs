//! Weekly program page parsing
//!
//! A weekly page carries one meeting week: the period in its title, the
//! Bible reading in paragraph `p2`, and the parts split across the three
//! workbook sections.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{ProgramPart, Songs, WeekProgram};
use crate::period::{format_period, resolve_period, PeriodRange};
use crate::schedule::Section;
use crate::text::{collapse_whitespace, element_text, html_title_text, strip_html, TextError};

const UNKNOWN_PERIOD: &str = "Semana a definir (Importado)";

const BOOKS: &str = r"(?:G[EÊ]NESIS|ÊXODO|LEV[IÍ]TICO|N[ÚU]MEROS|DEUTERON[ÔO]MIO|JOSU[ÉE]|JU[IÍ]ZES|RUTE|1\s*SAMUEL|2\s*SAMUEL|1\s*REIS|2\s*REIS|1\s*CR[ÔO]NICAS|2\s*CR[ÔO]NICAS|ESDRAS|NEEMIAS|ESTER|J[ÓO]|SALMOS|PROV[ÉE]RBIOS|ECLESIASTES|C[ÂA]NTICO\s+DOS\s+C[ÂA]NTICOS|ISA[IÍ]AS|JEREMIAS|LAMENTA[ÇC][ÕO]ES|EZEQUIEL|DANIEL|OSEIAS|JOEL|AM[ÓO]S|OBADIAS|JONAS|MIQUEIAS|NAUM|HABACUQUE|SOFONIAS|AGEU|ZACARIAS|MALAQUIAS|MATEUS|MARCOS|LUCAS|JO[ÃA]O|ATOS|ROMANOS|1\s*COR[ÍI]NTIOS|2\s*COR[ÍI]NTIOS|G[ÁA]LATAS|EF[ÉE]SIOS|FILIPENSES|COLOSSENSES|1\s*TESSALONICENSES|2\s*TESSALONICENSES|1\s*TIM[ÓO]TEO|2\s*TIM[ÓO]TEO|TITO|FILEMON|HEBREUS|TIAGO|1\s*PEDRO|2\s*PEDRO|1\s*JO[ÃA]O|2\s*JO[ÃA]O|3\s*JO[ÃA]O|JUDAS|APOCALIPSE)";

/// Known Memorial weeks, used when the page itself prints no period: (year, start, end)
const MEMORIAL_WEEKS: [(i32, (u32, u32), (u32, u32)); 1] = [(2026, (3, 30), (4, 5))];
const MEMORIAL_READING: &str = "Leitura da Bíblia para a Celebração";

static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{1,2}[.º°]*(?:\s*(?:[–—-]|\s+a\s+)\s*\d{1,2}[.º°]*)?\s+de\s+[A-Za-zÀ-ÿ]+(?:\s+de\s+\d{4})?(?:\s*(?:[–—-]|\s+a\s+)\s*\d{1,2}[.º°]*\s+de\s+[A-Za-zÀ-ÿ]+)?(?:\s+de\s+\d{4})?)",
    )
    .expect("valid regex")
});
static ENGLISH_PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b((?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}\s*[–—-]\s*\d{1,2}(?:,?\s*\d{4})?)",
    )
    .expect("valid regex")
});
static BODY_PERIOD_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Programa[çc][ãa]o").expect("valid regex"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").expect("valid regex"));
static PAGE_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(20\d{2})").expect("valid regex"));
static MEMORIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Celebra(?:ção|tion)\s+(?:de|of)\s+(\d{4})").expect("valid regex")
});
static SONG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:C[âa]ntico|Song)\s+(\d{1,3})").expect("valid regex"));
static READING_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Leitura\s+da\s+B[ií]blia[^:：]*[:：]\s*(.+)$").expect("valid regex")
});
static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{BOOKS}\b\s+\d+(?:\s*:\s*\d+)?(?:\s*[-–—]\s*\d+(?::\d+)?)?(?:,\s*\d+)?"
    ))
    .expect("valid regex")
});
static BOOK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b{BOOKS}\b")).expect("valid regex"));
static PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+\.)\s+(.+?)\s+\(?(\d{1,2})\s*min\)?").expect("valid regex")
});
static SCENARIO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(DE CASA EM CASA|TESTEMUNHO INFORMAL|TESTEMUNHO PÚBLICO|CONVERSA INFORMAL|HOUSE\s+TO\s+HOUSE|INFORMAL\s+WITNESSING|PUBLIC\s+WITNESSING)\b",
    )
    .expect("valid regex")
});
static MATERIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(([^)]*?\b(?:lmd|th|ap[êe]ndice|cap\.?|lfb)[^)]*?)\)").expect("valid regex")
});

/// Section headings in the order they are searched; bare fallbacks are uppercase-only
static SECTION_PATTERNS: Lazy<[(Section, Vec<Regex>); 3]> = Lazy::new(|| {
    let compile = |patterns: &[&str]| {
        patterns
            .iter()
            .map(|p| Regex::new(p).expect("valid regex"))
            .collect::<Vec<_>>()
    };
    [
        (
            Section::Treasures,
            compile(&[r"(?i)TESOUROS\s+DA\s+PALAVRA", r"(?i)TREASURES\s+FROM"]),
        ),
        (
            Section::Ministry,
            compile(&[
                r"(?i)FA[ÇC]A\s+SEU\s+MELHOR\s+NO\s+MINIST[ÉE]RIO",
                r"(?i)APPLY\s+YOURSELF",
                r"MINIST[ÉE]RIO",
            ]),
        ),
        (
            Section::ChristianLife,
            compile(&[
                r"(?i)NOSSA\s+VIDA\s+CRIST[ÃA]",
                r"(?i)(?:OUR\s+CHRISTIAN\s+LIFE|LIVING\s+AS\s+CHRISTIANS)",
                r"VIDA\s+CRIST[ÃA]",
            ]),
        ),
    ]
});

/// Parse a weekly program page.
///
/// `fallback_year` is used only when neither the period nor the page
/// mention a year.
pub fn parse_weekly_html(html: &str, fallback_year: i32) -> Result<WeekProgram, TextError> {
    let title = html_title_text(html);
    let text = strip_html(html)?;
    if let Some(week) = memorial_week(&title, &text) {
        return Ok(week);
    }

    let period = find_period(&title, &text);
    let year = period
        .as_deref()
        .and_then(|p| YEAR_RE.captures(p))
        .or_else(|| PAGE_YEAR_RE.captures(html))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(fallback_year);

    let range = resolve_period(period.as_deref().unwrap_or(UNKNOWN_PERIOD), year);
    let period = if range.is_fallback(year) {
        tracing::debug!(title = %title, "weekly page has no recognizable period");
        period.unwrap_or_else(|| UNKNOWN_PERIOD.to_string())
    } else {
        format_period(&range)
    };

    Ok(WeekProgram {
        period,
        range,
        bible_reading: bible_reading(html)?,
        songs: Songs::from_numbers(&unique_songs(&text)),
        parts: section_parts(&text),
    })
}

/// Memorial week announced in the title.
///
/// The week printed on the page wins; the known-weeks table covers pages
/// that print none. `None` lets the page be parsed as a normal week.
fn memorial_week(title: &str, text: &str) -> Option<WeekProgram> {
    let year: i32 = MEMORIAL_RE.captures(title)?.get(1)?.as_str().parse().ok()?;
    let range = find_period(title, text)
        .map(|phrase| resolve_period(&phrase, year))
        .filter(|range| !range.is_fallback(year))
        .or_else(|| known_memorial_week(year));
    let Some(range) = range else {
        tracing::debug!(year, "memorial page without a usable week");
        return None;
    };

    Some(WeekProgram {
        period: format_period(&range),
        range,
        bible_reading: MEMORIAL_READING.to_string(),
        songs: Songs::default(),
        parts: Vec::new(),
    })
}

fn known_memorial_week(year: i32) -> Option<PeriodRange> {
    let (_, start, end) = MEMORIAL_WEEKS.iter().find(|(y, _, _)| *y == year)?;
    Some(PeriodRange {
        start: NaiveDate::from_ymd_opt(year, start.0, start.1)?,
        end: NaiveDate::from_ymd_opt(year, end.0, end.1)?,
    })
}

/// Period phrase from the title/h1, else from a "Programação ..." body phrase
fn find_period(title: &str, text: &str) -> Option<String> {
    let in_title = PERIOD_RE
        .captures(title)
        .or_else(|| ENGLISH_PERIOD_RE.captures(title))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());
    if in_title.is_some() {
        return in_title;
    }

    let marker = BODY_PERIOD_MARKER_RE.find(text)?;
    PERIOD_RE
        .captures(&text[marker.end()..])
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Song numbers in order of first appearance
fn unique_songs(text: &str) -> Vec<u32> {
    let mut songs: Vec<u32> = Vec::new();
    for caps in SONG_RE.captures_iter(text) {
        if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
            if n > 0 && !songs.contains(&n) {
                songs.push(n);
            }
        }
    }
    songs
}

fn bible_reading(html: &str) -> Result<String, TextError> {
    for selector in ["#p2", r#"[data-pid="2"]"#] {
        if let Some(text) = element_text(html, selector)? {
            return Ok(reading_reference(&text).unwrap_or_default());
        }
    }
    Ok(String::new())
}

/// Book and chapter reference, preferring the text after the reading label
pub(crate) fn reading_reference(text: &str) -> Option<String> {
    let candidate = READING_LABEL_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str());
    let found = REFERENCE_RE.find(candidate)?;
    Some(format_reference(found.as_str()))
}

/// Normalize dashes and spacing and uppercase the book name
fn format_reference(reference: &str) -> String {
    let reference = collapse_whitespace(&reference.replace('-', "–"));
    match BOOK_RE.find(&reference) {
        Some(book) => format!(
            "{}{}{}",
            &reference[..book.start()],
            book.as_str().to_uppercase(),
            &reference[book.end()..]
        ),
        None => reference,
    }
}

fn section_start(text: &str, patterns: &[Regex]) -> Option<usize> {
    patterns.iter().find_map(|p| p.find(text)).map(|m| m.start())
}

/// Parts of every section present on the page, numbered sequentially
fn section_parts(text: &str) -> Vec<ProgramPart> {
    let starts: Vec<(Section, Option<usize>)> = SECTION_PATTERNS
        .iter()
        .map(|(section, patterns)| (*section, section_start(text, patterns)))
        .collect();

    let mut parts = Vec::new();
    for (i, (section, start)) in starts.iter().enumerate() {
        let Some(start) = *start else { continue };
        let end = starts[i + 1..]
            .iter()
            .find_map(|(_, s)| *s)
            .filter(|end| *end >= start)
            .unwrap_or(text.len());
        let body = collapse_whitespace(&text[start..end]);
        parse_section(&body, *section, &mut parts);
    }
    parts
}

fn parse_section(body: &str, section: Section, parts: &mut Vec<ProgramPart>) {
    let found: Vec<(usize, usize, String, u32)> = PART_RE
        .captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = caps.get(2)?.as_str().trim().to_string();
            let duration = caps.get(3)?.as_str().parse().ok()?;
            Some((whole.start(), whole.end(), title, duration))
        })
        .collect();

    for (i, (_, end, title, duration)) in found.iter().enumerate() {
        let next_start = found.get(i + 1).map_or(body.len(), |next| next.0);
        let post_text = &body[*end..next_start];

        let mut part = ProgramPart::new(parts.len() as u32 + 1, title.clone(), *duration, section);
        if section == Section::Ministry {
            describe_ministry_part(&mut part, post_text);
        }
        parts.push(part);
    }
}

/// Scenario, material reference and description of a ministry demonstration
fn describe_ministry_part(part: &mut ProgramPart, post_text: &str) {
    part.scenario = SCENARIO_RE
        .captures(post_text)
        .and_then(|c| c.get(1))
        .map(|m| collapse_whitespace(m.as_str()).to_uppercase());
    part.material = MATERIAL_RE
        .captures(post_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    let mut description = collapse_whitespace(post_text);
    if let Some(scenario) = &part.scenario {
        if description.to_uppercase().starts_with(scenario.as_str()) {
            description = description
                .get(scenario.len()..)
                .unwrap_or_default()
                .trim_start_matches(|c: char| c.is_whitespace() || ".-–—:".contains(c))
                .to_string();
        }
    }
    if let Some(material) = &part.material {
        let suffix = format!("({material})");
        if let Some(stripped) = description.strip_suffix(suffix.as_str()) {
            description = stripped.trim_end().to_string();
        }
    }
    part.description = (!description.is_empty()).then_some(description);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::PartType;

    const WEEKLY_PAGE: &str = r#"<html><head><title>2-8 de fevereiro | Programação da reunião Vida e Ministério</title></head>
<body><nav>Cântico 99</nav><main>
<h1>2-8 DE FEVEREIRO</h1>
<h2 id="p2" data-pid="2"><a href="/x">ISAÍAS 12-14</a></h2>
<p>Cântico 12 e oração | Comentários iniciais (1 min)</p>
<h2>TESOUROS DA PALAVRA DE DEUS</h2>
<h3>1. “Jeová é a minha força”</h3><p>(10 min)</p>
<h3>2. Joias espirituais</h3><p>(10 min)</p>
<h3>3. Leitura da Bíblia</h3><p>(4 min) Is 13:1-16 (th lição 10)</p>
<h2>FAÇA SEU MELHOR NO MINISTÉRIO</h2>
<h3>4. Iniciando conversas</h3><p>(3 min) DE CASA EM CASA. Use um tratado. (lmd lição 1 ponto 3)</p>
<h3>5. Cultivando o interesse</h3><p>(4 min) TESTEMUNHO INFORMAL. Mostre um vídeo.</p>
<h2>NOSSA VIDA CRISTÃ</h2>
<p>Cântico 45</p>
<h3>6. Necessidades locais</h3><p>(15 min)</p>
<h3>7. Estudo bíblico de congregação</h3><p>(30 min) lfb história 5</p>
<p>Comentários finais (3 min) | Cântico 80 e oração</p>
</main></body></html>"#;

    #[test]
    fn test_parse_weekly_page() {
        let week = parse_weekly_html(WEEKLY_PAGE, 2026).unwrap();
        assert_eq!(week.period, "2-8 de fevereiro de 2026");
        assert_eq!(week.range, resolve_period("2-8 de fevereiro de 2026", 2026));
        assert_eq!(week.bible_reading, "ISAÍAS 12–14");
        assert_eq!(
            week.songs,
            Songs {
                opening: Some(12),
                middle: Some(45),
                closing: Some(80)
            }
        );

        let titles: Vec<&str> = week.parts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "“Jeová é a minha força”",
                "Joias espirituais",
                "Leitura da Bíblia",
                "Iniciando conversas",
                "Cultivando o interesse",
                "Necessidades locais",
                "Estudo bíblico de congregação",
            ]
        );
        let numbers: Vec<u32> = week.parts.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_part_classification() {
        let week = parse_weekly_html(WEEKLY_PAGE, 2026).unwrap();
        let types: Vec<PartType> = week.parts.iter().map(|p| p.part_type).collect();
        assert_eq!(
            types,
            vec![
                PartType::Talk,
                PartType::Qna,
                PartType::Reading,
                PartType::Demonstration,
                PartType::Demonstration,
                PartType::ElderConsideration,
                PartType::CongregationStudy,
            ]
        );

        let first_demo = &week.parts[3];
        assert_eq!(first_demo.scenario.as_deref(), Some("DE CASA EM CASA"));
        assert_eq!(first_demo.material.as_deref(), Some("lmd lição 1 ponto 3"));
        assert_eq!(first_demo.description.as_deref(), Some("Use um tratado."));
        assert_eq!(first_demo.duration, 3);

        let second_demo = &week.parts[4];
        assert_eq!(second_demo.scenario.as_deref(), Some("TESTEMUNHO INFORMAL"));
        assert_eq!(second_demo.material, None);
        assert_eq!(second_demo.description.as_deref(), Some("Mostre um vídeo."));
    }

    #[test]
    fn test_unknown_period_uses_placeholder() {
        let week = parse_weekly_html("<main><p>sem datas</p></main>", 2027).unwrap();
        assert!(week.has_placeholder_dates());
        assert_eq!(week.period, "Semana a definir (Importado)");
        assert_eq!(week.range.start, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        assert!(week.parts.is_empty());
    }

    #[test]
    fn test_period_from_body_phrase() {
        let html = "<title>Apostila</title><main><p>Programação para 23 de fevereiro–1 de março de 2026</p></main>";
        let week = parse_weekly_html(html, 2020).unwrap();
        assert_eq!(week.period, "23 de fevereiro–1 de março de 2026");
    }

    #[test]
    fn test_memorial_week() {
        let html = "<title>Celebração de 2026 | Programa</title><main>Cântico 1</main>";
        let week = parse_weekly_html(html, 2026).unwrap();
        assert_eq!(week.period, "30 de março–5 de abril de 2026");
        assert_eq!(week.bible_reading, "Leitura da Bíblia para a Celebração");
        assert!(week.parts.is_empty());
    }

    #[test]
    fn test_memorial_week_from_page_period() {
        let html = "<title>Celebração de 2027 | Programa</title>\
            <h1>22-28 de março de 2027</h1><main>Cântico 1</main>";
        let week = parse_weekly_html(html, 2020).unwrap();
        assert_eq!(week.range.start.to_string(), "2027-03-22");
        assert_eq!(week.range.end.to_string(), "2027-03-28");
        assert_eq!(week.bible_reading, "Leitura da Bíblia para a Celebração");
        assert!(week.songs.opening.is_none());
        assert!(week.parts.is_empty());
    }

    #[test]
    fn test_unknown_memorial_without_period_is_parsed_normally() {
        let html = "<title>Celebração de 2031</title><main><p>Cântico 7</p></main>";
        let week = parse_weekly_html(html, 2031).unwrap();
        assert!(week.has_placeholder_dates());
        assert_eq!(week.bible_reading, "");
    }

    #[test]
    fn test_reading_reference() {
        assert_eq!(
            reading_reference("Leitura da Bíblia: (4 min) isaías 13:1-16").as_deref(),
            Some("ISAÍAS 13:1–16")
        );
        assert_eq!(
            reading_reference("PROVÉRBIOS  3, 4").as_deref(),
            Some("PROVÉRBIOS 3, 4")
        );
        assert_eq!(reading_reference("nada aqui"), None);
    }
}
