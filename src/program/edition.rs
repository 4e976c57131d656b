//! Bi-monthly edition addressing and link discovery

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

/// URL slugs of the months, unaccented as they appear in edition paths
const MONTH_SLUGS: [&str; 12] = [
    "janeiro", "fevereiro", "marco", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

static ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<a[^>]+href="([^"]+)"[^>]*>(.*?)</a>"#).expect("valid regex"));
static HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="([^"]+)""#).expect("valid regex"));
static PDF_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href="([^"]+\.pdf)""#).expect("valid regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WEEKLY_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)vida.*minist[ée]rio.*para").expect("valid regex"));
static WEEKLY_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Program.*Vida.*Minist.*para").expect("valid regex"));
static EDITION_PDF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mwb|apostila|vida.*minist").expect("valid regex"));

/// Odd month an edition covering `month` starts in
pub fn bimester_start(month: u32) -> u32 {
    if month % 2 == 0 {
        month.saturating_sub(1)
    } else {
        month
    }
}

/// Storage key of an edition, e.g. `"2026-01"`
pub fn issue_key(year: i32, month_start: u32) -> String {
    format!("{year}-{month_start:02}")
}

/// Page of the edition starting in `month_start`, under `base`
pub fn edition_url(base: &str, year: i32, month_start: u32) -> String {
    let first = bimester_start(month_start.clamp(1, 12)) as usize - 1;
    format!(
        "{}/{}-{}-{}-mwb/",
        base.trim_end_matches('/'),
        MONTH_SLUGS[first],
        MONTH_SLUGS[first + 1],
        year
    )
}

/// Edition following the one that covers `month` of `year`
pub fn next_issue(year: i32, month: u32) -> (i32, u32) {
    let next = bimester_start(month) + 2;
    if next > 12 {
        (year + 1, 1)
    } else {
        (year, next)
    }
}

fn resolve(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Url::parse(href).ok().map(String::from),
    }
}

/// Links to the weekly program pages of an edition, in page order.
///
/// An anchor qualifies by its visible text, or by its percent-decoded href.
pub fn extract_weekly_links(html: &str, base: &str) -> Vec<String> {
    let base_url = Url::parse(base).ok();
    if base_url.is_none() {
        tracing::warn!(base, "edition base is not an absolute URL");
    }

    let by_text = ANCHOR_RE.captures_iter(html).filter_map(|caps| {
        let text = TAG_RE.replace_all(caps.get(2)?.as_str(), " ");
        let text = html_escape::decode_html_entities(&text).to_lowercase();
        WEEKLY_TEXT_RE
            .is_match(&text)
            .then(|| caps.get(1).map(|m| m.as_str()))
            .flatten()
    });
    let by_href = HREF_RE.captures_iter(html).filter_map(|caps| {
        let href = caps.get(1)?.as_str();
        let decoded = urlencoding::decode(href).ok()?;
        WEEKLY_HREF_RE.is_match(&decoded).then_some(href)
    });

    let mut links: Vec<String> = Vec::new();
    for href in by_text.chain(by_href) {
        let href = html_escape::decode_html_entities(href);
        if let Some(link) = resolve(base_url.as_ref(), &href) {
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
    links
}

/// First PDF link of the edition page that looks like the workbook itself
pub fn extract_edition_pdf_url(html: &str, base: &str) -> Option<String> {
    let base_url = Url::parse(base).ok();
    PDF_HREF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|href| EDITION_PDF_RE.is_match(href))
        .find_map(|href| resolve(base_url.as_ref(), href))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.jw.org/pt/biblioteca/jw-apostila-do-mes";

    #[test]
    fn test_bimester_start() {
        assert_eq!(bimester_start(1), 1);
        assert_eq!(bimester_start(2), 1);
        assert_eq!(bimester_start(11), 11);
        assert_eq!(bimester_start(12), 11);
    }

    #[test]
    fn test_issue_key() {
        assert_eq!(issue_key(2026, 1), "2026-01");
        assert_eq!(issue_key(2025, 11), "2025-11");
    }

    #[test]
    fn test_edition_url() {
        assert_eq!(
            edition_url(BASE, 2026, 1),
            format!("{BASE}/janeiro-fevereiro-2026-mwb/")
        );
        assert_eq!(
            edition_url(&format!("{BASE}/"), 2026, 3),
            format!("{BASE}/marco-abril-2026-mwb/")
        );
        assert_eq!(
            edition_url(BASE, 2025, 12),
            format!("{BASE}/novembro-dezembro-2025-mwb/")
        );
    }

    #[test]
    fn test_next_issue_wraps_year() {
        assert_eq!(next_issue(2026, 1), (2026, 3));
        assert_eq!(next_issue(2026, 4), (2026, 5));
        assert_eq!(next_issue(2026, 11), (2027, 1));
        assert_eq!(next_issue(2026, 12), (2027, 1));
    }

    #[test]
    fn test_extract_weekly_links() {
        let edition = format!("{BASE}/janeiro-fevereiro-2026-mwb/");
        let html = r#"
            <a href="/pt/x/semana-1/"><span>5-11 de janeiro</span> Programação da reunião Vida e Ministério para 5-11 de janeiro</a>
            <a href="/pt/outro/">Outro artigo</a>
            <a href="Programa%C3%A7%C3%A3o-da-reuni%C3%A3o-Vida-e-Minist%C3%A9rio-para-12-18-de-janeiro/">12-18 de janeiro</a>
            <a href="/pt/x/semana-1/">Vida e Ministério para 5-11 de janeiro (repetido)</a>
        "#;
        let links = extract_weekly_links(html, &edition);
        assert_eq!(
            links,
            vec![
                "https://www.jw.org/pt/x/semana-1/".to_string(),
                format!("{edition}Programa%C3%A7%C3%A3o-da-reuni%C3%A3o-Vida-e-Minist%C3%A9rio-para-12-18-de-janeiro/"),
            ]
        );
    }

    #[test]
    fn test_extract_edition_pdf_url() {
        let html = r#"<a href="/files/guia.pdf">Guia</a> <a href="/files/mwb_T_202601.pdf">PDF</a>"#;
        assert_eq!(
            extract_edition_pdf_url(html, BASE).as_deref(),
            Some("https://www.jw.org/files/mwb_T_202601.pdf")
        );
        assert_eq!(extract_edition_pdf_url("<p>nada</p>", BASE), None);
    }
}
