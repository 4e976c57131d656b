//! Month name tables

const PT_FULL: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

const PT_SHORT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

const EN_FULL: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

const EN_SHORT: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Resolve a Portuguese or English month name (full or 3-letter) to 1..=12.
///
/// Case-insensitive, dots ignored, `marco` accepted for `março`.
pub fn month_number(name: &str) -> Option<u32> {
    let cleaned = name.trim().replace('.', "").to_lowercase();
    let cleaned = if cleaned == "marco" { "março".to_string() } else { cleaned };

    [PT_FULL, PT_SHORT, EN_FULL, EN_SHORT]
        .iter()
        .find_map(|table| table.iter().position(|m| *m == cleaned))
        .map(|i| i as u32 + 1)
}

/// Lowercase Portuguese month name for 1..=12
pub fn portuguese_name(month: u32) -> &'static str {
    PT_FULL[(month.clamp(1, 12) - 1) as usize]
}
