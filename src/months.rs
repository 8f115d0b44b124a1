//! Month resolution for snapshot rows.
//!
//! A row's month comes from its tab name and its raw date text. Daily tabs
//! are usually named like `26th July`, summary tabs carry abbreviations such
//! as `Aug Ops`, and some rows only have a bare numeric date.

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Abbreviation checklist applied to the tab name after full names fail.
///
/// Order matters: the first entry whose abbreviation appears in the tab name
/// wins, so `Dec-Jan` resolves to December and `Jun/Jul` to July.
const TAB_ABBREVIATIONS: [(&str, &str); 12] = [
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
];

/// Resolve the canonical month for a row, or `None` when nothing matches.
///
/// Priority:
/// 1. A full month name (January first) in the tab name or the date text.
/// 2. An abbreviation from [`TAB_ABBREVIATIONS`] in the tab name.
/// 3. A standalone numeric token `1..=12` (optionally zero-padded) in the
///    date text, taken as the month number.
pub fn get_month(table_name: &str, raw_date: &str) -> Option<&'static str> {
    let tab = table_name.to_lowercase();
    let date = raw_date.to_lowercase();

    for name in MONTH_NAMES {
        let lower = name.to_lowercase();
        if tab.contains(&lower) || date.contains(&lower) {
            return Some(name);
        }
    }

    for (abbr, name) in TAB_ABBREVIATIONS {
        if tab.contains(abbr) {
            return Some(name);
        }
    }

    numeric_month(raw_date)
}

// First word-bounded token that reads as a month number.
fn numeric_month(raw_date: &str) -> Option<&'static str> {
    raw_date
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find_map(|word| {
            let valid = match word.len() {
                1 => word != "0",
                2 if word.starts_with('0') => word != "00",
                2 => matches!(word, "10" | "11" | "12"),
                _ => false,
            };
            if !valid || !word.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let n: usize = word.parse().ok()?;
            Some(MONTH_NAMES[n - 1])
        })
}
