// Row normalization helpers.
//
// Snapshot cells are typed by hand in a spreadsheet, so the same date shows
// up as "26th July", "26-Jul-2024", a native date, or "on 26 July". These
// helpers reduce every cell to a clean display string and a sortable key so
// the rest of the code never touches raw cell text.
use crate::months::MONTH_NAMES;
use crate::types::Cell;
use chrono::Datelike;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

static TAB_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([0-9]+)(st|nd|rd|th)?\s+(january|february|march|april|may|june|july|august|september|october|november|december)",
    )
    .expect("tab date pattern is valid")
});

static FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("number pattern is valid"));

static FIRST_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)january|february|march|april|may|june|july|august|september|october|november|december",
    )
    .expect("month pattern is valid")
});

/// Strip bold markers, trim, and collapse whitespace runs to one space.
pub fn clean_text(value: &str) -> String {
    value
        .replace("**", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Canonicalize a date cell into `"<day> <Month>"` display form.
///
/// Rules are tried in order and the first that matches wins:
/// 1. `<day>[st|nd|rd|th] <full month>` anywhere in the text.
/// 2. Hyphenated text: the first two hyphen-separated segments.
/// 3. A native date value.
/// 4. The first digit run plus the first month name found anywhere.
/// 5. The text with punctuation stripped.
pub fn format_date(value: &Cell) -> String {
    let text = value.to_text();

    if let Some(caps) = TAB_DATE.captures(&text) {
        return format!("{} {}", &caps[1], capitalize(&caps[3]));
    }

    if text.contains('-') {
        let mut parts = text.split('-');
        let first = parts.next().unwrap_or_default();
        let second = parts.next().unwrap_or_default();
        return format!("{} {}", first, second);
    }

    if let Cell::Date(d) = value {
        return format!("{} {}", d.day(), d.format("%B"));
    }

    if let (Some(day), Some(month)) = (FIRST_NUMBER.find(&text), FIRST_MONTH.find(&text)) {
        return format!("{} {}", day.as_str(), month.as_str());
    }

    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lexicographically sortable `"MM-DD"` key for a display date.
///
/// Unknown months map to `00` and unparseable days to `00`. Text without a
/// second space-separated token is returned unchanged.
pub fn date_sort_key(display: &str) -> String {
    let parts: Vec<&str> = display.split(' ').collect();
    if parts.len() < 2 {
        return display.to_string();
    }
    let day = leading_int(parts[0]).unwrap_or_else(|| "0".to_string());
    let month = MONTH_NAMES
        .iter()
        .position(|m| *m == parts[1])
        .map(|i| i + 1)
        .unwrap_or(0);
    format!("{:02}-{:0>2}", month, day)
}

// Integer prefix of a token as canonical digits, e.g. "26th" -> "26",
// "007" -> "7". Kept as text so runs of any length never overflow.
fn leading_int(token: &str) -> Option<String> {
    let token = token.trim_start();
    let (negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(match trimmed {
        "" => "0".to_string(),
        t if negative => format!("-{t}"),
        t => t.to_string(),
    })
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thousands separators for console counts (e.g., `12,480 observations`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fmt(s: &str) -> String {
        format_date(&Cell::from(s))
    }

    #[test]
    fn clean_text_strips_markers_and_collapses_whitespace() {
        assert_eq!(clean_text("  **MH12  AB\t1234**  "), "MH12 AB 1234");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn format_date_prefers_tab_style_pattern() {
        assert_eq!(fmt("26th July"), "26 July");
        assert_eq!(fmt("1st AUGUST 2024"), "1 August");
        assert_eq!(fmt("Snapshot 3rd september"), "3 September");
        // A hyphen does not win over an ordinal date.
        assert_eq!(fmt("2nd June - evening"), "2 June");
    }

    #[test]
    fn format_date_splits_hyphenated_values() {
        assert_eq!(fmt("26-Jul-2024"), "26 Jul");
        assert_eq!(fmt("2024-07-26"), "2024 07");
        assert_eq!(fmt("5-"), "5 ");
    }

    #[test]
    fn format_date_handles_native_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 8, 2).unwrap();
        assert_eq!(format_date(&Cell::Date(d)), "2 August");
    }

    #[test]
    fn format_date_extracts_day_and_month_anywhere() {
        assert_eq!(fmt("on 5 of July"), "5 July");
        assert_eq!(fmt("july, day 9"), "9 july");
    }

    #[test]
    fn format_date_falls_back_to_stripped_text() {
        assert_eq!(fmt("26/07/2024"), "26072024");
        assert_eq!(fmt(" ?? today! "), "today");
        assert_eq!(format_date(&Cell::Number(45500.0)), "45500");
    }

    #[test]
    fn sort_key_orders_by_month_then_day() {
        assert_eq!(date_sort_key("2 August"), "08-02");
        assert_eq!(date_sort_key("26 July"), "07-26");
        assert!(date_sort_key("2 August") > date_sort_key("26 July"));
    }

    #[test]
    fn sort_key_degrades_gracefully() {
        assert_eq!(date_sort_key("26 Jul"), "00-26");
        assert_eq!(date_sort_key("x July"), "07-00");
        assert_eq!(date_sort_key("26th July"), "07-26");
        assert_eq!(date_sort_key("today"), "today");
        assert_eq!(date_sort_key(""), "");
    }

    #[test]
    fn sort_key_keeps_long_day_runs() {
        let day = "1".repeat(25);
        assert_eq!(date_sort_key(&format!("{day} July")), format!("07-{day}"));
        assert_eq!(date_sort_key("007 July"), "07-07");
        assert_eq!(date_sort_key("000 July"), "07-00");
        assert_eq!(date_sort_key("-5 July"), "07--5");
    }

    #[test]
    fn capitalize_normalizes_case() {
        assert_eq!(capitalize("jULY"), "July");
        assert_eq!(capitalize(""), "");
    }
}
