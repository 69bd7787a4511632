// =============================================================================
// case_ref.rs - WHAT CASE ARE WE EVEN TALKING ABOUT?
// =============================================================================
//
// Case numbers reach us in three dialects:
//
//   "CF-2019-123"                                   the docket's own spelling
//   "CF-19-123 CT 1"                                sentencing records: short
//                                                   year, count suffix
//   "https://www.oscn.net/dockets/GetCaseInformation.aspx?db=tulsa&number=CF-2019-123"
//
// Everything is folded into the first dialect before it is used as a key.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Two-digit years at or above this pivot belong to the 1900s.
pub const CENTURY_PIVOT: u32 = 24;

/// A case to process, and where its docket page lives if we know.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseRef {
    pub case_number: String,
    pub url: Option<String>,
}

impl CaseRef {
    pub fn new(case_number: impl AsRef<str>) -> Self {
        Self {
            case_number: normalize_case_number(case_number.as_ref()),
            url: None,
        }
    }

    /// Accept either a bare case number or a docket URL.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if input.starts_with("http://") || input.starts_with("https://") {
            let number = case_number_from_url(input)?;
            return Some(Self {
                case_number: normalize_case_number(&number),
                url: Some(input.to_string()),
            });
        }
        Some(Self::new(input))
    }
}

/// Drop a trailing count suffix and widen a two-digit year.
pub fn normalize_case_number(raw: &str) -> String {
    let without_count = match raw.find("CT") {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    let trimmed = without_count.trim();

    let mut parts: Vec<String> = trimmed.split('-').map(str::to_string).collect();
    let year_slot = match parts.as_slice() {
        [first, ..] if is_two_digit_year(first) => Some(0),
        [prefix, second, ..]
            if prefix.chars().all(|c| c.is_ascii_alphabetic()) && is_two_digit_year(second) =>
        {
            Some(1)
        }
        _ => None,
    };

    if let Some(slot) = year_slot {
        if let Ok(year) = parts[slot].parse::<u32>() {
            let century = if year >= CENTURY_PIVOT { "19" } else { "20" };
            parts[slot] = format!("{century}{:02}", year);
        }
    }

    let normalized = parts.join("-");
    if normalized != raw {
        debug!(raw = raw, normalized = %normalized, "Case number normalized");
    }
    normalized
}

fn is_two_digit_year(part: &str) -> bool {
    part.len() == 2 && part.chars().all(|c| c.is_ascii_digit())
}

/// The `number` query parameter of a docket URL.
pub fn case_number_from_url(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let number = parsed
        .query_pairs()
        .find(|(key, _)| key == "number")
        .map(|(_, value)| value.into_owned())?;
    let number = number.split('&').next().unwrap_or_default().trim().to_string();
    if number.is_empty() {
        None
    } else {
        Some(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_year_is_widened() {
        assert_eq!(normalize_case_number("19-1234"), "2019-1234");
        assert_eq!(normalize_case_number("98-77"), "1998-77");
        assert_eq!(normalize_case_number("CF-19-123"), "CF-2019-123");
    }

    #[test]
    fn test_count_suffix_is_dropped() {
        assert_eq!(normalize_case_number("CF-19-123 CT 1"), "CF-2019-123");
        assert_eq!(normalize_case_number("CF-2019-123"), "CF-2019-123");
    }

    #[test]
    fn test_case_number_from_docket_url() {
        let link = "https://www.oscn.net/dockets/GetCaseInformation.aspx?db=tulsa&number=CF-2019-123&cmid=1";
        assert_eq!(case_number_from_url(link).as_deref(), Some("CF-2019-123"));
        assert_eq!(case_number_from_url("https://www.oscn.net/dockets/"), None);
        assert_eq!(case_number_from_url("not a url"), None);
    }

    #[test]
    fn test_parse_accepts_urls_and_numbers() {
        let from_url = CaseRef::parse("https://www.oscn.net/dockets/x.aspx?number=CM-20-5").unwrap();
        assert_eq!(from_url.case_number, "CM-2020-5");
        assert!(from_url.url.is_some());

        let bare = CaseRef::parse("  CF-2021-9 ").unwrap();
        assert_eq!(bare.case_number, "CF-2021-9");
        assert_eq!(bare.url, None);

        assert_eq!(CaseRef::parse("   "), None);
    }
}
