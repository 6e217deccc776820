use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Four letters, an optional space or hyphen, seven digits.
static CONTAINER_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]{4})[ \-]?([0-9]{7})\b").expect("invalid container id regex")
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{2}/[0-9]{2}/[0-9]{4}|[0-9]{2}-[0-9]{2}-[0-9]{4})\b")
        .expect("invalid discharge date regex")
});

/// One recognised line of an operator discharge report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DischargeRecord {
    /// Canonical id: uppercase prefix and digits without separator.
    pub container_id: String,
    /// The source line, trimmed.
    pub raw_line: String,
    /// First `DD/MM/YYYY` or `DD-MM-YYYY` token found on the line.
    pub date: Option<String>,
}

impl DischargeRecord {
    /// Calendar date of the discharge, when the token is a real date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let token = self.date.as_deref()?;
        NaiveDate::parse_from_str(token, "%d/%m/%Y")
            .or_else(|_| NaiveDate::parse_from_str(token, "%d-%m-%Y"))
            .ok()
    }
}

/// Find the first container identifier in `text` and return it in canonical form.
pub fn extract_container_id(text: &str) -> Option<String> {
    let caps = CONTAINER_ID_RE.captures(text)?;
    let prefix = caps.get(1)?.as_str().to_ascii_uppercase();
    let digits = caps.get(2)?.as_str();
    Some(format!("{prefix}{digits}"))
}

/// First date token on the line, as written.
pub fn extract_date(text: &str) -> Option<String> {
    DATE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse one report line; lines without a container identifier yield `None`.
pub fn parse_line(line: &str) -> Option<DischargeRecord> {
    let container_id = extract_container_id(line)?;
    Some(DischargeRecord {
        container_id,
        raw_line: line.trim().to_string(),
        date: extract_date(line),
    })
}

/// Lookup key for a manifest container number.
///
/// Numbers that look like container identifiers are canonicalised the same way
/// as report lines; anything else is used trimmed and literal.
pub fn canonical_container_id(num_conteneur: &str) -> String {
    extract_container_id(num_conteneur).unwrap_or_else(|| num_conteneur.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_canonicalise_to_one_id() {
        for text in ["TCNU 1234567", "TCNU-1234567", "TCNU1234567", "tcnu1234567"] {
            assert_eq!(extract_container_id(text).as_deref(), Some("TCNU1234567"));
        }
    }

    #[test]
    fn requires_exact_letter_and_digit_counts() {
        assert_eq!(extract_container_id("TCN 1234567"), None);
        assert_eq!(extract_container_id("XTCNU1234567"), None);
        assert_eq!(extract_container_id("TCNU123456"), None);
        assert_eq!(extract_container_id("TCNU12345678"), None);
        assert_eq!(extract_container_id("TCNU  1234567"), None);
    }

    #[test]
    fn finds_id_and_date_anywhere_on_the_line() {
        let record = parse_line("  Found TCNU1234567 on 01/03/2024 at berth 2 ").unwrap();
        assert_eq!(record.container_id, "TCNU1234567");
        assert_eq!(record.date.as_deref(), Some("01/03/2024"));
        assert_eq!(record.raw_line, "Found TCNU1234567 on 01/03/2024 at berth 2");
        assert_eq!(record.parsed_date(), NaiveDate::from_ymd_opt(2024, 3, 1));

        let dashed = parse_line("MSKU-7654321 disch 15-02-2024").unwrap();
        assert_eq!(dashed.date.as_deref(), Some("15-02-2024"));
        assert_eq!(dashed.parsed_date(), NaiveDate::from_ymd_opt(2024, 2, 15));
    }

    #[test]
    fn noise_lines_are_ignored() {
        assert_eq!(parse_line("berth 2 shift change 06:00"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn date_is_optional_and_validated_separately() {
        let record = parse_line("TCNU1234567").unwrap();
        assert_eq!(record.date, None);
        assert_eq!(record.parsed_date(), None);

        let bogus = parse_line("TCNU1234567 31/02/2024").unwrap();
        assert_eq!(bogus.date.as_deref(), Some("31/02/2024"));
        assert_eq!(bogus.parsed_date(), None);
    }

    #[test]
    fn manifest_numbers_use_the_same_key() {
        assert_eq!(canonical_container_id("TCNU 1234567"), "TCNU1234567");
        assert_eq!(canonical_container_id(" UNKNOWN "), "UNKNOWN");
    }
}
