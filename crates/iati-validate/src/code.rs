//! Vocabulary-dependent code format rules.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// OECD DAC aid type codes: a category letter and two or three digits.
static DAC_AID_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-H][0-9]{2,3}$").expect("valid aid type regex"));
/// Earmarking modality codes such as `1.1`.
static EARMARKING_MODALITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}\.[0-9]{1,2}$").expect("valid modality regex"));

/// Reporting-organisation vocabularies: any alphanumeric token.
const REPORTER_VOCABULARIES: [&str; 2] = ["98", "99"];

/// Coded element kinds whose validity depends on a vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeKind {
    Sector,
    RecipientCountry,
    RecipientRegion,
    AidType,
    PolicyMarker,
}

impl CodeKind {
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Sector => "sector",
            Self::RecipientCountry => "recipient-country",
            Self::RecipientRegion => "recipient-region",
            Self::AidType => "aid-type",
            Self::PolicyMarker => "policy-marker",
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// Outcome of a single code check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Check `code` against the format its vocabulary prescribes.
///
/// An absent or blank vocabulary means the IATI default (`1`) for every kind.
pub fn validate(kind: CodeKind, code: &str, vocabulary: Option<&str>) -> Verdict {
    let code = code.trim();
    if code.is_empty() {
        return Verdict::invalid(format!("{kind} has no code"));
    }
    let vocabulary = vocabulary.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("1");
    match kind {
        CodeKind::Sector => sector(code, vocabulary),
        CodeKind::RecipientCountry => country(code),
        CodeKind::RecipientRegion => region(code, vocabulary),
        CodeKind::AidType => aid_type(code, vocabulary),
        CodeKind::PolicyMarker => policy_marker(code, vocabulary),
    }
}

fn sector(code: &str, vocabulary: &str) -> Verdict {
    match vocabulary {
        "1" => digits(code, 5, "DAC 5-digit purpose code (vocabulary 1)"),
        "2" => digits(code, 3, "DAC 3-digit sector code (vocabulary 2)"),
        _ => other_vocabulary(code, vocabulary),
    }
}

fn country(code: &str) -> Verdict {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Verdict::valid()
    } else {
        Verdict::invalid(format!(
            "'{code}' is not an ISO 3166-1 alpha-2 country code"
        ))
    }
}

fn region(code: &str, vocabulary: &str) -> Verdict {
    match vocabulary {
        "1" => digits(code, 3, "DAC region code (vocabulary 1)"),
        "2" => digits(code, 3, "UN M49 region code (vocabulary 2)"),
        _ => other_vocabulary(code, vocabulary),
    }
}

fn aid_type(code: &str, vocabulary: &str) -> Verdict {
    let matches = match vocabulary {
        "1" => DAC_AID_TYPE.is_match(code),
        "2" | "4" => code.len() == 1 && code.chars().all(|c| c.is_ascii_digit()),
        "3" => EARMARKING_MODALITY.is_match(code),
        _ => return other_vocabulary(code, vocabulary),
    };
    if matches {
        Verdict::valid()
    } else {
        Verdict::invalid(format!(
            "'{code}' is not a valid aid type code for vocabulary {vocabulary}"
        ))
    }
}

fn policy_marker(code: &str, vocabulary: &str) -> Verdict {
    if vocabulary != "1" {
        return other_vocabulary(code, vocabulary);
    }
    match code.parse::<u8>() {
        Ok(1..=12) if code.chars().all(|c| c.is_ascii_digit()) => Verdict::valid(),
        _ => Verdict::invalid(format!(
            "'{code}' is not an OECD DAC policy marker code (1-12)"
        )),
    }
}

fn digits(code: &str, len: usize, what: &str) -> Verdict {
    if code.len() == len && code.chars().all(|c| c.is_ascii_digit()) {
        Verdict::valid()
    } else {
        Verdict::invalid(format!("'{code}' is not a {what}"))
    }
}

/// Reporter-defined vocabularies take alphanumeric tokens; other published
/// vocabularies also allow `.` and `-` (e.g. SDG targets `6.1`).
fn other_vocabulary(code: &str, vocabulary: &str) -> Verdict {
    let valid = if REPORTER_VOCABULARIES.contains(&vocabulary) {
        code.chars().all(|c| c.is_ascii_alphanumeric())
    } else {
        code.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    };
    if valid {
        Verdict::valid()
    } else {
        Verdict::invalid(format!(
            "'{code}' is not an alphanumeric code for vocabulary {vocabulary}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn three_digit_sectors_under_vocabulary_two() {
        assert!(validate(CodeKind::Sector, "111", Some("2")).valid);
        assert!(validate(CodeKind::Sector, "112", Some("2")).valid);
        assert!(!validate(CodeKind::Sector, "11110", Some("2")).valid);
    }

    #[test]
    fn default_vocabulary_requires_five_digits() {
        assert!(validate(CodeKind::Sector, "11110", None).valid);
        assert!(validate(CodeKind::Sector, "11110", Some(" ")).valid);
        let verdict = validate(CodeKind::Sector, "111", None);
        assert!(!verdict.valid);
        assert!(verdict.reason.unwrap().contains("5-digit"));
    }

    #[test]
    fn other_kinds() {
        assert!(validate(CodeKind::RecipientCountry, "TZ", None).valid);
        assert!(!validate(CodeKind::RecipientCountry, "TZA", None).valid);
        assert!(validate(CodeKind::RecipientRegion, "298", None).valid);
        assert!(validate(CodeKind::AidType, "B021", None).valid);
        assert!(validate(CodeKind::AidType, "1.2", Some("3")).valid);
        assert!(!validate(CodeKind::AidType, "Z01", Some("1")).valid);
        assert!(validate(CodeKind::PolicyMarker, "12", None).valid);
        assert!(!validate(CodeKind::PolicyMarker, "13", None).valid);
        assert!(validate(CodeKind::Sector, "6.1", Some("8")).valid);
        assert!(!validate(CodeKind::Sector, "", Some("2")).valid);
    }

    proptest! {
        #[test]
        fn vocabulary_two_accepts_exactly_three_digits(code in "[0-9]{1,6}") {
            let verdict = validate(CodeKind::Sector, &code, Some("2"));
            prop_assert_eq!(verdict.valid, code.len() == 3);
        }

        #[test]
        fn default_vocabulary_accepts_exactly_five_digits(
            code in "[0-9]{1,7}",
            vocabulary in prop::option::of(Just("1")),
        ) {
            let verdict = validate(CodeKind::Sector, &code, vocabulary);
            prop_assert_eq!(verdict.valid, code.len() == 5);
        }

        #[test]
        fn reporter_vocabulary_accepts_alphanumeric(code in "[A-Za-z0-9 _.-]{1,12}") {
            let verdict = validate(CodeKind::Sector, &code, Some("99"));
            let trimmed = code.trim();
            let expected = !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphanumeric());
            prop_assert_eq!(verdict.valid, expected);
        }

        #[test]
        fn rejected_codes_carry_a_reason(code in "\\PC{0,8}", vocabulary in "[0-9]{1,2}") {
            let verdict = validate(CodeKind::Sector, &code, Some(vocabulary.as_str()));
            prop_assert_eq!(verdict.valid, verdict.reason.is_none());
        }
    }
}
