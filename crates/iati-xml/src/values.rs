//! Scalar conversions for attribute and text values.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// `http:example.com`, `https:/example.com`, `http:\\example.com`.
static MISSING_SLASHES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?|ftp):[/\\]{0,3}").expect("valid scheme regex")
});
static HAS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid scheme regex"));

/// Parse an IATI `xsd:date`, tolerating a trailing time part.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parse a decimal value, accepting thousands separators.
pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return value.is_finite().then_some(value);
    }
    let without_separators: String = trimmed
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    without_separators
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// IATI booleans are `1`/`0` or `true`/`false`.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Repair common URL mistakes; `None` for an empty url.
///
/// - `http:example.com` / `http:/example.com` become `http://example.com`
/// - `//example.com` and `www.example.com` get an `https://` scheme
/// - surrounding whitespace and inner spaces are removed or encoded
pub(crate) fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let encoded = trimmed.replace(' ', "%20");
    if HAS_SCHEME.is_match(&encoded) {
        return Some(encoded);
    }
    if let Some(found) = MISSING_SLASHES.find(&encoded) {
        let scheme = found.as_str().split(':').next().unwrap_or("http").to_ascii_lowercase();
        let rest = &encoded[found.end()..];
        if rest.is_empty() {
            return None;
        }
        return Some(format!("{scheme}://{rest}"));
    }
    if let Some(rest) = encoded.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    Some(format!("https://{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accept_datetime_suffix() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 31);
        assert_eq!(parse_date("2024-03-31"), expected);
        assert_eq!(parse_date("2024-03-31T00:00:00Z"), expected);
        assert_eq!(parse_date("31/03/2024"), None);
    }

    #[test]
    fn decimals_accept_separators() {
        assert_eq!(parse_decimal(" 1500.50 "), Some(1500.5));
        assert_eq!(parse_decimal("1,500,000"), Some(1_500_000.0));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn booleans() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn repairs_urls() {
        assert_eq!(
            normalize_url("http:example.com/doc.pdf").as_deref(),
            Some("http://example.com/doc.pdf")
        );
        assert_eq!(
            normalize_url("https:/example.com").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            normalize_url("www.example.com/a b.pdf").as_deref(),
            Some("https://www.example.com/a%20b.pdf")
        );
        assert_eq!(
            normalize_url("//cdn.example.com/x").as_deref(),
            Some("https://cdn.example.com/x")
        );
        assert_eq!(
            normalize_url("https://example.com").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(normalize_url("   "), None);
        assert_eq!(normalize_url("http:"), None);
    }
}
