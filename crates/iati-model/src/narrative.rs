use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Language code treated as primary when an element carries several narratives.
pub const PRIMARY_LANGUAGE: &str = "en";

/// Human-readable text of an IATI element.
///
/// IATI allows one `<narrative>` per language. The primary text is the
/// English narrative when present, otherwise the first one in source order;
/// every other language is kept in `translations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub text: String,
    /// Language of the primary text, from `xml:lang` or the activity default.
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, String>,
}

impl Narrative {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            translations: BTreeMap::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Select the primary narrative from `(text, language)` pairs in source order.
    ///
    /// Empty texts are ignored. Returns `None` when nothing usable remains.
    pub fn select<I>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let entries: Vec<(String, Option<String>)> = entries
            .into_iter()
            .filter(|(text, _)| !text.trim().is_empty())
            .collect();
        let primary_index = entries
            .iter()
            .position(|(_, lang)| {
                lang.as_deref()
                    .is_some_and(|lang| is_primary_language(lang))
            })
            .unwrap_or(0);
        let mut primary = None;
        let mut translations = BTreeMap::new();
        for (index, (text, lang)) in entries.into_iter().enumerate() {
            if index == primary_index {
                primary = Some((text, lang));
            } else if let Some(lang) = lang {
                translations.entry(lang.to_lowercase()).or_insert(text);
            }
        }
        let (text, language) = primary?;
        Some(Self {
            text,
            language,
            translations,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn is_primary_language(lang: &str) -> bool {
    let lower = lang.to_ascii_lowercase();
    lower == PRIMARY_LANGUAGE || lower.starts_with("en-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, lang: Option<&str>) -> (String, Option<String>) {
        (text.to_string(), lang.map(str::to_string))
    }

    #[test]
    fn english_wins_over_source_order() {
        let narrative = Narrative::select(vec![
            entry("Titre", Some("fr")),
            entry("Title", Some("en")),
        ])
        .expect("narrative");
        assert_eq!(narrative.text, "Title");
        assert_eq!(narrative.language.as_deref(), Some("en"));
        assert_eq!(narrative.translations.get("fr").map(String::as_str), Some("Titre"));
    }

    #[test]
    fn first_narrative_without_english() {
        let narrative = Narrative::select(vec![
            entry("Titre", Some("fr")),
            entry("Titel", Some("de")),
        ])
        .expect("narrative");
        assert_eq!(narrative.text, "Titre");
        assert_eq!(narrative.language.as_deref(), Some("fr"));
    }

    #[test]
    fn blank_narratives_are_ignored() {
        assert!(Narrative::select(vec![entry("  ", Some("en"))]).is_none());
    }
}
