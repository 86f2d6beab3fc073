//! Resolution of Dataverse language names to ISO 639 codes.
//!
//! Dataverse claims ISO 639-1 names but uses its own spellings for several
//! languages, and ISO itself lists more than one official English name for
//! some of them. A name is therefore rewritten through the Dataverse synonym
//! table, expanded to every ISO synonym, and each candidate is looked up in
//! the ISO 639-3 registry in turn.

use isolang::Language;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{MappingError, MappingResult};
use crate::vocab::LOC_VOCABULARY;

/// Code used for "no linguistic content" (ISO 639-2).
pub const NO_LINGUISTIC_CONTENT: &str = "zxx";

const NO_LANGUAGE_NAMES: &[&str] = &["no linguistic content", "not applicable"];

/// ISO 639 languages with more than one official English name.
const ISO_SYNONYMS: &[&[&str]] = &[
    &["Castillian", "Castilian", "Spanish"],
    &["Catalan", "Valencian"],
    &["Chichewa", "Chewa", "Nyanja"],
    &["Zhuang", "Chuang"],
    &["Church Slavic", "Old Slavonic", "Church Slavonic", "Old Bulgarian", "Old Church Slavonic"],
    &["Divehi", "Dhivehi", "Maldivian"],
    &["Dutch", "Flemish"],
    &["Gaelic", "Scottish Gaelic"],
    &["Kikuyu", "Gikuyu"],
    &["Kalaallisut", "Greenlandic"],
    &["Haitian", "Haitian Creole"],
    &["Kuanyama", "Kwanyama"],
    &["Kirghiz", "Kyrgyz"],
    &["Limburgan", "Limburger", "Limburgish"],
    &["Romanian", "Moldavian", "Moldovan"],
    &["Navajo", "Navaho"],
    &["Ndebele, North", "North Ndebele"],
    &["Ndebele, South", "South Ndebele"],
    &["Norwegian Nynorsk", "Nynorsk, Norwegian"],
    &["Sichuan Yi", "Nuosu"],
    &["Interlingue", "Occidental"],
    &["Ossetian", "Ossetic"],
    &["Panjabi", "Punjabi"],
    &["Pushto", "Pashto"],
    &["Sinhala", "Sinhalese"],
    &["Uighur", "Uyghur"],
];

/// Dataverse spellings that are not ISO names, mapped to one that is.
const DATAVERSE_SYNONYMS: &[(&str, &str)] = &[
    ("Bangla", "Bengali"),
    ("Fula", "Fulah"),
    ("Pulaar", "Fulah"),
    ("Pular", "Fulah"),
    ("Letzeburgesch", "Luxembourgish"),
    ("Persian (Farsi)", "Persian"),
    ("Sanskrit (Saṁskṛta)", "Sanskrit"),
    ("Tibetan Standard", "Tibetan"),
    ("Tibetan, Central", "Tibetan"),
    ("Greek (Modern)", "Modern Greek (1453-)"),
    ("Interlingua", "Interlingua (International Auxiliary Language Association)"),
    ("Malay", "Malay (macrolanguage)"),
    ("Nepali", "Nepali (macrolanguage)"),
    ("Occitan", "Occitan (post 1500)"),
    ("Oriya", "Oriya (macrolanguage)"),
    ("Swahili", "Swahili (macrolanguage)"),
    ("Tonga", "Tonga (Tonga Islands)"),
];

/// Lower-cased Dataverse spelling to its ISO name.
static DATAVERSE_BY_NAME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    DATAVERSE_SYNONYMS
        .iter()
        .map(|&(dataverse, iso)| (dataverse.to_lowercase(), iso))
        .collect()
});

/// Lower-cased ISO name to its other official names.
static SYNONYMS_BY_NAME: Lazy<HashMap<String, Vec<&'static str>>> = Lazy::new(|| {
    let mut synonyms = HashMap::new();
    for set in ISO_SYNONYMS {
        for &name in set.iter() {
            let others: Vec<&str> = set.iter().copied().filter(|&other| other != name).collect();
            synonyms.insert(name.to_lowercase(), others);
        }
    }
    synonyms
});

/// ISO 639-1 code of a registry name, or its ISO 639-3 code when the
/// language has no two-letter code.
fn registry_code(name: &str) -> Option<&'static str> {
    Language::from_name_lowercase(&name.to_ascii_lowercase())
        .map(|language| language.to_639_1().unwrap_or_else(|| language.to_639_3()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLanguage {
    /// ISO 639-1 code, or the three-letter code when no two-letter code exists
    pub code: String,
    pub uri: String,
}

impl ResolvedLanguage {
    fn from_code(code: &str) -> Self {
        let part = if code.len() <= 2 { 1 } else { 2 };
        Self {
            code: code.to_string(),
            uri: format!("{}/iso639-{}/{}", LOC_VOCABULARY, part, code),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageResolver;

impl LanguageResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve one raw language value, which may hold several
    /// comma-separated names.
    ///
    /// The whole value is first tried as a single name, since some ISO and
    /// Dataverse names themselves contain a comma (`"Ndebele, North"`).
    pub fn resolve(&self, raw: &str) -> MappingResult<Vec<ResolvedLanguage>> {
        if let Some(code) = self.lookup(raw.trim()) {
            return Ok(vec![ResolvedLanguage::from_code(code)]);
        }

        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                self.lookup(name)
                    .map(ResolvedLanguage::from_code)
                    .ok_or_else(|| MappingError::UnsupportedLanguage {
                        language: raw.to_string(),
                    })
            })
            .collect::<MappingResult<Vec<_>>>()
            .and_then(|resolved| {
                if resolved.is_empty() {
                    Err(MappingError::UnsupportedLanguage {
                        language: raw.to_string(),
                    })
                } else {
                    Ok(resolved)
                }
            })
    }

    /// Code for a single name, trying every synonym candidate in order.
    /// Names are compared case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<&'static str> {
        let canonical = DATAVERSE_BY_NAME
            .get(&name.to_lowercase())
            .copied()
            .unwrap_or(name);

        let candidates = std::iter::once(canonical).chain(
            SYNONYMS_BY_NAME
                .get(&canonical.to_lowercase())
                .into_iter()
                .flat_map(|others| others.iter().copied()),
        );

        for candidate in candidates {
            if NO_LANGUAGE_NAMES.contains(&candidate.to_lowercase().as_str()) {
                return Some(NO_LINGUISTIC_CONTENT);
            }
            if let Some(code) = registry_code(candidate) {
                debug!("Language '{}' resolved to '{}' via '{}'", name, code, candidate);
                return Some(code);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spanish_synonyms_agree() {
        let resolver = LanguageResolver::new();
        let spanish = resolver.resolve("Spanish").unwrap();
        let castillian = resolver.resolve("Castillian").unwrap();
        assert_eq!(spanish, castillian);
        assert_eq!(spanish[0].code, "es");
        assert_eq!(spanish[0].uri, "http://id.loc.gov/vocabulary/iso639-1/es");
    }

    #[test]
    fn test_no_language_sentinels_are_zxx() {
        let resolver = LanguageResolver::new();
        for name in ["Not applicable", "No linguistic content", "no linguistic content"] {
            let resolved = resolver.resolve(name).unwrap();
            assert_eq!(resolved[0].code, "zxx");
            assert_eq!(resolved[0].uri, "http://id.loc.gov/vocabulary/iso639-2/zxx");
        }
    }

    #[test]
    fn test_synonyms_ignore_case() {
        let resolver = LanguageResolver::new();
        assert_eq!(resolver.lookup("castillian"), Some("es"));
        assert_eq!(resolver.lookup("BANGLA"), Some("bn"));
        assert_eq!(resolver.lookup("greek (modern)"), Some("el"));
    }

    #[test]
    fn test_unknown_language_fails() {
        let resolver = LanguageResolver::new();
        assert_eq!(
            resolver.resolve("Martian").unwrap_err(),
            MappingError::UnsupportedLanguage {
                language: "Martian".to_string()
            }
        );
    }

    #[test]
    fn test_comma_separated_names() {
        let resolver = LanguageResolver::new();
        let resolved = resolver.resolve("English, French").unwrap();
        let codes: Vec<&str> = resolved.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "fr"]);
    }

    #[test]
    fn test_comma_separated_failure_reports_raw_value() {
        let resolver = LanguageResolver::new();
        match resolver.resolve("English, Martian") {
            Err(MappingError::UnsupportedLanguage { language }) => {
                assert_eq!(language, "English, Martian")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_comma_bearing_single_names() {
        let resolver = LanguageResolver::new();
        assert_eq!(resolver.resolve("Ndebele, North").unwrap()[0].code, "nd");
        assert_eq!(resolver.resolve("Tibetan, Central").unwrap()[0].code, "bo");
    }

    #[test]
    fn test_dataverse_spellings() {
        let resolver = LanguageResolver::new();
        assert_eq!(resolver.lookup("Bangla"), Some("bn"));
        assert_eq!(resolver.lookup("Greek (Modern)"), Some("el"));
        assert_eq!(resolver.lookup("Kyrgyz"), Some("ky"));
        assert_eq!(resolver.lookup("Flemish"), Some("nl"));
    }

    #[test]
    fn test_alpha_3_when_no_alpha_2() {
        let resolver = LanguageResolver::new();
        let cases = [
            ("Hawaiian", "haw"),
            ("Cherokee", "chr"),
            ("Filipino", "fil"),
            ("Ancient Greek (to 1453)", "grc"),
            ("Klingon", "tlh"),
        ];
        for (name, code) in cases {
            let resolved = resolver.resolve(name).unwrap();
            assert_eq!(resolved[0].code, code);
            assert_eq!(
                resolved[0].uri,
                format!("http://id.loc.gov/vocabulary/iso639-2/{}", code)
            );
        }
    }
}
