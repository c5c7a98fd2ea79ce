//! Multiloc (translation map) validation.
//!
//! A multiloc maps a locale code to a piece of text (often HTML), e.g.
//! `{"en": "<p>Hello</p>", "nl-BE": "<p>Hallo</p>"}`. Validation works on
//! raw JSON so that `null` values and non-object payloads can be reported
//! as field-level errors instead of failing deserialization.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Locale code to text.
pub type Multiloc = BTreeMap<String, String>;

/// Locales content may be written in.
pub const SUPPORTED_LOCALES: &[&str] = &[
    "en", "en-GB", "en-CA", "nl-BE", "nl-NL", "fr-BE", "fr-FR", "de-DE", "da-DK", "nb-NO",
    "es-ES", "it-IT", "pt-BR", "pl-PL",
];

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// A length constraint applied to every translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRule {
    /// Inclusive range.
    In { min: usize, max: usize },
    Is(usize),
    Maximum(usize),
    Minimum(usize),
}

/// Rules for one multiloc field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultilocRules {
    /// At least one locale must carry text content.
    pub presence: bool,
    pub lengths: Vec<LengthRule>,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum MultilocError {
    ContainsNilValues { locales: Vec<String> },
    NotATranslationHash,
    UnsupportedLocales { locales: Vec<String> },
    Blank,
    TooShort { minimum: usize },
    TooLong { maximum: usize },
    WrongLength { is: usize },
}

impl MultilocError {
    pub fn message(&self) -> String {
        match self {
            MultilocError::ContainsNilValues { locales } => format!(
                "nil values (for {locales:?}) cannot be accepted. Either the key should be \
                 removed, or the value should be replaced by an empty string"
            ),
            MultilocError::NotATranslationHash => "is not a translation hash".to_string(),
            MultilocError::UnsupportedLocales { locales } => {
                format!("contains unsupported locales {locales:?}")
            }
            MultilocError::Blank => "should be set for at least one locale".to_string(),
            MultilocError::TooShort { minimum } => {
                format!("is too short (minimum is {minimum} characters)")
            }
            MultilocError::TooLong { maximum } => {
                format!("is too long (maximum is {maximum} characters)")
            }
            MultilocError::WrongLength { is } => {
                format!("is the wrong length (should be {is} characters)")
            }
        }
    }
}

/// Whether an HTML fragment has visible text once tags are stripped.
pub fn html_with_content(html: &str) -> bool {
    let text = HTML_TAG_RE.replace_all(html, "");
    !text.replace("&nbsp;", " ").trim().is_empty()
}

/// Validate a raw multiloc value against `rules`.
///
/// Returns the parsed map (`None` for an absent, optional value) or every
/// error found.
pub fn validate_multiloc(
    value: Option<&serde_json::Value>,
    rules: &MultilocRules,
) -> Result<Option<Multiloc>, Vec<MultilocError>> {
    let mut errors = Vec::new();

    let object = match value {
        Some(serde_json::Value::Object(map)) => Some(map),
        None | Some(serde_json::Value::Null) if !rules.presence => return Ok(None),
        _ => None,
    };

    let Some(object) = object else {
        errors.push(MultilocError::NotATranslationHash);
        return Err(errors);
    };

    let nil_locales: Vec<String> = object
        .iter()
        .filter(|(_, v)| v.is_null())
        .map(|(k, _)| k.clone())
        .collect();
    if !nil_locales.is_empty() {
        errors.push(MultilocError::ContainsNilValues {
            locales: nil_locales,
        });
    }

    let mut multiloc = Multiloc::new();
    for (locale, text) in object {
        match text {
            serde_json::Value::String(s) => {
                multiloc.insert(locale.clone(), s.clone());
            }
            serde_json::Value::Null => {}
            _ => {
                errors.push(MultilocError::NotATranslationHash);
                return Err(errors);
            }
        }
    }

    let unsupported: Vec<String> = object
        .keys()
        .filter(|l| !SUPPORTED_LOCALES.contains(&l.as_str()))
        .cloned()
        .collect();

    if !unsupported.is_empty() {
        errors.push(MultilocError::UnsupportedLocales {
            locales: unsupported,
        });
    } else if rules.presence && !multiloc.values().any(|text| html_with_content(text)) {
        errors.push(MultilocError::Blank);
    } else {
        for rule in &rules.lengths {
            check_length(&multiloc, *rule, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(Some(multiloc))
    } else {
        Err(errors)
    }
}

fn check_length(multiloc: &Multiloc, rule: LengthRule, errors: &mut Vec<MultilocError>) {
    let lengths = || multiloc.values().map(|v| v.chars().count());
    match rule {
        LengthRule::In { min, max } => {
            if lengths().any(|n| n < min) {
                errors.push(MultilocError::TooShort { minimum: min });
            }
            if lengths().any(|n| n > max) {
                errors.push(MultilocError::TooLong { maximum: max });
            }
        }
        LengthRule::Is(is) => {
            if lengths().any(|n| n != is) {
                errors.push(MultilocError::WrongLength { is });
            }
        }
        LengthRule::Maximum(max) => {
            if lengths().any(|n| n > max) {
                errors.push(MultilocError::TooLong { maximum: max });
            }
        }
        LengthRule::Minimum(min) => {
            if lengths().any(|n| n < min) {
                errors.push(MultilocError::TooShort { minimum: min });
            }
        }
    }
}
