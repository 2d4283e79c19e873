// crates/formwell-core/src/core/language.rs
// ============================================================================
// Module: Formwell Languages
// Description: Closed set of supported form languages with text direction.
// Purpose: Provide stable language tags for translations and rendering.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Formwell supports a fixed, closed set of languages. Each language carries
//! a stable wire tag and a text direction flag; right-to-left languages get
//! the matching direction attribute in rendered markup. Localized yes/no
//! words used by document formatting live here so every consumer agrees on
//! the same vocabulary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Text Direction
// ============================================================================

/// Text direction of a supported language.
///
/// # Invariants
/// - Variants are stable for serialization and markup generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    /// Left-to-right scripts.
    LeftToRight,
    /// Right-to-left scripts.
    RightToLeft,
}

impl TextDirection {
    /// Returns the HTML `dir` attribute value for the direction.
    #[must_use]
    pub const fn html_dir(self) -> &'static str {
        match self {
            Self::LeftToRight => "ltr",
            Self::RightToLeft => "rtl",
        }
    }
}

// ============================================================================
// SECTION: Language
// ============================================================================

/// Supported form language.
///
/// # Invariants
/// - The set is closed; adding a language is a code change, not data.
/// - Wire tags are stable lowercase ISO 639-1 codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// German.
    De,
    /// English.
    En,
    /// French.
    Fr,
    /// Italian.
    It,
    /// Spanish.
    Es,
    /// Turkish.
    Tr,
    /// Russian.
    Ru,
    /// Polish.
    Pl,
    /// Arabic.
    Ar,
}

/// Every supported language in stable order.
pub const ALL_LANGUAGES: [Language; 9] = [
    Language::De,
    Language::En,
    Language::Fr,
    Language::It,
    Language::Es,
    Language::Tr,
    Language::Ru,
    Language::Pl,
    Language::Ar,
];

impl Language {
    /// Returns the stable lowercase language tag.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
            Self::Fr => "fr",
            Self::It => "it",
            Self::Es => "es",
            Self::Tr => "tr",
            Self::Ru => "ru",
            Self::Pl => "pl",
            Self::Ar => "ar",
        }
    }

    /// Parses a language tag (case-insensitive).
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lowered = tag.trim().to_ascii_lowercase();
        ALL_LANGUAGES.into_iter().find(|language| language.as_tag() == lowered)
    }

    /// Returns the text direction of the language.
    #[must_use]
    pub const fn direction(self) -> TextDirection {
        match self {
            Self::Ar => TextDirection::RightToLeft,
            _ => TextDirection::LeftToRight,
        }
    }

    /// Returns the localized affirmative word used in document formatting.
    #[must_use]
    pub const fn yes_word(self) -> &'static str {
        match self {
            Self::De => "Ja",
            Self::En => "Yes",
            Self::Fr => "Oui",
            Self::It => "Sì",
            Self::Es => "Sí",
            Self::Tr => "Evet",
            Self::Ru => "Да",
            Self::Pl => "Tak",
            Self::Ar => "نعم",
        }
    }

    /// Returns the localized negative word used in document formatting.
    #[must_use]
    pub const fn no_word(self) -> &'static str {
        match self {
            Self::De => "Nein",
            Self::En => "No",
            Self::Fr => "Non",
            Self::It => "No",
            Self::Es => "No",
            Self::Tr => "Hayır",
            Self::Ru => "Нет",
            Self::Pl => "Nie",
            Self::Ar => "لا",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}
