// crates/formwell-render/src/format.rs
// ============================================================================
// Module: Formwell Value Formatting
// Description: Per-type value formatting for rendered documents.
// Purpose: Render submitted values in a localized, print-friendly form.
// Dependencies: formwell-core, time
// ============================================================================

//! ## Overview
//! Document rendering formats each value by its declared field kind.
//! Booleans render as a localized two-option marker, dates follow the
//! locale pattern of the document language, radio choices list every
//! option with the selection marked, dropdown choices show only the chosen
//! label, and multi-choice values render as a marked list. Unknown or
//! unparseable values fall back to their raw text rather than failing the
//! document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use formwell_core::ChoiceOption;
use formwell_core::Language;
use formwell_core::Timestamp;
use time::Date;
use time::OffsetDateTime;
use time::macros::format_description;

// ============================================================================
// SECTION: Boolean Formatting
// ============================================================================

/// Renders a boolean as a localized two-option marker.
///
/// `true` in German renders as `(X) Ja   ( ) Nein`; `false` renders as
/// `( ) Ja   (X) Nein`.
#[must_use]
pub fn format_boolean(value: bool, language: Language) -> String {
    let yes_marker = if value { "(X)" } else { "( )" };
    let no_marker = if value { "( )" } else { "(X)" };
    format!("{yes_marker} {}   {no_marker} {}", language.yes_word(), language.no_word())
}

// ============================================================================
// SECTION: Date Formatting
// ============================================================================

/// Formats a canonical ISO date in the locale pattern of the language.
///
/// Values that do not parse as ISO dates are returned verbatim so stale
/// snapshots never fail a document.
#[must_use]
pub fn format_date(value: &str, language: Language) -> String {
    let iso = format_description!("[year]-[month]-[day]");
    let Ok(date) = Date::parse(value.trim(), iso) else {
        return value.to_string();
    };
    let formatted = match language {
        Language::En => date.format(format_description!("[month]/[day]/[year]")),
        Language::Fr | Language::It | Language::Es => {
            date.format(format_description!("[day]/[month]/[year]"))
        }
        _ => date.format(format_description!("[day].[month].[year]")),
    };
    formatted.unwrap_or_else(|_| value.to_string())
}

/// Formats a timestamp as a date-time stamp for signature metadata.
#[must_use]
pub fn format_timestamp(timestamp: Timestamp) -> String {
    let seconds = timestamp.as_unix_millis().div_euclid(1000);
    let Ok(moment) = OffsetDateTime::from_unix_timestamp(seconds) else {
        return timestamp.as_unix_millis().to_string();
    };
    moment
        .format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
        .unwrap_or_else(|_| timestamp.as_unix_millis().to_string())
}

// ============================================================================
// SECTION: Choice Formatting
// ============================================================================

/// Renders a radio choice: every option with the selected one marked.
#[must_use]
pub fn format_radio_choice(options: &[(String, bool)]) -> String {
    options
        .iter()
        .map(|(label, selected)| {
            let marker = if *selected { "(X)" } else { "( )" };
            format!("{marker} {label}")
        })
        .collect::<Vec<_>>()
        .join("   ")
}

/// Renders a dropdown choice: only the chosen option's display label.
#[must_use]
pub fn format_dropdown_choice(options: &[ChoiceOption], value: &str) -> String {
    options
        .iter()
        .find(|option| option.value == value)
        .map_or_else(|| value.to_string(), |option| option.label.clone())
}

/// Renders a multi-choice value as a marked list of the chosen items.
#[must_use]
pub fn format_multi_choice(labels: &[String]) -> String {
    labels.iter().map(|label| format!("[X] {label}")).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use formwell_core::Language;

    use super::format_boolean;
    use super::format_date;

    /// Verifies the German boolean marker from the engine contract.
    #[test]
    fn german_boolean_markers() {
        assert_eq!(format_boolean(true, Language::De), "(X) Ja   ( ) Nein");
        assert_eq!(format_boolean(false, Language::De), "( ) Ja   (X) Nein");
    }

    /// Verifies dates follow the locale pattern and fall back verbatim.
    #[test]
    fn locale_date_patterns() {
        assert_eq!(format_date("1990-05-13", Language::De), "13.05.1990");
        assert_eq!(format_date("1990-05-13", Language::En), "05/13/1990");
        assert_eq!(format_date("1990-05-13", Language::Fr), "13/05/1990");
        assert_eq!(format_date("not a date", Language::De), "not a date");
    }
}
