//! Script-based locale detection for prompt-template selection.

/// Language variant a prompt template is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Hebrew,
    English,
}

/// Detect the locale of a text sample.
///
/// Hebrew wins if any character falls in the Hebrew Unicode block
/// (U+0590..=U+05FF); otherwise English. Empty input is English.
pub fn detect_locale(text: &str) -> Locale {
    if text.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c)) {
        Locale::Hebrew
    } else {
        Locale::English
    }
}
