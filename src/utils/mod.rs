//! Utility functions and helpers.

pub mod http;
pub mod retry;

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace Spanish accented vowels with their plain forms.
pub fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'Á' => 'A',
            'É' => 'E',
            'Í' => 'I',
            'Ó' => 'O',
            'Ú' | 'Ü' => 'U',
            other => other,
        })
        .collect()
}

/// Text between `start` (inclusive) and the next `end` after it, or the end
/// of `text`. Whitespace is normalized.
pub fn section_between(text: &str, start: &str, end: &str) -> Option<String> {
    let start_idx = text.find(start)?;
    let after = start_idx + start.len();
    let end_idx = text[after..]
        .find(end)
        .map(|i| after + i)
        .unwrap_or(text.len());
    Some(normalize_whitespace(&text[start_idx..end_idx]))
}
