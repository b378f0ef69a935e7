//! Text manipulation utilities for working with Kconfig source lines.

/// Check if a character can be part of a symbol name.
///
/// Kconfig names may start with a digit and may contain `-`.
#[inline]
pub fn is_word_character(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Find the boundaries of a word at the given position.
///
/// Returns `Some((start, end))` where `start` is the character index of the word start
/// and `end` is the character index after the last word character.
/// Returns `None` if there is no word at the position.
pub fn find_word_boundaries(chars: &[char], position: usize) -> Option<(usize, usize)> {
    if position >= chars.len() || !is_word_character(chars[position]) {
        return None;
    }

    let mut start = position;
    while start > 0 && is_word_character(chars[start - 1]) {
        start -= 1;
    }

    let mut end = position;
    while end < chars.len() && is_word_character(chars[end]) {
        end += 1;
    }

    Some((start, end))
}

/// Extract the word at the cursor position in a line of text.
///
/// # Example
/// ```
/// use kconfig::ide::text_utils::extract_word_at_cursor;
///
/// let line = "\tdepends on FOO && BAR";
/// assert_eq!(extract_word_at_cursor(line, 12), Some("FOO".to_string()));
/// assert_eq!(extract_word_at_cursor(line, 15), None);
/// ```
pub fn extract_word_at_cursor(line: &str, position: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let (start, end) = find_word_boundaries(&chars, position)?;
    Some(chars[start..end].iter().collect())
}

/// The partial word immediately left of the cursor and the text before it.
///
/// `column` counts characters. Returns `(head, prefix)`.
pub fn split_at_word_prefix(line: &str, column: usize) -> (String, String) {
    let chars: Vec<char> = line.chars().take(column).collect();
    let mut start = chars.len();
    while start > 0 && is_word_character(chars[start - 1]) {
        start -= 1;
    }
    (
        chars[..start].iter().collect(),
        chars[start..].iter().collect(),
    )
}

/// Whether the end of `text` lies inside a quoted string.
pub fn inside_string(text: &str) -> bool {
    let mut quote = None;
    let mut escaped = false;
    for c in text.chars() {
        match (quote, c) {
            (Some(_), _) if escaped => escaped = false,
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => return false,
            _ => {}
        }
    }
    quote.is_some()
}

/// Whether the end of `text` lies inside a `#` comment.
pub fn inside_comment(text: &str) -> bool {
    let mut quote = None;
    let mut escaped = false;
    for c in text.chars() {
        match (quote, c) {
            (Some(_), _) if escaped => escaped = false,
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => return true,
            _ => {}
        }
    }
    false
}
