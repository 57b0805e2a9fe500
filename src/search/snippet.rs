/// Characters of context kept on each side of a match
pub const CONTEXT_CHARS: usize = 100;

/// A match inside a text plus its surrounding context, all borrowed from the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Leftmost case-insensitive occurrence of `query` in `text`.
///
/// Offsets are counted in chars: the match spans as many chars as the query,
/// and up to [`CONTEXT_CHARS`] chars are taken on each side, clipped to the
/// text. The returned slices keep the text's original casing.
pub fn find_snippet<'a>(text: &'a str, query: &str) -> Option<Snippet<'a>> {
    let query: Vec<char> = query.chars().collect();
    if query.is_empty() {
        return None;
    }

    // Byte offset of every char boundary, including the end of the text
    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).chain([text.len()]).collect();
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < query.len() {
        return None;
    }

    let start = (0..=chars.len() - query.len()).find(|&start| {
        chars[start..start + query.len()].iter().zip(&query).all(|(&a, &b)| chars_eq_ignore_case(a, b))
    })?;
    let end = start + query.len();

    let context_start = start.saturating_sub(CONTEXT_CHARS);
    let context_end = (end + CONTEXT_CHARS).min(chars.len());

    Some(Snippet {
        before: &text[boundaries[context_start]..boundaries[start]],
        matched: &text[boundaries[start]..boundaries[end]],
        after: &text[boundaries[end]..boundaries[context_end]],
    })
}
