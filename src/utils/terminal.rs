//! Terminal output sanitization
//!
//! Log content is user-controlled. Anything printed by the CLI goes through
//! these helpers so escape sequences embedded in a session cannot take over
//! the terminal.

/// Strips ANSI CSI sequences (`ESC [ ... letter`) and control characters other
/// than tab, newline and carriage return
///
/// # Examples
///
/// ```
/// use agent_history_search::utils::terminal::strip_ansi_codes;
///
/// assert_eq!(strip_ansi_codes("\x1b[31mRed\x1b[0m"), "Red");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r') {
            continue;
        }
        result.push(ch);
    }

    result
}

/// Sanitized text folded onto one line, for result listings
pub fn single_line(text: &str) -> String {
    strip_ansi_codes(text)
        .chars()
        .map(|ch| if matches!(ch, '\t' | '\n' | '\r') { ' ' } else { ch })
        .collect()
}
