//! Delimiter finding for bracketed patterns using memchr
//!
//! Double-quoted runs in the modifier part of an expression (after its
//! first `:`) are opaque: brackets, colons and commas inside them have no
//! syntactic meaning. A backslash inside quotes protects the next byte. A
//! quote that never closes, or one in the key, is an ordinary character.

/// How the expression opened at some `[` ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionEnd {
    /// Closed by the `]` at this position
    Close(usize),
    /// Another `[` at this position opens before any `]`
    Reopen(usize),
    /// No `]` follows
    Unterminated,
}

/// Find where the expression body starting at `start` ends
#[must_use]
pub fn find_expression_end(haystack: &[u8], start: usize) -> ExpressionEnd {
    // Quotes only open in the modifier part
    let mut pos = match find_bytes3(haystack, b']', b'[', b':', start) {
        Some((found, b']')) => return ExpressionEnd::Close(found),
        Some((found, b'[')) => return ExpressionEnd::Reopen(found),
        Some((found, _)) => found + 1,
        None => return ExpressionEnd::Unterminated,
    };

    while let Some((found, byte)) = find_bytes3(haystack, b']', b'[', b'"', pos) {
        match byte {
            b']' => return ExpressionEnd::Close(found),
            b'[' => return ExpressionEnd::Reopen(found),
            _ => {
                pos = find_closing_quote(haystack, found + 1).map_or(found + 1, |end| end + 1);
            }
        }
    }

    ExpressionEnd::Unterminated
}

/// Find the `"` closing a quoted run whose content starts at `start`
#[must_use]
pub fn find_closing_quote(haystack: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;

    while let Some((found, byte)) = find_bytes2(haystack, b'"', b'\\', pos) {
        if byte == b'"' {
            return Some(found);
        }
        // Skip the escaped byte
        pos = found + 2;
    }

    None
}

/// Find `needle` outside of quoted runs
#[must_use]
pub fn find_unquoted(haystack: &[u8], needle: u8, start: usize) -> Option<usize> {
    let mut pos = start;

    while let Some((found, byte)) = find_bytes2(haystack, needle, b'"', pos) {
        if byte == needle {
            return Some(found);
        }
        pos = find_closing_quote(haystack, found + 1).map_or(found + 1, |end| end + 1);
    }

    None
}

/// Split `input` at every `sep` byte outside of quoted runs
#[must_use]
pub fn split_unquoted(input: &str, sep: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;

    while let Some(found) = find_unquoted(bytes, sep, start) {
        parts.push(&input[start..found]);
        start = found + 1;
    }
    parts.push(&input[start..]);

    parts
}

/// Find a single specific delimiter
#[must_use]
pub fn find_byte(haystack: &[u8], needle: u8, start: usize) -> Option<usize> {
    if start >= haystack.len() {
        return None;
    }

    memchr::memchr(needle, &haystack[start..]).map(|pos| start + pos)
}

/// Find any of 2 delimiters
#[must_use]
pub fn find_bytes2(haystack: &[u8], needle1: u8, needle2: u8, start: usize) -> Option<(usize, u8)> {
    if start >= haystack.len() {
        return None;
    }

    memchr::memchr2(needle1, needle2, &haystack[start..])
        .map(|pos| (start + pos, haystack[start + pos]))
}

/// Find any of 3 delimiters
#[must_use]
pub fn find_bytes3(
    haystack: &[u8],
    needle1: u8,
    needle2: u8,
    needle3: u8,
    start: usize,
) -> Option<(usize, u8)> {
    if start >= haystack.len() {
        return None;
    }

    memchr::memchr3(needle1, needle2, needle3, &haystack[start..])
        .map(|pos| (start + pos, haystack[start + pos]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_expression_end() {
        assert_eq!(find_expression_end(b"[year]_x", 1), ExpressionEnd::Close(5));
        assert_eq!(find_expression_end(b"[auth_[firstpage]", 1), ExpressionEnd::Reopen(6));
        assert_eq!(find_expression_end(b"[firstpage", 1), ExpressionEnd::Unterminated);
        assert_eq!(find_expression_end(b"[", 1), ExpressionEnd::Unterminated);
    }

    #[test]
    fn test_brackets_inside_quotes_are_ignored() {
        let input = br#"[title:regex("[0-9]]", "")]"#;
        assert_eq!(find_expression_end(input, 1), ExpressionEnd::Close(input.len() - 1));
    }

    #[test]
    fn test_quotes_in_key_are_ordinary() {
        assert_eq!(find_expression_end(br#"[a"b]_[year]"#, 1), ExpressionEnd::Close(4));
        assert_eq!(find_expression_end(br#"[a"b[year]"#, 1), ExpressionEnd::Reopen(4));
        assert_eq!(
            find_expression_end(br#"[a"b:lower]"#, 1),
            ExpressionEnd::Close(10)
        );
    }

    #[test]
    fn test_unclosed_quote_is_ordinary() {
        let input = br#"[title:regex("a]"#;
        assert_eq!(find_expression_end(input, 1), ExpressionEnd::Close(15));
    }

    #[test]
    fn test_find_closing_quote_skips_escapes() {
        let input = br#"a\"b" rest"#;
        assert_eq!(find_closing_quote(input, 0), Some(4));
        assert_eq!(find_closing_quote(b"open", 0), None);
        assert_eq!(find_closing_quote(b"trailing\\", 0), None);
    }

    #[test]
    fn test_split_unquoted() {
        assert_eq!(split_unquoted("journal:lower", b':'), vec!["journal", "lower"]);
        assert_eq!(
            split_unquoted(r#"title:regex(":", "-"):upper"#, b':'),
            vec!["title", r#"regex(":", "-")"#, "upper"]
        );
        assert_eq!(split_unquoted(":", b':'), vec!["", ""]);
        assert_eq!(split_unquoted("", b':'), vec![""]);
    }

    #[test]
    fn test_specialized_searches() {
        let input = b"test [nested] string";

        assert_eq!(find_byte(input, b'[', 0), Some(5));
        assert_eq!(find_byte(input, b']', 13), None);
        assert_eq!(find_bytes2(input, b']', b'[', 6), Some((12, b']')));
        assert_eq!(find_bytes3(input, b'x', b'y', b'z', 0), None);
    }
}
