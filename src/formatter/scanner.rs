/// Lexical context of the template cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment,
}

/// `-- ` only opens a comment when followed by whitespace or the end of input.
pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx) {
        Some(b'#') => true,
        Some(b'-') => {
            bytes.get(idx + 1) == Some(&b'-')
                && bytes
                    .get(idx + 2)
                    .is_none_or(|b| b.is_ascii_whitespace())
        }
        _ => false,
    }
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Advance over one byte inside a quoted span closed by `quote`.
///
/// Returns the next index to inspect and whether the span closed. Backslash escapes apply
/// to string literals but not to backticked identifiers; a doubled quote is an escape in both.
pub(super) fn step_quoted(bytes: &[u8], idx: usize, quote: u8) -> (usize, bool) {
    let b = bytes[idx];
    if b == b'\\' && quote != b'`' {
        return (idx + 2, false);
    }
    if b == quote {
        if bytes.get(idx + 1) == Some(&quote) {
            return (idx + 2, false);
        }
        return (idx + 1, true);
    }
    (idx + 1, false)
}
