use std::borrow::Cow;

mod escape;
mod scanner;

pub use escape::{escape_identifier, escape_string, render_value};

use scanner::{
    State, is_block_comment_end, is_block_comment_start, is_line_comment_start, step_quoted,
};

use crate::error::QueryError;
use crate::options::QueryParameterOption;
use crate::params::QueryParameter;

/// Kind of placeholder found in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?`, replaced by an escaped literal.
    Value,
    /// `??`, replaced by a quoted identifier.
    Identifier,
}

/// Substitute `?` and `??` placeholders with the given parameters, in order.
///
/// Placeholders inside quoted strings, backticked identifiers and comments are left alone.
/// Returns a borrowed `Cow` when the template has no placeholders and no parameters:
/// ```rust
/// use wirequery::prelude::*;
///
/// let sql = format_query(
///     "SELECT * FROM ?? WHERE id = ? AND note = '?'",
///     &["users".into(), 42.into()],
///     &QueryParameterOption::default(),
/// )
/// .unwrap();
/// assert_eq!(sql, "SELECT * FROM `users` WHERE id = 42 AND note = '?'");
/// ```
///
/// # Errors
/// Returns `QueryError::Format` when the placeholder and parameter counts differ or when a
/// parameter cannot be used at its placeholder.
pub fn format_query<'a>(
    template: &'a str,
    params: &[QueryParameter],
    option: &QueryParameterOption,
) -> Result<Cow<'a, str>, QueryError> {
    let bytes = template.as_bytes();
    let mut out: Option<String> = None;
    let mut copied_to = 0;
    let mut next_param = 0;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backticked,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment;
                    idx += 1;
                }
                b'?' => {
                    let placeholder = if bytes.get(idx + 1) == Some(&b'?') {
                        Placeholder::Identifier
                    } else {
                        Placeholder::Value
                    };
                    let param = params.get(next_param).ok_or_else(|| {
                        QueryError::Format(format!(
                            "placeholder #{} has no parameter ({} given)",
                            next_param + 1,
                            params.len()
                        ))
                    })?;
                    let rendered = render_placeholder(placeholder, param, next_param, option)?;

                    let buf = out.get_or_insert_with(|| String::with_capacity(template.len() + 16));
                    buf.push_str(&template[copied_to..idx]);
                    buf.push_str(&rendered);
                    next_param += 1;
                    idx += match placeholder {
                        Placeholder::Value => 1,
                        Placeholder::Identifier => 2,
                    };
                    copied_to = idx;
                    continue;
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted | State::Backticked => {
                let quote = match state {
                    State::SingleQuoted => b'\'',
                    State::DoubleQuoted => b'"',
                    _ => b'`',
                };
                let (next, closed) = step_quoted(bytes, idx, quote);
                if closed {
                    state = State::Normal;
                }
                idx = next;
                continue;
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    if next_param != params.len() {
        return Err(QueryError::Format(format!(
            "template has {next_param} placeholders but {} parameters were given",
            params.len()
        )));
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&template[copied_to..]);
            Ok(Cow::Owned(buf))
        }
        None => Ok(Cow::Borrowed(template)),
    }
}

fn render_placeholder(
    placeholder: Placeholder,
    param: &QueryParameter,
    position: usize,
    option: &QueryParameterOption,
) -> Result<String, QueryError> {
    match placeholder {
        Placeholder::Value => render_value(param, option),
        Placeholder::Identifier => match param.as_text() {
            Some(name) if !name.is_empty() => Ok(escape_identifier(name)),
            Some(_) => Err(QueryError::Format(format!(
                "identifier parameter #{} is empty",
                position + 1
            ))),
            None => Err(QueryError::Format(format!(
                "identifier parameter #{} must be text, got {}",
                position + 1,
                param.kind()
            ))),
        },
    }
}
