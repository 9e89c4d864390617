use std::fmt::Write;

use crate::error::QueryError;
use crate::options::QueryParameterOption;
use crate::params::QueryParameter;

/// Quote a string literal, backslash-escaping every byte that could end or corrupt it.
#[must_use]
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Quote an identifier with backticks; `db.table` is quoted per segment.
#[must_use]
pub fn escape_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for (i, segment) in name.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push('`');
        out.push_str(&segment.replace('`', "``"));
        out.push('`');
    }
    out
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out.push('\'');
    out
}

fn float_literal(value: f64) -> Result<String, QueryError> {
    if !value.is_finite() {
        return Err(QueryError::Format(format!(
            "float parameter {value} has no SQL literal"
        )));
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
        Ok(format!("{value:e}"))
    } else {
        Ok(value.to_string())
    }
}

/// Literal for a value placeholder.
///
/// # Errors
/// Returns `QueryError::Format` for non-finite floats, empty sets, and sets nested in sets.
pub fn render_value(
    param: &QueryParameter,
    option: &QueryParameterOption,
) -> Result<String, QueryError> {
    match param {
        QueryParameter::Set(pairs) => render_set(pairs, option),
        scalar => render_scalar(scalar, option),
    }
}

fn render_set(
    pairs: &[(String, QueryParameter)],
    option: &QueryParameterOption,
) -> Result<String, QueryError> {
    if pairs.is_empty() {
        return Err(QueryError::Format("set parameter has no columns".to_string()));
    }
    let mut out = String::new();
    for (i, (column, value)) in pairs.iter().enumerate() {
        if let QueryParameter::Set(_) = value {
            return Err(QueryError::Format(format!(
                "set parameter column `{column}` holds a nested set"
            )));
        }
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&escape_identifier(column));
        out.push_str(" = ");
        out.push_str(&render_scalar(value, option)?);
    }
    Ok(out)
}

fn render_scalar(
    param: &QueryParameter,
    option: &QueryParameterOption,
) -> Result<String, QueryError> {
    let literal = match param {
        QueryParameter::Null => "NULL".to_string(),
        QueryParameter::Bool(b) => b.to_string(),
        QueryParameter::Int(i) => i.to_string(),
        QueryParameter::UInt(u) => u.to_string(),
        QueryParameter::Float(f) => float_literal(*f)?,
        QueryParameter::Numeric(n) => n.to_string(),
        QueryParameter::Text(s) => escape_string(s),
        QueryParameter::Bytes(bytes) => hex_literal(bytes),
        QueryParameter::DateTime(dt) => format!(
            "'{}'",
            dt.with_timezone(&option.time_zone)
                .format("%Y-%m-%d %H:%M:%S%.f")
        ),
        QueryParameter::NaiveDateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        QueryParameter::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        QueryParameter::Time(t) => format!("'{}'", t.format("%H:%M:%S%.f")),
        QueryParameter::Json(v) => escape_string(&v.to_string()),
        QueryParameter::Set(_) => {
            return Err(QueryError::Format(
                "set parameter is only allowed at a value placeholder".to_string(),
            ));
        }
    };
    Ok(literal)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    use super::*;

    fn utc() -> QueryParameterOption {
        QueryParameterOption::default()
    }

    #[test]
    fn strings_cannot_break_out() {
        assert_eq!(escape_string("it's"), r"'it\'s'");
        assert_eq!(escape_string("a\\' OR 1=1 --"), r"'a\\\' OR 1=1 --'");
        assert_eq!(escape_string("line\nnext\0"), r"'line\nnext\0'");
        assert_eq!(escape_string("\"q\""), r#"'\"q\"'"#);
    }

    #[test]
    fn identifiers_are_backticked() {
        assert_eq!(escape_identifier("my_table"), "`my_table`");
        assert_eq!(escape_identifier("db.my_table"), "`db`.`my_table`");
        assert_eq!(escape_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn scalars() {
        let o = utc();
        assert_eq!(render_value(&QueryParameter::Null, &o).unwrap(), "NULL");
        assert_eq!(render_value(&QueryParameter::Int(-3), &o).unwrap(), "-3");
        assert_eq!(render_value(&QueryParameter::Float(1.5), &o).unwrap(), "1.5");
        assert_eq!(render_value(&QueryParameter::Float(1e100), &o).unwrap(), "1e100");
        assert!(render_value(&QueryParameter::Float(f64::NAN), &o).is_err());
        assert_eq!(
            render_value(&QueryParameter::Bytes(vec![0, 0xab]), &o).unwrap(),
            "X'00AB'"
        );
        assert_eq!(
            render_value(&QueryParameter::Numeric("1.23e100".parse().unwrap()), &o).unwrap(),
            "1.23E+100"
        );
        assert_eq!(
            render_value(&QueryParameter::Json(serde_json::json!({"k": "v"})), &o).unwrap(),
            r#"'{\"k\":\"v\"}'"#
        );
    }

    #[test]
    fn dates_follow_the_call_time_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        let tokyo = QueryParameterOption::new(FixedOffset::east_opt(9 * 3600).unwrap());
        assert_eq!(
            render_value(&QueryParameter::DateTime(instant), &utc()).unwrap(),
            "'2024-03-01 23:30:00'"
        );
        assert_eq!(
            render_value(&QueryParameter::DateTime(instant), &tokyo).unwrap(),
            "'2024-03-02 08:30:00'"
        );
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            render_value(&QueryParameter::Date(day), &tokyo).unwrap(),
            "'2024-03-01'"
        );
    }

    #[test]
    fn sets_expand_to_assignments() {
        let set = QueryParameter::Set(vec![
            ("id".into(), QueryParameter::Int(1)),
            ("name".into(), QueryParameter::Text("o'k".into())),
            ("gone".into(), QueryParameter::Null),
        ]);
        assert_eq!(
            render_value(&set, &utc()).unwrap(),
            r"`id` = 1, `name` = 'o\'k', `gone` = NULL"
        );
        assert!(render_value(&QueryParameter::Set(vec![]), &utc()).is_err());
        let nested = QueryParameter::Set(vec![("x".into(), set)]);
        assert!(matches!(
            render_value(&nested, &utc()),
            Err(QueryError::Format(_))
        ));
    }
}
