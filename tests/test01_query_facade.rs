use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use wirequery::prelude::*;
use wirequery::test_utils::{MockResult, MockWire};

wirequery::query_record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct User {
        pub id: i64,
        pub name: String,
    }
}

wirequery::query_record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct DecimalRow {
        #[column = "value_double_col"]
        pub value_double: Numeric,
        #[column = "value_text_col"]
        pub value_text: Numeric,
    }
}

wirequery::query_record! {
    #[derive(Debug)]
    pub struct Event {
        pub at: DateTime<Utc>,
        pub local: DateTime<FixedOffset>,
    }
}

fn connection(wire: MockWire) -> Connection<MockWire> {
    Connection::new(wire, ConnectionOption::default())
}

#[test]
fn select_by_identifier_and_value() -> Result<(), Box<dyn std::error::Error>> {
    let mut wire = MockWire::new();
    wire.respond_rows(
        MockResult::new(&[("id", WireType::Long), ("name", WireType::VarString)])
            .row(&[Some("42"), Some("a")]),
    );
    let mut conn = connection(wire);

    let (users, status) = conn
        .query("SELECT * FROM ?? WHERE id = ?")
        .params(&["users".into(), 42.into()])
        .fetch::<User>()?;

    assert_eq!(
        users,
        vec![User {
            id: 42,
            name: "a".into()
        }]
    );
    assert_eq!(status.affected_rows, None);
    assert_eq!(
        conn.wire().sent(),
        &["SELECT * FROM `users` WHERE id = 42".to_string()]
    );
    assert_eq!(conn.wire().acquired(), 1);
    assert_eq!(conn.wire().released(), 1);
    Ok(())
}

#[test]
fn non_select_returns_status_without_rows() -> Result<(), Box<dyn std::error::Error>> {
    let mut wire = MockWire::new();
    wire.respond_status(1, 7);
    let mut conn = connection(wire);

    let (rows, status) = conn
        .query("INSERT INTO ?? (name) VALUES (?)")
        .params(&["users".into(), "b".into()])
        .raw()?;

    assert!(rows.is_empty());
    assert_eq!(status.affected_rows, Some(1));
    assert_eq!(status.inserted_id, 7);
    assert_eq!(conn.wire().acquired(), 0);
    assert_eq!(
        conn.wire().sent()[0],
        "INSERT INTO `users` (name) VALUES ('b')"
    );
    Ok(())
}

#[test]
fn status_only_discards_rows() -> Result<(), Box<dyn std::error::Error>> {
    let mut wire = MockWire::new();
    wire.respond_rows(
        MockResult::new(&[("blob", WireType::Blob)]).raw_row(vec![Some(vec![0xff, 0x00])]),
    );
    let mut conn = connection(wire);

    let status = conn.query("SELECT `blob` FROM t").status()?;
    assert_eq!(status.affected_rows, None);
    assert_eq!(conn.wire().released(), 1);
    Ok(())
}

#[test]
fn raw_rows_pair_fields_and_values() -> Result<(), Box<dyn std::error::Error>> {
    let mut wire = MockWire::new();
    wire.respond_rows(
        MockResult::new(&[
            ("id", WireType::LongLong),
            ("created", WireType::DateTime),
            ("note", WireType::VarString),
        ])
        .row(&[Some("1"), Some("2024-01-02 03:04:05"), None])
        .row(&[Some("2"), None, Some("x")]),
    );
    let mut conn = connection(wire);

    let (rows, _) = conn.query("SELECT * FROM t").raw()?;
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.fields().len(), row.values().len());
    }
    assert!(matches!(rows[0].get("created"), Some(FieldValue::Temporal { .. })));
    assert_eq!(rows[0].get("note"), Some(&FieldValue::Null));
    assert_eq!(rows[1].get("created"), Some(&FieldValue::Null));
    assert_eq!(rows[1].get("note"), Some(&FieldValue::Raw(b"x".to_vec())));
    Ok(())
}

fn decimal_round_trip(text: &str, double_echo: &str) -> Result<(), Box<dyn std::error::Error>> {
    let value: Numeric = text.parse()?;
    let row = DecimalRow {
        value_double: value.clone(),
        value_text: value.clone(),
    };

    let mut wire = MockWire::new();
    wire.respond_status(1, 1);
    let mut conn = connection(wire);
    conn.query("INSERT INTO ?? SET ? ")
        .params(&["decimal_test".into(), QueryParameter::set(&row)])
        .status()?;

    let sent = conn.wire().sent()[0].clone();
    assert_eq!(
        sent,
        format!(
            "INSERT INTO `decimal_test` SET `value_double_col` = {value}, `value_text_col` = {value} "
        )
    );

    // The DOUBLE column comes back in the server's float notation; the text column holds the
    // literal that was sent.
    let literal = value.to_string();
    conn.wire_mut().respond_rows(
        MockResult::new(&[
            ("id", WireType::Long),
            ("value_double_col", WireType::Double),
            ("value_text_col", WireType::Blob),
        ])
        .row(&[Some("1"), Some(double_echo), Some(literal.as_str())]),
    );
    let rows: Vec<DecimalRow> = conn
        .query("SELECT * FROM ?? ORDER BY id ASC")
        .params(&["decimal_test".into()])
        .rows()?;
    assert_eq!(rows[0], row);
    Ok(())
}

#[test]
fn decimal_values_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    decimal_round_trip("1.549", "1.549")
}

#[test]
fn decimal_values_beyond_float_range_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    decimal_round_trip("1.23e100", "1.23e100")
}

#[test]
fn per_call_time_zone_overrides_connection_default() -> Result<(), Box<dyn std::error::Error>> {
    let tokyo = FixedOffset::east_opt(9 * 3600).ok_or("offset")?;
    let instant = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).single().ok_or("instant")?;
    let fields = [("at", WireType::DateTime), ("local", WireType::Timestamp)];

    let mut wire = MockWire::new();
    wire.respond_rows(MockResult::new(&fields).row(&[
        Some("2024-03-02 08:30:00"),
        Some("2024-03-02 08:30:00"),
    ]));
    wire.respond_rows(MockResult::new(&fields).row(&[
        Some("2024-03-01 23:30:00"),
        Some("2024-03-01 23:30:00"),
    ]));
    let mut conn = connection(wire);

    let events: Vec<Event> = conn
        .query("SELECT at, local FROM events WHERE at = ?")
        .bind(instant)
        .option(QueryParameterOption::new(tokyo))
        .rows()?;
    assert_eq!(events[0].at, instant);
    assert_eq!(events[0].local.offset().local_minus_utc(), 9 * 3600);

    let events: Vec<Event> = conn
        .query("SELECT at, local FROM events WHERE at = ?")
        .bind(instant)
        .rows()?;
    assert_eq!(events[0].at, instant);
    assert_eq!(events[0].local.offset().local_minus_utc(), 0);

    assert_eq!(
        conn.wire().sent(),
        &[
            "SELECT at, local FROM events WHERE at = '2024-03-02 08:30:00'".to_string(),
            "SELECT at, local FROM events WHERE at = '2024-03-01 23:30:00'".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn connection_zone_applies_without_per_call_option() -> Result<(), Box<dyn std::error::Error>> {
    let option = ConnectionOption::from_json(r#"{"time_zone":"-05:00"}"#)?;
    let mut conn = Connection::new(MockWire::new(), option);
    let instant = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().ok_or("instant")?;

    let sql = conn.format("UPDATE t SET at = ? WHERE id = ?", &[instant.into(), 1.into()])?;
    assert_eq!(sql, "UPDATE t SET at = '2024-01-01 07:00:00' WHERE id = 1");

    let command = conn.query("SELECT ?").bind("o'k").to_command()?;
    assert_eq!(command, r"SELECT 'o\'k'");
    Ok(())
}
