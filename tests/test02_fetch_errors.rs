use wirequery::connection::RawField;
use wirequery::prelude::*;
use wirequery::test_utils::{MockResponse, MockResult, MockWire};

wirequery::query_record! {
    #[derive(Debug)]
    pub struct Named {
        pub id: i64,
        pub name: String,
    }
}

wirequery::query_record! {
    #[derive(Debug)]
    pub struct Price {
        pub amount: rust_decimal::Decimal,
    }
}

fn two_columns() -> MockResult {
    MockResult::new(&[("id", WireType::Long), ("name", WireType::VarString)])
}

fn run(wire: MockWire, option: ConnectionOption) -> (Result<(Vec<RowResult>, QueryStatus), QueryError>, MockWire) {
    let mut conn = Connection::new(wire, option);
    let result = conn.query("SELECT * FROM t WHERE id = ?").bind(1).raw();
    (result, conn.into_inner())
}

#[test]
fn rejected_command_carries_message_and_query() {
    let mut wire = MockWire::new();
    wire.reject("You have an error in your SQL syntax");
    let (result, _) = run(wire, ConnectionOption::default());

    match result {
        Err(QueryError::QueryExecution { message, query }) => {
            assert_eq!(message, "You have an error in your SQL syntax");
            assert_eq!(query, "SELECT * FROM t WHERE id = 1");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn omitted_details_hide_the_query() {
    let mut wire = MockWire::new();
    wire.reject("denied");
    let (result, _) = run(
        wire,
        ConnectionOption::default().with_omit_details_on_error(true),
    );

    match result {
        Err(QueryError::QueryExecution { query, .. }) => assert!(query.is_empty()),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn long_queries_are_truncated_in_errors() {
    let mut wire = MockWire::new();
    wire.reject("too long");
    let mut conn = Connection::new(wire, ConnectionOption::default());
    let long_text = "é".repeat(3000);

    let err = conn
        .query("SELECT ?")
        .bind(long_text.as_str())
        .status()
        .unwrap_err();
    match err {
        QueryError::QueryExecution { query, .. } => {
            assert_eq!(query.chars().count(), 1000);
            assert!(query.starts_with("SELECT '"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_result_with_fields_is_a_fetch_error() {
    let mut wire = MockWire::new();
    wire.push(MockResponse::MissingResult {
        field_count: 2,
        message: "Out of memory".into(),
    });
    let (result, wire) = run(wire, ConnectionOption::default());

    match result {
        Err(QueryError::ResultFetch { message, .. }) => assert_eq!(message, "Out of memory"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(wire.acquired(), 0);
}

#[test]
fn result_without_fields_is_rejected_and_released() {
    let mut wire = MockWire::new();
    wire.respond_rows(MockResult::new(&[]));
    let (result, wire) = run(wire, ConnectionOption::default());

    assert!(matches!(result, Err(QueryError::ResultNoField { .. })));
    assert_eq!(wire.acquired(), 1);
    assert_eq!(wire.released(), 1);
}

#[test]
fn undecodable_field_name_aborts_the_fetch() {
    let mut wire = MockWire::new();
    wire.respond_rows(
        MockResult::with_raw_fields(vec![
            RawField {
                name: Some(b"id".to_vec()),
                type_tag: WireType::Long.tag(),
            },
            RawField {
                name: Some(vec![0xff, 0xfe]),
                type_tag: WireType::VarString.tag(),
            },
        ])
        .row(&[Some("1"), Some("a")]),
    );
    let (result, wire) = run(wire, ConnectionOption::default());

    assert!(matches!(result, Err(QueryError::ResultFieldFetch { .. })));
    assert_eq!(wire.released(), 1);
}

#[test]
fn missing_field_name_or_metadata_aborts_the_fetch() {
    let mut wire = MockWire::new();
    wire.respond_rows(MockResult::with_raw_fields(vec![RawField {
        name: None,
        type_tag: WireType::Long.tag(),
    }]));
    wire.respond_rows(two_columns().without_metadata());
    wire.respond_rows(two_columns().num_fields(3));
    let mut conn = Connection::new(wire, ConnectionOption::default());

    for _ in 0..3 {
        let result = conn.query("SELECT 1").raw();
        assert!(matches!(result, Err(QueryError::ResultFieldFetch { .. })));
    }
    assert_eq!(conn.wire().acquired(), 3);
    assert_eq!(conn.wire().released(), 3);
}

#[test]
fn row_fetch_failure_discards_partial_rows() {
    let mut wire = MockWire::new();
    wire.respond_rows(
        two_columns()
            .row(&[Some("1"), Some("a")])
            .row(&[Some("2"), Some("b")])
            .fail_at_row(1),
    );
    let (result, wire) = run(wire, ConnectionOption::default());

    match result {
        Err(QueryError::ResultRowFetch { message, .. }) => {
            assert_eq!(message, "Lost connection to server during query");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(wire.released(), 1);
}

#[test]
fn short_row_is_a_parse_error() {
    let mut wire = MockWire::new();
    wire.respond_rows(two_columns().row(&[Some("1")]));
    let (result, wire) = run(wire, ConnectionOption::default());

    assert!(matches!(result, Err(QueryError::ResultParse { .. })));
    assert_eq!(wire.released(), 1);
}

#[test]
fn temporal_cell_must_be_text() {
    let mut wire = MockWire::new();
    wire.respond_rows(
        MockResult::new(&[("at", WireType::Date)]).raw_row(vec![Some(vec![0xff])]),
    );
    let (result, wire) = run(wire, ConnectionOption::default());

    assert!(matches!(result, Err(QueryError::ResultParse { .. })));
    assert_eq!(wire.released(), 1);
}

#[test]
fn format_errors_send_nothing() {
    let mut conn = Connection::new(MockWire::new(), ConnectionOption::default());

    let err = conn
        .query("SELECT * FROM ?? WHERE id = ?")
        .bind("t")
        .raw()
        .unwrap_err();
    assert!(matches!(err, QueryError::Format(_)));

    let err = conn.query("SELECT * FROM ??").bind(3).raw().unwrap_err();
    assert!(matches!(err, QueryError::Format(_)));
    assert!(conn.wire().sent().is_empty());
}

#[test]
fn null_into_required_member_fails_after_release() {
    let mut wire = MockWire::new();
    wire.respond_rows(two_columns().row(&[Some("1"), None]));
    let mut conn = Connection::new(wire, ConnectionOption::default());

    let err = conn.query("SELECT id, name FROM t").rows::<Named>().unwrap_err();
    match err {
        QueryError::Decode { column, value, .. } => {
            assert_eq!(column, "name");
            assert_eq!(value, "NULL");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(conn.wire().released(), 1);
}

#[test]
fn missing_column_is_a_decode_error() {
    let mut wire = MockWire::new();
    wire.respond_rows(MockResult::new(&[("id", WireType::Long)]).row(&[Some("1")]));
    let mut conn = Connection::new(wire, ConnectionOption::default());

    let err = conn.query("SELECT id FROM t").rows::<Named>().unwrap_err();
    assert!(matches!(err, QueryError::Decode { ref column, .. } if column == "name"));
}

#[test]
fn decimal_with_out_of_range_exponent_is_a_decode_error() {
    let mut wire = MockWire::new();
    wire.respond_rows(
        MockResult::new(&[("amount", WireType::NewDecimal)]).row(&[Some("10e9223372036854775807")]),
    );
    let mut conn = Connection::new(wire, ConnectionOption::default());

    let err = conn.query("SELECT amount FROM prices").rows::<Price>().unwrap_err();
    match err {
        QueryError::Decode { column, value, .. } => {
            assert_eq!(column, "amount");
            assert_eq!(value, "10e9223372036854775807");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(conn.wire().released(), 1);
}
