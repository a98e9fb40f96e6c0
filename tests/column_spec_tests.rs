use drill_rs::DrillError;
use drill_rs::core::{AggregationKind, COUNT_COLUMN, ColumnSpec};

#[test]
fn aggregation_labels_parse_into_kinds() {
    let avg: ColumnSpec = "avg(latency)".parse().expect("avg");
    assert_eq!(avg.kind, AggregationKind::Avg);
    assert_eq!(avg.name, "avg(latency)");
    assert_eq!(avg.field.as_deref(), Some("latency"));

    let sum: ColumnSpec = " $SUM( bytes ) ".parse().expect("sum");
    assert_eq!(sum.kind, AggregationKind::Sum);
    assert_eq!(sum.name, "$SUM( bytes )");
    assert_eq!(sum.field.as_deref(), Some("bytes"));

    let count: ColumnSpec = "$count".parse().expect("count");
    assert_eq!(count.kind, AggregationKind::Count);
    assert_eq!(count.field, None);
    assert_eq!(ColumnSpec::count().name, COUNT_COLUMN);
}

#[test]
fn unsupported_labels_are_rejected() {
    for label in ["p99(latency)", "avg", "sum()", "avg(latency", "distinct(host)"] {
        let result: Result<ColumnSpec, _> = label.parse();
        assert!(
            matches!(result, Err(DrillError::UnknownAggregation(_))),
            "{label} should be rejected"
        );
    }
}

#[test]
fn kinds_serialize_lowercase() {
    let json = serde_json::to_string(&ColumnSpec::avg("avg(latency)")).expect("serialize");
    assert_eq!(json, r#"{"name":"avg(latency)","kind":"avg"}"#);
    assert_eq!(AggregationKind::Sum.to_string(), "sum");
}
