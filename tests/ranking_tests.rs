use drill_rs::core::{
    AggregationKind, ColumnSpec, DuplicateGroupPolicy, GroupKey, RankOrder, RankedEntry,
    RankingTotals, Row, build_snapshot, rank_impacts,
};

fn totals() -> RankingTotals {
    RankingTotals {
        column: "avg(latency)".to_owned(),
        kind: AggregationKind::Avg,
        total: 10.0,
        count: 2.0,
        reference_value: Some(5.0),
        groups: 4,
    }
}

fn keys(ranking: &drill_rs::core::Ranking) -> Vec<String> {
    ranking.groups().map(|(key, _)| key.to_string()).collect()
}

#[test]
fn totals_entry_is_always_first() {
    let ranking = rank_impacts(
        totals(),
        vec![(GroupKey::from("a"), Some(0.5))],
        RankOrder::Descending,
    );

    assert!(matches!(&ranking.entries[0], RankedEntry::Totals(t) if t.groups == 4));
    assert_eq!(ranking.totals(), Some(&totals()));
    assert_eq!(ranking.position(&GroupKey::from("a")), Some(0));
}

#[test]
fn equal_magnitudes_keep_discovery_order() {
    let impacts = vec![
        (GroupKey::from("first"), Some(0.2)),
        (GroupKey::from("big"), Some(-0.8)),
        (GroupKey::from("second"), Some(-0.2)),
        (GroupKey::from("third"), Some(0.2)),
    ];

    let ranking = rank_impacts(totals(), impacts, RankOrder::Descending);
    assert_eq!(keys(&ranking), vec!["big", "first", "second", "third"]);
}

#[test]
fn ascending_order_still_puts_undefined_last() {
    let impacts = vec![
        (GroupKey::from("undefined"), None),
        (GroupKey::from("big"), Some(3.0)),
        (GroupKey::from("small"), Some(-1.0)),
        (GroupKey::from("nan"), Some(f64::NAN)),
    ];

    let ranking = rank_impacts(totals(), impacts, RankOrder::Ascending);
    assert_eq!(keys(&ranking), vec!["small", "big", "undefined", "nan"]);

    let nan = ranking
        .groups()
        .find(|(key, _)| key.as_str() == "nan")
        .map(|(_, impact)| impact);
    assert_eq!(nan, Some(None));
}

#[test]
fn snapshot_ranking_ties_follow_row_order() {
    let column = ColumnSpec::sum("sum(bytes)");
    let rows = vec![
        Row::new(1.0).with_dim("host", "z").with_column("sum(bytes)", 10.0),
        Row::new(1.0).with_dim("host", "m").with_column("sum(bytes)", 10.0),
        Row::new(1.0).with_dim("host", "a").with_column("sum(bytes)", 10.0),
        Row::new(1.0).with_dim("host", "big").with_column("sum(bytes)", 70.0),
    ];

    let snapshot = build_snapshot(&rows, &column, DuplicateGroupPolicy::Reject).expect("snapshot");
    let ranking = snapshot.ranking(RankOrder::Descending);

    // diffs: z/m/a = 0.9, big = 0.3
    assert_eq!(keys(&ranking), vec!["z", "m", "a", "big"]);
    let totals = ranking.totals().expect("totals");
    assert_eq!(totals.column, "sum(bytes)");
    assert_eq!(totals.reference_value, Some(100.0));
}
