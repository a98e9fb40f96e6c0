use drill_rs::core::{
    ColumnSpec, DuplicateGroupPolicy, GroupKey, GroupScope, Row, build_snapshot,
    compare_snapshots, comparison_group_keys,
};
use proptest::prelude::*;

fn rows_from(values: &[(f64, f64)]) -> Vec<Row> {
    values
        .iter()
        .enumerate()
        .map(|(i, (count, value))| {
            Row::new(*count)
                .with_dim("host", format!("h{i}"))
                .with_dim("dc", if i % 2 == 0 { "east" } else { "west" })
                .with_column("v", *value)
        })
        .collect()
}

proptest! {
    #[test]
    fn group_key_ignores_dimension_order(
        dims in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,4}", 1..6)
            .prop_flat_map(|dims| {
                let pairs: Vec<(String, String)> = dims.into_iter().collect();
                (Just(pairs.clone()), Just(pairs).prop_shuffle())
            })
    ) {
        let (sorted, shuffled) = dims;
        let forward = GroupKey::from_pairs(sorted.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let mixed = GroupKey::from_pairs(shuffled.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        prop_assert_eq!(forward, mixed);
    }

    #[test]
    fn sum_diffs_add_up_to_group_count_minus_one(
        values in prop::collection::vec((1.0f64..50.0, 1.0f64..1_000.0), 2..40)
    ) {
        let rows = rows_from(&values);
        let snapshot = build_snapshot(&rows, &ColumnSpec::sum("v"), DuplicateGroupPolicy::Reject)
            .expect("snapshot");

        let sum: f64 = snapshot.per_group.values().map(|stat| stat.diff.expect("defined")).sum();
        let expected = (values.len() - 1) as f64;
        prop_assert!((sum - expected).abs() <= 1e-9 * values.len() as f64);
    }

    #[test]
    fn permuted_rows_give_identical_snapshots(
        values in prop::collection::vec((0.0f64..50.0, -1_000.0f64..1_000.0), 1..40),
        rotation in 0usize..40
    ) {
        let rows = rows_from(&values);
        let mut permuted = rows.clone();
        permuted.reverse();
        let len = permuted.len();
        permuted.rotate_left(rotation % len);

        for column in [ColumnSpec::sum("v"), ColumnSpec::avg("v"), ColumnSpec::count()] {
            let a = build_snapshot(&rows, &column, DuplicateGroupPolicy::Reject).expect("a");
            let b = build_snapshot(&permuted, &column, DuplicateGroupPolicy::Reject).expect("b");
            prop_assert_eq!(a.total.to_bits(), b.total.to_bits());
            prop_assert_eq!(a.count.to_bits(), b.count.to_bits());
            prop_assert_eq!(&a, &b);
        }
    }

    #[test]
    fn comparison_against_itself_attributes_no_movement(
        values in prop::collection::vec((1.0f64..50.0, 1.0f64..1_000.0), 1..30)
    ) {
        let rows = rows_from(&values);
        let groups = comparison_group_keys(&rows, &rows, GroupScope::Union);

        for column in [ColumnSpec::sum("v"), ColumnSpec::avg("v"), ColumnSpec::count()] {
            let snapshot = build_snapshot(&rows, &column, DuplicateGroupPolicy::Reject)
                .expect("snapshot");
            let comparison = compare_snapshots(&snapshot, &snapshot, &groups).expect("comparison");
            for row in &comparison.rows {
                let impact = row.impact_pct.expect("defined");
                prop_assert!(impact.abs() <= 1e-6, "{} moved {}", row.group, impact);
            }
        }
    }
}
