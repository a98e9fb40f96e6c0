use drill_rs::core::{AggregationKind, GroupKey, RankOrder, RankingTotals, rank_impacts};
use proptest::prelude::*;

fn totals() -> RankingTotals {
    RankingTotals {
        column: "count".to_owned(),
        kind: AggregationKind::Count,
        total: 1.0,
        count: 1.0,
        reference_value: Some(1.0),
        groups: 0,
    }
}

fn impact_strategy() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        4 => (-100i32..100).prop_map(|v| Some(f64::from(v) / 4.0)),
        1 => Just(None),
        1 => Just(Some(f64::NAN)),
    ]
}

proptest! {
    #[test]
    fn ranking_is_a_sorted_stable_permutation(
        impacts in prop::collection::vec(impact_strategy(), 0..60),
        ascending in any::<bool>()
    ) {
        let order = if ascending { RankOrder::Ascending } else { RankOrder::Descending };
        let input: Vec<(GroupKey, Option<f64>)> = impacts
            .iter()
            .enumerate()
            .map(|(i, impact)| (GroupKey::new(format!("g{i:03}")), *impact))
            .collect();

        let ranking = rank_impacts(totals(), input.clone(), order);
        let ranked: Vec<(GroupKey, Option<f64>)> =
            ranking.groups().map(|(key, impact)| (key.clone(), impact)).collect();
        prop_assert_eq!(ranked.len(), input.len());

        let first_undefined = ranked.iter().position(|(_, impact)| impact.is_none());
        if let Some(split) = first_undefined {
            prop_assert!(ranked[split..].iter().all(|(_, impact)| impact.is_none()));
        }

        for pair in ranked.windows(2) {
            let (left_key, left) = &pair[0];
            let (right_key, right) = &pair[1];
            match (left, right) {
                (Some(l), Some(r)) => {
                    let (l, r) = (l.abs(), r.abs());
                    match order {
                        RankOrder::Descending => prop_assert!(l >= r),
                        RankOrder::Ascending => prop_assert!(l <= r),
                    }
                    if l == r {
                        prop_assert!(left_key < right_key);
                    }
                }
                (None, None) => prop_assert!(left_key < right_key),
                (Some(_), None) => {}
                (None, Some(_)) => prop_assert!(false, "undefined ranked before a value"),
            }
        }
    }
}
