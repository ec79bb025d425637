//! Property tests for the narrative rank ordering.

use proptest::prelude::*;

use fabula_temporal::RankKey;

fn arb_key() -> impl Strategy<Value = RankKey> {
    (0u8..=2, -400_000i64..400_000, 0u64..10_000).prop_map(|(category, numeric, discourse)| {
        RankKey {
            category,
            numeric,
            discourse,
        }
    })
}

proptest! {
    // The ordering is total: transitive, antisymmetric, and agrees
    // with equality. A sort under a comparator without these
    // properties is unspecified behavior.
    #[test]
    fn prop_rank_transitive(a in arb_key(), b in arb_key(), c in arb_key()) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    #[test]
    fn prop_rank_antisymmetric(a in arb_key(), b in arb_key()) {
        if a <= b && b <= a {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn prop_rank_duality(a in arb_key(), b in arb_key()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    // Stronger evidence always sorts first regardless of numeric and
    // discourse values.
    #[test]
    fn prop_category_dominates(
        numeric_a in -400_000i64..400_000,
        numeric_b in -400_000i64..400_000,
        discourse_a in 0u64..10_000,
        discourse_b in 0u64..10_000,
    ) {
        let dated = RankKey { category: 2, numeric: numeric_a, discourse: discourse_a };
        let offset = RankKey { category: 1, numeric: numeric_b, discourse: discourse_b };
        prop_assert!(dated < offset);
    }
}
