use pnlboard_core::data::{FileSchema, PNL_HEADER};
use pnlboard_core::metrics::{drawdown_curve, max_drawdown, sharpe_ratio};
use pnlboard_core::{read_pnl_csv, IngestError};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn drawdown_of_increasing_series_is_zero(
        start in 1.0f64..1_000_000.0,
        steps in prop::collection::vec(0.0f64..1_000.0, 0..200),
    ) {
        let mut values = vec![start];
        for s in steps {
            let next = values.last().copied().unwrap() + s;
            values.push(next);
        }
        prop_assert_eq!(max_drawdown(&values), 0.0);
    }

    #[test]
    fn drawdown_is_bounded_for_positive_series(values in prop::collection::vec(0.01f64..100_000.0, 1..200)) {
        let dd = max_drawdown(&values);
        prop_assert!((0.0..1.0).contains(&dd));
    }

    #[test]
    fn drawdown_is_max_of_curve(values in prop::collection::vec(0.01f64..100_000.0, 1..200)) {
        let curve = drawdown_curve(&values);
        let max = curve.iter().copied().fold(0.0_f64, f64::max);
        prop_assert!((max - max_drawdown(&values)).abs() < 1e-12);
    }

    #[test]
    fn sharpe_is_scale_invariant(
        returns in prop::collection::vec(-0.1f64..0.1, 2..120),
        k in 0.001f64..1_000.0,
    ) {
        let base = sharpe_ratio(&returns, Some(252.0));
        let scaled: Vec<f64> = returns.iter().map(|r| r * k).collect();
        let other = sharpe_ratio(&scaled, Some(252.0));
        match (base, other) {
            (Ok(a), Ok(b)) => prop_assert!((a - b).abs() <= 1e-6 * a.abs().max(1.0)),
            (Err(_), Err(_)) => {}
            (a, b) => prop_assert!(false, "inconsistent results {:?} vs {:?}", a, b),
        }
    }

    #[test]
    fn arbitrary_header_other_than_schema_is_rejected(
        cols in prop::collection::vec("[A-Za-z_ ]{1,12}", 1..8),
    ) {
        let header = cols.join(",");
        prop_assume!(FileSchema::Pnl.validate(header.split(',')).is_err());
        let csv = format!("{header}\n");
        let rejected = matches!(read_pnl_csv(csv.as_bytes()), Err(IngestError::Schema(_)));
        prop_assert!(rejected);
    }
}

#[test]
fn halving_series_has_half_drawdown() {
    assert!((max_drawdown(&[100.0, 50.0]) - 0.5).abs() < 1e-12);
}

#[test]
fn exact_header_round_trip() {
    let csv = format!("{PNL_HEADER}\n2024-01-02,1,2,3,4,0.5\n");
    let series = read_pnl_csv(csv.as_bytes()).unwrap().data;
    assert_eq!(series.len(), 1);
}
