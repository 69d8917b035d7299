//! Weighted sum scores for one pattern group.

use amp_common::{Dataset, Result};
use amp_math::zscore;

/// Weighted sum score of every sample in `rows`.
///
/// Only columns with a nonzero weight are read, coerced to numbers and, when
/// `standardize` is set, z-scored within the group. All-zero weights yield
/// all-zero scores.
pub fn weighted_sum_scores(
    data: &Dataset,
    rows: &[usize],
    weights: &[f64],
    standardize: bool,
) -> Result<Vec<f64>> {
    let mut scores = vec![0.0; rows.len()];
    for (col, &w) in weights.iter().enumerate() {
        if w == 0.0 {
            continue;
        }
        let mut values = data.numeric_column(col, rows)?;
        if standardize {
            values = zscore(&values);
        }
        for (score, value) in scores.iter_mut().zip(values) {
            *score += w * value;
        }
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amp_common::Cell;

    fn data() -> Dataset {
        Dataset::from_rows(vec![
            vec![Cell::Number(1.0), Cell::Number(10.0), Cell::from("skip")],
            vec![Cell::Number(2.0), Cell::Number(20.0), Cell::from("me")],
            vec![Cell::Number(3.0), Cell::Number(30.0), Cell::Missing],
        ])
        .unwrap()
    }

    #[test]
    fn raw_scores_are_inner_products() {
        let scores = weighted_sum_scores(&data(), &[0, 2], &[1.0, 0.5, 0.0], false).unwrap();
        assert_eq!(scores, vec![6.0, 18.0]);
    }

    #[test]
    fn standardized_scores_center_each_column() {
        let scores = weighted_sum_scores(&data(), &[0, 1, 2], &[1.0, 1.0, 0.0], true).unwrap();
        let s = (1.5f64).sqrt();
        let expected = [-2.0 * s, 0.0, 2.0 * s];
        for (got, want) in scores.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_weights_give_zero_scores() {
        let scores = weighted_sum_scores(&data(), &[0, 1, 2], &[0.0, 0.0, 0.0], true).unwrap();
        assert_eq!(scores, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_group_scores_nothing() {
        let scores = weighted_sum_scores(&data(), &[], &[1.0, 1.0, 0.0], true).unwrap();
        assert!(scores.is_empty());
    }

    #[test]
    fn unparseable_scored_column_fails() {
        assert!(weighted_sum_scores(&data(), &[0, 1], &[0.0, 0.0, 1.0], false).is_err());
    }
}
