//! Logistic score-to-probability family.
//!
//! Every cutoff maps a standardized score `z` and a horizontal shift `b` to
//! `sigmoid(g(z) + b)`. The shift is applied after the cutoff shape, so the
//! probability is non-decreasing in `b` for all four cutoffs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Offset that splits the standardized score distribution into a center and
/// two tails for the `Mid` and `Tail` cutoffs.
pub const MID_TAIL_OFFSET: f64 = 0.75;

/// Numerically stable logistic function.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Which part of the score distribution is most likely to be amputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SigmoidCutoff {
    /// High scores are more likely missing.
    Right,
    /// Low scores are more likely missing.
    Left,
    /// Scores near the center are more likely missing.
    Mid,
    /// Extreme scores in either tail are more likely missing.
    Tail,
}

impl SigmoidCutoff {
    pub const ALL: [SigmoidCutoff; 4] = [
        SigmoidCutoff::Right,
        SigmoidCutoff::Left,
        SigmoidCutoff::Mid,
        SigmoidCutoff::Tail,
    ];

    /// Canonical upper-case name, e.g. `SIGMOID-RIGHT`.
    pub fn name(self) -> &'static str {
        match self {
            SigmoidCutoff::Right => "SIGMOID-RIGHT",
            SigmoidCutoff::Left => "SIGMOID-LEFT",
            SigmoidCutoff::Mid => "SIGMOID-MID",
            SigmoidCutoff::Tail => "SIGMOID-TAIL",
        }
    }

    /// Cutoff shape applied to a standardized score before shifting.
    pub fn shape(self, z: f64) -> f64 {
        match self {
            SigmoidCutoff::Right => z,
            SigmoidCutoff::Left => -z,
            SigmoidCutoff::Mid => -z.abs() + MID_TAIL_OFFSET,
            SigmoidCutoff::Tail => z.abs() - MID_TAIL_OFFSET,
        }
    }

    /// Probability of amputation for one standardized score.
    pub fn probability(self, z: f64, shift: f64) -> f64 {
        sigmoid(self.shape(z) + shift)
    }

    /// Probabilities for a slice of standardized scores.
    pub fn probabilities(self, z: &[f64], shift: f64) -> Vec<f64> {
        z.iter().map(|&v| self.probability(v, shift)).collect()
    }
}

impl fmt::Display for SigmoidCutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for names outside the sigmoid family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCutoff(pub String);

impl fmt::Display for UnknownCutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sigmoid cutoff `{}`", self.0)
    }
}

impl std::error::Error for UnknownCutoff {}

impl FromStr for SigmoidCutoff {
    type Err = UnknownCutoff;

    /// Case-insensitive; accepts `sigmoid-right` as well as `right`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("SIGMOID-").unwrap_or(&upper);
        match bare {
            "RIGHT" => Ok(SigmoidCutoff::Right),
            "LEFT" => Ok(SigmoidCutoff::Left),
            "MID" => Ok(SigmoidCutoff::Mid),
            "TAIL" => Ok(SigmoidCutoff::Tail),
            _ => Err(UnknownCutoff(s.to_string())),
        }
    }
}

impl TryFrom<String> for SigmoidCutoff {
    type Error = UnknownCutoff;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SigmoidCutoff> for String {
    fn from(value: SigmoidCutoff) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sigmoid_handles_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(-800.0).is_finite());
    }

    #[test]
    fn cutoff_orientation() {
        let (lo, hi) = (-2.0, 2.0);
        assert!(SigmoidCutoff::Right.probability(hi, 0.0) > SigmoidCutoff::Right.probability(lo, 0.0));
        assert!(SigmoidCutoff::Left.probability(lo, 0.0) > SigmoidCutoff::Left.probability(hi, 0.0));
        assert!(SigmoidCutoff::Mid.probability(0.0, 0.0) > SigmoidCutoff::Mid.probability(hi, 0.0));
        assert!(SigmoidCutoff::Tail.probability(lo, 0.0) > SigmoidCutoff::Tail.probability(0.0, 0.0));
        assert!(SigmoidCutoff::Tail.probability(hi, 0.0) > SigmoidCutoff::Tail.probability(0.0, 0.0));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("sigmoid-right".parse::<SigmoidCutoff>().unwrap(), SigmoidCutoff::Right);
        assert_eq!("Sigmoid-TAIL".parse::<SigmoidCutoff>().unwrap(), SigmoidCutoff::Tail);
        assert_eq!("mid".parse::<SigmoidCutoff>().unwrap(), SigmoidCutoff::Mid);
        assert!("sigmoid-up".parse::<SigmoidCutoff>().is_err());
    }

    #[test]
    fn names_round_trip() {
        for cutoff in SigmoidCutoff::ALL {
            assert_eq!(cutoff.name().parse::<SigmoidCutoff>().unwrap(), cutoff);
        }
    }

    proptest! {
        #[test]
        fn probability_non_decreasing_in_shift(
            z in -10.0f64..10.0,
            b in -5.0f64..5.0,
            db in 0.0f64..5.0,
            idx in 0usize..4,
        ) {
            let cutoff = SigmoidCutoff::ALL[idx];
            let p0 = cutoff.probability(z, b);
            let p1 = cutoff.probability(z, b + db);
            prop_assert!((0.0..=1.0).contains(&p0));
            prop_assert!(p1 >= p0);
        }
    }
}
