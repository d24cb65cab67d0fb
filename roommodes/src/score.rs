//! Modal problem score
//!
//! Modes below the cutoff are sorted by frequency and every adjacent pair is
//! judged by its spacing measured in modal bandwidths, `r = Δf / (f_mid / Q)`:
//! - clustering: `r < 1`, the two resonances overlap and reinforce the same
//!   pitch region; penalty `(1 - r)²`
//! - holes: `r > hole_ratio`, nothing resonates in between; penalty
//!   `(r - hole_ratio) / hole_ratio`
//!
//! Each pair penalty is multiplied by the larger of the two mode weights, so
//! the score is linear in the weights: scaling every weight by k scales the
//! score by k. The bandwidth reference depends only on the pair itself, which
//! keeps the score from decreasing when a mode is added inside a cluster.

use crate::modes::Mode;
use crate::types::ModeFactors;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tuning of the spacing penalties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringPolicy {
    /// Modal quality factor; a mode at f is f/Q wide (typical rooms: 5-20)
    #[serde(default = "default_modal_q")]
    pub modal_q: f64,
    /// Spacing, in bandwidths, above which a gap counts as a hole
    #[serde(default = "default_hole_ratio")]
    pub hole_ratio: f64,
}

fn default_modal_q() -> f64 {
    10.0
}
fn default_hole_ratio() -> f64 {
    4.0
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            modal_q: default_modal_q(),
            hole_ratio: default_hole_ratio(),
        }
    }
}

/// A frequency with the weight it carries in the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeightedMode {
    pub frequency: f64,
    pub weight: f64,
}

/// Score split into its two components
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreBreakdown {
    /// Penalty from overlapping resonances
    pub clustering: f64,
    /// Penalty from gaps in modal coverage
    pub holes: f64,
    /// Number of adjacent pairs examined
    pub pairs: usize,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.clustering + self.holes
    }
}

/// Stateless scorer parameterised by a [`ScoringPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeScorer {
    policy: ScoringPolicy,
}

impl ModeScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score modes weighted by their class factor only
    pub fn score<'a>(
        &self,
        modes: impl IntoIterator<Item = &'a Mode>,
        factors: &ModeFactors,
        cutoff: f64,
    ) -> f64 {
        let weighted = modes.into_iter().map(|m| WeightedMode {
            frequency: m.frequency,
            weight: factors.factor(m.mode_type),
        });
        self.score_weighted(weighted, cutoff).total()
    }

    /// Score arbitrary weighted frequencies
    ///
    /// Entries above `cutoff` are discarded; fewer than two remaining entries
    /// score zero.
    pub fn score_weighted(
        &self,
        entries: impl IntoIterator<Item = WeightedMode>,
        cutoff: f64,
    ) -> ScoreBreakdown {
        let mut kept: Vec<WeightedMode> = entries
            .into_iter()
            .filter(|e| e.frequency <= cutoff)
            .collect();
        // Stable: equal frequencies keep their input order
        kept.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        self.score_sorted(&kept)
    }

    /// Score entries already sorted by ascending frequency and filtered
    pub fn score_sorted(&self, sorted: &[WeightedMode]) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::default();
        for pair in sorted.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let weight = lo.weight.max(hi.weight);
            let r = self.relative_spacing(lo.frequency, hi.frequency);
            breakdown.clustering += weight * self.clustering_penalty(r);
            breakdown.holes += weight * self.hole_penalty(r);
            breakdown.pairs += 1;
        }
        breakdown
    }

    /// Spacing between two frequencies in units of the modal bandwidth at
    /// their midpoint
    pub fn relative_spacing(&self, f_lo: f64, f_hi: f64) -> f64 {
        let sum = f_lo + f_hi;
        if sum <= 0.0 {
            return 0.0;
        }
        2.0 * self.policy.modal_q * (f_hi - f_lo).abs() / sum
    }

    fn clustering_penalty(&self, r: f64) -> f64 {
        if r < 1.0 {
            (1.0 - r) * (1.0 - r)
        } else {
            0.0
        }
    }

    fn hole_penalty(&self, r: f64) -> f64 {
        let h = self.policy.hole_ratio;
        if r > h {
            (r - h) / h
        } else {
            0.0
        }
    }
}

/// Problem score of `modes` below `cutoff` with the default policy
pub fn score<'a>(
    modes: impl IntoIterator<Item = &'a Mode>,
    weights: &ModeFactors,
    cutoff: f64,
) -> f64 {
    ModeScorer::default().score(modes, weights, cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::{enumerate_modes, ModeType};
    use crate::types::RoomDimensions;

    fn assert_approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} != {} (tol {})", a, b, tol);
    }

    fn wm(frequency: f64, weight: f64) -> WeightedMode {
        WeightedMode { frequency, weight }
    }

    fn axial(frequency: f64) -> Mode {
        Mode {
            indices: [1, 0, 0],
            mode_type: ModeType::Axial,
            frequency,
        }
    }

    #[test]
    fn test_empty_and_single_score_zero() {
        let scorer = ModeScorer::default();
        assert_eq!(scorer.score_weighted(Vec::new(), 250.0).total(), 0.0);
        assert_eq!(scorer.score_weighted(vec![wm(40.0, 1.0)], 250.0).total(), 0.0);
        // Everything above the cutoff
        let modes = [axial(300.0), axial(310.0)];
        assert_eq!(score(&modes, &ModeFactors::default(), 250.0), 0.0);
    }

    #[test]
    fn test_coincident_modes_are_penalised() {
        let scorer = ModeScorer::default();
        let b = scorer.score_weighted(vec![wm(50.0, 1.0), wm(50.0, 1.0)], 250.0);
        assert_approx_eq(b.clustering, 1.0, 1e-12);
        assert_eq!(b.holes, 0.0);
        assert_eq!(b.pairs, 1);
    }

    #[test]
    fn test_hole_penalty() {
        let scorer = ModeScorer::default();
        // 20 Hz and 40 Hz: r = 2 * 10 * 20 / 60 = 6.67 bandwidths
        let b = scorer.score_weighted(vec![wm(20.0, 1.0), wm(40.0, 1.0)], 250.0);
        assert_eq!(b.clustering, 0.0);
        assert_approx_eq(b.holes, (20.0 / 3.0 - 4.0) / 4.0, 1e-12);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let scorer = ModeScorer::default();
        let entries = vec![wm(100.0, 1.0), wm(100.0, 1.0), wm(100.5, 1.0)];
        let b = scorer.score_weighted(entries, 100.0);
        assert_eq!(b.pairs, 1);
    }

    #[test]
    fn test_weight_scaling_scales_score() {
        let room = RoomDimensions::new(8.4, 6.1, 2.5).unwrap();
        let modes: Vec<Mode> = enumerate_modes(&room, 347.5, 4).unwrap().collect();
        let factors = ModeFactors::default();
        let base = score(&modes, &factors, 250.0);
        assert!(base > 0.0);
        for k in [0.1, 2.0, 37.5] {
            let scaled = score(&modes, &factors.scaled(k), 250.0);
            assert_approx_eq(scaled / base, k, 1e-9);
        }
    }

    #[test]
    fn test_adding_to_cluster_never_decreases() {
        let scorer = ModeScorer::default();
        let base = vec![
            wm(30.0, 1.0),
            wm(55.0, 0.5),
            wm(56.0, 1.0),
            wm(57.0, 0.25),
            wm(90.0, 1.0),
        ];
        let before = scorer.score_weighted(base.clone(), 250.0).total();
        for (f, w) in [(56.0, 1.0), (56.5, 0.25), (55.2, 0.5), (57.3, 1.0), (54.9, 0.25)] {
            let mut more = base.clone();
            more.push(wm(f, w));
            let after = scorer.score_weighted(more, 250.0).total();
            assert!(after >= before, "adding {} Hz lowered {} -> {}", f, before, after);
        }
    }

    #[test]
    fn test_deterministic_regardless_of_input_order() {
        let scorer = ModeScorer::default();
        let a = vec![wm(80.0, 1.0), wm(30.0, 0.5), wm(31.0, 0.25), wm(120.0, 1.0)];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(
            scorer.score_weighted(a, 250.0).total(),
            scorer.score_weighted(b, 250.0).total()
        );
    }

    #[test]
    fn test_dominant_weight_drives_pair() {
        let scorer = ModeScorer::default();
        let strong = scorer.score_weighted(vec![wm(50.0, 1.0), wm(50.0, 0.0)], 250.0);
        let weak = scorer.score_weighted(vec![wm(50.0, 0.0), wm(50.0, 0.0)], 250.0);
        assert_approx_eq(strong.total(), 1.0, 1e-12);
        assert_eq!(weak.total(), 0.0);
    }
}
