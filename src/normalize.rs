//! Turns a raw policy vector into a probability distribution over the
//! legal moves of one position.

use serde::Deserialize;
use shakmaty::Move;
use tracing::warn;

use crate::{
    codec::POLICY_SIZE,
    types::{Fallback, MoveDistribution, PolicyIndex},
};

/// How raw policy scores become non-negative weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightTransform {
    /// Scores are logits: `exp(score - max)` over the legal indices.
    #[default]
    Softmax,
    /// Scores are already weights; negatives are clamped to zero and the
    /// rest scaled so the largest is 1.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DecisionSettings {
    /// Pre-normalization weight for moves without a usable index.
    pub epsilon: f32,
    /// Weight sums at or below this fall back to a uniform distribution.
    pub degenerate_threshold: f32,
    pub transform: WeightTransform,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self {
            epsilon: 1e-10,
            degenerate_threshold: 1e-10,
            transform: WeightTransform::Softmax,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub distribution: MoveDistribution,
    pub fallback: Option<Fallback>,
}

/// Build a distribution over `lookups`, in their order.
///
/// Moves whose index is absent or outside the policy space get
/// `settings.epsilon` as weight. Valid weights are scaled so the largest
/// is 1, so any move with a non-zero weight outranks every epsilon move. Weights are normalized only after all
/// of them are assigned. If no move has a usable index, or the weights
/// sum to at most `settings.degenerate_threshold`, every move gets
/// `1 / N` instead.
pub fn normalize(
    policy: &[f32],
    lookups: Vec<(Move, PolicyIndex)>,
    settings: &DecisionSettings,
) -> Normalized {
    let bound = policy.len().min(POLICY_SIZE);
    let valid = |index: PolicyIndex| match index {
        PolicyIndex::Index(idx) if idx < bound => Some(policy[idx]),
        _ => None,
    };

    if lookups.is_empty() {
        return Normalized {
            distribution: MoveDistribution::default(),
            fallback: None,
        };
    }

    let scores: Vec<Option<f32>> = lookups.iter().map(|(_, index)| valid(*index)).collect();

    if scores.iter().all(Option::is_none) {
        warn!(
            moves = lookups.len(),
            "no legal move has a policy index, using uniform distribution"
        );
        return uniform(lookups, Fallback::NoValidIndices);
    }

    let weights = to_weights(&scores, settings);
    let sum: f64 = weights.iter().sum();

    if sum <= f64::from(settings.degenerate_threshold) {
        warn!(sum, "policy weights degenerate, using uniform distribution");
        return uniform(lookups, Fallback::DegenerateWeights);
    }

    let entries = lookups
        .into_iter()
        .zip(weights)
        .map(|((mv, _), weight)| (mv, (weight / sum) as f32))
        .collect();

    Normalized {
        distribution: MoveDistribution::from_entries(entries),
        fallback: None,
    }
}

// Weights are accumulated in f64 so the normalized f32 probabilities
// still sum to 1 within 1e-6 for a full move list.
//
// +inf is the strongest possible score: in softmax mode the infinite
// scores share all the weight, in direct mode it is read as f32::MAX.
// NaN and -inf always weigh 0.
fn to_weights(scores: &[Option<f32>], settings: &DecisionSettings) -> Vec<f64> {
    let epsilon = f64::from(settings.epsilon);
    let valid = || scores.iter().flatten().copied().filter(|s| !s.is_nan());

    match settings.transform {
        WeightTransform::Softmax => {
            // Subtract the largest legal score so exp never overflows.
            let max = valid().fold(f32::NEG_INFINITY, f32::max);
            let infinite = max == f32::INFINITY;
            let max = f64::from(max);

            scores
                .iter()
                .map(|score| match score {
                    None => epsilon,
                    Some(s) if infinite => (*s == f32::INFINITY) as u8 as f64,
                    Some(s) if s.is_finite() => (f64::from(*s) - max).exp(),
                    Some(_) => 0.0,
                })
                .collect()
        }
        WeightTransform::Direct => {
            let direct = |s: f32| {
                if s.is_nan() {
                    0.0
                } else {
                    f64::from(s.clamp(0.0, f32::MAX))
                }
            };
            let max = valid().map(direct).fold(0.0, f64::max);
            // All-zero weights stay zero and trip the degenerate check.
            let scale = if max > 0.0 { max } else { 1.0 };

            scores
                .iter()
                .map(|score| match score {
                    None => epsilon,
                    Some(s) => direct(*s) / scale,
                })
                .collect()
        }
    }
}

fn uniform(lookups: Vec<(Move, PolicyIndex)>, fallback: Fallback) -> Normalized {
    let p = 1.0 / lookups.len() as f32;
    let entries = lookups.into_iter().map(|(mv, _)| (mv, p)).collect();
    Normalized {
        distribution: MoveDistribution::from_entries(entries),
        fallback: Some(fallback),
    }
}
