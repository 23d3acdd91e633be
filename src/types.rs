use shakmaty::{CastlingMode, Move, uci::UciMove};

/// Result of looking up one legal move in the policy space.
///
/// `Index` may still point past the end of the policy vector; the
/// normalizer treats such an index like `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyIndex {
    Index(usize),
    Absent,
}

/// Which fallback the normalizer applied, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Fallback {
    /// No legal move resolved to a usable policy index.
    NoValidIndices,
    /// The weights summed to (almost) nothing.
    DegenerateWeights,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MoveProbability {
    pub uci: UciMove,
    pub probability: f32,
}

/// Probabilities over the legal moves of one position.
///
/// Entries keep the order in which the legal moves were enumerated,
/// which is also the tie-break order for [`MoveDistribution::best`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveDistribution {
    entries: Vec<(Move, f32)>,
}

impl MoveDistribution {
    pub(crate) fn from_entries(entries: Vec<(Move, f32)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Move, f32)> {
        self.entries.iter().map(|(m, p)| (m, *p))
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.entries.iter().map(|(m, _)| m)
    }

    /// Probability of `mv`, or `None` if it was not a legal move.
    pub fn get(&self, mv: &Move) -> Option<f32> {
        self.entries.iter().find(|(m, _)| m == mv).map(|(_, p)| *p)
    }

    /// Sum of all probabilities, accumulated in f64.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| f64::from(*p)).sum()
    }

    /// The most probable move. Ties go to the earliest entry.
    pub fn best(&self) -> Option<&Move> {
        let mut best: Option<&(Move, f32)> = None;
        for entry in &self.entries {
            match best {
                Some((_, p)) if entry.1 <= *p => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(m, _)| m)
    }

    /// Moves in UCI notation, sorted highest to lowest probability.
    pub fn ranked(&self) -> Vec<MoveProbability> {
        let mut policy: Vec<MoveProbability> = self
            .entries
            .iter()
            .map(|(m, p)| MoveProbability {
                uci: m.to_uci(CastlingMode::Standard),
                probability: *p,
            })
            .collect();

        // Stable sort keeps enumeration order among equal probabilities.
        policy.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        policy
    }
}

#[derive(Debug, Clone)]
pub struct Decision {
    /// The selected move, always one of the position's legal moves.
    pub best: Move,
    /// The distribution the move was selected from, as reported.
    pub distribution: MoveDistribution,
    /// Raw position evaluation from the model, `None` if inference failed.
    pub value: Option<f32>,
    pub fallback: Option<Fallback>,
}
