use std::sync::Mutex;

use shakmaty::{CastlingMode, Chess, Move, Position, fen::Fen};
use tracing::{debug, error, info, warn};

use crate::{
    codec::{AlphaZeroCodec, MoveCodec, POLICY_SIZE},
    config::BotConfig,
    error::BotError,
    model::{OnnxPolicyModel, PolicyModel, shared_model},
    normalize::{DecisionSettings, normalize},
    observer::{Observer, TracingObserver},
    tensor::encode_position,
    types::{Decision, MoveDistribution, PolicyIndex},
};

/// Picks one legal move per turn from the policy network's output.
///
/// The engine holds no state between games apart from the model; call
/// [`DecisionEngine::reset`] when a new game starts.
pub struct DecisionEngine<M, C = AlphaZeroCodec, O = TracingObserver> {
    model: M,
    codec: C,
    observer: O,
    settings: DecisionSettings,
    last_distribution: Option<MoveDistribution>,
    ply: u32,
}

impl DecisionEngine<&'static Mutex<OnnxPolicyModel>> {
    /// Engine on the process-wide model, loading it on first use.
    pub fn from_config(config: &BotConfig) -> Result<Self, BotError> {
        let model = shared_model(&config.model)?;
        Ok(Self::new(model, AlphaZeroCodec, TracingObserver, config.decision))
    }
}

impl<M: PolicyModel, C: MoveCodec, O: Observer> DecisionEngine<M, C, O> {
    pub fn new(model: M, codec: C, observer: O, settings: DecisionSettings) -> Self {
        Self {
            model,
            codec,
            observer,
            settings,
            last_distribution: None,
            ply: 0,
        }
    }

    /// Choose a move for `position`.
    ///
    /// Fails only when there is no legal move.
    pub fn decide(&mut self, position: &Chess) -> Result<Move, BotError> {
        self.evaluate(position).map(|decision| decision.best)
    }

    /// Parse a FEN string and choose a move for it.
    pub fn decide_fen(&mut self, fen: &str) -> Result<Move, BotError> {
        let fen: Fen = fen.parse()?;
        let position: Chess = fen.into_position(CastlingMode::Standard)?;
        self.decide(&position)
    }

    /// Choose a move and return everything that went into the choice.
    pub fn evaluate(&mut self, position: &Chess) -> Result<Decision, BotError> {
        let ply = self.ply;
        self.ply += 1;

        let legal_moves = position.legal_moves();
        if legal_moves.is_empty() {
            let empty = MoveDistribution::default();
            self.observer.report(&empty);
            self.last_distribution = Some(empty);
            error!(ply, "no legal moves available");
            return Err(BotError::NoLegalMoves);
        }

        let (policy, value) = match self.model.infer(encode_position(position)) {
            Ok(inference) => {
                info!(ply, value = inference.value, "position evaluation");
                if inference.policy.len() != POLICY_SIZE {
                    warn!(
                        len = inference.policy.len(),
                        expected = POLICY_SIZE,
                        "policy vector has unexpected length"
                    );
                }
                (inference.policy, Some(inference.value))
            }
            Err(err) => {
                warn!(ply, %err, "inference failed, deciding without a policy");
                (Vec::new(), None)
            }
        };

        let lookups: Vec<(Move, PolicyIndex)> = legal_moves
            .into_iter()
            .map(|mv| {
                let index = match self.codec.encode(&mv, position) {
                    Ok(idx) => PolicyIndex::Index(idx),
                    Err(err) => {
                        warn!(
                            ply,
                            mv = %mv.to_uci(CastlingMode::Standard),
                            %err,
                            "move has no policy index"
                        );
                        PolicyIndex::Absent
                    }
                };
                (mv, index)
            })
            .collect();

        let normalized = normalize(&policy, lookups, &self.settings);
        let distribution = normalized.distribution;

        self.observer.report(&distribution);
        self.last_distribution = Some(distribution.clone());

        let best = distribution.best().cloned().ok_or(BotError::NoLegalMoves)?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let top = distribution
                .ranked()
                .iter()
                .take(3)
                .map(|mp| format!("{}={:.3}", mp.uci, mp.probability))
                .collect::<Vec<_>>()
                .join(" ");
            debug!(
                ply,
                best = %best.to_uci(CastlingMode::Standard),
                fallback = ?normalized.fallback,
                %top,
                "move selected"
            );
        }

        Ok(Decision {
            best,
            distribution,
            value,
            fallback: normalized.fallback,
        })
    }

    /// Prepare for a new game.
    ///
    /// The model stays loaded. Never fails: an observer that cannot be
    /// cleared is logged and the game starts anyway.
    pub fn reset(&mut self) {
        self.last_distribution = None;
        self.ply = 0;
        if let Err(err) = self.observer.clear() {
            warn!(%err, "failed to clear observer on reset");
        }
        debug!("engine reset");
    }

    /// The distribution behind the most recent decision of this game.
    pub fn last_distribution(&self) -> Option<&MoveDistribution> {
        self.last_distribution.as_ref()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn settings(&self) -> &DecisionSettings {
        &self.settings
    }
}
