//! Move selection for a chess agent driven by a policy network.
//!
//! Each turn the [`DecisionEngine`] encodes the position, runs the
//! network once, maps every legal move to its index in the 4672-entry
//! AlphaZero policy vector and normalizes the matching scores into a
//! [`MoveDistribution`]. The most probable move is played, and the
//! distribution is handed to an [`Observer`] for later analysis.
//!
//! Nothing short of a position without legal moves makes a decision
//! fail. Moves the codec cannot place get a tiny epsilon weight, and a
//! policy that gives the legal moves no usable weight at all is
//! replaced by a uniform distribution.
//!
//! The library re-exports `shakmaty` to make position construction easy.

mod codec;
mod config;
mod download;
mod engine;
mod error;
mod model;
mod normalize;
mod observer;
mod tensor;
mod types;

/// The decision engine and its game lifecycle.
pub use engine::DecisionEngine;

/// Error types produced by library operations.
pub use error::{BotError, CodecError};

/// Move encoding into the policy vector.
pub use codec::{AlphaZeroCodec, MoveCodec, POLICY_SIZE};

/// Policy network access.
pub use model::{Backend, Inference, OnnxPolicyModel, PolicyModel, install_backend, shared_model};

/// Turning policy scores into probabilities.
pub use normalize::{DecisionSettings, Normalized, WeightTransform, normalize};

/// Distribution sinks.
pub use observer::{JsonLinesObserver, Observer, RecordingObserver, TracingObserver};

/// Configuration and model download.
pub use config::{BotConfig, HubSource, ModelConfig};
pub use download::{download, ensure_model};

/// Board encoding for the network input.
pub use tensor::{BOARD_CHANNELS, encode_position};

/// Output data structures.
pub use types::{Decision, Fallback, MoveDistribution, MoveProbability, PolicyIndex};

/// Re-export of `shakmaty` for convenience when building positions.
pub use shakmaty;
