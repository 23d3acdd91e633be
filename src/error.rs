//! Error types for the policy bot.
//!
//! `BotError` is the single error type callers handle. Only a few of its
//! variants ever escape a decision: the engine absorbs inference and
//! codec failures and turns them into fallback distributions. The
//! remaining variants come from model loading, configuration and
//! download.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    /// The position has no legal moves; the game is already over.
    #[error("No legal moves available")]
    NoLegalMoves,

    /// Wraps an error returned by the underlying ONNX Runtime bindings.
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    /// The provided FEN string could not be parsed.
    #[error("Invalid FEN: {0}")]
    InvalidFen(#[from] shakmaty::fen::ParseFenError),

    /// A parsed position is invalid from the perspective of `shakmaty`.
    #[error("Invalid Chess Position: {0}")]
    InvalidPosition(#[from] shakmaty::PositionError<shakmaty::Chess>),

    /// The model session has no output with the configured name.
    #[error("Model output '{0}' not found")]
    MissingOutput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed, or a record could not be
    /// serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Download of {1} returned HTTP {0}")]
    DownloadStatus(u16, String),
}

/// Why a single move has no index in the policy vector.
///
/// Codec errors never leave the engine: the move is kept with an
/// epsilon weight instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("{0} has no from-square")]
    NoFromSquare(String),

    #[error("{0} is not a line, knight or promotion move")]
    NoGeometry(String),

    #[error("{0} promotes to an unsupported piece")]
    Promotion(String),
}
