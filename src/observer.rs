//! Sinks that record every distribution the engine decides from.

use std::io::Write;

use serde::Serialize;
use tracing::{info, warn};

use crate::{error::BotError, types::MoveDistribution};

/// Receives the distribution behind each decision.
///
/// `report` is called exactly once per decision, including an empty
/// distribution when the position has no legal moves.
pub trait Observer {
    fn report(&mut self, distribution: &MoveDistribution);

    /// Drop per-game state. Called when a new game starts.
    fn clear(&mut self) -> Result<(), BotError> {
        Ok(())
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn report(&mut self, distribution: &MoveDistribution) {
        (**self).report(distribution)
    }

    fn clear(&mut self) -> Result<(), BotError> {
        (**self).clear()
    }
}

/// Logs each distribution through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn report(&mut self, distribution: &MoveDistribution) {
        let moves = distribution
            .ranked()
            .iter()
            .map(|mp| format!("{}={:.4}", mp.uci, mp.probability))
            .collect::<Vec<_>>()
            .join(" ");
        info!(count = distribution.len(), %moves, "move probabilities");
    }
}

/// Keeps every reported distribution in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub reports: Vec<MoveDistribution>,
}

impl Observer for RecordingObserver {
    fn report(&mut self, distribution: &MoveDistribution) {
        self.reports.push(distribution.clone());
    }

    fn clear(&mut self) -> Result<(), BotError> {
        self.reports.clear();
        Ok(())
    }
}

#[derive(Serialize)]
struct Record {
    ply: u32,
    moves: Vec<Entry>,
}

#[derive(Serialize)]
struct Entry {
    uci: String,
    probability: f32,
}

/// Writes one JSON object per decision, e.g.
/// `{"ply":0,"moves":[{"uci":"e2e4","probability":0.41},...]}`.
///
/// Moves appear in enumeration order. Write failures are logged and
/// otherwise ignored so they never affect move selection.
pub struct JsonLinesObserver<W: Write> {
    writer: W,
    ply: u32,
}

impl<W: Write> JsonLinesObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, ply: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, distribution: &MoveDistribution) -> Result<(), BotError> {
        let record = Record {
            ply: self.ply,
            moves: distribution
                .iter()
                .map(|(mv, probability)| Entry {
                    uci: mv.to_uci(shakmaty::CastlingMode::Standard).to_string(),
                    probability,
                })
                .collect(),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> Observer for JsonLinesObserver<W> {
    fn report(&mut self, distribution: &MoveDistribution) {
        if let Err(err) = self.write_record(distribution) {
            warn!(%err, ply = self.ply, "failed to write move probabilities");
        }
        self.ply += 1;
    }

    fn clear(&mut self) -> Result<(), BotError> {
        self.ply = 0;
        self.writer.flush()?;
        Ok(())
    }
}
