//! Plays a short game of the policy bot against itself.
//!
//! Usage: `cargo run --example play -- [config.json] [plies]`
//!
//! Without a config file the model is expected at `chess_model.onnx`.
//! Set `RUST_LOG=policy_bot=debug` to see every decision.

use std::env;

use policy_bot::{
    BotConfig, BotError, DecisionEngine,
    shakmaty::{CastlingMode, Chess, Position},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("policy_bot=info".parse()?),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => BotConfig::from_file(path)?,
        None => BotConfig::default(),
    };
    let plies: usize = match args.get(2) {
        Some(n) => n.parse()?,
        None => 20,
    };

    println!("Initializing policy model...");
    let mut engine = DecisionEngine::from_config(&config)?;
    engine.reset();

    let mut position = Chess::default();
    let mut line = Vec::with_capacity(plies);

    for _ in 0..plies {
        let decision = match engine.evaluate(&position) {
            Ok(decision) => decision,
            Err(BotError::NoLegalMoves) => {
                println!("Game over: {:?}", position.outcome());
                break;
            }
            Err(err) => return Err(err.into()),
        };

        let top: Vec<String> = decision
            .distribution
            .ranked()
            .iter()
            .take(3)
            .map(|mp| format!("{} {:.1}%", mp.uci, mp.probability * 100.0))
            .collect();
        println!(
            "{:>3}. {}  (value {:+.3}; top: {})",
            line.len() + 1,
            decision.best.to_uci(CastlingMode::Standard),
            decision.value.unwrap_or(f32::NAN),
            top.join(", ")
        );

        line.push(decision.best.to_uci(CastlingMode::Standard).to_string());
        position.play_unchecked(decision.best);
    }

    println!("------------------------------------------------");
    println!("{}", line.join(" "));
    Ok(())
}
