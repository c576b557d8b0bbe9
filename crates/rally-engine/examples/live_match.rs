//! Live scoring demo -- plays a short match, undoes a point, then saves and
//! restores the engine.
//!
//! Run with:
//!   RUST_LOG=rally_engine=debug cargo run --example live_match -p rally-engine

use rally_engine::prelude::*;

// ---------------------------------------------------------------------------
// Match script
// ---------------------------------------------------------------------------

/// Point winners (0 or 1) for a best-of-three with short sets.
fn script() -> Vec<u8> {
    let mut winners = Vec::new();
    // First set: side 1 holds four straight games.
    for _ in 0..4 {
        winners.extend([0, 0, 1, 0, 0]);
    }
    // Second set: side 2 replies in kind.
    for _ in 0..4 {
        winners.extend([1, 1, 0, 1, 1]);
    }
    // Deciding set: a match tiebreak.
    winners.extend([0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 0, 0]);
    winners
}

fn print_score(engine: &ScoringEngine, label: &str) {
    println!(
        "{label:>12}: {:<24} ({} points, mode {:?})",
        engine.get_scoreboard(&ScoreboardOptions::default()),
        engine.get_point_count(),
        engine.get_input_mode(),
    );
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut engine = ScoringEngine::new(EngineConfig {
        match_up_format: Some("SET3-S:4/TB7-F:TB10".to_owned()),
        ..Default::default()
    });
    println!("format {}", engine.get_format());

    for (i, winner) in script().into_iter().enumerate() {
        let server = (i / 5 % 2) as u8;
        engine.add_point(PointInput::won_by(winner).with_server(server));
        if i % 10 == 9 {
            print_score(&engine, &format!("point {}", i + 1));
        }
        if engine.is_complete() {
            break;
        }
    }
    print_score(&engine, "final");
    println!("winner: side {:?}", engine.get_winner());

    // Take back the last point, then put it back.
    engine.undo(1);
    print_score(&engine, "after undo");
    engine.redo(1);
    print_score(&engine, "after redo");

    // Save and restore.
    let state = engine.state_json()?;
    let extra = engine.supplementary_state_json()?;
    let mut restored = ScoringEngine::default();
    restored.set_state_json(&state)?;
    restored.load_supplementary_state_json(&extra)?;
    println!(
        "restored {} (hash match: {})",
        restored.get_state().match_up_id,
        restored.state_hash()? == engine.state_hash()?,
    );

    Ok(())
}
