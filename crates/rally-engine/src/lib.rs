//! Rally Engine -- live scoring with a replayable timeline and undo/redo.
//!
//! This crate builds on [`rally_model`] to provide [`ScoringEngine`], the
//! stateful owner of one matchUp. Every scoring action (point, game, set,
//! segment end, initial score, substitution) both updates the record and
//! appends one [`ScoreEntry`](rally_model::timeline::ScoreEntry) to its
//! timeline. Undo, redo and point edits regenerate the record by folding the
//! timeline over a fresh baseline (see [`rebuild`]).
//!
//! # Quick Start
//!
//! ```
//! use rally_engine::prelude::*;
//!
//! let mut engine = ScoringEngine::new(EngineConfig {
//!     match_up_format: Some("SET3-S:6/TB7".to_owned()),
//!     ..Default::default()
//! });
//!
//! engine.add_set(SetScoreInput::new(6, 3), None);
//! engine.add_set(SetScoreInput::new(4, 6), None);
//! engine.add_set(SetScoreInput::new(7, 5), None);
//! assert!(engine.is_complete());
//! assert_eq!(engine.get_winner(), Some(1));
//!
//! assert!(engine.undo(1));
//! assert!(!engine.is_complete());
//! assert!(engine.redo(1));
//! assert_eq!(engine.get_score().score_string, "6-3 4-6 7-5");
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod edit;
pub mod engine;
pub mod history;
pub mod lineup;
pub mod mutation;
pub mod rebuild;
pub mod snapshot;

pub use engine::ScoringEngine;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced at the engine's serialization boundaries.
///
/// Scoring operations never fail; invalid calls are ignored.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A value could not be written as JSON.
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },

    /// JSON input did not describe a valid value.
    #[error("failed to deserialize {what}: {source}")]
    Deserialize {
        what: &'static str,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the model crate for convenience.
pub use rally_model;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use rally_model::prelude::*;

    pub use crate::config::{CompetitionFormat, EngineConfig, SubstitutionRules};
    pub use crate::edit::{MarkHardBoundary, PointDecoration, PointEdit};
    pub use crate::engine::{InputMode, ScoringEngine};
    pub use crate::lineup::SubstituteOptions;
    pub use crate::snapshot::SupplementaryState;
    pub use crate::EngineError;
}
