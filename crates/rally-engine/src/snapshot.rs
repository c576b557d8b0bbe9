//! Persistence helpers and the BLAKE3 state hash.
//!
//! The canonical [`MatchUp`] JSON does not carry everything an engine needs
//! to resume exactly where it left off. The redo stack, the initial lineups
//! and hard boundaries marked on undone sets travel separately as
//! [`SupplementaryState`]:
//!
//! ```
//! use rally_engine::prelude::*;
//!
//! let mut engine = ScoringEngine::default();
//! engine.add_point(PointInput::won_by(0));
//! engine.add_point(PointInput::won_by(1));
//! engine.undo(1);
//!
//! let state = engine.state_json().unwrap();
//! let extra = engine.supplementary_state_json().unwrap();
//!
//! let mut restored = ScoringEngine::default();
//! restored.set_state_json(&state).unwrap();
//! restored.load_supplementary_state_json(&extra).unwrap();
//!
//! assert_eq!(restored.state_hash().unwrap(), engine.state_hash().unwrap());
//! assert!(restored.redo(1));
//! assert_eq!(restored.get_point_count(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use rally_model::matchup::{LineUpMember, MatchUp};
use rally_model::timeline::ScoreEntry;
use serde::{Deserialize, Serialize};

use crate::engine::ScoringEngine;
use crate::EngineError;

/// Engine-private state that is not part of the canonical record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplementaryState {
    /// Undone entries, most recent last.
    pub redo_stack: Vec<ScoreEntry>,
    /// Lineups per side before any substitution.
    pub initial_line_ups: [Option<Vec<LineUpMember>>; 2],
    /// Marked game indices keyed by set index.
    pub hard_boundaries: BTreeMap<usize, BTreeSet<u32>>,
}

impl ScoringEngine {
    /// Copy out the engine-private state.
    pub fn get_supplementary_state(&self) -> SupplementaryState {
        SupplementaryState {
            redo_stack: self.redo_stack.clone(),
            initial_line_ups: self.initial_line_ups.clone(),
            hard_boundaries: self.marked_boundaries.clone(),
        }
    }

    /// Restore the redo stack, lineup baseline and marked boundaries. Call
    /// after [`set_state`](Self::set_state), which resets all three.
    pub fn load_supplementary_state(&mut self, state: SupplementaryState) {
        self.redo_stack = state.redo_stack;
        self.initial_line_ups = state.initial_line_ups;
        for (index, games) in state.hard_boundaries {
            self.marked_boundaries.entry(index).or_default().extend(games);
        }
    }

    /// BLAKE3 hex digest (64 lowercase hex chars) of the canonical record.
    pub fn state_hash(&self) -> Result<String, EngineError> {
        let bytes = serde_json::to_vec(&self.match_up).map_err(|source| {
            EngineError::Serialize {
                what: "match record",
                source,
            }
        })?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    /// The canonical record as JSON.
    pub fn state_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(&self.match_up).map_err(|source| EngineError::Serialize {
            what: "match record",
            source,
        })
    }

    /// Parse a record and load it with [`set_state`](Self::set_state). The
    /// engine is unchanged on error.
    pub fn set_state_json(&mut self, json: &str) -> Result<(), EngineError> {
        let match_up: MatchUp =
            serde_json::from_str(json).map_err(|source| EngineError::Deserialize {
                what: "match record",
                source,
            })?;
        self.set_state(match_up);
        Ok(())
    }

    pub fn supplementary_state_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(&self.get_supplementary_state()).map_err(|source| {
            EngineError::Serialize {
                what: "supplementary state",
                source,
            }
        })
    }

    pub fn load_supplementary_state_json(&mut self, json: &str) -> Result<(), EngineError> {
        let state: SupplementaryState =
            serde_json::from_str(json).map_err(|source| EngineError::Deserialize {
                what: "supplementary state",
                source,
            })?;
        self.load_supplementary_state(state);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
