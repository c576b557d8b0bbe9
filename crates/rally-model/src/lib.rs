//! Rally Model -- the Match Record, its timeline, and the pure rules over it.
//!
//! This crate holds plain data plus pure functions: [`create_match_up`]
//! builds a record, [`add_point`] plays one point into it, the
//! [`completion`] rules decide sets and matches, and [`view`] derives score
//! strings. Nothing here keeps state between calls; the stateful engine
//! with undo/redo lives in `rally-engine`.
//!
//! # Quick Start
//!
//! ```
//! use rally_model::prelude::*;
//!
//! let mut match_up = create_match_up(&CreateMatchUp {
//!     match_up_format: "SET1-S:TB7".to_owned(),
//!     match_up_id: Some("demo".to_owned()),
//!     is_doubles: false,
//! });
//!
//! for _ in 0..7 {
//!     match_up = add_point(match_up, &PointInput::won_by(0), &PointConfig::default());
//! }
//!
//! assert!(is_complete(&match_up));
//! assert_eq!(get_winner(&match_up), Some(1));
//! assert_eq!(get_score(&match_up).score_string, "[7-0]");
//! ```

#![deny(unsafe_code)]

pub mod completion;
pub mod matchup;
pub mod point;
pub mod timeline;
pub mod view;

pub use matchup::{create_match_up, CreateMatchUp, MatchUp};
pub use point::{add_point, PointConfig, PointInput};

/// Re-export the format crate for convenience.
pub use rally_format;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common model usage.
pub mod prelude {
    pub use rally_format::{parse_format, MatchFormat, SetFormat};

    pub use crate::completion::{check_match_completion, check_set_completion};
    pub use crate::matchup::{
        create_match_up, CreateMatchUp, LineUpMember, MatchScore, MatchUp, MatchUpStatus,
        MatchUpType, SetScore, Side,
    };
    pub use crate::point::{add_point, Point, PointConfig, PointInput, PointMultiplier};
    pub use crate::timeline::{
        EndSegment, EntryKind, GameInput, History, InitialScore, ScoreEntry, SetScoreInput,
        SubstitutionEvent,
    };
    pub use crate::view::{
        get_score, get_scoreboard, get_winner, is_complete, Score, ScoreboardOptions,
    };
}
