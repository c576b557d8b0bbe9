//! Rally Format -- match-format codes and their structured form.
//!
//! A match-format code describes how many sets are played and how each set is
//! decided. The grammar is:
//!
//! ```text
//! SET{n}[X]-S:{set}[-F:{set}]
//!
//! {set} := {setTo}[NOAD][/TB{tiebreakTo}[NOAD][@{tiebreakAt}]]   standard set
//!        | TB{tiebreakTo}[NOAD]                                 tiebreak-only set
//!        | T{minutes}[G|P|A]                                    timed set
//! ```
//!
//! `SET3` is best of three, `SET3X` is exactly three. The optional `F:`
//! section applies to the deciding set only.
//!
//! # Example
//!
//! ```
//! use rally_format::{parse_format, SetFormat};
//!
//! let format = parse_format("SET3-S:6/TB7-F:TB10").unwrap();
//! assert_eq!(format.best_of, Some(3));
//! assert_eq!(format.sets_to_win(), 2);
//! assert!(matches!(format.final_set_format, Some(SetFormat::TiebreakOnly(_))));
//! assert_eq!(format.to_string(), "SET3-S:6/TB7-F:TB10");
//! ```

#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while parsing a match-format code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The code was empty or whitespace only.
    #[error("match format code is empty")]
    Empty,

    /// The code does not start with a `SET{n}` section.
    #[error("match format '{code}' does not start with a SET section")]
    MissingSetCount { code: String },

    /// The `SET` section carries something other than a positive count.
    #[error("invalid set count '{0}'")]
    InvalidSetCount(String),

    /// No `S:` section was found.
    #[error("match format '{code}' has no S: section")]
    MissingSetFormat { code: String },

    /// An `S:` or `F:` body could not be parsed.
    #[error("invalid set format '{0}'")]
    InvalidSetFormat(String),

    /// A section with an unrecognised prefix.
    #[error("unknown match format section '{0}'")]
    UnknownSection(String),
}

// ---------------------------------------------------------------------------
// Set formats
// ---------------------------------------------------------------------------

/// Rules for a tiebreak, either inside a set or as a whole set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiebreakFormat {
    /// Points needed to take the tiebreak.
    pub tiebreak_to: u32,
    /// Win by one point instead of two.
    pub no_ad: bool,
}

impl TiebreakFormat {
    /// Required winning margin in points.
    pub fn win_by(&self) -> u32 {
        if self.no_ad {
            1
        } else {
            2
        }
    }
}

/// A set played in games, optionally ending in a tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardSet {
    /// Games needed to take the set.
    pub set_to: u32,
    /// Games are played without advantage (sudden death at deuce).
    pub no_ad: bool,
    /// Tiebreak played when the games reach `tiebreak_at` all.
    pub tiebreak: Option<TiebreakFormat>,
    /// Game count at which the tiebreak starts. Defaults to `set_to`.
    pub tiebreak_at: Option<u32>,
}

impl StandardSet {
    /// Game count (each side) at which the tiebreak is played.
    pub fn tiebreak_at(&self) -> u32 {
        self.tiebreak_at.unwrap_or(self.set_to)
    }
}

/// What a timed set counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimedBasis {
    /// Ordinary games are played until time runs out.
    Games,
    /// Every point adds to the set score.
    Points,
    /// Points are counted and the match is decided on totals across all sets.
    Aggregate,
}

/// A set that ends when its clock runs out rather than on score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedSet {
    /// Length of the segment in minutes.
    pub minutes: u32,
    /// What the set score counts.
    pub basis: TimedBasis,
}

/// The three shapes a set can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SetFormat {
    /// Games, first to `set_to` with a two-game margin or a tiebreak.
    Standard(StandardSet),
    /// A single tiebreak decides the set.
    TiebreakOnly(TiebreakFormat),
    /// Decided only when the segment is ended explicitly.
    Timed(TimedSet),
}

impl SetFormat {
    /// Returns `true` for timed sets.
    pub fn is_timed(&self) -> bool {
        matches!(self, SetFormat::Timed(_))
    }
}

// ---------------------------------------------------------------------------
// MatchFormat
// ---------------------------------------------------------------------------

/// Structured form of a match-format code.
///
/// Exactly one of `best_of` and `exactly` is set by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFormat {
    /// Best of `n` sets.
    pub best_of: Option<u32>,
    /// Exactly `n` sets are played.
    pub exactly: Option<u32>,
    /// Format of every non-deciding set.
    pub set_format: SetFormat,
    /// Format of the deciding set, if it differs.
    pub final_set_format: Option<SetFormat>,
}

impl MatchFormat {
    /// Number of sets in the match (`exactly`, else `best_of`, else 1).
    pub fn set_count(&self) -> u32 {
        self.exactly.or(self.best_of).unwrap_or(1)
    }

    /// Sets a side must win: `ceil(set_count / 2)`.
    pub fn sets_to_win(&self) -> u32 {
        self.set_count().div_ceil(2)
    }

    /// Returns `true` when the winner is decided on totals rather than sets.
    pub fn is_aggregate(&self) -> bool {
        let aggregate = |set: &SetFormat| {
            matches!(
                set,
                SetFormat::Timed(TimedSet {
                    basis: TimedBasis::Aggregate,
                    ..
                })
            )
        };
        aggregate(&self.set_format) || self.final_set_format.as_ref().is_some_and(aggregate)
    }
}

/// Parse a match-format code.
///
/// # Errors
///
/// Returns a [`FormatError`] describing the first section that could not be
/// understood.
pub fn parse_format(code: &str) -> Result<MatchFormat, FormatError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(FormatError::Empty);
    }

    let mut sections = code.split('-');
    let head = sections.next().unwrap_or_default();
    let count = head
        .strip_prefix("SET")
        .ok_or_else(|| FormatError::MissingSetCount {
            code: code.to_owned(),
        })?;
    let (digits, exactly) = match count.strip_suffix('X') {
        Some(digits) => (digits, true),
        None => (count, false),
    };
    let sets = parse_count(digits).ok_or_else(|| FormatError::InvalidSetCount(count.to_owned()))?;

    let mut set_format = None;
    let mut final_set_format = None;
    for section in sections {
        if let Some(body) = section.strip_prefix("S:") {
            set_format = Some(parse_set_format(body)?);
        } else if let Some(body) = section.strip_prefix("F:") {
            final_set_format = Some(parse_set_format(body)?);
        } else {
            return Err(FormatError::UnknownSection(section.to_owned()));
        }
    }

    let set_format = set_format.ok_or_else(|| FormatError::MissingSetFormat {
        code: code.to_owned(),
    })?;

    Ok(MatchFormat {
        best_of: (!exactly).then_some(sets),
        exactly: exactly.then_some(sets),
        set_format,
        final_set_format,
    })
}

/// Returns `true` when the format decides the winner on summed totals.
pub fn is_aggregate_format(format: &MatchFormat) -> bool {
    format.is_aggregate()
}

impl FromStr for MatchFormat {
    type Err = FormatError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        parse_format(code)
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_set_format(body: &str) -> Result<SetFormat, FormatError> {
    let invalid = || FormatError::InvalidSetFormat(body.to_owned());

    if let Some(rest) = body.strip_prefix("TB") {
        return parse_tiebreak(rest)
            .map(SetFormat::TiebreakOnly)
            .ok_or_else(invalid);
    }

    if let Some(rest) = body.strip_prefix('T') {
        let (digits, basis) = match rest.as_bytes().last() {
            Some(b'G') => (&rest[..rest.len() - 1], TimedBasis::Games),
            Some(b'P') => (&rest[..rest.len() - 1], TimedBasis::Points),
            Some(b'A') => (&rest[..rest.len() - 1], TimedBasis::Aggregate),
            _ => (rest, TimedBasis::Games),
        };
        let minutes = parse_count(digits).ok_or_else(invalid)?;
        return Ok(SetFormat::Timed(TimedSet { minutes, basis }));
    }

    let (games, tiebreak) = match body.split_once('/') {
        Some((games, tiebreak)) => (games, Some(tiebreak)),
        None => (body, None),
    };
    let (digits, no_ad) = strip_no_ad(games);
    let set_to = parse_count(digits).ok_or_else(invalid)?;

    let (tiebreak, tiebreak_at) = match tiebreak {
        None => (None, None),
        Some(spec) => {
            let spec = spec.strip_prefix("TB").ok_or_else(invalid)?;
            let (tb, at) = match spec.split_once('@') {
                Some((tb, at)) => (tb, Some(parse_count(at).ok_or_else(invalid)?)),
                None => (spec, None),
            };
            (Some(parse_tiebreak(tb).ok_or_else(invalid)?), at)
        }
    };

    Ok(SetFormat::Standard(StandardSet {
        set_to,
        no_ad,
        tiebreak,
        tiebreak_at,
    }))
}

fn parse_tiebreak(body: &str) -> Option<TiebreakFormat> {
    let (digits, no_ad) = strip_no_ad(body);
    Some(TiebreakFormat {
        tiebreak_to: parse_count(digits)?,
        no_ad,
    })
}

fn strip_no_ad(body: &str) -> (&str, bool) {
    match body.strip_suffix("NOAD") {
        Some(rest) => (rest, true),
        None => (body, false),
    }
}

/// A strictly positive decimal count with no sign or padding characters.
fn parse_count(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n > 0)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for TiebreakFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TB{}", self.tiebreak_to)?;
        if self.no_ad {
            f.write_str("NOAD")?;
        }
        Ok(())
    }
}

impl fmt::Display for SetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetFormat::Standard(set) => {
                write!(f, "{}", set.set_to)?;
                if set.no_ad {
                    f.write_str("NOAD")?;
                }
                if let Some(tiebreak) = &set.tiebreak {
                    write!(f, "/{tiebreak}")?;
                    if let Some(at) = set.tiebreak_at {
                        write!(f, "@{at}")?;
                    }
                }
                Ok(())
            }
            SetFormat::TiebreakOnly(tiebreak) => write!(f, "{tiebreak}"),
            SetFormat::Timed(timed) => {
                let suffix = match timed.basis {
                    TimedBasis::Games => "",
                    TimedBasis::Points => "P",
                    TimedBasis::Aggregate => "A",
                };
                write!(f, "T{}{suffix}", timed.minutes)
            }
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exactly {
            Some(n) => write!(f, "SET{n}X")?,
            None => write!(f, "SET{}", self.best_of.unwrap_or(1))?,
        }
        write!(f, "-S:{}", self.set_format)?;
        if let Some(final_set) = &self.final_set_format {
            write!(f, "-F:{final_set}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
