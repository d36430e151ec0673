//! Out-of-band control signals.
//!
//! The original engine family models "end this turn now" and "the game is
//! over" as exceptions thrown through the pipelines. Here they are a typed
//! error carried through `Result`, so every pipeline step that can be
//! interrupted says so in its signature and propagates with `?`.
//!
//! The turn loop is the sole catcher: `TurnBroken` forces the current turn
//! closed and advances, `StageChange` unwinds to the top of the loop, and
//! `GameFinish` ends the match.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A structured interruption of the current pipeline.
///
/// Not an error in the usual sense - raising one of these is how cards and
/// skills end a turn or the match from deep inside a pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ControlSignal {
    /// End the current player's turn immediately.
    #[error("turn broken")]
    TurnBroken,

    /// Unwind to the turn loop without ending the turn's owner explicitly.
    #[error("stage change")]
    StageChange,

    /// The match is over; a GameOver notification has been broadcast.
    #[error("game finished")]
    GameFinish,
}

/// Result type used by every interruptible pipeline step.
pub type GameResult<T> = Result<T, ControlSignal>;
