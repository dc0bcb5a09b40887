//! Errors raised when a progression invariant would be violated.

use thiserror::Error;

use crate::mechanics::Ending;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("ending already fixed as {0:?}")]
    EndingAlreadySet(Ending),

    #[error("act {0} is the final act")]
    FinalAct(u8),

    #[error("act number {0} is outside 1..=4")]
    InvalidAct(u8),

    #[error("stage update for act {found} while in act {expected}")]
    StageMismatch { expected: u8, found: u8 },
}
