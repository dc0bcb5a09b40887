//! Records supplied by the content store. Loaded once, read-only at runtime.

mod emergence_rule;
mod story_beat;

pub use emergence_rule::*;
pub use story_beat::*;
