//! Pattern matching
//!
//! - `matcher`: compiles a pattern and `MatchFlags` into a line predicate
//! - `engine`: runs the predicate over a line sequence with a worker pool

pub mod engine;
pub mod matcher;

pub use engine::{run, MatchOutput, DEFAULT_WORKERS};
pub use matcher::Matcher;
