use std::sync::Arc;

use anyhow::Result;

use crate::model::{Entry, PostExec};

pub mod dmenu;
pub mod drun;
pub mod run;
pub mod script;
pub mod windows;

/// A pluggable candidate source.
///
/// Each mode produces candidates, optionally previews the highlighted one,
/// and consumes the final selection. Exactly one mode is active at a time;
/// all are constructed at startup and live for the process lifetime.
pub trait Mode {
    /// Display label for the mode.
    fn name(&self) -> &str;

    /// The current candidate set.
    ///
    /// The first call may block on a background load started at
    /// construction. Whether later calls reuse a cache or re-query live
    /// state is the mode's own policy.
    fn entries(&mut self) -> Result<Vec<Arc<Entry>>>;

    /// When true, only the first whitespace-delimited token of the input is
    /// matched against candidates; the rest passes through to execute.
    fn first_word_only(&self) -> bool {
        false
    }

    /// Advisory hint that `_entry` is now highlighted. Must tolerate stale
    /// external state.
    fn preview(&mut self, _entry: &Entry) {}

    /// Consume the committed selection together with the raw input text.
    fn execute(&mut self, entry: &Entry, input: &str) -> PostExec;
}
