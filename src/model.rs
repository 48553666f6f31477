use std::cmp::Ordering;
use std::sync::Arc;

/// One selectable candidate surfaced by a mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The text shown in the results list, and matched against when no
    /// criteria are set.
    pub display: String,

    /// Alternate strings to match against instead of `display`, for modes
    /// whose display text is a composed label.
    pub criteria: Option<Vec<String>>,
}

impl Entry {
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            criteria: None,
        }
    }

    pub fn with_criteria(display: impl Into<String>, criteria: Vec<String>) -> Self {
        Self {
            display: display.into(),
            criteria: Some(criteria),
        }
    }
}

/// What should happen after a mode executed the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostExec {
    /// Close with a successful exit
    CloseSuccess,

    /// Close with a failure code
    CloseFailure,

    /// Stay open for another round with fresh candidates
    StayOpen,
}

/// A candidate paired with the length of its matched span, if any.
///
/// Ranking order: two non-matches are equivalent, a non-match ranks after
/// any match, and between matches the shorter span ranks first. Equal-length
/// matches are left to sort stability, so candidates keep their source order.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub entry: Arc<Entry>,
    pub span: Option<usize>,
}

impl MatchResult {
    pub fn unranked(entry: Arc<Entry>) -> Self {
        Self { entry, span: None }
    }

    pub fn rank(&self, other: &Self) -> Ordering {
        match (self.span, other.span) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}
