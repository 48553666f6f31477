use log::{debug, warn};

use crate::matcher::{self, Matcher};
use crate::model::{Entry, MatchResult, PostExec};
use crate::modes::Mode;

/// Owns the active mode, the per-mode candidate cache, and the ranked view.
///
/// The cache is discarded and reloaded when the mode changes, when a mode
/// asked to stay open after executing, or when the search scope widens (the
/// new text no longer contains the previous one, so candidates dropped
/// earlier could match again). A strict narrowing only re-ranks the
/// already-filtered subset: a candidate that failed against a substring of
/// the search cannot match the longer search.
pub struct Session {
    modes: Vec<Box<dyn Mode>>,
    active: usize,
    query: String,
    previous_search: Option<String>,
    previous_mode: Option<usize>,
    cached: Vec<MatchResult>,
    view: Vec<MatchResult>,
    selected: usize,
    matcher: Matcher,
}

impl Session {
    pub fn new(modes: Vec<Box<dyn Mode>>) -> Self {
        assert!(!modes.is_empty(), "a session needs at least one mode");
        Self {
            modes,
            active: 0,
            query: String::new(),
            previous_search: None,
            previous_mode: None,
            cached: Vec::new(),
            view: Vec::new(),
            selected: 0,
            matcher: Matcher::new(),
        }
    }

    pub fn mode_name(&self) -> &str {
        self.modes[self.active].name()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn displays(&self) -> impl Iterator<Item = &str> {
        self.view.iter().map(|result| result.entry.display.as_str())
    }

    pub fn result_count(&self) -> usize {
        self.view.len()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_char(&mut self, ch: char) {
        self.query.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    /// Display text of the highlighted candidate, if any.
    pub fn selected_display(&self) -> Option<String> {
        self.view
            .get(self.selected)
            .map(|result| result.entry.display.clone())
    }

    pub fn next_mode(&mut self) {
        self.active = (self.active + 1) % self.modes.len();
        self.selected = 0;
    }

    pub fn previous_mode(&mut self) {
        self.active = (self.active + self.modes.len() - 1) % self.modes.len();
        self.selected = 0;
    }

    /// Move the highlight, clamped to the view; past either end is a no-op.
    pub fn move_selection(&mut self, delta: i32) {
        if self.view.is_empty() {
            self.selected = 0;
            return;
        }

        let last = self.view.len() - 1;
        self.selected = if delta.is_negative() {
            self.selected.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (self.selected + delta as usize).min(last)
        };
    }

    /// Bring the view up to date with the current mode and search text.
    pub fn refresh(&mut self) {
        let reload = self.previous_mode != Some(self.active)
            || match &self.previous_search {
                None => true,
                Some(previous) => !self.query.contains(previous.as_str()),
            };

        if reload {
            let entries = match self.modes[self.active].entries() {
                Ok(entries) => entries,
                Err(err) => {
                    // A mode with zero candidates is valid; degrade quietly.
                    warn!("loading {} candidates failed: {err:#}", self.mode_name());
                    Vec::new()
                }
            };

            self.cached = entries.into_iter().map(MatchResult::unranked).collect();
            self.view = self.cached.clone();
            debug!("{}: reloaded {} candidates", self.mode_name(), self.cached.len());
        }

        let search = search_term(&self.query, self.modes[self.active].first_word_only());

        if is_blank(search) {
            // No ranking on an empty search: the full cache in source order.
            self.view = self.cached.clone();
        } else if reload || self.previous_search.as_deref() != Some(search) {
            match self.matcher.compile(search) {
                Some(pattern) => {
                    for result in &mut self.view {
                        result.span = best_span(&result.entry, &pattern);
                    }

                    // Stable sort: equal-length matches keep candidate order.
                    self.view.sort_by(MatchResult::rank);
                    self.view.retain(|result| result.span.is_some());
                }
                None => self.view.clear(),
            }
        }

        self.previous_search = Some(search.to_string());
        self.previous_mode = Some(self.active);

        if self.selected >= self.view.len() {
            self.selected = self.view.len().saturating_sub(1);
        }
    }

    /// Let the active mode preview the highlighted candidate.
    pub fn preview_selected(&mut self) {
        if let Some(entry) = self.view.get(self.selected).map(|result| result.entry.clone()) {
            self.modes[self.active].preview(&entry);
        }
    }

    /// Commit the highlighted candidate.
    ///
    /// Returns the process exit code when the session should close; `None`
    /// keeps it open, either because nothing was selected or because the
    /// mode wants another round, in which case the cache is invalidated so
    /// the next refresh reloads.
    pub fn commit(&mut self) -> Option<i32> {
        let entry = self.view.get(self.selected)?.entry.clone();

        match self.modes[self.active].execute(&entry, &self.query) {
            PostExec::StayOpen => {
                // Fresh candidates may be waiting; filter from scratch.
                self.previous_search = None;
                self.previous_mode = None;
                None
            }
            PostExec::CloseSuccess => Some(0),
            PostExec::CloseFailure => Some(1),
        }
    }
}

/// The part of the input that participates in matching.
fn search_term(query: &str, first_word_only: bool) -> &str {
    if !first_word_only {
        return query;
    }

    query.split_whitespace().next().unwrap_or("")
}

fn is_blank(search: &str) -> bool {
    search.chars().all(char::is_whitespace)
}

/// Best (shortest) span across the entry's match criteria, or its display
/// text when it has none.
fn best_span(entry: &Entry, pattern: &regex::Regex) -> Option<usize> {
    match &entry.criteria {
        Some(criteria) => criteria
            .iter()
            .filter_map(|criterion| matcher::find(criterion, pattern))
            .map(|span| span.len())
            .min(),
        None => matcher::find(&entry.display, pattern).map(|span| span.len()),
    }
}
