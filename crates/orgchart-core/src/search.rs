//! Substring search over the flattened hierarchy, plus the keystroke debouncer that feeds it.

use crate::model::Employee;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Queries shorter than this (in characters, after trimming) never trigger a search.
pub const MIN_QUERY_LEN: usize = 2;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub title: String,
}

impl From<&Employee> for SearchHit {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            title: e.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub include_department: bool,
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_department: true,
            limit: Some(DEFAULT_SEARCH_LIMIT),
        }
    }
}

pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

/// Pre-order list of every record in the hierarchy (children stripped). Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    records: Vec<Employee>,
}

impl SearchIndex {
    pub fn from_root(root: &Employee) -> Self {
        let mut records = Vec::new();
        let mut stack: Vec<&Employee> = vec![root];
        while let Some(e) = stack.pop() {
            records.push(e.detached());
            stack.extend(e.children.iter().rev());
        }
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Employee] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Employee> {
        self.records.iter().find(|e| e.id == id)
    }

    /// Case-insensitive substring match on name and title (and department when enabled),
    /// in index order. Returns nothing for queries below [`MIN_QUERY_LEN`].
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        if !is_searchable(query) {
            return Vec::new();
        }
        let needle = query.trim().to_lowercase();
        let limit = options.limit.unwrap_or(usize::MAX);

        self.records
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&needle)
                    || e.title.to_lowercase().contains(&needle)
                    || (options.include_department
                        && e.department
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(&needle)))
            })
            .take(limit)
            .map(SearchHit::from)
            .collect()
    }
}

/// What happened to a keystroke fed into [`SearchDebouncer::input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceInput {
    /// A search is pending and fires at `deadline` unless another keystroke arrives first.
    Scheduled { generation: u64, deadline: Instant },
    /// The query is too short; any pending search was dropped.
    Cleared,
}

#[derive(Debug, Clone)]
struct PendingSearch {
    query: String,
    deadline: Instant,
    generation: u64,
}

/// Trailing-edge debouncer. Time is supplied by the caller so the event loop (or a test)
/// stays in control of the clock.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: u64,
    pending: Option<PendingSearch>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Registers a keystroke. Every call supersedes the previous pending search.
    pub fn input(&mut self, query: &str, now: Instant) -> DebounceInput {
        self.generation += 1;
        let query = query.trim();
        if !is_searchable(query) {
            self.pending = None;
            return DebounceInput::Cleared;
        }
        let deadline = now + self.delay;
        self.pending = Some(PendingSearch {
            query: query.to_string(),
            deadline,
            generation: self.generation,
        });
        DebounceInput::Scheduled {
            generation: self.generation,
            deadline,
        }
    }

    /// Returns the pending query once its deadline has passed, consuming it.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let ready = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if !ready {
            return None;
        }
        self.pending.take().map(|p| p.query)
    }

    /// Like [`SearchDebouncer::poll`], for a caller holding the `generation` it was handed
    /// when the search was scheduled. A timer from a superseded keystroke yields `None` and
    /// leaves the newer pending search alone.
    pub fn fire(&mut self, generation: u64, now: Instant) -> Option<String> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == generation && now >= p.deadline);
        if !ready {
            return None;
        }
        self.pending.take().map(|p| p.query)
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debouncer_coalesces_rapid_keystrokes() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::default();
        d.input("al", t0);
        d.input("ali", t0 + Duration::from_millis(100));
        assert_eq!(d.poll(t0 + Duration::from_millis(350)), None);
        assert_eq!(
            d.poll(t0 + Duration::from_millis(400)),
            Some("ali".to_string())
        );
        assert_eq!(d.poll(t0 + Duration::from_millis(900)), None);
    }

    #[test]
    fn stale_timer_cannot_fire_a_newer_search() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::default();
        let DebounceInput::Scheduled { generation: first, .. } = d.input("al", t0) else {
            panic!("expected a scheduled search");
        };
        let later = t0 + Duration::from_millis(100);
        let DebounceInput::Scheduled {
            generation: second,
            deadline,
        } = d.input("ali", later)
        else {
            panic!("expected a scheduled search");
        };
        assert_ne!(first, second);

        assert_eq!(d.fire(first, deadline), None);
        assert!(d.is_pending());
        assert_eq!(d.fire(second, deadline), Some("ali".to_string()));
        assert_eq!(d.fire(second, deadline), None);
    }

    #[test]
    fn cancelled_search_never_fires() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::default();
        let DebounceInput::Scheduled { generation, deadline } = d.input("bob", t0) else {
            panic!("expected a scheduled search");
        };
        d.cancel();
        assert_eq!(d.fire(generation, deadline), None);
    }

    #[test]
    fn short_query_cancels_pending_search() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::default();
        d.input("bob", t0);
        assert_eq!(d.input("b", t0), DebounceInput::Cleared);
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + Duration::from_secs(1)), None);
    }
}
