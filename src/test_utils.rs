//! Helpers for exercising cursors without a database.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::SourceError;
use crate::source::RowSource;
use crate::types::RawValue;

/// Scripted [`RowSource`] that replays a fixed list of rows.
///
/// Failures can be injected on a given fetch (1-based) or on release, and every release is
/// counted through a shared counter so tests can assert it happened exactly once.
#[derive(Debug)]
pub struct MemorySource {
    rows: VecDeque<Vec<RawValue>>,
    fetches: usize,
    fail_on_fetch: Option<usize>,
    fail_on_release: bool,
    releases: Arc<AtomicUsize>,
}

impl MemorySource {
    #[must_use]
    pub fn new(rows: Vec<Vec<RawValue>>) -> Self {
        Self {
            rows: rows.into(),
            fetches: 0,
            fail_on_fetch: None,
            fail_on_release: false,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the `n`th call to `fetch_next_row` (1-based) fail without consuming a row.
    #[must_use]
    pub fn fail_on_fetch(mut self, n: usize) -> Self {
        self.fail_on_fetch = Some(n);
        self
    }

    #[must_use]
    pub fn fail_on_release(mut self) -> Self {
        self.fail_on_release = true;
        self
    }

    /// Counter incremented on every `release` call, including failing ones.
    #[must_use]
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }

    /// Number of `fetch_next_row` calls so far.
    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

impl RowSource for MemorySource {
    fn fetch_next_row(&mut self) -> Result<Option<Vec<RawValue>>, SourceError> {
        self.fetches += 1;
        if self.fail_on_fetch == Some(self.fetches) {
            return Err(SourceError::new(format!(
                "simulated fetch failure on call {}",
                self.fetches
            )));
        }
        Ok(self.rows.pop_front())
    }

    fn release(&mut self) -> Result<(), SourceError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_release {
            return Err(SourceError::new("simulated release failure"));
        }
        self.rows.clear();
        Ok(())
    }
}
