/*!
 * Mock backend implementation for testing.
 *
 * This module provides a mock backend that simulates different behaviors:
 * - `MockBackend::working(rows)` - serves fixture rows like the real backend
 * - `MockBackend::failing()` - always fails with a query error
 * - `MockBackend::slow(rows, delay_ms)` - serves rows after a delay
 *
 * The mock applies the same filter semantics the real backend enforces
 * server-side, via `FilterSpec::matches`, and counts upstream calls so
 * tests can assert on cache behavior.
 */

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::QueryError;
use crate::model::{Entry, FilterSpec, Table, ALL};

use super::QueryBackend;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Serves fixture rows, filtered and sorted like the real backend
    Working,
    /// Always fails with a request error
    Failing,
    /// Serves rows after a delay (for timeout/cancellation testing)
    Slow {
        /// Delay before responding, in milliseconds
        delay_ms: u64,
    },
}

/// Mock backend for testing retrieval behavior
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Fixture rows for the English table
    english: Vec<Entry>,
    /// Fixture rows for the OriginalLanguage table
    original: Vec<Entry>,
    /// Count of list_distinct_values calls reaching the mock
    distinct_calls: Arc<AtomicUsize>,
    /// Count of query_entries calls reaching the mock
    entry_calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a mock with the specified behavior and fixture rows
    pub fn new(behavior: MockBehavior, english: Vec<Entry>, original: Vec<Entry>) -> Self {
        Self {
            behavior,
            english,
            original,
            distinct_calls: Arc::new(AtomicUsize::new(0)),
            entry_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock serving the same rows from both tables
    pub fn working(rows: Vec<Entry>) -> Self {
        Self::new(MockBehavior::Working, rows.clone(), rows)
    }

    /// Create a working mock with distinct rows per table
    pub fn bilingual(english: Vec<Entry>, original: Vec<Entry>) -> Self {
        Self::new(MockBehavior::Working, english, original)
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, Vec::new(), Vec::new())
    }

    /// Create a slow mock that responds after `delay_ms`
    pub fn slow(rows: Vec<Entry>, delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms }, rows.clone(), rows)
    }

    /// Number of list_distinct_values calls that reached the mock
    pub fn distinct_call_count(&self) -> usize {
        self.distinct_calls.load(Ordering::SeqCst)
    }

    /// Number of query_entries calls that reached the mock
    pub fn entry_call_count(&self) -> usize {
        self.entry_calls.load(Ordering::SeqCst)
    }

    /// Total number of calls that reached the mock
    pub fn call_count(&self) -> usize {
        self.distinct_call_count() + self.entry_call_count()
    }

    fn rows(&self, table: Table) -> &[Entry] {
        match table {
            Table::English => &self.english,
            Table::OriginalLanguage => &self.original,
        }
    }

    async fn simulate(&self) -> Result<(), QueryError> {
        match self.behavior {
            MockBehavior::Working => Ok(()),
            MockBehavior::Failing => Err(QueryError::RequestFailed(
                "mock backend configured to fail".to_string(),
            )),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                Ok(())
            }
        }
    }

    fn column_value(entry: &Entry, column: &str) -> Option<String> {
        match column {
            "country" => Some(entry.country.clone()),
            "period" => Some(entry.period.clone()),
            "section" => Some(entry.section.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    async fn list_distinct_values(&self, table: Table, column: &str) -> Result<Vec<String>, QueryError> {
        self.distinct_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;

        let distinct: BTreeSet<String> = self
            .rows(table)
            .iter()
            .filter_map(|entry| Self::column_value(entry, column))
            .collect();

        let mut values = Vec::with_capacity(distinct.len() + 1);
        values.push(ALL.to_string());
        values.extend(distinct);
        Ok(values)
    }

    async fn query_entries(&self, table: Table, filter: &FilterSpec) -> Result<Vec<Entry>, QueryError> {
        self.entry_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;

        let mut matching: Vec<Entry> = self
            .rows(table)
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        matching.sort_by_key(Entry::sort_key);
        Ok(matching)
    }
}
