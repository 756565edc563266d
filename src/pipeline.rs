/*!
 * Filtered entry retrieval over the cached backend.
 *
 * One pipeline instance is built per session token and dropped with it, so
 * every fetch it performs is credentialed as the acting user.
 */

use log::debug;

use crate::backend::QueryBackend;
use crate::cache::{CacheStats, CachedBackend};
use crate::errors::QueryError;
use crate::model::{Entry, FilterOptions, FilterSpec, Table};

/// The two parallel result sets for one filter
///
/// Fetched independently with no transactional guarantee across tables; the
/// tables are append-only reference data, so a skew window is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BilingualEntries {
    /// Rows from the English table
    pub english: Vec<Entry>,
    /// Rows from the OriginalLanguage table
    pub original: Vec<Entry>,
}

impl BilingualEntries {
    /// Whether both tables returned nothing
    pub fn is_empty(&self) -> bool {
        self.english.is_empty() && self.original.is_empty()
    }
}

/// Retrieval pipeline over a cached credentialed backend
#[derive(Debug)]
pub struct RetrievalPipeline<B> {
    backend: CachedBackend<B>,
}

impl<B: QueryBackend> RetrievalPipeline<B> {
    /// Create a pipeline over `backend`
    pub fn new(backend: CachedBackend<B>) -> Self {
        Self { backend }
    }

    /// Option lists for the three select controls
    ///
    /// Derived from the English table only, even though filtering later
    /// applies to both tables; the original behaves this way and the
    /// asymmetry is kept deliberately.
    pub async fn filter_options(&self) -> Result<FilterOptions, QueryError> {
        let countries = self.backend.list_distinct_values(Table::English, "country").await?;
        let periods = self.backend.list_distinct_values(Table::English, "period").await?;
        let sections = self.backend.list_distinct_values(Table::English, "section").await?;

        Ok(FilterOptions {
            countries,
            periods,
            sections,
        })
    }

    /// Fetch both language tables for `filter`
    ///
    /// The two fetches share no mutable state and run concurrently; each
    /// result set arrives ordered by `(section_num, entry_num)`.
    pub async fn retrieve(&self, filter: &FilterSpec) -> Result<BilingualEntries, QueryError> {
        let (english, original) = tokio::try_join!(
            self.backend.query_entries(Table::English, filter),
            self.backend.query_entries(Table::OriginalLanguage, filter),
        )?;

        debug!(
            "Retrieved {} English / {} original rows for [{}]",
            english.len(),
            original.len(),
            filter
        );

        Ok(BilingualEntries { english, original })
    }

    /// Combined cache statistics for this pipeline's backend
    pub fn cache_stats(&self) -> CacheStats {
        self.backend.stats()
    }

    /// The cached backend this pipeline fetches through
    pub fn backend(&self) -> &CachedBackend<B> {
        &self.backend
    }
}
