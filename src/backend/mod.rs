/*!
 * Clients for the remote backend.
 *
 * This module contains the clients the application talks to the backend with:
 * - `auth`: password-grant sign-in against the identity endpoint
 * - `rest`: credentialed queries against the tabular REST surface
 * - `mock`: in-memory backend for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::QueryError;
use crate::model::{Entry, FilterSpec, Table};

/// Common trait for credentialed query backends
///
/// This trait is the seam between the retrieval pipeline and the wire
/// client, allowing the real REST client and the in-memory mock to be used
/// interchangeably.
#[async_trait]
pub trait QueryBackend: Send + Sync + Debug {
    /// List the distinct non-null values of `column` in `table`
    ///
    /// # Returns
    /// * Values sorted ascending, deduplicated, prefixed with the `"All"` sentinel
    async fn list_distinct_values(&self, table: Table, column: &str) -> Result<Vec<String>, QueryError>;

    /// Fetch the rows of `table` matching `filter`
    ///
    /// # Returns
    /// * Matching rows ordered ascending by `(section_num, entry_num)`;
    ///   an empty vector when nothing matches
    async fn query_entries(&self, table: Table, filter: &FilterSpec) -> Result<Vec<Entry>, QueryError>;
}

pub mod auth;
pub mod mock;
pub mod rest;
