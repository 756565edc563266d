/*!
 * # CRGE Historical Database Explorer
 *
 * A Rust library for browsing the CRGE bilingual historical-record database.
 *
 * ## Features
 *
 * - Password sign-in against the backend's identity endpoint
 * - Credentialed queries over the backend's tabular REST surface
 * - Filtering by country, period, section, and free-text search
 * - TTL caching of query results with stampede protection
 * - Grouped text rendering of the two parallel language tables
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `session`: Session store and auth lifecycle state
 * - `backend`: Clients for the remote backend:
 *   - `backend::auth`: Password-grant sign-in client
 *   - `backend::rest`: Credentialed REST query client
 *   - `backend::mock`: In-memory backend for tests
 * - `cache`: TTL memoization of query results
 * - `model`: Entries, tables, and filter state
 * - `pipeline`: Filtered retrieval over the cached backend
 * - `render`: Grouped rendering of result sets
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod backend;
pub mod cache;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod session;

// Re-export main types for easier usage
pub use app_config::Config;
pub use cache::{CacheKey, CacheStats, CachedBackend, QueryCaches, TtlCache};
pub use errors::{AppError, AuthError, QueryError};
pub use model::{Entry, FilterOptions, FilterSpec, Table, ALL};
pub use pipeline::{BilingualEntries, RetrievalPipeline};
pub use render::GroupedRenderer;
pub use session::{Session, SessionStore};
