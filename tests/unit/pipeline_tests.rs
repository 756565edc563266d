/*!
 * Tests for the retrieval pipeline
 */

use std::sync::Arc;
use std::time::Duration;

use crge_explorer::backend::mock::MockBackend;
use crge_explorer::cache::{CachedBackend, QueryCaches};
use crge_explorer::model::{FilterSpec, ALL};
use crge_explorer::pipeline::RetrievalPipeline;

use crate::common::{english_rows, entry, original_rows};

fn pipeline(backend: MockBackend) -> RetrievalPipeline<MockBackend> {
    let caches = Arc::new(QueryCaches::new(Duration::from_secs(600)));
    RetrievalPipeline::new(CachedBackend::new(backend, caches))
}

#[tokio::test]
async fn test_retrieve_shouldReturnBothTablesForOneFilter() {
    let backend = MockBackend::bilingual(english_rows(), original_rows());
    let pipeline = pipeline(backend);

    let results = pipeline.retrieve(&FilterSpec::default()).await.unwrap();

    assert_eq!(results.english.len(), english_rows().len());
    assert_eq!(results.original.len(), original_rows().len());
    assert!(!results.is_empty());
}

#[tokio::test]
async fn test_retrieve_shouldKeepParallelTablesAligned() {
    // Same ordering keys on both tables: row i corresponds to row i.
    let backend = MockBackend::bilingual(english_rows(), original_rows());
    let pipeline = pipeline(backend);

    let results = pipeline.retrieve(&FilterSpec::default()).await.unwrap();

    for (english, original) in results.english.iter().zip(results.original.iter()) {
        assert_eq!(english.sort_key(), original.sort_key());
        assert_eq!(english.section, original.section);
    }
}

#[tokio::test]
async fn test_retrieve_withFilter_shouldApplyToBothTables() {
    let backend = MockBackend::bilingual(english_rows(), original_rows());
    let pipeline = pipeline(backend);
    let filter = FilterSpec {
        country: "Eritrea".to_string(),
        ..FilterSpec::default()
    };

    let results = pipeline.retrieve(&filter).await.unwrap();

    assert!(results.english.iter().all(|row| row.country == "Eritrea"));
    assert!(results.original.iter().all(|row| row.country == "Eritrea"));
}

#[tokio::test]
async fn test_filterOptions_shouldDeriveFromEnglishTableOnly() {
    // The original table carries a country the English table does not;
    // option lists must not pick it up.
    let mut original = original_rows();
    original.push(entry("Djibouti", "Modern", "Trade", 4, 1, "ሰነድ"));
    let backend = MockBackend::bilingual(english_rows(), original);
    let pipeline = pipeline(backend);

    let options = pipeline.filter_options().await.unwrap();

    assert_eq!(options.countries, ["All", "Eritrea", "Ethiopia"]);
    assert!(!options.countries.contains(&"Djibouti".to_string()));
    assert_eq!(options.periods[0], ALL);
    assert_eq!(options.sections[0], ALL);
}

#[tokio::test]
async fn test_filterOptions_shouldIssueOneDistinctCallPerColumn() {
    let backend = MockBackend::bilingual(english_rows(), original_rows());
    let pipeline = pipeline(backend);

    pipeline.filter_options().await.unwrap();

    assert_eq!(pipeline.backend().inner().distinct_call_count(), 3);
}

#[tokio::test]
async fn test_retrieve_withRepeatWithinTtl_shouldServeFromCache() {
    let backend = MockBackend::bilingual(english_rows(), original_rows());
    let pipeline = pipeline(backend);
    let filter = FilterSpec::default();

    let first = pipeline.retrieve(&filter).await.unwrap();
    let second = pipeline.retrieve(&filter).await.unwrap();

    assert_eq!(first, second);
    // One call per table; the repeat cycle was fully served from cache.
    assert_eq!(pipeline.backend().inner().entry_call_count(), 2);
    assert_eq!(pipeline.cache_stats().hits, 2);
}

#[tokio::test]
async fn test_retrieve_withFailingBackend_shouldPropagateError() {
    let pipeline = pipeline(MockBackend::failing());

    let result = pipeline.retrieve(&FilterSpec::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_retrieve_withNoMatches_shouldReturnEmptySets() {
    let backend = MockBackend::bilingual(english_rows(), original_rows());
    let pipeline = pipeline(backend);
    let filter = FilterSpec {
        search: "no such phrase anywhere".to_string(),
        ..FilterSpec::default()
    };

    let results = pipeline.retrieve(&filter).await.unwrap();
    assert!(results.is_empty());
}
