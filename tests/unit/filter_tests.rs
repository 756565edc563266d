/*!
 * Tests for filter and distinct-value semantics against the mock backend
 */

use crge_explorer::backend::mock::MockBackend;
use crge_explorer::backend::QueryBackend;
use crge_explorer::model::{Entry, FilterSpec, Table, ALL};

use crate::common::{english_rows, entry};

#[tokio::test]
async fn test_queryEntries_withUnconstrainedFilter_shouldReturnAllRowsSorted() {
    let backend = MockBackend::working(english_rows());

    let rows = backend
        .query_entries(Table::English, &FilterSpec::default())
        .await
        .unwrap();

    assert_eq!(rows.len(), english_rows().len());
    let keys: Vec<(i64, i64)> = rows.iter().map(Entry::sort_key).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn test_queryEntries_withCountryFilter_shouldMatchExactly() {
    let backend = MockBackend::working(english_rows());
    let filter = FilterSpec {
        country: "Ethiopia".to_string(),
        ..FilterSpec::default()
    };

    let rows = backend.query_entries(Table::English, &filter).await.unwrap();

    assert!(!rows.is_empty());
    assert!(rows.iter().all(|row| row.country == "Ethiopia"));
}

#[tokio::test]
async fn test_queryEntries_withPartialCountryValue_shouldMatchNothing() {
    let backend = MockBackend::working(english_rows());
    let filter = FilterSpec {
        country: "Ethio".to_string(),
        ..FilterSpec::default()
    };

    let rows = backend.query_entries(Table::English, &filter).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_queryEntries_withSearch_shouldMatchCaseInsensitiveSubstring() {
    let backend = MockBackend::working(english_rows());
    let filter = FilterSpec {
        search: "treaty".to_string(),
        ..FilterSpec::default()
    };

    let rows = backend.query_entries(Table::English, &filter).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].entry.contains("Treaty of Wuchale"));
}

#[tokio::test]
async fn test_queryEntries_withCombinedPredicates_shouldAndThem() {
    let backend = MockBackend::working(english_rows());
    let filter = FilterSpec {
        country: "Eritrea".to_string(),
        period: "Colonial".to_string(),
        section: "Trade".to_string(),
        search: "tariff".to_string(),
    };

    let rows = backend.query_entries(Table::English, &filter).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry, "Port tariff schedule");
}

#[tokio::test]
async fn test_queryEntries_withNoMatches_shouldReturnEmptyNotError() {
    let backend = MockBackend::working(english_rows());
    let filter = FilterSpec {
        country: "Atlantis".to_string(),
        ..FilterSpec::default()
    };

    let rows = backend.query_entries(Table::English, &filter).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_listDistinctValues_shouldBeSortedDedupedAndAllPrefixed() {
    // Fixture has repeated countries and arrives unsorted.
    let backend = MockBackend::working(english_rows());

    let values = backend
        .list_distinct_values(Table::English, "country")
        .await
        .unwrap();

    assert_eq!(values[0], ALL);
    let rest: Vec<&str> = values[1..].iter().map(String::as_str).collect();
    assert_eq!(rest, vec!["Eritrea", "Ethiopia"]);
}

#[tokio::test]
async fn test_listDistinctValues_withSections_shouldListEachOnce() {
    let backend = MockBackend::working(english_rows());

    let values = backend
        .list_distinct_values(Table::English, "section")
        .await
        .unwrap();

    assert_eq!(values, ["All", "Administration", "Law", "Trade"]);
}

#[tokio::test]
async fn test_queryEntries_withFailingBackend_shouldPropagateError() {
    let backend = MockBackend::failing();

    let result = backend
        .query_entries(Table::English, &FilterSpec::default())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_queryEntries_withEmptySearchAndAllSelects_shouldNotConstrain() {
    let rows = vec![entry("A", "B", "C", 1, 1, "text")];
    let backend = MockBackend::working(rows.clone());

    let fetched = backend
        .query_entries(Table::English, &FilterSpec::default())
        .await
        .unwrap();
    assert_eq!(fetched, rows);
}
