/*!
 * Common test utilities for the crge-explorer test suite
 */

use crge_explorer::model::Entry;

/// Build one entry row
pub fn entry(
    country: &str,
    period: &str,
    section: &str,
    section_num: i64,
    entry_num: i64,
    text: &str,
) -> Entry {
    Entry {
        country: country.to_string(),
        period: period.to_string(),
        section: section.to_string(),
        section_num,
        entry_num,
        entry: text.to_string(),
    }
}

/// Fixture rows for the English table
///
/// Deliberately not in `(section_num, entry_num)` order so tests can verify
/// the backend-side sort.
pub fn english_rows() -> Vec<Entry> {
    vec![
        entry("Ethiopia", "Imperial", "Trade", 2, 1, "Customs ledger from the coffee routes"),
        entry("Ethiopia", "Imperial", "Administration", 1, 1, "Decree on provincial governors"),
        entry("Eritrea", "Colonial", "Trade", 2, 2, "Port tariff schedule"),
        entry("Ethiopia", "Modern", "Administration", 1, 2, "The Treaty of Wuchale annotations"),
        entry("Eritrea", "Colonial", "Law", 3, 1, "Land tenure proclamation"),
    ]
}

/// Fixture rows for the OriginalLanguage table
///
/// Parallel to `english_rows`: same keys, translated bodies, so row *i* of
/// one table corresponds to row *i* of the other after sorting.
pub fn original_rows() -> Vec<Entry> {
    vec![
        entry("Ethiopia", "Imperial", "Trade", 2, 1, "የቡና መንገዶች የጉምሩክ መዝገብ"),
        entry("Ethiopia", "Imperial", "Administration", 1, 1, "የክፍለ ሀገር ገዢዎች አዋጅ"),
        entry("Eritrea", "Colonial", "Trade", 2, 2, "የወደብ ቀረጥ ሰንጠረዥ"),
        entry("Ethiopia", "Modern", "Administration", 1, 2, "የውጫሌ ውል ማብራሪያዎች"),
        entry("Eritrea", "Colonial", "Law", 3, 1, "የመሬት ይዞታ አዋጅ"),
    ]
}
