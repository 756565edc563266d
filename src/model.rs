/*!
 * Core data model for the historical-record database.
 *
 * The backend exposes two parallel tables, `English` and `OriginalLanguage`,
 * sharing one row shape. Row *i* of one table corresponds to row *i* of the
 * other for the same filter, because both tables sort on the same keys.
 */

use serde::{Deserialize, Serialize};

/// Sentinel option meaning "no constraint on this field"
pub const ALL: &str = "All";

/// The two parallel entry tables on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// English-language entries
    English,
    /// Entries in the original source language
    OriginalLanguage,
}

impl Table {
    /// Backend table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::OriginalLanguage => "OriginalLanguage",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One historical record row
///
/// Within a table, ordering by `(section_num, entry_num)` is total and stable;
/// the backend returns rows in that order and the rest of the application
/// relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Country the record belongs to
    pub country: String,

    /// Historical period label
    pub period: String,

    /// Section heading the entry appears under
    pub section: String,

    /// Inter-section ordering key
    pub section_num: i64,

    /// Intra-section ordering key
    pub entry_num: i64,

    /// Entry text body
    pub entry: String,
}

impl Entry {
    /// The two-key sort order used by every entry query
    pub fn sort_key(&self) -> (i64, i64) {
        (self.section_num, self.entry_num)
    }
}

/// The four user-chosen filter values, re-derived each interaction cycle
///
/// `"All"` on a select field and an empty `search` mean "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Country constraint, or `"All"`
    pub country: String,

    /// Period constraint, or `"All"`
    pub period: String,

    /// Section constraint, or `"All"`
    pub section: String,

    /// Free-text constraint on the entry body, or empty
    pub search: String,
}

impl FilterSpec {
    /// Check whether no field constrains the query
    pub fn is_unconstrained(&self) -> bool {
        self.country == ALL && self.period == ALL && self.section == ALL && self.search.is_empty()
    }

    /// Apply the filter semantics to a single row
    ///
    /// `country`/`period`/`section` use exact equality when not `"All"`;
    /// `search` is a case-insensitive substring match against the entry body
    /// when non-empty; all active predicates are ANDed. The credentialed
    /// client pushes these predicates to the backend; this in-process
    /// restatement is the single definition shared by the mock backend and
    /// the test suite.
    pub fn matches(&self, entry: &Entry) -> bool {
        if self.country != ALL && entry.country != self.country {
            return false;
        }
        if self.period != ALL && entry.period != self.period {
            return false;
        }
        if self.section != ALL && entry.section != self.section {
            return false;
        }
        if !self.search.is_empty() {
            let haystack = entry.entry.to_lowercase();
            let needle = self.search.to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            country: ALL.to_string(),
            period: ALL.to_string(),
            section: ALL.to_string(),
            search: String::new(),
        }
    }
}

impl std::fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "country={} period={} section={} search={:?}",
            self.country, self.period, self.section, self.search
        )
    }
}

/// Option lists for the three select controls
///
/// Each list is sorted ascending, deduplicated, and begins with `"All"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Distinct countries
    pub countries: Vec<String>,
    /// Distinct periods
    pub periods: Vec<String>,
    /// Distinct sections
    pub sections: Vec<String>,
}
