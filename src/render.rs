/*!
 * Grouped text rendering of entry result sets.
 *
 * Rows arrive pre-sorted by `(section_num, entry_num)`; the renderer groups
 * them by section in the order sections first appear in that sequence and
 * prints rows within each group in their incoming order. It never re-sorts.
 */

use std::collections::HashMap;
use std::io::{self, Write};

use crate::model::Entry;

/// Renderer for one labeled result table
#[derive(Debug, Default)]
pub struct GroupedRenderer;

impl GroupedRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self
    }

    /// Render `rows` under a heading `label` into `out`
    ///
    /// An empty result set renders a single "No entries found." notice. Group
    /// order tracks input order, not alphabetical order, and rows of one
    /// section collapse into that section's first-seen group even if they are
    /// not adjacent in the input. Entry text is emitted raw: no truncation,
    /// pagination, or match highlighting.
    pub fn render<W: Write>(&self, out: &mut W, rows: &[Entry], label: &str) -> io::Result<()> {
        writeln!(out, "== {} ==", label)?;

        if rows.is_empty() {
            writeln!(out, "No entries found.")?;
            return Ok(());
        }

        for (section, entries) in group_by_section(rows) {
            writeln!(out)?;
            writeln!(out, "Section: {}", section)?;
            for entry in entries {
                writeln!(out, "{}", entry.entry)?;
            }
        }

        Ok(())
    }
}

/// Partition rows by section, preserving first-seen section order
fn group_by_section(rows: &[Entry]) -> Vec<(&str, Vec<&Entry>)> {
    let mut groups: Vec<(&str, Vec<&Entry>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for entry in rows {
        match positions.get(entry.section.as_str()) {
            Some(&idx) => groups[idx].1.push(entry),
            None => {
                positions.insert(entry.section.as_str(), groups.len());
                groups.push((entry.section.as_str(), vec![entry]));
            }
        }
    }

    groups
}
