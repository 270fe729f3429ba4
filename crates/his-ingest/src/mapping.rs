//! Header-to-field resolution for delimited exports.

use std::collections::BTreeMap;

use crate::delimited::field;
use crate::profile::{FieldKey, FieldRow, SynonymTable};

/// Column index of each canonical field in a delimited export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<FieldKey, usize>,
}

impl ColumnMapping {
    /// Resolves header cells against a synonym table.
    ///
    /// Each cell is lowercased and trimmed, then claimed by the first field in
    /// table order that has a synonym contained in it. When several cells
    /// claim the same field the rightmost one wins.
    pub fn from_header(headers: &[String], synonyms: SynonymTable) -> Self {
        let mut columns = BTreeMap::new();
        for (index, header) in headers.iter().enumerate() {
            let header = header.trim().to_lowercase();
            if header.is_empty() {
                continue;
            }
            let claimed = synonyms.iter().find(|(_, variants)| {
                variants
                    .iter()
                    .any(|variant| header.contains(&variant.to_lowercase()))
            });
            if let Some((key, _)) = claimed {
                columns.insert(*key, index);
            }
        }
        Self { columns }
    }

    /// Positional mapping used when a file has no header.
    pub fn from_order(order: &[FieldKey]) -> Self {
        Self {
            columns: order
                .iter()
                .enumerate()
                .map(|(index, key)| (*key, index))
                .collect(),
        }
    }

    pub fn column(&self, key: FieldKey) -> Option<usize> {
        self.columns.get(&key).copied()
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.columns.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Extracts the mapped fields of one data line.
    pub fn extract(&self, fields: &[String]) -> FieldRow {
        let mut row = FieldRow::new();
        for (key, index) in &self.columns {
            row.set(*key, field(fields, *index));
        }
        row
    }
}
