//! Inventory hydration.
//!
//! Turns a parsed CSV table into the in-memory inventory: cleaned column
//! names, normalized records, a guessed key column and a code index for
//! match lookups during scanning.

use std::collections::HashMap;

use thiserror::Error;

use crate::csv::{normalize_cell, unique_column_names, ParsedTable};

/// Key-column candidates, checked in order against lower-cased column
/// names. Inventories in the field come from Spanish- and English-language
/// ERP exports alike.
const KEY_GUESSES: [&str; 11] = [
    "codigo",
    "código",
    "barcode",
    "barra",
    "ean",
    "sku",
    "id",
    "inventario",
    "cod_barra",
    "code",
    "nro.inventario",
];

/// Distinct user-visible statuses for malformed input. None of these is a
/// crash; the UI renders each differently.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HydrateError {
    #[error("the file contains no rows")]
    EmptyTable,
    #[error("no columns detected in the header row")]
    NoColumns,
    #[error("the file contains no data rows")]
    NoDataRows,
}

/// The loaded inventory table.
#[derive(Clone, Debug)]
pub struct Inventory {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
    key: String,
    index: HashMap<String, usize>,
    delimiter: char,
}

impl Inventory {
    /// Build an inventory from a parsed table. Row 0 is the header; data
    /// rows are normalized cell-by-cell and padded to the column count.
    pub fn hydrate(table: &ParsedTable) -> Result<Self, HydrateError> {
        let Some((header, data)) = table.rows.split_first() else {
            return Err(HydrateError::EmptyTable);
        };
        let columns = unique_column_names(header);
        if columns.is_empty() {
            return Err(HydrateError::NoColumns);
        }
        let records: Vec<Vec<String>> = data
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| {
                (0..columns.len())
                    .map(|i| normalize_cell(row.get(i)))
                    .collect()
            })
            .collect();
        if records.is_empty() {
            return Err(HydrateError::NoDataRows);
        }

        let key = guess_key(&columns);
        let mut inventory = Self {
            columns,
            records,
            key,
            index: HashMap::new(),
            delimiter: table.delimiter,
        };
        inventory.rebuild_index();
        Ok(inventory)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The active key column.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The delimiter the file was imported with; reused on export.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Switch the key column and rebuild the index. An unknown name falls
    /// back to the first column.
    pub fn set_key(&mut self, key: &str) {
        self.key = key.to_string();
        self.rebuild_index();
    }

    /// Find the record whose key cell equals `code`.
    pub fn lookup(&self, code: &str) -> Option<&Vec<String>> {
        self.index.get(code.trim()).map(|&i| &self.records[i])
    }

    /// Column/value pairs of the record matching `code`, for attaching to
    /// a confirmed scan.
    pub fn lookup_fields(&self, code: &str) -> Option<Vec<(String, String)>> {
        self.lookup(code).map(|record| {
            self.columns
                .iter()
                .cloned()
                .zip(record.iter().cloned())
                .collect()
        })
    }

    fn rebuild_index(&mut self) {
        if !self.columns.contains(&self.key) {
            self.key = self.columns[0].clone();
        }
        let key_pos = self
            .columns
            .iter()
            .position(|c| *c == self.key)
            .unwrap_or(0);
        self.index.clear();
        for (i, record) in self.records.iter().enumerate() {
            let code = record.get(key_pos).map(|c| c.trim()).unwrap_or("");
            if !code.is_empty() {
                // Later rows overwrite earlier ones on key collision.
                self.index.insert(code.to_string(), i);
            }
        }
    }
}

fn guess_key(columns: &[String]) -> String {
    let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
    for candidate in KEY_GUESSES {
        if let Some(pos) = lowered.iter().position(|c| c == candidate) {
            return columns[pos].clone();
        }
    }
    columns[0].clone()
}
