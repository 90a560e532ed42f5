//! Confirmed-scan log.
//!
//! Every code the operator confirms lands here once, stamped with the
//! confirmation time and whether it matched the loaded inventory. The log
//! persists through `ConfirmedStore` so a restarted station picks up where
//! it left off, and renders itself as CSV text for export (the caller
//! decides where the bytes go).

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;

/// One confirmed scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedRecord {
    pub code: String,
    pub scanned_at: DateTime<Utc>,
    pub matched: bool,
    /// Column/value pairs copied from the matching inventory record, empty
    /// when the code was not in the inventory.
    pub fields: Vec<(String, String)>,
}

/// Outcome of a confirm call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Added,
    /// The code is already in the log; nothing was appended.
    Duplicate,
    /// Blank after trimming; nothing was appended.
    Blank,
}

/// Persistence seam for the confirmed list.
pub trait ConfirmedStore {
    fn append(&mut self, record: &ConfirmedRecord) -> Result<()>;
    fn load_all(&mut self) -> Result<Vec<ConfirmedRecord>>;
    fn clear(&mut self) -> Result<()>;
}

// ----------------------------------------------------------------------------
// SQLite store
// ----------------------------------------------------------------------------

pub struct SqliteConfirmedStore {
    conn: Connection,
}

impl SqliteConfirmedStore {
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS confirmed_scans (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              scanned_at TEXT NOT NULL,
              code TEXT NOT NULL,
              matched INTEGER NOT NULL,
              fields_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_confirmed_code ON confirmed_scans(code);
            "#,
        )?;
        Ok(())
    }
}

impl ConfirmedStore for SqliteConfirmedStore {
    fn append(&mut self, record: &ConfirmedRecord) -> Result<()> {
        let fields_json = serde_json::to_string(&record.fields)?;
        self.conn.execute(
            "INSERT INTO confirmed_scans (scanned_at, code, matched, fields_json) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.scanned_at.to_rfc3339(),
                record.code,
                record.matched as i64,
                fields_json
            ],
        )?;
        Ok(())
    }

    fn load_all(&mut self) -> Result<Vec<ConfirmedRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT scanned_at, code, matched, fields_json FROM confirmed_scans ORDER BY id",
        )?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let scanned_at: String = row.get(0)?;
            let code: String = row.get(1)?;
            let matched: i64 = row.get(2)?;
            let fields_json: String = row.get(3)?;
            let scanned_at = DateTime::parse_from_rfc3339(&scanned_at)
                .map_err(|e| anyhow!("corrupt confirmed_scans timestamp: {e}"))?
                .with_timezone(&Utc);
            records.push(ConfirmedRecord {
                code,
                scanned_at,
                matched: matched != 0,
                fields: serde_json::from_str(&fields_json)?,
            });
        }
        Ok(records)
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM confirmed_scans", [])?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// In-memory store
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct InMemoryConfirmedStore {
    records: Vec<ConfirmedRecord>,
}

impl ConfirmedStore for InMemoryConfirmedStore {
    fn append(&mut self, record: &ConfirmedRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn load_all(&mut self) -> Result<Vec<ConfirmedRecord>> {
        Ok(self.records.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// The log
// ----------------------------------------------------------------------------

pub struct ConfirmedLog {
    records: Vec<ConfirmedRecord>,
    store: Box<dyn ConfirmedStore>,
}

impl ConfirmedLog {
    /// Open the log, restoring whatever the store already holds.
    pub fn open(mut store: Box<dyn ConfirmedStore>) -> Result<Self> {
        let records = store.load_all()?;
        Ok(Self { records, store })
    }

    pub fn records(&self) -> &[ConfirmedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        let code = code.trim();
        self.records.iter().any(|r| r.code == code)
    }

    /// Confirm `code` at `scanned_at`, copying the inventory fields when
    /// the code matches. Blank and already-confirmed codes are no-ops.
    pub fn confirm(
        &mut self,
        code: &str,
        inventory: Option<&Inventory>,
        scanned_at: DateTime<Utc>,
    ) -> Result<ConfirmOutcome> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(ConfirmOutcome::Blank);
        }
        if self.contains(code) {
            return Ok(ConfirmOutcome::Duplicate);
        }
        let fields = inventory
            .and_then(|inv| inv.lookup_fields(code))
            .unwrap_or_default();
        let record = ConfirmedRecord {
            code: code.to_string(),
            scanned_at,
            matched: !fields.is_empty(),
            fields,
        };
        self.store.append(&record)?;
        self.records.push(record);
        Ok(ConfirmOutcome::Added)
    }

    /// Empty the log, both in memory and in the store.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.records.clear();
        Ok(())
    }

    /// Render the log as CSV text: BOM prefix, CRLF line joins, every cell
    /// quoted with `""` doubling. Columns are `timestamp`, `code`,
    /// `matched`, then the inventory columns (de-duplicated, order
    /// preserved). Returns `None` when the log is empty: a distinct
    /// no-records status, not an empty file.
    pub fn export_csv(&self, inventory_columns: &[String], delimiter: char) -> Option<String> {
        if self.records.is_empty() {
            return None;
        }
        let mut columns: Vec<String> =
            vec!["timestamp".into(), "code".into(), "matched".into()];
        for col in inventory_columns {
            if !columns.contains(col) {
                columns.push(col.clone());
            }
        }

        let delim = delimiter.to_string();
        let mut lines = Vec::with_capacity(self.records.len() + 1);
        lines.push(
            columns
                .iter()
                .map(|c| escape_cell(c))
                .collect::<Vec<_>>()
                .join(&delim),
        );
        for record in &self.records {
            let cells: Vec<String> = columns
                .iter()
                .map(|col| escape_cell(&record_cell(record, col)))
                .collect();
            lines.push(cells.join(&delim));
        }
        Some(format!("\u{feff}{}", lines.join("\r\n")))
    }
}

fn record_cell(record: &ConfirmedRecord, column: &str) -> String {
    match column {
        "timestamp" => record.scanned_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        "code" => record.code.clone(),
        "matched" => if record.matched { "1" } else { "0" }.to_string(),
        _ => record
            .fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.clone())
            .unwrap_or_default(),
    }
}

fn escape_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse_auto;
    use chrono::TimeZone;

    fn log() -> ConfirmedLog {
        ConfirmedLog::open(Box::new(InMemoryConfirmedStore::default())).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap()
    }

    #[test]
    fn confirm_deduplicates_by_code() {
        let mut log = log();
        assert_eq!(log.confirm("750", None, at(0)).unwrap(), ConfirmOutcome::Added);
        assert_eq!(
            log.confirm("750", None, at(1000)).unwrap(),
            ConfirmOutcome::Duplicate
        );
        assert_eq!(
            log.confirm("  750 ", None, at(2000)).unwrap(),
            ConfirmOutcome::Duplicate
        );
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn blank_codes_are_rejected() {
        let mut log = log();
        assert_eq!(log.confirm("   ", None, at(0)).unwrap(), ConfirmOutcome::Blank);
        assert!(log.is_empty());
    }

    #[test]
    fn match_flag_and_fields_come_from_inventory() {
        let inv = Inventory::hydrate(&parse_auto("codigo,desc\n750,Item A\n")).unwrap();
        let mut log = log();
        log.confirm("750", Some(&inv), at(0)).unwrap();
        log.confirm("999", Some(&inv), at(1)).unwrap();

        assert!(log.records()[0].matched);
        assert_eq!(
            log.records()[0].fields,
            vec![
                ("codigo".to_string(), "750".to_string()),
                ("desc".to_string(), "Item A".to_string())
            ]
        );
        assert!(!log.records()[1].matched);
        assert!(log.records()[1].fields.is_empty());
    }

    #[test]
    fn export_carries_bom_crlf_and_quoting() {
        let inv =
            Inventory::hydrate(&parse_auto("codigo;desc\n750;\"Item \"\"A\"\"\"\n")).unwrap();
        let mut log = log();
        log.confirm("750", Some(&inv), at(0)).unwrap();

        let text = log.export_csv(inv.columns(), inv.delimiter()).unwrap();
        assert!(text.starts_with('\u{feff}'));
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').split("\r\n").collect();
        assert_eq!(lines[0], "\"timestamp\";\"code\";\"matched\";\"codigo\";\"desc\"");
        assert!(lines[1].ends_with(";\"750\";\"Item \"\"A\"\"\""));
        assert!(lines[1].contains("\"1\""));
    }

    #[test]
    fn export_of_empty_log_is_none() {
        let log = log();
        assert!(log.export_csv(&[], ',').is_none());
    }

    #[test]
    fn clear_empties_memory_and_store() {
        let mut log = log();
        log.confirm("750", None, at(0)).unwrap();
        log.clear().unwrap();
        assert!(log.is_empty());
    }
}
