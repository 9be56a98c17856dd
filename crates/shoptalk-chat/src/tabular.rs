//! Tabular shop-information source.
//!
//! Store-operational facts (hours, addresses, contacts, policies) are
//! maintained as a table of key/value records. The file-backed source reads
//! a TOML snapshot of that table at startup; each record becomes one
//! document in the shop-information collection.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use shoptalk_core::error::ShoptalkError;

/// Source of tabular shop-information records.
pub trait TabularSource: Send + Sync {
    /// Fetch all records. Field order within a record is stable.
    fn records(&self) -> Result<Vec<BTreeMap<String, String>>, ShoptalkError>;
}

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default, rename = "record")]
    records: Vec<BTreeMap<String, toml::Value>>,
}

/// TOML-file-backed table snapshot.
///
/// The file holds one `[[record]]` table per row:
///
/// ```toml
/// [[record]]
/// branch = "Main"
/// address = "123 Example Street"
/// hours = "9:00-21:00"
/// ```
///
/// Scalar values of any TOML type are accepted and rendered to strings.
#[derive(Debug, Clone)]
pub struct FileTableSource {
    path: PathBuf,
}

impl FileTableSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TabularSource for FileTableSource {
    fn records(&self) -> Result<Vec<BTreeMap<String, String>>, ShoptalkError> {
        let content = std::fs::read_to_string(&self.path)?;
        let table: TableFile = toml::from_str(&content)?;

        let records: Vec<BTreeMap<String, String>> = table
            .records
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .map(|(key, value)| (key, render_value(value)))
                    .collect()
            })
            .collect();

        info!(path = %self.path.display(), count = records.len(), "Loaded shop records");
        Ok(records)
    }
}

fn render_value(value: toml::Value) -> String {
    match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    }
}
