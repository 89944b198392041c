//! Persistence of the form record
//!
//! The record is stored as JSON under a single key, with Sum in kopecks.
//! Every save overwrites the whole record.

use crate::amount;
use crate::config::StorageOptions;
use crate::error::{Error, Result};
use crate::fields::PaymentFields;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Backing store for the form record
pub trait FormStore {
    /// Load the stored record, `None` when nothing has been saved.
    fn load(&self) -> Result<Option<PaymentFields>>;
    /// Overwrite the stored record.
    fn save(&self, fields: &PaymentFields) -> Result<()>;
    /// Remove the stored record.
    fn clear(&self) -> Result<()>;
}

/// Convert a form record into its persisted shape.
pub fn to_stored(fields: &PaymentFields) -> PaymentFields {
    PaymentFields {
        sum: amount::to_minor_units(&fields.sum).unwrap_or_default(),
        ..fields.clone()
    }
}

/// Convert a persisted record back into form values.
pub fn from_stored(stored: PaymentFields) -> PaymentFields {
    PaymentFields {
        sum: amount::from_minor_units(&stored.sum),
        ..stored
    }
}

/// JSON file holding a map of keys to records
///
/// Keys other than the form key are left untouched.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    key: String,
}

impl JsonFileStore {
    /// Store the record under `key` in the file at `path`
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Build a store from configuration
    pub fn from_options(options: &StorageOptions) -> Self {
        Self::new(options.path.clone(), options.key.clone())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(Error::Storage(format!(
                "Failed to parse {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_map(&self, map: Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let contents = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, contents)
            .map_err(|e| Error::Storage(format!("Failed to write {}: {e}", self.path.display())))
    }
}

impl FormStore for JsonFileStore {
    fn load(&self) -> Result<Option<PaymentFields>> {
        let mut map = self.read_map()?;
        let Some(value) = map.remove(&self.key) else {
            return Ok(None);
        };

        let stored: PaymentFields = serde_json::from_value(value).map_err(|e| {
            Error::Storage(format!(
                "Stored record '{}' is malformed: {e}",
                self.key
            ))
        })?;
        Ok(Some(from_stored(stored)))
    }

    fn save(&self, fields: &PaymentFields) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(self.key.clone(), serde_json::to_value(to_stored(fields))?);
        self.write_map(map)?;
        tracing::debug!(path = %self.path.display(), key = %self.key, "Saved form record");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(&self.key).is_some() {
            self.write_map(map)?;
            tracing::info!(path = %self.path.display(), key = %self.key, "Cleared form record");
        }
        Ok(())
    }
}
