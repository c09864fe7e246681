//! File-backed key/value preferences.
//!
//! Holds the locale preference that registration requests carry. The file is
//! read on every lookup so a change made by another invocation is picked up
//! by the next request.

use crate::error::PreferencesError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Key under which the locale is stored.
pub const LANG_KEY: &str = "langKey";

/// Preferences stored as a flat JSON object.
#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
}

impl Preferences {
    /// Point at a preferences file. Nothing is read until a lookup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current locale, `None` when unset.
    pub async fn lang_key(&self) -> Result<Option<String>, PreferencesError> {
        self.get(LANG_KEY).await
    }

    pub async fn set_lang_key(&self, value: &str) -> Result<(), PreferencesError> {
        self.set(LANG_KEY, value).await
    }

    pub async fn clear_lang_key(&self) -> Result<(), PreferencesError> {
        self.remove(LANG_KEY).await
    }

    /// Read a string value. Non-string values count as unset.
    pub async fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        let entries = self.load().await?;
        Ok(entries
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&entries).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<Map<String, Value>, PreferencesError> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&data)? {
            Value::Object(entries) => Ok(entries),
            _ => Err(PreferencesError::NotAnObject),
        }
    }

    async fn save(&self, entries: &Map<String, Value>) -> Result<(), PreferencesError> {
        let data = serde_json::to_vec_pretty(entries)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file + rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!("Saved {} preferences to {:?}", entries.len(), self.path);
        Ok(())
    }
}
