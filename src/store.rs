use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::warn;
use serde_json::{json, Value};

use crate::model::AmbienceSetting;

/// Top-level namespace key inside the settings document.
const SETTINGS_KEY: &str = "AmbientLightAdjustment";

/// Loads and saves the two ambience slot records as a JSON document at a
/// fixed per-user path. The document is always rewritten whole, current
/// slot first, secondary second.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read both slot records. A missing file or missing namespace key is
    /// simply empty state, not an error. A record that fails to parse drops
    /// only that slot; the other still loads.
    pub fn load(&self) -> Result<[Option<AmbienceSetting>; 2]> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok([None, None]),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read settings at {:?}", self.path))
            }
        };

        let doc: Value = serde_json::from_str(&text)
            .with_context(|| format!("Malformed settings document at {:?}", self.path))?;

        let records = match doc.get(SETTINGS_KEY) {
            None => return Ok([None, None]),
            Some(Value::Array(records)) => records,
            Some(_) => bail!("Settings key {:?} is not a list", SETTINGS_KEY),
        };

        let mut slots = [None, None];
        for (i, record) in records.iter().take(2).enumerate() {
            match serde_json::from_value::<AmbienceSetting>(record.clone()) {
                Ok(setting) => slots[i] = Some(setting),
                Err(e) => warn!("[STORE] Dropping unreadable slot {} record: {}", i, e),
            }
        }
        Ok(slots)
    }

    /// Like `load`, but corruption degrades to empty state instead of an
    /// error. A broken settings file must never block showing the control.
    pub fn load_or_default(&self) -> [Option<AmbienceSetting>; 2] {
        match self.load() {
            Ok(slots) => slots,
            Err(e) => {
                warn!("[STORE] Falling back to default ambience settings: {:#}", e);
                [None, None]
            }
        }
    }

    /// Overwrite the document with exactly two records, current first.
    pub fn save(&self, current: AmbienceSetting, secondary: AmbienceSetting) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let doc = json!({ SETTINGS_KEY: [current, secondary] });
        let text = serde_json::to_string_pretty(&doc)?;
        fs::write(&self.path, text)
            .with_context(|| format!("Failed to write settings at {:?}", self.path))
    }
}
