//! Persisted local preferences.
//!
//! A flat JSON object of scalars stored under the user config directory:
//!
//! ```text
//! ~/.config/mdpad/preferences.json
//! { "name": "Anonymous Otter", "hue": 211, "darkMode": false }
//! ```
//!
//! Loaded once at start-up and written back on every change. A missing
//! or unreadable file means "no preferences yet".

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub const NAME_KEY: &str = "name";
pub const HUE_KEY: &str = "hue";
pub const DARK_MODE_KEY: &str = "darkMode";

/// `<config dir>/mdpad/preferences.json`, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut dir| {
        dir.push("mdpad");
        dir.push("preferences.json");
        dir
    })
}

#[derive(Debug, Default)]
pub struct Preferences {
    /// `None` keeps preferences in memory only.
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl Preferences {
    pub fn load(path: Option<PathBuf>) -> Self {
        let values = path.as_deref().map(read_values).unwrap_or_default();
        Self { path, values }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Ignoring preference {key}: {e}");
                None
            }
        }
    }

    /// The stored value for `key`, or `init()` stored and returned when
    /// the key is absent or unusable. `init` runs at most once.
    pub fn get_or_init<T, F>(&mut self, key: &str, init: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = init();
        self.set(key, &value);
        value
    }

    /// Store `value` under `key` and save if it changed.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Cannot store preference {key}: {e}");
                return;
            }
        };
        if self.values.get(key) == Some(&value) {
            return;
        }
        self.values.insert(key.to_string(), value);
        if let Err(e) = self.save() {
            log::warn!("Failed to save preferences: {e}");
        }
    }

    pub fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, json)
    }
}

fn read_values(path: &Path) -> Map<String, Value> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Map::new(),
        Err(e) => {
            log::warn!("Cannot read {}: {e}", path.display());
            return Map::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(values) => values,
        Err(e) => {
            log::warn!("Ignoring corrupt preferences in {}: {e}", path.display());
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(Some(dir.path().join("none.json")));
        assert_eq!(prefs.get::<String>(NAME_KEY), None);
    }

    #[test]
    fn test_get_or_init_runs_once_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdpad").join("preferences.json");
        let calls = Cell::new(0);

        let mut prefs = Preferences::load(Some(path.clone()));
        let hue: u32 = prefs.get_or_init(HUE_KEY, || {
            calls.set(calls.get() + 1);
            123
        });
        assert_eq!(hue, 123);
        let again: u32 = prefs.get_or_init(HUE_KEY, || {
            calls.set(calls.get() + 1);
            7
        });
        assert_eq!(again, 123);
        assert_eq!(calls.get(), 1);

        let reloaded = Preferences::load(Some(path));
        assert_eq!(reloaded.get::<u32>(HUE_KEY), Some(123));
    }

    #[test]
    fn test_set_saves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let mut prefs = Preferences::load(Some(path.clone()));
        prefs.set(NAME_KEY, &"Ada");
        prefs.set(DARK_MODE_KEY, &true);

        let text = fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[NAME_KEY], "Ada");
        assert_eq!(value[DARK_MODE_KEY], true);
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();

        let mut prefs = Preferences::load(Some(path.clone()));
        assert_eq!(prefs.get::<bool>(DARK_MODE_KEY), None);
        assert!(!prefs.get_or_init(DARK_MODE_KEY, || false));
        // The rewrite replaces the corrupt contents.
        assert_eq!(Preferences::load(Some(path)).get::<bool>(DARK_MODE_KEY), Some(false));
    }

    #[test]
    fn test_wrong_type_falls_back_to_init() {
        let mut prefs = Preferences::in_memory();
        prefs.set(HUE_KEY, &"not a number");
        let hue: u32 = prefs.get_or_init(HUE_KEY, || 42);
        assert_eq!(hue, 42);
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = default_path() {
            assert!(path.ends_with("mdpad/preferences.json"));
        }
    }
}
