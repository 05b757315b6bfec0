use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::errors::MediaEngineError;

/// Default warning threshold for listeners on one event name.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Registering more listeners than this on one event logs a warning.
    /// 0 disables the check.
    #[serde(default = "default_max_listeners")]
    pub max_listeners_per_event: usize,
    #[serde(default)]
    pub trace_dispatch: bool,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_max_listeners() -> usize {
    DEFAULT_MAX_LISTENERS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_listeners_per_event: DEFAULT_MAX_LISTENERS,
            trace_dispatch: false,
            log_filter: None,
        }
    }
}

pub struct SettingsStore {
    settings: Mutex<Settings>,
    file_path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let file_path = data_dir.as_ref().join("settings.json");
        let settings = match Self::load(&file_path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("falling back to default settings: {e}");
                Settings::default()
            }
        };
        Self {
            settings: Mutex::new(settings),
            file_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn get(&self) -> Settings {
        self.lock().clone()
    }

    pub fn set_max_listeners_per_event(&self, max: usize) {
        self.lock().max_listeners_per_event = max;
        self.persist();
    }

    pub fn set_trace_dispatch(&self, enabled: bool) {
        self.lock().trace_dispatch = enabled;
        self.persist();
    }

    pub fn set_log_filter(&self, filter: Option<String>) {
        self.lock().log_filter = filter;
        self.persist();
    }

    fn lock(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(path = %self.file_path.display(), "failed to save settings: {e}");
        }
    }

    fn save(&self) -> Result<(), MediaEngineError> {
        let settings = self.get();
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MediaEngineError::Settings(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&settings)
            .map_err(|e| MediaEngineError::Settings(e.to_string()))?;
        std::fs::write(&self.file_path, json).map_err(|e| MediaEngineError::Settings(e.to_string()))
    }

    /// A missing file yields defaults; an unreadable or corrupt one is an error.
    fn load(path: &Path) -> Result<Settings, MediaEngineError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| MediaEngineError::Settings(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(MediaEngineError::Settings(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.max_listeners_per_event, 10);
        assert!(!s.trace_dispatch);
        assert_eq!(s.log_filter, None);
    }

    #[test]
    fn test_new_creates_defaults_when_no_file() {
        let dir = temp_dir();
        let store = SettingsStore::new(dir.path());
        assert_eq!(store.get(), Settings::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_set_max_listeners_persists() {
        let dir = temp_dir();
        {
            let store = SettingsStore::new(dir.path());
            store.set_max_listeners_per_event(0);
        }
        let store = SettingsStore::new(dir.path());
        assert_eq!(store.get().max_listeners_per_event, 0);
    }

    #[test]
    fn test_trace_and_filter_persist() {
        let dir = temp_dir();
        {
            let store = SettingsStore::new(dir.path());
            store.set_trace_dispatch(true);
            store.set_log_filter(Some("frametap_core=trace".to_string()));
        }
        let store = SettingsStore::new(dir.path());
        let s = store.get();
        assert!(s.trace_dispatch);
        assert_eq!(s.log_filter.as_deref(), Some("frametap_core=trace"));
    }

    #[test]
    fn test_creates_missing_data_dir() {
        let dir = temp_dir();
        let nested = dir.path().join("a").join("b");
        let store = SettingsStore::new(&nested);
        store.set_trace_dispatch(true);
        assert!(nested.join("settings.json").exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = temp_dir();
        fs::write(dir.path().join("settings.json"), "not json!!!").unwrap();
        let store = SettingsStore::new(dir.path());
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn test_partial_json_uses_serde_defaults() {
        let dir = temp_dir();
        fs::write(
            dir.path().join("settings.json"),
            r#"{"trace_dispatch":true}"#,
        )
        .unwrap();
        let store = SettingsStore::new(dir.path());
        let s = store.get();
        assert!(s.trace_dispatch);
        assert_eq!(s.max_listeners_per_event, DEFAULT_MAX_LISTENERS);
        assert_eq!(s.log_filter, None);
    }
}
