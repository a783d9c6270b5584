//! File-backed settings store
//!
//! Owns the persisted bubble preferences and last bubble position, and
//! publishes appearance settings through a watch channel so the service can
//! observe a continuous stream plus read the current value once. Values are
//! validated and clamped on every load and update. Writes go through a
//! temp-file rename so a crash mid-write cannot corrupt the file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::constants::{config, geometry, validation};
use crate::host::PositionSink;
use crate::types::{BubbleSettings, Position};

/// On-disk schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct SettingsFile {
    bubble: BubbleSettings,
    position: Position,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            bubble: BubbleSettings::default(),
            position: Position::new(geometry::EDGE_MARGIN, geometry::DEFAULT_BUBBLE_Y),
        }
    }
}

fn validate_and_clamp(file: &mut SettingsFile) {
    if file.bubble.alpha_percent > 100 {
        warn!(
            alpha_percent = file.bubble.alpha_percent,
            "alpha_percent exceeds 100, clamping"
        );
        file.bubble.alpha_percent = 100;
    }
    if file.bubble.size_px < validation::MIN_BUBBLE_SIZE {
        warn!(
            size_px = file.bubble.size_px,
            min = validation::MIN_BUBBLE_SIZE,
            "bubble size below minimum, clamping"
        );
        file.bubble.size_px = validation::MIN_BUBBLE_SIZE;
    } else if file.bubble.size_px > validation::MAX_BUBBLE_SIZE {
        warn!(
            size_px = file.bubble.size_px,
            max = validation::MAX_BUBBLE_SIZE,
            "bubble size exceeds maximum, clamping"
        );
        file.bubble.size_px = validation::MAX_BUBBLE_SIZE;
    }
}

pub struct SettingsStore {
    path: PathBuf,
    state: Mutex<SettingsFile>,
    tx: watch::Sender<BubbleSettings>,
}

impl SettingsStore {
    /// Load from the default location under the platform config directory
    pub fn load() -> Result<Self> {
        let mut path = dirs::config_dir().context("no config directory available")?;
        path.push(config::APP_DIR);
        path.push(config::FILENAME);
        Self::load_from(path)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        let mut file = if path.exists() {
            let content = fs::read_to_string(&path)
                .context(format!("failed to read settings file {}", path.display()))?;
            match serde_json::from_str::<SettingsFile>(&content) {
                Ok(file) => file,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "settings file unreadable, starting from defaults"
                    );
                    SettingsFile::default()
                }
            }
        } else {
            info!(path = %path.display(), "no settings file yet, using defaults");
            SettingsFile::default()
        };
        validate_and_clamp(&mut file);

        let (tx, _) = watch::channel(file.bubble);
        Ok(Self {
            path,
            state: Mutex::new(file),
            tx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Continuous stream of appearance settings
    pub fn subscribe(&self) -> watch::Receiver<BubbleSettings> {
        self.tx.subscribe()
    }

    /// One-shot read of the current settings
    pub fn current(&self) -> BubbleSettings {
        self.lock().bubble
    }

    /// Last persisted bubble position, loaded once at bubble creation
    pub fn position(&self) -> Position {
        self.lock().position
    }

    /// Apply new appearance settings: clamp, publish to observers, persist
    pub fn update_bubble(&self, settings: BubbleSettings) -> Result<()> {
        let snapshot = {
            let mut state = self.lock();
            state.bubble = settings;
            validate_and_clamp(&mut state);
            *state
        };
        self.tx.send_replace(snapshot.bubble);
        self.persist(&snapshot)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SettingsFile> {
        // A poisoned lock still holds a consistent SettingsFile
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, file: &SettingsFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context(format!(
                "failed to create settings directory {}",
                parent.display()
            ))?;
        }

        let json = serde_json::to_string_pretty(file).context("failed to serialize settings")?;
        let tmp_path = self.path.with_extension("tmp");
        let mut tmp = fs::File::create(&tmp_path)
            .context(format!("failed to create {}", tmp_path.display()))?;
        tmp.write_all(json.as_bytes())
            .context("failed to write settings")?;
        tmp.sync_all().context("failed to sync settings")?;
        fs::rename(&tmp_path, &self.path).context(format!(
            "failed to move settings into place at {}",
            self.path.display()
        ))?;
        Ok(())
    }
}

impl PositionSink for SettingsStore {
    fn save(&self, position: Position) -> Result<()> {
        let snapshot = {
            let mut state = self.lock();
            state.position = position;
            *state
        };
        self.persist(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::load_from(dir.path().join("settings.json")).expect("store loads")
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.current(), BubbleSettings::default());
        assert_eq!(
            store.position(),
            Position::new(geometry::EDGE_MARGIN, geometry::DEFAULT_BUBBLE_Y)
        );
    }

    #[test]
    fn test_update_persists_across_reload() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let settings = BubbleSettings {
            size_px: 48,
            alpha_percent: 55,
            vibration: false,
        };
        store.update_bubble(settings).unwrap();
        drop(store);

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.current(), settings);
    }

    #[test]
    fn test_position_save_persists_across_reload() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(Position::new(880, 412)).unwrap();
        drop(store);

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.position(), Position::new(880, 412));
    }

    #[test]
    fn test_out_of_range_values_are_clamped_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"bubble":{"size_px":5,"alpha_percent":250,"vibration":true},"position":{"x":0,"y":0}}"#,
        )
        .unwrap();

        let store = SettingsStore::load_from(path).unwrap();
        let settings = store.current();
        assert_eq!(settings.size_px, validation::MIN_BUBBLE_SIZE);
        assert_eq!(settings.alpha_percent, 100);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json {{{").unwrap();

        let store = SettingsStore::load_from(path).unwrap();
        assert_eq!(store.current(), BubbleSettings::default());
    }

    #[test]
    fn test_subscribers_observe_updates() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let settings = BubbleSettings {
            size_px: 96,
            alpha_percent: 70,
            vibration: true,
        };
        store.update_bubble(settings).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), settings);
    }

    #[test]
    fn test_update_publishes_clamped_values() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut rx = store.subscribe();

        store
            .update_bubble(BubbleSettings {
                size_px: 9999,
                alpha_percent: 101,
                vibration: true,
            })
            .unwrap();
        let seen = *rx.borrow_and_update();
        assert_eq!(seen.size_px, validation::MAX_BUBBLE_SIZE);
        assert_eq!(seen.alpha_percent, 100);
    }
}
