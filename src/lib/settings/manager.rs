use std::{
    io::prelude::*,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::{
    ftl::client::{DEFAULT_HOST, DEFAULT_PORT},
    page::ViewportBudget,
};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HeaderSettingsFile {
    pub name: String,
    pub version: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FtlSettings {
    pub host: String,
    pub port: u16,
    pub read_timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ViewportSettings {
    pub width_chars: usize,
    pub height_chars: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DisplaySettings {
    pub device_path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
    pub glyph_width_px: u32,
    pub glyph_height_px: u32,
    pub origin_x: u32,
    pub origin_y: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RefreshSettings {
    pub page_interval_secs: u64,
    pub cycle_interval_secs: u64,
    pub cpu_sample_ms: u64,
    pub reconnect_attempts: u32,
    pub reconnect_backoff_ms: u64,
    pub sleep_slice_ms: u64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SettingsStruct {
    pub header: HeaderSettingsFile,
    pub ftl: FtlSettings,
    pub viewport: ViewportSettings,
    pub display: DisplaySettings,
    pub refresh: RefreshSettings,
}

impl Default for HeaderSettingsFile {
    fn default() -> Self {
        Self {
            name: "Pi-hole Display".to_string(),
            version: 0,
        }
    }
}

impl Default for FtlSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            read_timeout_ms: 5000,
        }
    }
}

impl Default for ViewportSettings {
    // What fits the default panel from the default origin
    fn default() -> Self {
        Self {
            width_chars: 31,
            height_chars: 11,
        }
    }
}

impl Default for DisplaySettings {
    // 2.13" tri-color e-ink (IL0373) rotated to landscape
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/run/pihole-display/panel.txt"),
            width_px: 212,
            height_px: 104,
            glyph_width_px: 6,
            glyph_height_px: 8,
            origin_x: 25,
            origin_y: 10,
        }
    }
}

impl Default for RefreshSettings {
    // E-ink panels should not be refreshed more often than every few minutes
    fn default() -> Self {
        Self {
            page_interval_secs: 60,
            cycle_interval_secs: 300,
            cpu_sample_ms: 1000,
            reconnect_attempts: 3,
            reconnect_backoff_ms: 2000,
            sleep_slice_ms: 100,
        }
    }
}

impl FtlSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl ViewportSettings {
    pub fn budget(&self) -> Result<ViewportBudget> {
        ViewportBudget::new(self.width_chars, self.height_chars).ok_or_else(|| {
            anyhow!(
                "Viewport {}x{} has no room for text",
                self.width_chars,
                self.height_chars
            )
        })
    }
}

impl RefreshSettings {
    pub fn page_interval(&self) -> Duration {
        Duration::from_secs(self.page_interval_secs)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }

    pub fn sleep_slice(&self) -> Duration {
        Duration::from_millis(self.sleep_slice_ms)
    }
}

/// Settings loaded from disk, together with the file they came from.
#[derive(Debug)]
pub struct Manager {
    file_name: PathBuf,
    config: SettingsStruct,
}

impl Manager {
    /// Loads `file_name`, falling back to defaults when it is missing, invalid, or
    /// `reset` is set. The result is written back so the file always exists afterwards.
    /// Relative names live in the user configuration folder.
    #[instrument(level = "debug")]
    pub fn load(file_name: &str, reset: bool) -> Result<Self> {
        let file_name = resolve_path(file_name)?;
        debug!("Using settings file: {file_name:?}");

        let config = if reset {
            info!("Resetting settings to defaults");
            SettingsStruct::default()
        } else {
            load_settings_from_file(&file_name)
        };

        let settings = Self { file_name, config };

        if let Err(error) = settings.save() {
            error!("Failed to save settings: {error:#}");
        }

        Ok(settings)
    }

    pub fn config(&self) -> &SettingsStruct {
        &self.config
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn save(&self) -> Result<()> {
        save_settings_to_file(&self.file_name, &self.config)
    }
}

fn resolve_path(file_name: &str) -> Result<PathBuf> {
    let path = Path::new(file_name);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let project = ProjectDirs::from("net", "pi-hole", env!("CARGO_PKG_NAME"))
        .context("Failed to find user settings path")?;

    let folder_path = project.config_dir();
    std::fs::create_dir_all(folder_path)
        .with_context(|| format!("Failed to create settings folder {folder_path:?}"))?;

    Ok(folder_path.join(path))
}

fn load_settings_from_file(file_name: &Path) -> SettingsStruct {
    let content = match std::fs::read_to_string(file_name) {
        Ok(content) => content,
        Err(error) => {
            warn!("Failed to read settings from {file_name:?}, using defaults: {error}");
            return SettingsStruct::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|error| {
        error!("Invalid settings in {file_name:?}, using defaults: {error}");
        SettingsStruct::default()
    })
}

fn save_settings_to_file(file_name: &Path, content: &SettingsStruct) -> Result<()> {
    if let Some(folder) = file_name.parent() {
        std::fs::create_dir_all(folder)
            .with_context(|| format!("Failed to create settings folder {folder:?}"))?;
    }

    let value = serde_json::to_string_pretty(content).context("Failed to serialize settings")?;
    let mut file = std::fs::File::create(file_name)
        .with_context(|| format!("Failed to create {file_name:?}"))?;
    file.write_all(value.as_bytes())
        .with_context(|| format!("Failed to write {file_name:?}"))
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    fn settings_path(directory: &tempfile::TempDir) -> String {
        directory
            .path()
            .join("settings.json")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let path = settings_path(&directory);

        let settings = Manager::load(&path, false).unwrap();

        assert_eq!(settings.config(), &SettingsStruct::default());
        assert!(Path::new(&path).exists());
        assert_eq!(settings.file_name(), Path::new(&path));
    }

    #[test]
    fn stored_values_are_loaded() {
        let directory = tempfile::tempdir().unwrap();
        let path = settings_path(&directory);

        let mut stored = SettingsStruct::default();
        stored.ftl.port = 14711;
        stored.viewport.width_chars = 20;
        save_settings_to_file(Path::new(&path), &stored).unwrap();

        let settings = Manager::load(&path, false).unwrap();
        assert_eq!(settings.config(), &stored);
    }

    #[test]
    fn partial_file_is_completed_with_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let path = settings_path(&directory);
        std::fs::write(&path, r#"{ "ftl": { "host": "10.0.0.2" } }"#).unwrap();

        let settings = Manager::load(&path, false).unwrap();

        assert_eq!(settings.config().ftl.host, "10.0.0.2");
        assert_eq!(settings.config().ftl.port, DEFAULT_PORT);
        assert_eq!(settings.config().refresh, RefreshSettings::default());
    }

    #[traced_test]
    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let path = settings_path(&directory);
        std::fs::write(&path, "{ not json").unwrap();

        let settings = Manager::load(&path, false).unwrap();

        assert_eq!(settings.config(), &SettingsStruct::default());
        assert!(logs_contain("Invalid settings"));
    }

    #[test]
    fn reset_ignores_the_stored_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = settings_path(&directory);

        let mut stored = SettingsStruct::default();
        stored.refresh.cycle_interval_secs = 5;
        save_settings_to_file(Path::new(&path), &stored).unwrap();

        let settings = Manager::load(&path, true).unwrap();
        assert_eq!(settings.config(), &SettingsStruct::default());

        let reloaded = Manager::load(&path, false).unwrap();
        assert_eq!(reloaded.config().refresh.cycle_interval_secs, 300);
    }

    #[test]
    fn zero_viewport_is_an_error() {
        let viewport = ViewportSettings {
            width_chars: 0,
            height_chars: 4,
        };

        assert!(viewport.budget().is_err());
        assert!(ViewportSettings::default().budget().is_ok());
    }
}
