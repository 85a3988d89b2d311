use synthbridge_ports::storage::{SettingsDto, StorageError, StoragePort};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

/// Settings kept as pretty JSON in one file under a config directory.
pub struct FsStorage {
    settings_path: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            settings_path: base_dir.join(SETTINGS_FILE),
        }
    }

    /// Use an explicit file, e.g. one passed on the command line of the host app.
    pub fn with_settings_file(path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: path.into(),
        }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join("SynthBridge"))
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    fn read_settings(path: &Path) -> Result<Option<SettingsDto>, StorageError> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(format!("{}: {}", path.display(), e))),
        };
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| StorageError::Serde(format!("{}: {}", path.display(), e)))
    }

    /// Writes next to the target and renames, so a crash never leaves half a file.
    fn write_settings(path: &Path, settings: &SettingsDto) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let data =
            serde_json::to_vec_pretty(settings).map_err(|e| StorageError::Serde(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| StorageError::Io(e.to_string()))
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(base_dir)
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        Ok(Self::read_settings(&self.settings_path)?.unwrap_or_default())
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        Self::write_settings(&self.settings_path, s)
    }
}
