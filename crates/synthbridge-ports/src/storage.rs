use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_master_volume() -> Volume01 {
    Volume01::new(0.8)
}

fn default_publish_virtual_endpoint() -> bool {
    true
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    pub synth_mode: SynthMode,
    pub general_midi_sf2: Option<String>,
    pub light_general_midi_sf2: Option<String>,
    #[serde(default = "default_master_volume")]
    pub master_volume: Volume01,
    pub selected_midi_in: Option<DeviceId>,
    #[serde(default = "default_publish_virtual_endpoint")]
    pub publish_virtual_endpoint: bool,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            synth_mode: SynthMode::GeneralMidi,
            general_midi_sf2: None,
            light_general_midi_sf2: None,
            master_volume: default_master_volume(),
            selected_midi_in: None,
            publish_virtual_endpoint: default_publish_virtual_endpoint(),
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
