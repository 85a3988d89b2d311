#![allow(dead_code)]

use parking_lot::Mutex;
use synthbridge_ports::midi::{MidiConsumer, MidiError, MidiInputPort, MidiInputStream};
use synthbridge_ports::storage::{SettingsDto, StorageError, StoragePort};
use synthbridge_ports::synth::{MidiSynth, SoundFontInfo, SynthEngine, SynthError};
use synthbridge_ports::types::{
    DeviceId, MidiInputDevice, SynthChannel, SynthMode, SynthTime, Volume01,
};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SynthCall {
    EnableInput(bool, bool),
    NoteOff(SynthChannel, u8, u8, SynthTime),
    NoteOn(SynthChannel, u8, u8, SynthTime),
    KeyPressure(SynthChannel, u8, u8, SynthTime),
    ControlChange(SynthChannel, u8, u8, SynthTime),
    ProgramChange(SynthChannel, u8, SynthTime),
    ChannelPressure(SynthChannel, u8, SynthTime),
    PitchBend(SynthChannel, u8, u8, SynthTime),
    AllNotesOff(bool, SynthTime),
    SetMasterVolume(Volume01),
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<SynthCall>>>);

impl CallLog {
    pub fn push(&self, call: SynthCall) {
        self.0.lock().push(call);
    }

    pub fn take(&self) -> Vec<SynthCall> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn snapshot(&self) -> Vec<SynthCall> {
        self.0.lock().clone()
    }
}

pub struct RecordingSynth {
    log: CallLog,
    enabled: Mutex<bool>,
    volume: Mutex<Volume01>,
}

impl RecordingSynth {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            enabled: Mutex::new(false),
            volume: Mutex::new(Volume01::new(1.0)),
        }
    }
}

impl MidiSynth for RecordingSynth {
    fn enable_input(&self, enable: bool, load_instruments: bool) {
        *self.enabled.lock() = enable;
        self.log.push(SynthCall::EnableInput(enable, load_instruments));
    }

    fn is_input_enabled(&self) -> bool {
        *self.enabled.lock()
    }

    fn note_off(&self, channel: SynthChannel, note: u8, velocity: u8, time: SynthTime) {
        self.log.push(SynthCall::NoteOff(channel, note, velocity, time));
    }

    fn note_on(&self, channel: SynthChannel, note: u8, velocity: u8, time: SynthTime) {
        self.log.push(SynthCall::NoteOn(channel, note, velocity, time));
    }

    fn key_pressure(&self, channel: SynthChannel, note: u8, pressure: u8, time: SynthTime) {
        self.log.push(SynthCall::KeyPressure(channel, note, pressure, time));
    }

    fn control_change(&self, channel: SynthChannel, control: u8, value: u8, time: SynthTime) {
        self.log.push(SynthCall::ControlChange(channel, control, value, time));
    }

    fn program_change(&self, channel: SynthChannel, program: u8, time: SynthTime) {
        self.log.push(SynthCall::ProgramChange(channel, program, time));
    }

    fn channel_pressure(&self, channel: SynthChannel, pressure: u8, time: SynthTime) {
        self.log.push(SynthCall::ChannelPressure(channel, pressure, time));
    }

    fn pitch_bend(&self, channel: SynthChannel, lsb: u8, msb: u8, time: SynthTime) {
        self.log.push(SynthCall::PitchBend(channel, lsb, msb, time));
    }

    fn all_notes_off(&self, just_channel: bool, time: SynthTime) {
        self.log.push(SynthCall::AllNotesOff(just_channel, time));
    }

    fn set_master_volume(&self, volume: Volume01) {
        *self.volume.lock() = volume;
        self.log.push(SynthCall::SetMasterVolume(volume));
    }

    fn master_volume(&self) -> Volume01 {
        *self.volume.lock()
    }
}

/// Engine that can load only the modes it was given.
pub struct FakeEngine {
    loadable: HashSet<SynthMode>,
    attempts: Mutex<Vec<SynthMode>>,
    loaded: Mutex<Option<SynthMode>>,
}

impl FakeEngine {
    pub fn new(loadable: &[SynthMode]) -> Self {
        Self {
            loadable: loadable.iter().copied().collect(),
            attempts: Mutex::new(Vec::new()),
            loaded: Mutex::new(None),
        }
    }

    pub fn attempts(&self) -> Vec<SynthMode> {
        self.attempts.lock().clone()
    }
}

impl SynthEngine for FakeEngine {
    fn load_synth_data(&self, mode: SynthMode) -> Result<SoundFontInfo, SynthError> {
        self.attempts.lock().push(mode);
        if self.loadable.contains(&mode) {
            *self.loaded.lock() = Some(mode);
            Ok(SoundFontInfo {
                name: format!("{mode} bank"),
                preset_count: 128,
            })
        } else {
            Err(SynthError::NoSynthData(mode))
        }
    }

    fn loaded_mode(&self) -> Option<SynthMode> {
        *self.loaded.lock()
    }
}

pub struct FakeStream {
    closed: Arc<Mutex<Vec<String>>>,
    label: String,
}

impl MidiInputStream for FakeStream {
    fn close(self: Box<Self>) {
        self.closed.lock().push(self.label.clone());
    }
}

/// MIDI port whose "devices" are plain ids; keeps the consumers it was handed.
#[derive(Clone, Default)]
pub struct FakeMidiPort {
    pub devices: Vec<DeviceId>,
    pub connected: Arc<Mutex<Vec<(DeviceId, Arc<dyn MidiConsumer>)>>>,
    pub published: Arc<Mutex<Vec<Arc<dyn MidiConsumer>>>>,
    pub closed: Arc<Mutex<Vec<String>>>,
}

impl FakeMidiPort {
    pub fn with_devices(ids: &[&str]) -> Self {
        Self {
            devices: ids.iter().map(|id| DeviceId(id.to_string())).collect(),
            ..Self::default()
        }
    }
}

impl MidiInputPort for FakeMidiPort {
    fn list_inputs(&self) -> Result<Vec<MidiInputDevice>, MidiError> {
        Ok(self
            .devices
            .iter()
            .map(|id| MidiInputDevice {
                id: id.clone(),
                name: id.0.clone(),
                is_available: true,
            })
            .collect())
    }

    fn connect(
        &self,
        device_id: &DeviceId,
        consumer: Arc<dyn MidiConsumer>,
    ) -> Result<Box<dyn MidiInputStream>, MidiError> {
        if !self.devices.contains(device_id) {
            return Err(MidiError::DeviceNotFound(device_id.to_string()));
        }
        self.connected.lock().push((device_id.clone(), consumer));
        Ok(Box::new(FakeStream {
            closed: self.closed.clone(),
            label: device_id.0.clone(),
        }))
    }

    fn publish(
        &self,
        consumer: Arc<dyn MidiConsumer>,
    ) -> Result<Box<dyn MidiInputStream>, MidiError> {
        let label = consumer.name().to_string();
        self.published.lock().push(consumer);
        Ok(Box::new(FakeStream {
            closed: self.closed.clone(),
            label,
        }))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub saved: Arc<Mutex<Option<SettingsDto>>>,
}

impl MemoryStorage {
    pub fn with(settings: SettingsDto) -> Self {
        Self {
            saved: Arc::new(Mutex::new(Some(settings))),
        }
    }
}

impl StoragePort for MemoryStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        Ok(self.saved.lock().clone().unwrap_or_default())
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        *self.saved.lock() = Some(s.clone());
        Ok(())
    }
}

pub struct BrokenStorage;

impl StoragePort for BrokenStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        Err(StorageError::Serde("unexpected end of file".to_string()))
    }

    fn save_settings(&self, _s: &SettingsDto) -> Result<(), StorageError> {
        Err(StorageError::Io("read-only".to_string()))
    }
}
