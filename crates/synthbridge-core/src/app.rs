use crate::bridge::SynthBridge;
use synthbridge_ports::midi::{MidiConsumer, MidiError, MidiInputPort, MidiInputStream};
use synthbridge_ports::storage::{SettingsDto, StorageError, StoragePort};
use synthbridge_ports::synth::{MidiSynth, SynthEngine, SynthError};
use synthbridge_ports::types::{DeviceId, MidiInputDevice, SynthMode, Volume01};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("midi error: {0}")]
    Midi(#[from] MidiError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("no synth data could be loaded (last error: {0})")]
    NoSynthData(SynthError),
}

/// Owns the bridge and connects it to a MIDI input and a settings store.
pub struct BridgeApp {
    bridge: Arc<SynthBridge>,
    midi_port: Box<dyn MidiInputPort>,
    storage: Option<Box<dyn StoragePort>>,
    settings: SettingsDto,
    input_stream: Option<Box<dyn MidiInputStream>>,
    endpoint_stream: Option<Box<dyn MidiInputStream>>,
}

impl BridgeApp {
    pub fn new(
        engine: Arc<dyn SynthEngine>,
        synth: Box<dyn MidiSynth>,
        midi_port: Box<dyn MidiInputPort>,
        storage: Option<Box<dyn StoragePort>>,
    ) -> Self {
        let settings = match storage.as_ref().map(|s| s.load_settings()) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                tracing::warn!("failed to load settings, using defaults: {}", err);
                SettingsDto::default()
            }
            None => SettingsDto::default(),
        };

        Self {
            bridge: Arc::new(SynthBridge::new(engine, synth)),
            midi_port,
            storage,
            settings,
            input_stream: None,
            endpoint_stream: None,
        }
    }

    pub fn bridge(&self) -> &Arc<SynthBridge> {
        &self.bridge
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    /// Tries the configured mode, then the rest of `SynthMode::FALLBACK_ORDER`.
    pub fn init_synth(&mut self) -> Result<SynthMode, AppError> {
        let preferred = self.settings.synth_mode;
        let candidates = std::iter::once(preferred).chain(
            SynthMode::FALLBACK_ORDER
                .into_iter()
                .filter(move |mode| *mode != preferred),
        );

        let mut last_error = None;
        for mode in candidates {
            match self.bridge.try_init(mode) {
                Ok(()) => {
                    if mode != preferred {
                        tracing::warn!("using {} synth data instead of {}", mode, preferred);
                    }
                    self.bridge.synth().set_master_volume(self.settings.master_volume);
                    return Ok(mode);
                }
                Err(err) => last_error = Some(err),
            }
        }

        let err = last_error.unwrap_or(SynthError::NoSynthData(preferred));
        tracing::warn!("internal synthesizer disabled: {}", err);
        Err(AppError::NoSynthData(err))
    }

    pub fn list_midi_inputs(&self) -> Result<Vec<MidiInputDevice>, AppError> {
        Ok(self.midi_port.list_inputs()?)
    }

    pub fn connect_input(&mut self, device_id: DeviceId) -> Result<(), AppError> {
        if let Some(stream) = self.input_stream.take() {
            stream.close();
        }

        let consumer: Arc<dyn MidiConsumer> = self.bridge.clone();
        let stream = self.midi_port.connect(&device_id, consumer)?;
        tracing::info!("{} connected to {}", self.bridge.name(), device_id);
        self.input_stream = Some(stream);

        self.settings.selected_midi_in = Some(device_id);
        self.save_settings();
        Ok(())
    }

    /// Reconnects to the input remembered in settings, if any.
    pub fn restore_input(&mut self) -> Result<bool, AppError> {
        match self.settings.selected_midi_in.clone() {
            Some(device_id) => {
                self.connect_input(device_id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn publish_endpoint(&mut self) -> Result<(), AppError> {
        if self.endpoint_stream.is_some() {
            return Ok(());
        }
        let consumer: Arc<dyn MidiConsumer> = self.bridge.clone();
        self.endpoint_stream = Some(self.midi_port.publish(consumer)?);
        tracing::info!("published midi endpoint '{}'", self.bridge.name());
        Ok(())
    }

    /// Publishes the endpoint if configured and reconnects the remembered input.
    pub fn open_inputs(&mut self) -> Result<(), AppError> {
        if self.settings.publish_virtual_endpoint {
            match self.publish_endpoint() {
                Ok(()) => {}
                Err(AppError::Midi(MidiError::Unsupported(reason))) => {
                    tracing::info!("not publishing endpoint: {}", reason);
                }
                Err(err) => return Err(err),
            }
        }
        self.restore_input()?;
        Ok(())
    }

    pub fn is_input_connected(&self) -> bool {
        self.input_stream.is_some()
    }

    pub fn is_endpoint_published(&self) -> bool {
        self.endpoint_stream.is_some()
    }

    pub fn disconnect(&mut self) {
        if let Some(stream) = self.input_stream.take() {
            stream.close();
        }
        if let Some(stream) = self.endpoint_stream.take() {
            stream.close();
        }
    }

    pub fn set_master_volume(&mut self, volume: Volume01) {
        self.bridge.synth().set_master_volume(volume);
        self.settings.master_volume = volume;
        self.save_settings();
    }

    pub fn set_synth_mode(&mut self, mode: SynthMode) {
        self.settings.synth_mode = mode;
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                tracing::warn!("failed to save settings: {}", err);
            }
        }
    }
}

impl Drop for BridgeApp {
    fn drop(&mut self) {
        self.disconnect();
    }
}
