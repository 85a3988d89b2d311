use crate::types::*;

#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    #[error("no synth data configured for mode {0}")]
    NoSynthData(SynthMode),
    #[error("soundfont load failed: {0}")]
    SoundFontLoad(String),
    #[error("unsupported soundfont format")]
    UnsupportedFormat,
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundFontInfo {
    pub name: String,
    pub preset_count: usize,
}

/// Process-wide synthesis engine: owns which instrument bank is loaded.
pub trait SynthEngine: Send + Sync {
    fn load_synth_data(&self, mode: SynthMode) -> Result<SoundFontInfo, SynthError>;
    fn loaded_mode(&self) -> Option<SynthMode>;
}

/// Control surface of one playable synthesizer instance.
///
/// Channels are 1-based, times are milliseconds. None of the event calls report
/// failure: a call the engine cannot honour is dropped.
pub trait MidiSynth: Send + Sync {
    /// `enable` opens the event path, `load_instruments` instantiates the loaded bank.
    fn enable_input(&self, enable: bool, load_instruments: bool);
    fn is_input_enabled(&self) -> bool;

    fn note_off(&self, channel: SynthChannel, note: u8, velocity: u8, time: SynthTime);
    fn note_on(&self, channel: SynthChannel, note: u8, velocity: u8, time: SynthTime);
    fn key_pressure(&self, channel: SynthChannel, note: u8, pressure: u8, time: SynthTime);
    fn control_change(&self, channel: SynthChannel, control: u8, value: u8, time: SynthTime);
    fn program_change(&self, channel: SynthChannel, program: u8, time: SynthTime);
    fn channel_pressure(&self, channel: SynthChannel, pressure: u8, time: SynthTime);
    fn pitch_bend(&self, channel: SynthChannel, lsb: u8, msb: u8, time: SynthTime);
    fn all_notes_off(&self, just_channel: bool, time: SynthTime);

    fn set_master_volume(&self, volume: Volume01);
    fn master_volume(&self) -> Volume01;
}
