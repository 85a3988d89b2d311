use synthbridge_ports::midi::MidiConsumer;
use synthbridge_ports::synth::{MidiSynth, SynthEngine, SynthError};
use synthbridge_ports::types::{to_synth_channel, to_synth_time, Channel, MidiTime, SynthMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Forwards MIDI consumer events to a synthesizer control handle.
///
/// Channels are shifted from 0-based to 1-based and timestamps converted from
/// microseconds to milliseconds. Event handlers never fail and never block; they
/// forward even before `init` succeeds, in which case the synth decides what
/// (if anything) is heard.
pub struct SynthBridge {
    name: String,
    engine: Arc<dyn SynthEngine>,
    synth: Box<dyn MidiSynth>,
    ready: AtomicBool,
}

impl SynthBridge {
    pub const CONSUMER_NAME: &'static str = "Internal Synthesizer";

    pub fn new(engine: Arc<dyn SynthEngine>, synth: Box<dyn MidiSynth>) -> Self {
        Self::with_name(Self::CONSUMER_NAME, engine, synth)
    }

    pub fn with_name(
        name: impl Into<String>,
        engine: Arc<dyn SynthEngine>,
        synth: Box<dyn MidiSynth>,
    ) -> Self {
        Self {
            name: name.into(),
            engine,
            synth,
            ready: AtomicBool::new(false),
        }
    }

    /// Loads synthesis data for `mode` and, only if that worked, enables synth input.
    pub fn try_init(&self, mode: SynthMode) -> Result<(), SynthError> {
        match self.engine.load_synth_data(mode) {
            Ok(info) => {
                tracing::info!(
                    "{}: loaded {} synth data '{}' ({} presets)",
                    self.name,
                    mode,
                    info.name,
                    info.preset_count
                );
                self.synth.enable_input(true, true);
                self.ready.store(true, Ordering::Release);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("{}: failed to load {} synth data: {}", self.name, mode, err);
                Err(err)
            }
        }
    }

    pub fn init(&self, mode: SynthMode) -> bool {
        self.try_init(mode).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn synth(&self) -> &dyn MidiSynth {
        self.synth.as_ref()
    }
}

impl MidiConsumer for SynthBridge {
    fn name(&self) -> &str {
        &self.name
    }

    fn note_off(&self, channel: Channel, note: u8, velocity: u8, time: MidiTime) {
        self.synth
            .note_off(to_synth_channel(channel), note, velocity, to_synth_time(time));
    }

    fn note_on(&self, channel: Channel, note: u8, velocity: u8, time: MidiTime) {
        self.synth
            .note_on(to_synth_channel(channel), note, velocity, to_synth_time(time));
    }

    fn key_pressure(&self, channel: Channel, note: u8, pressure: u8, time: MidiTime) {
        self.synth
            .key_pressure(to_synth_channel(channel), note, pressure, to_synth_time(time));
    }

    fn control_change(&self, channel: Channel, control: u8, value: u8, time: MidiTime) {
        self.synth
            .control_change(to_synth_channel(channel), control, value, to_synth_time(time));
    }

    fn program_change(&self, channel: Channel, program: u8, time: MidiTime) {
        self.synth
            .program_change(to_synth_channel(channel), program, to_synth_time(time));
    }

    fn channel_pressure(&self, channel: Channel, pressure: u8, time: MidiTime) {
        self.synth
            .channel_pressure(to_synth_channel(channel), pressure, to_synth_time(time));
    }

    fn pitch_bend(&self, channel: Channel, lsb: u8, msb: u8, time: MidiTime) {
        self.synth
            .pitch_bend(to_synth_channel(channel), lsb, msb, to_synth_time(time));
    }

    fn all_notes_off(&self, just_channel: bool, time: MidiTime) {
        self.synth.all_notes_off(just_channel, to_synth_time(time));
    }
}
