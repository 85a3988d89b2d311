use serde::{Deserialize, Serialize};
use std::fmt;

pub type Channel = u8; // MIDI side, 0..=15
pub type SynthChannel = u8; // synthesizer side, 1..=16
pub type MidiTime = u64; // microseconds
pub type SynthTime = u64; // milliseconds

/// Synthesizer channels are 1-based. Only the low nibble of `channel` is used.
pub fn to_synth_channel(channel: Channel) -> SynthChannel {
    (channel & 0x0F) + 1
}

/// Truncates: 1999us -> 1ms, 999us -> 0ms.
pub fn to_synth_time(time: MidiTime) -> SynthTime {
    time / 1000
}

/// Which instrument bank the synthesizer engine loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SynthMode {
    #[default]
    GeneralMidi,
    LightGeneralMidi,
    /// Resolved by the engine to whichever bank it is configured with.
    Default,
}

impl SynthMode {
    pub const FALLBACK_ORDER: [SynthMode; 3] = [
        SynthMode::GeneralMidi,
        SynthMode::LightGeneralMidi,
        SynthMode::Default,
    ];
}

impl fmt::Display for SynthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SynthMode::GeneralMidi => "general-midi",
            SynthMode::LightGeneralMidi => "light-general-midi",
            SynthMode::Default => "default",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MidiInputDevice {
    pub id: DeviceId,
    pub name: String,
    pub is_available: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Volume01(pub f32);

impl Volume01 {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
