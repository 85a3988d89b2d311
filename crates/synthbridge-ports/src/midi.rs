use crate::types::*;
use std::sync::Arc;

/// A named endpoint that receives MIDI channel-voice messages.
///
/// Thread model: the delivery framework invokes these from its own callback
/// thread, one message at a time per connection. Implementations must not block.
pub trait MidiConsumer: Send + Sync {
    fn name(&self) -> &str;

    fn note_off(&self, channel: Channel, note: u8, velocity: u8, time: MidiTime);
    fn note_on(&self, channel: Channel, note: u8, velocity: u8, time: MidiTime);
    fn key_pressure(&self, channel: Channel, note: u8, pressure: u8, time: MidiTime);
    fn control_change(&self, channel: Channel, control: u8, value: u8, time: MidiTime);
    fn program_change(&self, channel: Channel, program: u8, time: MidiTime);
    fn channel_pressure(&self, channel: Channel, pressure: u8, time: MidiTime);
    /// `lsb` and `msb` are the two 7-bit halves of the 14-bit bend value.
    fn pitch_bend(&self, channel: Channel, lsb: u8, msb: u8, time: MidiTime);
    fn all_notes_off(&self, just_channel: bool, time: MidiTime);
}

#[derive(thiserror::Error, Debug)]
pub enum MidiError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// MIDI input stream handle: drop closes it.
pub trait MidiInputStream: Send {
    fn close(self: Box<Self>);
}

pub trait MidiInputPort: Send + Sync {
    fn list_inputs(&self) -> Result<Vec<MidiInputDevice>, MidiError>;

    /// Connect a hardware input: implementation delivers to `consumer` from a background thread.
    fn connect(
        &self,
        device_id: &DeviceId,
        consumer: Arc<dyn MidiConsumer>,
    ) -> Result<Box<dyn MidiInputStream>, MidiError>;

    /// Make `consumer` visible to other applications under `consumer.name()`.
    fn publish(&self, consumer: Arc<dyn MidiConsumer>)
        -> Result<Box<dyn MidiInputStream>, MidiError>;
}
