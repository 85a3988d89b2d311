use midly::live::LiveEvent;
use midly::MidiMessage;
use synthbridge_ports::midi::MidiConsumer;
use synthbridge_ports::types::MidiTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Ignored,
}

/// Decodes one raw MIDI message and calls the matching consumer hook.
///
/// Only channel-voice messages are delivered. Note On with velocity 0 stays a
/// Note On; interpreting it is up to the synth. Channel-mode controllers
/// (120..=127, e.g. CC 123 All Notes Off) stay control changes, so
/// `MidiConsumer::all_notes_off` is never called from here.
pub fn dispatch(consumer: &dyn MidiConsumer, bytes: &[u8], time: MidiTime) -> DispatchOutcome {
    let event = match LiveEvent::parse(bytes) {
        Ok(event) => event,
        Err(err) => {
            tracing::trace!("dropping malformed midi message {:02X?}: {}", bytes, err);
            return DispatchOutcome::Ignored;
        }
    };

    let (channel, message) = match event {
        LiveEvent::Midi { channel, message } => (channel.as_int(), message),
        other => {
            tracing::trace!("ignoring non channel-voice message {:?}", other);
            return DispatchOutcome::Ignored;
        }
    };

    match message {
        MidiMessage::NoteOff { key, vel } => {
            consumer.note_off(channel, key.as_int(), vel.as_int(), time)
        }
        MidiMessage::NoteOn { key, vel } => {
            consumer.note_on(channel, key.as_int(), vel.as_int(), time)
        }
        MidiMessage::Aftertouch { key, vel } => {
            consumer.key_pressure(channel, key.as_int(), vel.as_int(), time)
        }
        MidiMessage::Controller { controller, value } => {
            consumer.control_change(channel, controller.as_int(), value.as_int(), time)
        }
        MidiMessage::ProgramChange { program } => {
            consumer.program_change(channel, program.as_int(), time)
        }
        MidiMessage::ChannelAftertouch { vel } => {
            consumer.channel_pressure(channel, vel.as_int(), time)
        }
        MidiMessage::PitchBend { bend } => {
            let (lsb, msb) = split_bend(bend.0.as_int());
            consumer.pitch_bend(channel, lsb, msb, time)
        }
    }

    DispatchOutcome::Delivered
}

fn split_bend(value: u16) -> (u8, u8) {
    ((value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8)
}
