mod dispatch;

pub use dispatch::{dispatch, DispatchOutcome};

use midir::{Ignore, MidiInput, MidiInputConnection};
use synthbridge_ports::midi::{MidiConsumer, MidiError, MidiInputPort, MidiInputStream};
use synthbridge_ports::types::{DeviceId, MidiInputDevice};
use std::sync::Arc;

pub struct MidirMidiInputPort {
    client_name: String,
}

impl MidirMidiInputPort {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn create_midi_in(&self) -> Result<MidiInput, MidiError> {
        let mut midi_in =
            MidiInput::new(&self.client_name).map_err(|e| MidiError::Backend(e.to_string()))?;
        // SysEx, timing and active sensing never reach the consumer anyway.
        midi_in.ignore(Ignore::All);
        Ok(midi_in)
    }

    fn device_id(index: usize, name: &str) -> DeviceId {
        DeviceId(format!("midir:{}:{}", index, name))
    }

    /// midir stamps are microseconds, which is what consumers expect.
    fn deliver(stamp: u64, message: &[u8], consumer: &mut Arc<dyn MidiConsumer>) {
        dispatch(consumer.as_ref(), message, stamp);
    }
}

impl Default for MidirMidiInputPort {
    fn default() -> Self {
        Self::new("SynthBridge")
    }
}

pub struct MidirMidiInputStream {
    connection: Option<MidiInputConnection<Arc<dyn MidiConsumer>>>,
}

impl MidiInputStream for MidirMidiInputStream {
    fn close(mut self: Box<Self>) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }
    }
}

impl MidiInputPort for MidirMidiInputPort {
    fn list_inputs(&self) -> Result<Vec<MidiInputDevice>, MidiError> {
        let midi_in = self.create_midi_in()?;
        let ports = midi_in.ports();
        let mut devices = Vec::new();

        for (index, port) in ports.iter().enumerate() {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| "Unknown Input".to_string());
            devices.push(MidiInputDevice {
                id: Self::device_id(index, &name),
                name,
                is_available: true,
            });
        }

        Ok(devices)
    }

    fn connect(
        &self,
        device_id: &DeviceId,
        consumer: Arc<dyn MidiConsumer>,
    ) -> Result<Box<dyn MidiInputStream>, MidiError> {
        let midi_in = self.create_midi_in()?;

        let ports = midi_in.ports();
        let mut selected = None;
        for (index, port) in ports.iter().enumerate() {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| "Unknown Input".to_string());
            if &Self::device_id(index, &name) == device_id {
                selected = Some(port.clone());
                break;
            }
        }

        let port = selected.ok_or_else(|| MidiError::DeviceNotFound(device_id.to_string()))?;
        let port_name = consumer.name().to_string();

        let connection = midi_in
            .connect(&port, &port_name, Self::deliver, consumer)
            .map_err(|e| MidiError::DeviceUnavailable(e.to_string()))?;
        tracing::debug!("midir input {} connected as '{}'", device_id, port_name);

        Ok(Box::new(MidirMidiInputStream {
            connection: Some(connection),
        }))
    }

    #[cfg(unix)]
    fn publish(
        &self,
        consumer: Arc<dyn MidiConsumer>,
    ) -> Result<Box<dyn MidiInputStream>, MidiError> {
        use midir::os::unix::VirtualInput;

        let midi_in = self.create_midi_in()?;
        let port_name = consumer.name().to_string();
        let connection = midi_in
            .create_virtual(&port_name, Self::deliver, consumer)
            .map_err(|e| MidiError::Backend(e.to_string()))?;
        tracing::debug!("midir virtual input '{}' created", port_name);

        Ok(Box::new(MidirMidiInputStream {
            connection: Some(connection),
        }))
    }

    #[cfg(not(unix))]
    fn publish(
        &self,
        consumer: Arc<dyn MidiConsumer>,
    ) -> Result<Box<dyn MidiInputStream>, MidiError> {
        Err(MidiError::Unsupported(format!(
            "virtual input '{}' needs a unix midi backend",
            consumer.name()
        )))
    }
}
