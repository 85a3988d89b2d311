use parking_lot::Mutex;
use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};
use synthbridge_ports::storage::SettingsDto;
use synthbridge_ports::synth::{MidiSynth, SoundFontInfo, SynthEngine, SynthError};
use synthbridge_ports::types::{SynthChannel, SynthMode, SynthTime, Volume01};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

/// Where each mode's SoundFont lives. `Default` uses the first bank configured.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SynthDataPaths {
    pub general_midi: Option<PathBuf>,
    pub light_general_midi: Option<PathBuf>,
}

impl SynthDataPaths {
    pub fn from_settings(settings: &SettingsDto) -> Self {
        Self {
            general_midi: settings.general_midi_sf2.as_ref().map(PathBuf::from),
            light_general_midi: settings.light_general_midi_sf2.as_ref().map(PathBuf::from),
        }
    }

    pub fn resolve(&self, mode: SynthMode) -> Option<&Path> {
        match mode {
            SynthMode::GeneralMidi => self.general_midi.as_deref(),
            SynthMode::LightGeneralMidi => self.light_general_midi.as_deref(),
            SynthMode::Default => self
                .general_midi
                .as_deref()
                .or(self.light_general_midi.as_deref()),
        }
    }
}

struct LoadedBank {
    mode: SynthMode,
    sound_font: Arc<SoundFont>,
}

type SharedBank = Arc<Mutex<Option<LoadedBank>>>;

/// Loads instrument banks; synth handles created from it pick up whatever is loaded.
pub struct RustySynthEngine {
    paths: Mutex<SynthDataPaths>,
    bank: SharedBank,
}

impl RustySynthEngine {
    pub fn new(paths: SynthDataPaths) -> Self {
        Self {
            paths: Mutex::new(paths),
            bank: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_paths(&self, paths: SynthDataPaths) {
        *self.paths.lock() = paths;
    }

    pub fn create_synth(&self, sample_rate_hz: u32) -> RustySynth {
        RustySynth::new(self.bank.clone(), sample_rate_hz)
    }

    fn read_sound_font(path: &Path) -> Result<SoundFont, SynthError> {
        let mut file = File::open(path)
            .map_err(|e| SynthError::SoundFontLoad(format!("{}: {}", path.display(), e)))?;
        SoundFont::new(&mut file)
            .map_err(|e| SynthError::SoundFontLoad(format!("{}: {}", path.display(), e)))
    }
}

impl Default for RustySynthEngine {
    fn default() -> Self {
        Self::new(SynthDataPaths::default())
    }
}

impl SynthEngine for RustySynthEngine {
    fn load_synth_data(&self, mode: SynthMode) -> Result<SoundFontInfo, SynthError> {
        let path = self
            .paths
            .lock()
            .resolve(mode)
            .map(Path::to_path_buf)
            .ok_or(SynthError::NoSynthData(mode))?;

        let sound_font = Arc::new(Self::read_sound_font(&path)?);

        let name = sound_font.get_info().get_bank_name().trim().to_string();
        let name = if name.is_empty() {
            path.file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("SoundFont")
                .to_string()
        } else {
            name
        };
        let preset_count = sound_font.get_presets().len();

        *self.bank.lock() = Some(LoadedBank { mode, sound_font });
        tracing::debug!("loaded {} from {}", mode, path.display());

        Ok(SoundFontInfo { name, preset_count })
    }

    fn loaded_mode(&self) -> Option<SynthMode> {
        self.bank.lock().as_ref().map(|bank| bank.mode)
    }
}

/// One playable synthesizer built from the engine's loaded bank.
///
/// Thread model:
/// - enable_input / set_sample_rate may allocate and lock
/// - event calls lock briefly from the MIDI delivery thread
/// - render is called from the audio thread and never waits for the lock
pub struct RustySynth {
    bank: SharedBank,
    sample_rate_hz: AtomicU32,
    enabled: AtomicBool,
    master_volume: AtomicU32,
    last_channel: AtomicU8,
    synth: Mutex<Option<Synthesizer>>,
}

impl RustySynth {
    fn new(bank: SharedBank, sample_rate_hz: u32) -> Self {
        Self {
            bank,
            sample_rate_hz: AtomicU32::new(sample_rate_hz),
            enabled: AtomicBool::new(false),
            master_volume: AtomicU32::new(1.0f32.to_bits()),
            last_channel: AtomicU8::new(0),
            synth: Mutex::new(None),
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz.load(Ordering::Relaxed)
    }

    pub fn has_instruments(&self) -> bool {
        self.synth.lock().is_some()
    }

    pub fn set_sample_rate(&self, sample_rate_hz: u32) {
        self.sample_rate_hz.store(sample_rate_hz, Ordering::Relaxed);
        if self.synth.lock().is_some() {
            if let Err(err) = self.load_instruments() {
                tracing::warn!("failed to rebuild synthesizer at {} Hz: {}", sample_rate_hz, err);
            }
        }
    }

    /// Fills both buffers; silence until instruments are loaded and input is enabled.
    pub fn render(&self, out_l: &mut [f32], out_r: &mut [f32]) {
        out_l.fill(0.0);
        out_r.fill(0.0);

        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        let Some(mut guard) = self.synth.try_lock() else {
            return;
        };
        if let Some(synth) = guard.as_mut() {
            let frames = out_l.len().min(out_r.len());
            synth.render(&mut out_l[..frames], &mut out_r[..frames]);
        }
    }

    fn load_instruments(&self) -> Result<(), SynthError> {
        let sound_font = match self.bank.lock().as_ref() {
            Some(bank) => bank.sound_font.clone(),
            None => {
                *self.synth.lock() = None;
                return Ok(());
            }
        };

        let sample_rate_hz = self.sample_rate_hz.load(Ordering::Relaxed) as i32;
        let settings = SynthesizerSettings::new(sample_rate_hz);
        let mut synth = Synthesizer::new(&sound_font, &settings)
            .map_err(|e| SynthError::Backend(e.to_string()))?;
        synth.set_master_volume(self.master_volume().get());

        *self.synth.lock() = Some(synth);
        Ok(())
    }

    fn channel_index(channel: SynthChannel) -> i32 {
        channel.clamp(1, 16) as i32 - 1
    }

    /// `Some(channel)` for the last addressed 0-based channel, `None` for every channel.
    fn notes_off_target(&self, just_channel: bool) -> Option<i32> {
        just_channel.then(|| self.last_channel.load(Ordering::Relaxed) as i32)
    }

    fn with_synth(&self, channel: SynthChannel, f: impl FnOnce(&mut Synthesizer, i32)) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        let index = Self::channel_index(channel);
        self.last_channel.store(index as u8, Ordering::Relaxed);
        if let Some(synth) = self.synth.lock().as_mut() {
            f(synth, index);
        }
    }
}

impl MidiSynth for RustySynth {
    fn enable_input(&self, enable: bool, load_instruments: bool) {
        if load_instruments {
            if let Err(err) = self.load_instruments() {
                tracing::warn!("failed to load instruments: {}", err);
            }
        }
        self.enabled.store(enable, Ordering::Relaxed);
    }

    fn is_input_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn note_off(&self, channel: SynthChannel, note: u8, _velocity: u8, _time: SynthTime) {
        self.with_synth(channel, |synth, ch| synth.note_off(ch, note as i32));
    }

    fn note_on(&self, channel: SynthChannel, note: u8, velocity: u8, _time: SynthTime) {
        self.with_synth(channel, |synth, ch| {
            synth.note_on(ch, note as i32, velocity as i32)
        });
    }

    fn key_pressure(&self, channel: SynthChannel, note: u8, pressure: u8, _time: SynthTime) {
        self.with_synth(channel, |synth, ch| {
            synth.process_midi_message(ch, 0xA0, note as i32, pressure as i32)
        });
    }

    fn control_change(&self, channel: SynthChannel, control: u8, value: u8, _time: SynthTime) {
        self.with_synth(channel, |synth, ch| {
            synth.process_midi_message(ch, 0xB0, control as i32, value as i32)
        });
    }

    fn program_change(&self, channel: SynthChannel, program: u8, _time: SynthTime) {
        self.with_synth(channel, |synth, ch| {
            synth.process_midi_message(ch, 0xC0, program as i32, 0)
        });
    }

    fn channel_pressure(&self, channel: SynthChannel, pressure: u8, _time: SynthTime) {
        self.with_synth(channel, |synth, ch| {
            synth.process_midi_message(ch, 0xD0, pressure as i32, 0)
        });
    }

    fn pitch_bend(&self, channel: SynthChannel, lsb: u8, msb: u8, _time: SynthTime) {
        self.with_synth(channel, |synth, ch| {
            synth.process_midi_message(ch, 0xE0, lsb as i32, msb as i32)
        });
    }

    fn all_notes_off(&self, just_channel: bool, _time: SynthTime) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        let target = self.notes_off_target(just_channel);
        if let Some(synth) = self.synth.lock().as_mut() {
            match target {
                Some(channel) => synth.note_off_all_channel(channel, false),
                None => synth.note_off_all(false),
            }
        }
    }

    fn set_master_volume(&self, volume: Volume01) {
        let volume = Volume01::new(volume.get());
        self.master_volume
            .store(volume.get().to_bits(), Ordering::Relaxed);
        if let Some(synth) = self.synth.lock().as_mut() {
            synth.set_master_volume(volume.get());
        }
    }

    fn master_volume(&self) -> Volume01 {
        Volume01(f32::from_bits(self.master_volume.load(Ordering::Relaxed)))
    }
}
