use crate::params::{ParameterSnapshot, VoiceParams};
use crate::synth::factory::{self, VoiceMode};
use crate::synth::voice::Voice;

/// Fixed number of voices in the pool.
pub const POOL_SIZE: usize = 32;

/// Last-resort block limiter. A mixed block whose peak exceeds 1.0 is
/// rescaled uniformly so the loudest sample lands exactly at 1.0; quieter
/// blocks pass through untouched.
pub struct PeakGuard;

impl PeakGuard {
    /// Returns the gain that was applied (1.0 when the block passed through).
    pub fn process(buffer: &mut [f32]) -> f32 {
        let peak = buffer.iter().fold(0.0f32, |p, s| p.max(s.abs()));
        if peak <= 1.0 {
            return 1.0;
        }

        let gain = 1.0 / peak;
        for s in buffer.iter_mut() {
            *s *= gain;
        }
        gain
    }
}

/// Fixed-size pool of voices of one mode with quietest-voice stealing.
///
/// The pool owns the block snapshot: notes latch from whatever snapshot was
/// most recently pushed. Rendering clears the output once, mixes the active
/// voices additively, applies the snapshot's master gain and finishes with
/// the [`PeakGuard`].
pub struct VoicePool {
    voices: Vec<Box<dyn Voice>>,
    mode: VoiceMode,
    sample_rate: f64,
    snapshot: ParameterSnapshot,
    time_accumulation: bool,
    audio_enabled: bool,
}

impl VoicePool {
    pub fn new(mode: VoiceMode) -> Self {
        let voices = (0..POOL_SIZE).map(|_| factory::make_voice(mode)).collect();
        Self {
            voices,
            mode,
            sample_rate: 48_000.0,
            snapshot: ParameterSnapshot::default(),
            time_accumulation: false,
            audio_enabled: false,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
    }

    pub fn mode(&self) -> VoiceMode {
        self.mode
    }

    /// Rebuild every voice in the new mode. Sounding notes are dropped, not
    /// migrated.
    pub fn set_mode(&mut self, mode: VoiceMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.voices = (0..POOL_SIZE).map(|_| factory::make_voice(mode)).collect();
        for voice in &mut self.voices {
            voice.prepare(self.sample_rate);
            voice.enable_time_accumulation(self.time_accumulation);
            voice.set_audio_enabled(self.audio_enabled);
        }
    }

    pub fn set_snapshot(&mut self, snapshot: ParameterSnapshot) {
        self.snapshot = snapshot;
    }

    pub fn snapshot(&self) -> &ParameterSnapshot {
        &self.snapshot
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let snapshot = self.snapshot;
        if let Some(voice) = self.allocate_voice() {
            voice.note_on(&snapshot, note, velocity);
        }
    }

    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == Some(note) {
                voice.note_off();
            }
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.note_off();
            }
        }
    }

    /// Broadcast the kinematic-integration gate to every voice. Survives a
    /// mode switch.
    pub fn enable_time_accumulation(&mut self, enabled: bool) {
        self.time_accumulation = enabled;
        for voice in &mut self.voices {
            voice.enable_time_accumulation(enabled);
        }
    }

    /// Broadcast the audio gate to every voice. Survives a mode switch.
    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
        for voice in &mut self.voices {
            voice.set_audio_enabled(enabled);
        }
    }

    pub fn handle_controller(&mut self, cc: u8, value: f32) {
        for voice in &mut self.voices {
            voice.handle_controller(cc, value);
        }
    }

    pub fn update_params(&mut self, params: &VoiceParams) {
        for voice in &mut self.voices {
            voice.update_params(params);
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Mix one block of all active voices into `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        debug_assert!(out.len() <= crate::MAX_BLOCK_SIZE);
        out.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render(out);
            }
        }

        let gain = db_to_linear(self.snapshot.master_volume_db) * self.snapshot.master_mix;
        let gain = gain as f32;
        for s in out.iter_mut() {
            *s *= gain;
        }

        PeakGuard::process(out);
    }

    /// Mutable access to a voice slot, for host-side diagnostics.
    pub fn voice_mut(&mut self, index: usize) -> Option<&mut Box<dyn Voice>> {
        self.voices.get_mut(index)
    }

    fn allocate_voice(&mut self) -> Option<&mut Box<dyn Voice>> {
        if let Some(idx) = self.voices.iter().position(|v| !v.is_active()) {
            return Some(&mut self.voices[idx]);
        }

        // All busy: steal the quietest by last block peak.
        self.voices
            .iter_mut()
            .min_by(|a, b| a.current_level().total_cmp(&b.current_level()))
    }
}

fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}
