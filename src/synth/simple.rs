use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::Oscillator;
use crate::params::{self, cc, ParameterSnapshot, VoiceParams};
use crate::synth::voice::Voice;

/// Deactivation threshold on the block peak once the envelope is releasing.
const LEVEL_FLOOR: f32 = 1e-3;

/// Non-spatial voice: one sine oscillator shaped by a sample-stepped ADSR.
///
/// Pitch comes from the MIDI note (plus a persistent semitone detune) unless
/// the block snapshot carries a frequency override, in which case the note
/// runs in free-frequency mode and live `update_params` moves can retune it.
pub struct SimpleVoice {
    osc: Oscillator,
    env: Envelope,
    active: bool,
    pitch_locked: bool,
    note: Option<u8>,
    velocity: f32,
    level: f32,
    detune_semis: f64,
}

impl SimpleVoice {
    pub fn new() -> Self {
        Self {
            osc: Oscillator::new(),
            env: Envelope::new(),
            active: false,
            pitch_locked: true,
            note: None,
            velocity: 0.0,
            level: 0.0,
            detune_semis: 0.0,
        }
    }

    pub fn set_detune_semitones(&mut self, semitones: f64) {
        self.detune_semis = semitones;
    }

    pub fn detune_semitones(&self) -> f64 {
        self.detune_semis
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.osc.set_frequency(0.0);
        self.osc.reset_phase();
    }
}

impl Default for SimpleVoice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice for SimpleVoice {
    fn prepare(&mut self, sample_rate: f64) {
        self.osc.prepare(sample_rate);
        self.env.prepare(sample_rate);
        self.active = false;
        self.note = None;
        self.level = 0.0;
    }

    fn note_on(&mut self, snapshot: &ParameterSnapshot, midi_note: u8, velocity: f32) {
        self.pitch_locked = !snapshot.overrides_pitch();
        let freq = if self.pitch_locked {
            params::apply_detune(params::midi_note_to_freq(midi_note), self.detune_semis)
        } else {
            snapshot.osc_freq
        };

        self.osc.set_frequency(freq);
        self.env.set_attack(snapshot.env_attack);
        self.env.set_release(snapshot.env_release);
        self.osc.reset_phase();
        self.env.note_on();

        self.active = true;
        self.note = Some(midi_note);
        self.velocity = velocity.clamp(0.0, 1.0);
        self.level = 0.0;
    }

    fn note_off(&mut self) {
        self.env.note_off();
    }

    fn render(&mut self, buffer: &mut [f32]) {
        if !self.active {
            return;
        }

        let mut peak = 0.0f32;
        for out in buffer.iter_mut() {
            let sample = self.osc.next_sample() * self.env.next_sample() * self.velocity;
            *out += sample;
            peak = peak.max(sample.abs());
        }
        self.level = peak;

        let releasing = self.env.state() == crate::dsp::EnvelopeState::Release;
        if !self.env.is_active() || (releasing && peak < LEVEL_FLOOR) {
            self.deactivate();
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn note(&self) -> Option<u8> {
        self.note
    }

    fn current_level(&self) -> f32 {
        self.level
    }

    fn handle_controller(&mut self, cc_num: u8, value: f32) {
        let value = f64::from(value);
        match cc_num {
            cc::ENV_ATTACK => self.env.set_attack(params::envelope_seconds(value)),
            cc::ENV_RELEASE => self.env.set_release(params::envelope_seconds(value)),
            cc::DETUNE => self.detune_semis = params::detune_semitones(value),
            _ => {}
        }
    }

    fn update_params(&mut self, params: &VoiceParams) {
        if !self.active {
            return;
        }

        self.env.set_attack(params.env_attack);
        self.env.set_release(params.env_release);
        if !self.pitch_locked {
            self.osc.set_frequency(params.osc_freq);
        }
    }
}
