use crate::dsp::kinematics::ListenerKinematics;
use crate::dsp::lattice::EmitterLattice;
use crate::dsp::selector::{self, EmitterCandidate};
use crate::dsp::vec2::Vec2;
use crate::dsp::{propagation, waveform};
use crate::dsp::waveform::RetardedEnvelope;
use crate::params::{self, cc, ParameterSnapshot, VoiceParams};
use crate::synth::voice::Voice;

/*
Doppler Voice
=============

One voice = one listener moving through a plane of virtual emitters. Per
audio block:

    1. integrate the listener (time always moves when either gate is open;
       position only when kinematic integration is enabled),
    2. pick the single best emitter over a small fixed index window,
    3. for every sample, extrapolate the listener from the block start with
       the instantaneous velocity, solve the retarded time against the
       chosen emitter, and evaluate carrier * ADSR * field pulse there,
       scaled by the distance-attenuation kernel.

Evaluating the sources at retarded time is the whole trick: as the listener
approaches an emitter the retarded clock runs fast and the carrier arrives
sharp; receding runs it slow and flat. No explicit pitch-shift exists.

Two externally settable gates stage the behavior:

  time accumulation   enables kinematic integration (position + time).
  audio               enables the audible synthesis path. Off, the voice
                      still advances time but writes guaranteed silence,
                      overwriting the buffer instead of adding to it so a
                      gated voice can never leak sound.

Everything per-sample is O(1), the selection is O(window), and nothing in
this file allocates after construction.
*/

/// Default carrier frequency before any note latches one.
pub const DEFAULT_BASE_FREQ: f64 = 220.0;

/// Default field-pulse frequency in Hz.
pub const DEFAULT_PULSE_HZ: f64 = 1.0;

/// Half-width of the per-block emitter selection window, in lattice indices.
pub const SELECTION_WINDOW_RADIUS: i32 = 2;

/// Block-peak threshold under which a releasing voice frees itself.
const LEVEL_FLOOR: f32 = 1e-4;

const DEFAULT_ATTACK: f64 = 0.01;
const DEFAULT_RELEASE: f64 = 0.2;

/// Controller values cached between notes. Density, orientation and the
/// field-pulse frequency are sampled from here at note-on only; speed and
/// heading pass straight through to the kinematics.
#[derive(Debug, Clone, Copy)]
struct CachedControls {
    speed_norm: f64,
    heading_norm: f64,
    density_norm: f64,
    orientation_norm: f64,
    pulse_hz: f64,
}

impl Default for CachedControls {
    fn default() -> Self {
        Self {
            speed_norm: 0.0,
            heading_norm: 0.5, // facing +X
            density_norm: 1.0,
            orientation_norm: 0.5, // axis-aligned lattice
            pulse_hz: DEFAULT_PULSE_HZ,
        }
    }
}

pub struct DopplerVoice {
    sample_rate: f64,
    active: bool,
    note: Option<u8>,
    velocity: f64,
    level: f32,

    time_accumulation: bool,
    audio_enabled: bool,

    listener: ListenerKinematics,
    lattice: EmitterLattice,
    envelope: RetardedEnvelope,
    controls: CachedControls,

    base_freq: f64,
    base_phase: f64,
    pulse_freq: f64,
    pitch_locked: bool,
}

impl DopplerVoice {
    pub fn new() -> Self {
        let controls = CachedControls::default();
        Self {
            sample_rate: 48_000.0,
            active: false,
            note: None,
            velocity: 0.0,
            level: 0.0,
            time_accumulation: false,
            audio_enabled: false,
            listener: ListenerKinematics::new(),
            lattice: EmitterLattice::from_controls(
                controls.density_norm,
                controls.orientation_norm,
            ),
            envelope: RetardedEnvelope::new(DEFAULT_ATTACK, 0.0, 1.0, DEFAULT_RELEASE),
            controls,
            base_freq: DEFAULT_BASE_FREQ,
            base_phase: 0.0,
            pulse_freq: DEFAULT_PULSE_HZ,
            pitch_locked: true,
        }
    }

    /// Live listener motion controls; effective immediately, inert while
    /// motion is disabled.
    pub fn set_listener_controls(&mut self, speed_norm: f64, heading_norm: f64) {
        self.controls.speed_norm = speed_norm;
        self.controls.heading_norm = heading_norm;
        self.listener.set_controls(speed_norm, heading_norm);
    }

    /// Cache lattice controls. Sampled at note-on; a rebuild happens
    /// immediately only while no note is sounding, so a sounding note keeps
    /// the geometry it latched.
    pub fn set_field_controls(&mut self, density_norm: f64, orientation_norm: f64) {
        self.controls.density_norm = density_norm;
        self.controls.orientation_norm = orientation_norm;
        if !self.active {
            self.lattice = EmitterLattice::from_controls(density_norm, orientation_norm);
        }
    }

    pub fn listener(&self) -> &ListenerKinematics {
        &self.listener
    }

    pub fn listener_position(&self) -> Vec2 {
        self.listener.position()
    }

    pub fn listener_time(&self) -> f64 {
        self.listener.time()
    }

    pub fn set_listener_position(&mut self, position: Vec2) {
        self.listener.set_position(position);
    }

    pub fn set_listener_time(&mut self, time: f64) {
        self.listener.set_time(time);
    }

    pub fn lattice(&self) -> &EmitterLattice {
        &self.lattice
    }

    /// World position of the lattice emitter at (k, m).
    pub fn emitter_position(&self, k: i32, m: i32) -> Vec2 {
        self.lattice.position(k, m)
    }

    /// Predictive score for an arbitrary emitter position.
    pub fn score_emitter(&self, emitter: Vec2) -> f64 {
        selector::score_emitter(&self.listener, emitter)
    }

    /// Windowed best-candidate query over the current lattice.
    pub fn best_emitter_in_window(
        &self,
        k_min: i32,
        k_max: i32,
        m_min: i32,
        m_max: i32,
    ) -> EmitterCandidate {
        selector::find_best_in_window(&self.listener, &self.lattice, k_min, k_max, m_min, m_max)
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_freq
    }

    pub fn set_base_frequency(&mut self, hz: f64) {
        self.base_freq = hz;
    }

    pub fn pulse_frequency(&self) -> f64 {
        self.pulse_freq
    }

    pub fn set_pulse_frequency(&mut self, hz: f64) {
        self.pulse_freq = hz;
    }

    pub fn envelope(&self) -> &RetardedEnvelope {
        &self.envelope
    }

    pub fn set_adsr_params(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.envelope.set_attack(attack);
        self.envelope.set_decay(decay);
        self.envelope.set_sustain(sustain);
        self.envelope.set_release(release);
    }

    pub fn set_adsr_times(&mut self, note_on_time: f64, note_off_time: f64) {
        self.envelope.set_times(note_on_time, note_off_time);
    }

    /// Carrier sample at an arbitrary retarded time.
    pub fn eval_carrier(&self, t_ret: f64) -> f64 {
        waveform::carrier(self.base_freq, self.base_phase, t_ret)
    }

    /// Field-pulse level at an arbitrary retarded time.
    pub fn eval_field_pulse(&self, t_ret: f64) -> f64 {
        waveform::field_pulse(self.pulse_freq, t_ret)
    }

    /// ADSR level at an arbitrary retarded time.
    pub fn eval_adsr(&self, t_ret: f64) -> f64 {
        self.envelope.eval(t_ret)
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.level = 0.0;
    }
}

impl Default for DopplerVoice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice for DopplerVoice {
    fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = if sample_rate > 0.0 {
            sample_rate
        } else {
            48_000.0
        };
        self.active = false;
        self.note = None;
        self.velocity = 0.0;
        self.level = 0.0;

        self.listener = ListenerKinematics::new();
        self.controls = CachedControls::default();
        self.lattice = EmitterLattice::from_controls(
            self.controls.density_norm,
            self.controls.orientation_norm,
        );
        self.envelope = RetardedEnvelope::new(DEFAULT_ATTACK, 0.0, 1.0, DEFAULT_RELEASE);
        self.base_freq = DEFAULT_BASE_FREQ;
        self.base_phase = 0.0;
        self.pulse_freq = DEFAULT_PULSE_HZ;
        self.pitch_locked = true;
    }

    fn note_on(&mut self, snapshot: &ParameterSnapshot, midi_note: u8, velocity: f32) {
        self.note = Some(midi_note);
        self.velocity = f64::from(velocity.clamp(0.0, 1.0));
        self.active = true;
        self.level = 1.0; // fresh notes are not steal candidates

        self.pitch_locked = !snapshot.overrides_pitch();
        self.base_freq = if self.pitch_locked {
            params::midi_note_to_freq(midi_note)
        } else {
            snapshot.osc_freq
        };

        self.envelope.set_attack(snapshot.env_attack);
        self.envelope.set_release(snapshot.env_release);

        // Latch the note-on controller snapshot.
        self.pulse_freq = self.controls.pulse_hz;
        self.lattice = EmitterLattice::from_controls(
            self.controls.density_norm,
            self.controls.orientation_norm,
        );

        // Listener restarts at the origin of space and source-local time.
        self.listener.reset();
        self.envelope.start(0.0);
    }

    fn note_off(&mut self) {
        if !self.active {
            return;
        }

        self.envelope.release_at(self.listener.time());
        if !self.audio_enabled {
            // Silent-skeleton path: nothing will ever fade out, stop now.
            self.deactivate();
        }
    }

    fn render(&mut self, buffer: &mut [f32]) {
        if !self.active {
            buffer.fill(0.0);
            return;
        }

        let dt = buffer.len() as f64 / self.sample_rate;
        let block_start_time = self.listener.time();
        let block_start_pos = self.listener.position();
        let block_velocity = self.listener.velocity();

        if self.time_accumulation {
            self.listener.advance(dt);
        } else if self.audio_enabled {
            self.listener.advance_time(dt);
        }

        if !self.audio_enabled {
            buffer.fill(0.0);
            return;
        }

        let best = selector::find_best_in_window(
            &self.listener,
            &self.lattice,
            -SELECTION_WINDOW_RADIUS,
            SELECTION_WINDOW_RADIUS,
            -SELECTION_WINDOW_RADIUS,
            SELECTION_WINDOW_RADIUS,
        );

        let mut peak = 0.0f32;
        let mut t_ret = block_start_time;
        for (i, out) in buffer.iter_mut().enumerate() {
            let offset = i as f64 / self.sample_rate;
            let t = block_start_time + offset;
            let position = block_start_pos + block_velocity * offset;

            let r = propagation::distance(position, best.position);
            t_ret = propagation::retarded_time(t, r);

            let sample = waveform::carrier(self.base_freq, self.base_phase, t_ret)
                * self.envelope.eval(t_ret)
                * waveform::field_pulse(self.pulse_freq, t_ret)
                * waveform::attenuation(r)
                * self.velocity;

            let sample = sample as f32;
            *out += sample;
            peak = peak.max(sample.abs());
        }
        self.level = peak;

        // The release is only over once it has played out in *retarded*
        // time; checking wall clock would cut distant emitters short.
        let audibly_released =
            self.envelope.releasing() && t_ret > self.envelope.note_off_time();
        if self.envelope.finished(t_ret) || (audibly_released && peak < LEVEL_FLOOR) {
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
            cc::LISTENER_SPEED => {
                self.set_listener_controls(value, self.controls.heading_norm);
            }
            cc::LISTENER_HEADING => {
                self.set_listener_controls(self.controls.speed_norm, value);
            }
            cc::LATTICE_DENSITY => {
                self.set_field_controls(value, self.controls.orientation_norm);
            }
            cc::LATTICE_ORIENTATION => {
                self.set_field_controls(self.controls.density_norm, value);
            }
            cc::FIELD_PULSE_FREQ => {
                self.controls.pulse_hz = params::field_pulse_hz(value);
                if !self.active {
                    self.pulse_freq = self.controls.pulse_hz;
                }
            }
            _ => {}
        }
    }

    fn update_params(&mut self, params: &VoiceParams) {
        self.envelope.set_attack(params.env_attack);
        self.envelope.set_release(params.env_release);
        if !self.active || !self.pitch_locked {
            self.base_freq = params.osc_freq;
        }
    }

    /// Enable kinematic integration: position and time advance each block.
    fn enable_time_accumulation(&mut self, enabled: bool) {
        self.time_accumulation = enabled;
    }

    /// Gate the audible synthesis path. Off, the voice renders silence.
    fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
    }
}
