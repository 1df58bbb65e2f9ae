use crate::MIN_TIME;

/*
Source Waveform Model
=====================

Everything here is a pure function of *retarded* time: the synthesis loop
computes when the sound it is about to output departed its emitter, and
evaluates the source at that earlier instant. That single substitution is
what makes the engine Doppler-correct; no explicit pitch-shift exists anywhere.

Three components multiply into one source sample:

  carrier       sin(2*pi*f*t_ret + phase). The audible tone.

  field pulse   0.5 * (1 + sin(2*pi*mu*t_ret)). A slow, always-non-negative
                amplitude swell at mu of a few hertz; a unipolar LFO riding
                the source's own clock, so it Doppler-shifts with the rest.

  ADSR          linear attack/decay/sustain/release, with note-on/note-off
                stamped in the source's local time reference. Continuity at
                every segment joint is mandatory: the release starts from
                whatever level the attack/decay/sustain rule had reached at
                the release instant, never from a fixed sustain value.

Plus the attenuation kernel: exp(-alpha*r) / max(r, r_min) combines
exponential loss with inverse-distance falloff, clamped near r = 0 so a
coincident emitter cannot divide by zero.
*/

/// Exponential loss coefficient of the attenuation kernel.
pub const ATTENUATION_ALPHA: f64 = 0.5;

/// Distance floor of the attenuation kernel, in world units.
pub const MIN_EMITTER_DISTANCE: f64 = 0.25;

/// Carrier oscillation at retarded time.
#[inline]
pub fn carrier(freq: f64, phase: f64, t_ret: f64) -> f64 {
    (core::f64::consts::TAU * freq * t_ret + phase).sin()
}

/// Slow unipolar amplitude pulse at retarded time.
#[inline]
pub fn field_pulse(mu: f64, t_ret: f64) -> f64 {
    0.5 * (1.0 + (core::f64::consts::TAU * mu * t_ret).sin())
}

/// Distance attenuation kernel `exp(-αr) / max(r, r_min)`.
#[inline]
pub fn attenuation(distance: f64) -> f64 {
    (-ATTENUATION_ALPHA * distance).exp() / distance.max(MIN_EMITTER_DISTANCE)
}

/// ADSR envelope evaluated against retarded time.
///
/// Timestamps live in the source's own time reference: `note_on_time` is
/// latched at note-on and `note_off_time` stays `+∞` until a release is
/// registered. Durations are floored at `MIN_TIME` so every ramp is finite.
#[derive(Debug, Clone, Copy)]
pub struct RetardedEnvelope {
    attack: f64,
    decay: f64,
    sustain: f64,
    release: f64,
    note_on_time: f64,
    note_off_time: f64,
}

impl RetardedEnvelope {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack: attack.max(MIN_TIME),
            decay: decay.max(MIN_TIME),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(MIN_TIME),
            note_on_time: 0.0,
            note_off_time: f64::INFINITY,
        }
    }

    pub fn set_attack(&mut self, seconds: f64) {
        self.attack = seconds.max(MIN_TIME);
    }

    pub fn set_decay(&mut self, seconds: f64) {
        self.decay = seconds.max(MIN_TIME);
    }

    pub fn set_sustain(&mut self, level: f64) {
        self.sustain = level.clamp(0.0, 1.0);
    }

    pub fn set_release(&mut self, seconds: f64) {
        self.release = seconds.max(MIN_TIME);
    }

    /// Stamp the note-on instant and clear any registered release.
    pub fn start(&mut self, note_on_time: f64) {
        self.note_on_time = note_on_time;
        self.note_off_time = f64::INFINITY;
    }

    /// Register the release instant. Idempotent: the earliest stamp wins.
    pub fn release_at(&mut self, note_off_time: f64) {
        self.note_off_time = self.note_off_time.min(note_off_time);
    }

    pub fn attack(&self) -> f64 {
        self.attack
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    pub fn sustain(&self) -> f64 {
        self.sustain
    }

    pub fn release(&self) -> f64 {
        self.release
    }

    pub fn note_on_time(&self) -> f64 {
        self.note_on_time
    }

    pub fn note_off_time(&self) -> f64 {
        self.note_off_time
    }

    pub fn set_times(&mut self, note_on_time: f64, note_off_time: f64) {
        self.note_on_time = note_on_time;
        self.note_off_time = note_off_time;
    }

    /// True once a release instant has been registered.
    pub fn releasing(&self) -> bool {
        self.note_off_time.is_finite()
    }

    /// True when the release has fully played out at retarded time `t_ret`.
    pub fn finished(&self, t_ret: f64) -> bool {
        self.releasing() && t_ret - self.note_on_time >= self.release_start() + self.release
    }

    fn release_start(&self) -> f64 {
        self.note_off_time - self.note_on_time
    }

    /// The attack/decay/sustain rule, ignoring any release.
    fn held_level(&self, t: f64) -> f64 {
        if t <= 0.0 {
            0.0
        } else if t < self.attack {
            t / self.attack
        } else if t < self.attack + self.decay {
            1.0 + (self.sustain - 1.0) * (t - self.attack) / self.decay
        } else {
            self.sustain
        }
    }

    /// Envelope level at retarded time `t_ret`. Continuous everywhere,
    /// clamped to zero at and beyond release completion.
    pub fn eval(&self, t_ret: f64) -> f64 {
        let t = t_ret - self.note_on_time;
        if t <= 0.0 {
            return 0.0;
        }

        let release_start = self.release_start();
        if t < release_start {
            return self.held_level(t);
        }

        // Re-derive the level at the release instant so the joint is
        // continuous, then ramp linearly to zero.
        let start_level = self.held_level(release_start);
        let level = start_level * (1.0 - (t - release_start) / self.release);
        level.max(0.0)
    }
}
