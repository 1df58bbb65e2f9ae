use crate::MIN_TIME;

/*
Sample-Stepped ADSR Envelope
============================

The amplitude envelope for the non-spatial voice. Where the Doppler voice
evaluates its envelope analytically at retarded time, this one is the
classic realtime form: a state machine advanced once per sample.

    Level
      1.0 |     /\
          |    /  \___________
      S   |   /               \
          |  /                 \
      0.0 |_/___________________\___  Time
          Attack Decay  Sustain  Release

All ramps are linear. note_off can arrive in any stage; release always
starts from the *current* level (snapshot at note_off), which is what keeps
an early release click-free. Release interpolates from that snapshot so it
lands on exactly 0.0 after the precomputed sample count.

Increments are recomputed each sample from the stored times. That keeps
parameter changes (live CC moves) effective immediately with no cached
state to invalidate; one division per sample is noise next to the sine.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    sample_rate: f64,
    attack_time: f64,
    decay_time: f64,
    sustain_level: f64,
    release_time: f64,

    state: EnvelopeState,
    level: f64,

    release_start_level: f64,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000.0,
            attack_time: 0.01,
            decay_time: MIN_TIME,
            sustain_level: 1.0,
            release_time: 0.2,

            state: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = if sample_rate > 0.0 {
            sample_rate
        } else {
            48_000.0
        };
        self.reset();
    }

    pub fn set_attack(&mut self, seconds: f64) {
        self.attack_time = seconds.max(MIN_TIME);
    }

    pub fn set_decay(&mut self, seconds: f64) {
        self.decay_time = seconds.max(MIN_TIME);
    }

    pub fn set_sustain(&mut self, level: f64) {
        self.sustain_level = level.clamp(0.0, 1.0);
    }

    pub fn set_release(&mut self, seconds: f64) {
        self.release_time = seconds.max(MIN_TIME);
    }

    /// Gate high: restart the attack from zero for a clean retrigger.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.state = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: release from the current level, whatever stage we are in.
    pub fn note_off(&mut self) {
        if self.state == EnvelopeState::Idle || self.state == EnvelopeState::Release {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples =
            ((self.release_time * self.sample_rate).round() as u32).max(1);
        self.release_elapsed_samples = 0;
        self.state = EnvelopeState::Release;
    }

    pub fn next_sample(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * self.sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let drop = 1.0 - self.sustain_level;
                self.level -= drop / (self.decay_time * self.sample_rate);
                if self.level <= self.sustain_level {
                    self.level = self.sustain_level;
                    self.state = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                let progress =
                    f64::from(self.release_elapsed_samples) / f64::from(self.release_total_samples);
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);
                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level as f32
    }

    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level as f32
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 1_000.0;

    fn run(env: &mut Envelope, samples: usize) -> f32 {
        let mut last = 0.0;
        for _ in 0..samples {
            last = env.next_sample();
        }
        last
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::new();
        env.prepare(SAMPLE_RATE);
        env.set_attack(0.01);

        env.note_on();
        let level = run(&mut env, (0.01 * SAMPLE_RATE) as usize + 1);

        assert!(level > 0.99);
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn decay_settles_on_sustain() {
        let mut env = Envelope::new();
        env.prepare(SAMPLE_RATE);
        env.set_attack(0.01);
        env.set_decay(0.05);
        env.set_sustain(0.6);

        env.note_on();
        run(&mut env, (0.07 * SAMPLE_RATE) as usize);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - 0.6).abs() < 0.05);
    }

    #[test]
    fn release_falls_back_to_idle() {
        let mut env = Envelope::new();
        env.prepare(SAMPLE_RATE);
        env.set_attack(0.01);
        env.set_release(0.03);

        env.note_on();
        run(&mut env, (0.02 * SAMPLE_RATE) as usize);

        env.note_off();
        run(&mut env, (0.03 * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001);
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn release_mid_attack_starts_from_current_level() {
        let mut env = Envelope::new();
        env.prepare(SAMPLE_RATE);
        env.set_attack(0.1);
        env.set_release(0.05);

        env.note_on();
        run(&mut env, (0.05 * SAMPLE_RATE) as usize); // halfway up
        let level_at_release = env.level();
        assert!(level_at_release > 0.3 && level_at_release < 0.7);

        env.note_off();
        let next = env.next_sample();
        assert!((next - level_at_release).abs() < 0.05, "no click on release");
    }
}
