/*
Sine Oscillator
===============

Phase-accumulating sine generator for the non-spatial voice. One addition
and one wrap per sample:

    phase += 2*pi * freq / sample_rate

The phase accumulator is f64 so long notes don't collect pitch drift, and
it wraps every cycle so it never loses precision by growing large. A zeroed
frequency silences the oscillator outright; deactivated voices use that to
guarantee no residual bleed.
*/

pub struct Oscillator {
    sample_rate: f64,
    freq: f64,
    phase: f64,
}

impl Oscillator {
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000.0,
            freq: 440.0,
            phase: 0.0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = if sample_rate > 0.0 {
            sample_rate
        } else {
            48_000.0
        };
        self.phase = 0.0;
    }

    pub fn set_frequency(&mut self, hz: f64) {
        self.freq = hz;
    }

    pub fn frequency(&self) -> f64 {
        self.freq
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.freq <= 0.0 {
            return 0.0;
        }

        let value = self.phase.sin();
        self.phase += core::f64::consts::TAU * self.freq / self.sample_rate;
        if self.phase >= core::f64::consts::TAU {
            self.phase -= core::f64::consts::TAU;
        }

        value as f32
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_expected_sine() {
        let sample_rate = 48_000.0;
        let freq = 440.0;
        let mut osc = Oscillator::new();
        osc.prepare(sample_rate);
        osc.set_frequency(freq);

        let mut buffer = [0.0f32; 128];
        for sample in buffer.iter_mut() {
            *sample = osc.next_sample();
        }

        // sample n = sin(2*pi*f*n / sr)
        let n = 12;
        let expected = (core::f64::consts::TAU * freq * n as f64 / sample_rate).sin() as f32;
        assert!((buffer[n] - expected).abs() < 1e-6);
    }

    #[test]
    fn zero_frequency_is_silent() {
        let mut osc = Oscillator::new();
        osc.prepare(48_000.0);
        osc.set_frequency(0.0);

        for _ in 0..64 {
            assert_eq!(osc.next_sample(), 0.0);
        }
    }

    #[test]
    fn phase_reset_restarts_waveform() {
        let mut osc = Oscillator::new();
        osc.prepare(48_000.0);
        osc.set_frequency(220.0);

        let first = osc.next_sample();
        for _ in 0..100 {
            osc.next_sample();
        }
        osc.reset_phase();
        assert_eq!(osc.next_sample(), first);
    }
}
