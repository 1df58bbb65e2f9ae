//! Parameter plumbing between the host and the voices.
//!
//! Three channels exist, with different lifetimes:
//!
//! - [`ParameterSnapshot`]: immutable per-block snapshot built by the host
//!   and handed to the pool at the start of each block. Voices latch from it
//!   at note-on only.
//! - [`VoiceParams`]: live per-block reconciliation values pushed into
//!   already-sounding voices (subject to the pitch-lock rule below).
//! - Controller (CC) moves: normalized 0..1 values routed per the fixed
//!   convention in [`cc`], some live, some latched at the next note-on.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Snapshot oscillator frequency meaning "no override": a note started from
/// a snapshot still at this default derives its pitch from the MIDI note and
/// is pitch-locked; any other value selects free-frequency mode.
pub const DEFAULT_OSC_FREQ: f64 = 440.0;

/// Immutable snapshot of all block-level parameter values. Built once per
/// audio block so every voice shares a consistent state.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct ParameterSnapshot {
    pub master_volume_db: f64,
    pub master_mix: f64,
    pub osc_freq: f64,
    pub env_attack: f64,
    pub env_release: f64,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            master_volume_db: -6.0,
            master_mix: 1.0,
            osc_freq: DEFAULT_OSC_FREQ,
            env_attack: 0.01,
            env_release: 0.2,
        }
    }
}

impl ParameterSnapshot {
    /// True when the snapshot frequency overrides note pitch
    /// (free-frequency mode).
    pub fn overrides_pitch(&self) -> bool {
        (self.osc_freq - DEFAULT_OSC_FREQ).abs() > 1e-3
    }
}

/// Live per-block parameter values for reconciling sounding voices.
///
/// `osc_freq` is ignored by a pitch-locked note (one whose pitch came from
/// the MIDI note rather than a snapshot override).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct VoiceParams {
    pub osc_freq: f64,
    pub env_attack: f64,
    pub env_release: f64,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            osc_freq: DEFAULT_OSC_FREQ,
            env_attack: 0.01,
            env_release: 0.2,
        }
    }
}

/// Fixed controller routing convention.
///
/// Speed and heading are continuous (applied every block); density,
/// orientation and the field-pulse frequency are sampled from the cached
/// controller state at note-on only and stay fixed for the note's lifetime.
pub mod cc {
    /// Envelope attack, simple voice (live).
    pub const ENV_ATTACK: u8 = 3;
    /// Envelope release, simple voice (live).
    pub const ENV_RELEASE: u8 = 4;
    /// Detune in semitones around center, simple voice (live).
    pub const DETUNE: u8 = 5;
    /// Listener speed (live).
    pub const LISTENER_SPEED: u8 = 21;
    /// Listener heading (live).
    pub const LISTENER_HEADING: u8 = 22;
    /// Lattice density (latched at note-on).
    pub const LATTICE_DENSITY: u8 = 23;
    /// Lattice orientation (latched at note-on).
    pub const LATTICE_ORIENTATION: u8 = 24;
    /// Field-pulse frequency (latched at note-on).
    pub const FIELD_PULSE_FREQ: u8 = 25;
}

/// Field-pulse frequency range endpoints, Hz.
pub const FIELD_PULSE_MIN_HZ: f64 = 0.25;
pub const FIELD_PULSE_MAX_HZ: f64 = 8.0;

/// Map a normalized controller value exponentially across the field-pulse
/// frequency range.
pub fn field_pulse_hz(norm: f64) -> f64 {
    let norm = norm.clamp(0.0, 1.0);
    FIELD_PULSE_MIN_HZ * (FIELD_PULSE_MAX_HZ / FIELD_PULSE_MIN_HZ).powf(norm)
}

/// Map a normalized controller value to ±12 semitones around center.
pub fn detune_semitones(norm: f64) -> f64 {
    (norm.clamp(0.0, 1.0) - 0.5) * 24.0
}

/// Map a normalized controller value exponentially across 1 ms – 2 s,
/// used for both attack and release moves.
pub fn envelope_seconds(norm: f64) -> f64 {
    0.001 * 2000.0_f64.powf(norm.clamp(0.0, 1.0))
}

/// Convert a MIDI note number to frequency in Hz. A4 = 440 Hz = note 69.
#[inline]
pub fn midi_note_to_freq(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((f64::from(note) - 69.0) / 12.0)
}

/// Apply a semitone detune to a frequency.
#[inline]
pub fn apply_detune(hz: f64, semitones: f64) -> f64 {
    hz * 2.0_f64.powf(semitones / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_defaults_match_convention() {
        let snap = ParameterSnapshot::default();
        assert_eq!(snap.osc_freq, DEFAULT_OSC_FREQ);
        assert!(!snap.overrides_pitch());

        let free = ParameterSnapshot {
            osc_freq: 880.0,
            ..Default::default()
        };
        assert!(free.overrides_pitch());
    }

    #[test]
    fn field_pulse_map_spans_range_exponentially() {
        assert!((field_pulse_hz(0.0) - FIELD_PULSE_MIN_HZ).abs() < 1e-12);
        assert!((field_pulse_hz(1.0) - FIELD_PULSE_MAX_HZ).abs() < 1e-9);

        // Midpoint is the geometric mean, not the arithmetic one.
        let geometric = (FIELD_PULSE_MIN_HZ * FIELD_PULSE_MAX_HZ).sqrt();
        assert!((field_pulse_hz(0.5) - geometric).abs() < 1e-9);

        // Out-of-range input clamps.
        assert_eq!(field_pulse_hz(2.0), field_pulse_hz(1.0));
    }

    #[test]
    fn detune_is_centered() {
        assert_eq!(detune_semitones(0.5), 0.0);
        assert_eq!(detune_semitones(0.0), -12.0);
        assert_eq!(detune_semitones(1.0), 12.0);
    }

    #[test]
    fn midi_mapping_hits_reference_pitches() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-9);
        assert!((midi_note_to_freq(57) - 220.0).abs() < 1e-9);
        assert!((midi_note_to_freq(81) - 880.0).abs() < 1e-9);
    }

    #[test]
    fn detune_shifts_by_octaves() {
        assert!((apply_detune(440.0, 12.0) - 880.0).abs() < 1e-9);
        assert!((apply_detune(440.0, -12.0) - 220.0).abs() < 1e-9);
    }
}
