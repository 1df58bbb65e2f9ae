use crate::params::{ParameterSnapshot, VoiceParams};

/// Capability interface shared by every voice implementation.
///
/// The render contract is additive: a voice adds its output into the buffer
/// it is given and must not assume the buffer was cleared for it. The pool
/// clears the mix once per block and only renders active voices.
pub trait Voice: Send {
    /// Reset all state for a new sample rate. Called outside the render path.
    fn prepare(&mut self, sample_rate: f64);

    /// Start a note, latching parameters from the block snapshot.
    fn note_on(&mut self, snapshot: &ParameterSnapshot, midi_note: u8, velocity: f32);

    /// Release the current note.
    fn note_off(&mut self);

    /// Add one block of output into `buffer`.
    fn render(&mut self, buffer: &mut [f32]);

    fn is_active(&self) -> bool;

    /// The sounding MIDI note, if any.
    fn note(&self) -> Option<u8>;

    /// Most recent block peak, used by the note-stealing heuristic.
    fn current_level(&self) -> f32;

    /// Route a normalized controller move. Default: ignore.
    fn handle_controller(&mut self, cc: u8, value: f32) {
        let _ = (cc, value);
    }

    /// Enable kinematic integration, for voices that model motion.
    /// Default: ignore.
    fn enable_time_accumulation(&mut self, enabled: bool) {
        let _ = enabled;
    }

    /// Gate the audible path, for voices that stage it behind a flag.
    /// Default: ignore.
    fn set_audio_enabled(&mut self, enabled: bool) {
        let _ = enabled;
    }

    /// Reconcile live per-block parameters. Default: ignore.
    fn update_params(&mut self, params: &VoiceParams) {
        let _ = params;
    }
}

/// Allow boxed voices to be used wherever a voice is expected.
impl Voice for Box<dyn Voice> {
    fn prepare(&mut self, sample_rate: f64) {
        (**self).prepare(sample_rate)
    }

    fn note_on(&mut self, snapshot: &ParameterSnapshot, midi_note: u8, velocity: f32) {
        (**self).note_on(snapshot, midi_note, velocity)
    }

    fn note_off(&mut self) {
        (**self).note_off()
    }

    fn render(&mut self, buffer: &mut [f32]) {
        (**self).render(buffer)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn note(&self) -> Option<u8> {
        (**self).note()
    }

    fn current_level(&self) -> f32 {
        (**self).current_level()
    }

    fn handle_controller(&mut self, cc: u8, value: f32) {
        (**self).handle_controller(cc, value)
    }

    fn enable_time_accumulation(&mut self, enabled: bool) {
        (**self).enable_time_accumulation(enabled)
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        (**self).set_audio_enabled(enabled)
    }

    fn update_params(&mut self, params: &VoiceParams) {
        (**self).update_params(params)
    }
}
