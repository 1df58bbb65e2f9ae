use crate::synth::doppler::DopplerVoice;
use crate::synth::simple::SimpleVoice;
use crate::synth::voice::Voice;

/// Which voice implementation the pool builds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceMode {
    /// Plain oscillator + sample-stepped ADSR.
    Simple,
    /// Listener moving through an emitter lattice, sources evaluated at
    /// retarded time.
    #[default]
    Doppler,
}

/// Build one unprepared voice of the given mode.
pub fn make_voice(mode: VoiceMode) -> Box<dyn Voice> {
    match mode {
        VoiceMode::Simple => Box::new(SimpleVoice::new()),
        VoiceMode::Doppler => Box::new(DopplerVoice::new()),
    }
}
