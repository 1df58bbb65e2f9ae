use crate::params::ParameterSnapshot;
use crate::synth::factory::VoiceMode;
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::pool::VoicePool;

/// Message-driven polyphonic synth: drains a control queue at the top of
/// every block, then renders the voice pool.
///
/// Built generic over [`MessageReceiver`] so the realtime path can feed it
/// from an SPSC ring (`rtrb::Consumer`) while tests use a `VecDeque`.
pub struct PolySynth<R: MessageReceiver> {
    pool: VoicePool,
    rx: R,
    frame_counter: u64,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(mode: VoiceMode, sample_rate: f64, rx: R) -> Self {
        let mut pool = VoicePool::new(mode);
        pool.prepare(sample_rate);
        Self {
            pool,
            rx,
            frame_counter: 0,
        }
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut VoicePool {
        &mut self.pool
    }

    pub fn set_snapshot(&mut self, snapshot: ParameterSnapshot) {
        self.pool.set_snapshot(snapshot);
    }

    /// Frames rendered since construction.
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::NoteOn { note, velocity } => self.pool.note_on(note, velocity),
                SynthMessage::NoteOff { note } => self.pool.note_off(note),
                SynthMessage::Controller { cc, value } => self.pool.handle_controller(cc, value),
                SynthMessage::AllNotesOff => self.pool.all_notes_off(),
            }
        }

        self.pool.render(out);
        self.frame_counter += out.len() as u64;
    }
}
