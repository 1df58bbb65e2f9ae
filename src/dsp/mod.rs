//! Low-level DSP primitives used by the voice implementations.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They intentionally stay focused on the
//! numerical work (motion integration, lattice geometry, retarded-time
//! propagation, waveform evaluation) so the synth layer can stay pure
//! orchestration.

/// Sample-stepped ADSR envelope for non-spatial voices.
pub mod envelope;
/// Listener motion: normalized controls, integration, prediction.
pub mod kinematics;
/// Emitter lattice geometry indexed by (k, m).
pub mod lattice;
/// Phase-accumulating sine oscillator.
pub mod oscillator;
/// Propagation delay and retarded-time arithmetic.
pub mod propagation;
/// Predictive scoring and windowed best-emitter search.
pub mod selector;
/// Minimal 2-D point/vector type shared by the spatial modules.
pub mod vec2;
/// Source waveforms evaluated at retarded time.
pub mod waveform;

pub use envelope::EnvelopeState;
pub use selector::EmitterCandidate;
pub use vec2::Vec2;
