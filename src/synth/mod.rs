// Purpose: voice management, polyphony, controller routing.
// This layer sits above the dsp primitives and orchestrates them; all the
// numerical work lives in `crate::dsp`.

pub mod doppler;
pub mod factory;
pub mod message;
pub mod poly;
pub mod pool;
pub mod simple;
pub mod voice;

pub use doppler::DopplerVoice;
pub use factory::VoiceMode;
pub use pool::VoicePool;
pub use simple::SimpleVoice;
pub use voice::Voice;
