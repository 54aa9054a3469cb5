//! PCM Encoder
//!
//! Hard-clips samples to [-1.0, 1.0], quantizes to 16-bit signed integers and
//! serializes a canonical mono 44.1 kHz WAV container.

pub mod wav;

pub use wav::{encode, quantize, wav_spec, write_wav};

/// Channel count of every encoded file
pub const CHANNELS: u16 = 1;

/// Bit depth of every encoded file
pub const BITS_PER_SAMPLE: u16 = 16;

/// File extension of encoded assets
pub const EXTENSION: &str = "wav";
