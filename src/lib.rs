//! Procedural sound assets for interactive applications
//!
//! Every sound an application needs is synthesized in memory at startup,
//! encoded to 16-bit mono WAV in a scratch directory and then scheduled for
//! playback: a looped ambient pad plus fire-and-forget one-shot effects.
//! No audio files ship with the application.
//!
//! # Pipeline
//! - [`synth`]: sine/sweep oscillators, linear envelopes, buffer mixing
//! - [`assets`]: one fixed recipe per named sound
//! - [`export`]: clip, quantize and serialize to WAV
//! - [`catalog`]: render every recipe into the scratch directory
//! - [`playback`]: one-shot and ambient-loop scheduling over an [`AudioBackend`]
//!
//! # Crate feature flags
//! - `cli` (default): the `veilsound` command-line front end
//! - `device` (opt-in): in-process playback through rodio (`DeviceBackend`)
//!
//! # Quick start
//! ```no_run
//! use std::sync::Arc;
//! use veilsound::{AssetCatalog, PlaybackSession, SoundSet, StopSignal};
//! use veilsound::playback::CommandBackend;
//!
//! let catalog = Arc::new(AssetCatalog::new(SoundSet::Game).unwrap());
//! catalog.generate_all().unwrap();
//!
//! let backend = Arc::new(CommandBackend::platform_default());
//! let session = PlaybackSession::new(catalog, backend);
//!
//! let game_over = StopSignal::new();
//! session.start_ambient_loop(game_over.clone());
//! let _ = session.play("zone_charge");
//! let _ = session.play_regenerated("sparkle");
//! game_over.request_stop();
//! ```

#![warn(missing_docs)]

pub mod assets; // Named sound recipes
pub mod catalog; // Generation pipeline and scratch directory
pub mod config; // Runtime configuration
pub mod export; // PCM/WAV encoding
pub mod playback; // Backends and scheduling
pub mod synth; // Signal primitives

/// Error types for sound generation and configuration
#[derive(thiserror::Error, Debug)]
pub enum VeilsoundError {
    /// Invalid synthesis parameters
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Error encoding or writing an audio file
    #[error("Encode error: {0}")]
    Encode(String),

    /// IO error from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the WAV writer
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Asset name not present in the catalog
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for VeilsoundError {
    /// Converts a String into `VeilsoundError::Other`.
    ///
    /// Prefer the specific variants (`Encode`, `Config`, ...) where the failure
    /// kind is known.
    fn from(msg: String) -> Self {
        VeilsoundError::Other(msg)
    }
}

impl From<&str> for VeilsoundError {
    fn from(msg: &str) -> Self {
        VeilsoundError::Other(msg.to_string())
    }
}

/// Result type for sound generation operations
pub type Result<T> = std::result::Result<T, VeilsoundError>;

// Public API exports
pub use assets::{AssetDescriptor, AssetKind, SoundSet};
pub use catalog::AssetCatalog;
pub use config::{AudioConfig, BackendKind};
pub use export::{encode, write_wav, CHANNELS, BITS_PER_SAMPLE};
pub use playback::{
    AmbientState, AudioBackend, BackendError, OneShot, PlaybackHandle, PlaybackSession,
    StopSignal,
};
pub use synth::{concat, envelope, mix, sine, sweep, SampleBuffer, SAMPLE_RATE};
