//! Runtime configuration
//!
//! Loaded from JSON; every field is optional and falls back to defaults.
//!
//! ```json
//! {
//!   "backend": "command",
//!   "player_command": ["paplay"],
//!   "sound_set": "game",
//!   "ambient_fallback_secs": 12.0,
//!   "seed": 7
//! }
//! ```

use crate::assets::SoundSet;
use crate::{Result, VeilsoundError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Playback backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Device if available, then the platform player command, then silence
    #[default]
    Auto,
    /// Spawn the platform (or configured) player command per sound
    Command,
    /// In-process output through the default audio device
    Device,
    /// No audio; every playback attempt reports the backend as unavailable
    None,
}

impl BackendKind {
    /// Parse a backend name (case-insensitive)
    pub fn from_name(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Some(BackendKind::Auto),
            "command" => Some(BackendKind::Command),
            "device" => Some(BackendKind::Device),
            "none" => Some(BackendKind::None),
            _ => None,
        }
    }

    /// Lowercase backend name
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Auto => "auto",
            BackendKind::Command => "command",
            BackendKind::Device => "device",
            BackendKind::None => "none",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio subsystem configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Which playback backend to use
    pub backend: BackendKind,
    /// Player argv prefix; the file path is appended as the last argument
    pub player_command: Option<Vec<String>>,
    /// Which set of sounds to generate
    pub sound_set: SoundSet,
    /// Degraded-mode ambient sleep and minimum cycle length, defaulting to
    /// the ambient asset length
    pub ambient_fallback_secs: Option<f32>,
    /// Fixed scratch directory instead of a process temp dir
    pub scratch_dir: Option<PathBuf>,
    /// Seed for regenerating assets
    pub seed: Option<u64>,
}

impl AudioConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AudioConfig = serde_json::from_str(json)
            .map_err(|e| VeilsoundError::Config(format!("Malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            VeilsoundError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Reject values no backend or scheduler can honour
    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.ambient_fallback_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(VeilsoundError::Config(format!(
                    "ambient_fallback_secs must be positive, got {}",
                    secs
                )));
            }
        }
        if let Some(cmd) = &self.player_command {
            if cmd.first().map_or(true, |program| program.trim().is_empty()) {
                return Err(VeilsoundError::Config(
                    "player_command must name a program".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Degraded-mode sleep for the ambient loop, if overridden
    pub fn ambient_fallback(&self) -> Option<Duration> {
        self.ambient_fallback_secs.map(Duration::from_secs_f32)
    }
}
