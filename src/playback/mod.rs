//! Playback Scheduler
//!
//! Plays catalog files through an [`AudioBackend`]: fire-and-forget one-shots
//! on short-lived threads, and one looping ambient track on a dedicated
//! thread. Backend failures never reach the caller's frame loop; one-shots
//! are skipped and the ambient loop sleeps out the track length instead.

pub mod backend;
#[cfg(feature = "device")]
pub mod device;
pub mod session;

pub use backend::{CommandBackend, NullBackend};
#[cfg(feature = "device")]
pub use device::DeviceBackend;
pub use session::{AmbientState, OneShot, PlaybackSession};

use crate::config::{AudioConfig, BackendKind};
use parking_lot::{Condvar, Mutex};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Errors reported by playback backends and one-shot tasks
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    /// No usable player or device
    #[error("No audio backend available: {0}")]
    Unavailable(String),

    /// The player process could not be started
    #[error("Failed to start player: {0}")]
    Spawn(std::io::Error),

    /// The player process ended unsuccessfully
    #[error("Player exited with {0}")]
    Exited(std::process::ExitStatus),

    /// The output device rejected the stream
    #[error("Audio device error: {0}")]
    Device(String),

    /// Name not present in the catalog
    #[error("Unknown sound: {0}")]
    UnknownAsset(String),

    /// Name is known but its file has not been generated
    #[error("Sound not generated yet: {0}")]
    MissingFile(String),

    /// Re-synthesis before playback failed
    #[error("Failed to regenerate {name}: {reason}")]
    Regenerate {
        /// Asset name
        name: String,
        /// Underlying failure
        reason: String,
    },

    /// The one-shot thread panicked
    #[error("Playback task for {0} panicked")]
    Panicked(String),

    /// IO error while supervising playback
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An in-flight playback owned by a backend
pub trait ActivePlayback: Send + Sync {
    /// Block until playback has finished
    fn wait(&self) -> Result<(), BackendError>;

    /// Cut playback short; a no-op once it has finished
    fn terminate(&self);
}

/// Opaque, cloneable reference to an in-flight playback
#[derive(Clone)]
pub struct PlaybackHandle {
    inner: Arc<dyn ActivePlayback>,
}

impl PlaybackHandle {
    /// Wrap a backend-specific playback
    pub fn new(playback: impl ActivePlayback + 'static) -> Self {
        PlaybackHandle {
            inner: Arc::new(playback),
        }
    }

    /// Block until playback has finished
    pub fn wait(&self) -> Result<(), BackendError> {
        self.inner.wait()
    }

    /// Cut playback short
    pub fn terminate(&self) {
        self.inner.terminate()
    }
}

impl std::fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PlaybackHandle")
    }
}

/// Capability to play an encoded file
///
/// All OS- and device-specific invocation lives behind this seam.
pub trait AudioBackend: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    /// Start playing `path` and return without waiting for it to finish
    fn play(&self, path: &Path) -> Result<PlaybackHandle, BackendError>;
}

/// Shared cooperative stop flag for the ambient loop
///
/// The owner of the frame loop keeps a clone and calls
/// [`StopSignal::request_stop`] when the session ends.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopInner>,
}

#[derive(Default)]
struct StopInner {
    stopped: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl StopSignal {
    /// New signal in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop at its next cycle boundary
    pub fn request_stop(&self) {
        let _guard = self.inner.lock.lock();
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.wake.notify_all();
    }

    /// Whether a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless a stop is requested first
    ///
    /// Returns `true` if the full duration elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.inner.lock.lock();
        while !self.is_stopped() {
            if self.inner.wake.wait_until(&mut guard, deadline).timed_out() {
                return !self.is_stopped();
            }
        }
        false
    }
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Pick a backend once at startup according to `config`
///
/// Never fails: when nothing usable is found the [`NullBackend`] is returned
/// and every playback degrades silently.
pub fn select_backend(config: &AudioConfig) -> Arc<dyn AudioBackend> {
    let command = || match &config.player_command {
        Some(argv) => CommandBackend::from_argv(argv),
        None => Some(CommandBackend::platform_default()),
    };

    let backend: Arc<dyn AudioBackend> = match config.backend {
        BackendKind::None => Arc::new(NullBackend),
        BackendKind::Command => match command() {
            Some(cmd) => Arc::new(cmd),
            None => Arc::new(NullBackend),
        },
        BackendKind::Device => match open_device() {
            Some(device) => device,
            None => Arc::new(NullBackend),
        },
        BackendKind::Auto => {
            if let Some(device) = open_device() {
                device
            } else {
                match command().filter(CommandBackend::is_available) {
                    Some(cmd) => Arc::new(cmd),
                    None => {
                        warn!("no audio player found; sounds are disabled");
                        Arc::new(NullBackend)
                    }
                }
            }
        }
    };

    info!(backend = backend.name(), requested = %config.backend, "audio backend selected");
    backend
}

#[cfg(feature = "device")]
fn open_device() -> Option<Arc<dyn AudioBackend>> {
    match DeviceBackend::open_default() {
        Ok(device) => Some(Arc::new(device)),
        Err(e) => {
            warn!(error = %e, "audio device unavailable");
            None
        }
    }
}

#[cfg(not(feature = "device"))]
fn open_device() -> Option<Arc<dyn AudioBackend>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_stop_signal_shared_between_clones() {
        let signal = StopSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_stopped());
        signal.request_stop();
        assert!(observer.is_stopped());
    }

    #[test]
    fn test_sleep_runs_to_completion() {
        let signal = StopSignal::new();
        let started = Instant::now();
        assert!(signal.sleep(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_sleep_wakes_on_stop() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.request_stop();
        });

        let started = Instant::now();
        assert!(!signal.sleep(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(5));
        stopper.join().unwrap();
    }

    #[test]
    fn test_select_none_backend() {
        let config = AudioConfig {
            backend: BackendKind::None,
            ..AudioConfig::default()
        };
        let backend = select_backend(&config);
        assert_eq!(backend.name(), "none");
        let err = backend.play(Path::new("missing.wav")).unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }

    #[test]
    fn test_select_configured_command() {
        let config = AudioConfig {
            backend: BackendKind::Command,
            player_command: Some(vec!["paplay".to_string()]),
            ..AudioConfig::default()
        };
        assert_eq!(select_backend(&config).name(), "paplay");
    }
}
