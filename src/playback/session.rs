//! Playback session: one-shot effects and the ambient loop
//!
//! One-shots run on their own threads and are serialized only around the
//! backend call that starts them; the lock is released as soon as the
//! backend returns, so effects may overlap audibly.
//!
//! The ambient loop plays its track, waits for it to end, and checks the
//! [`StopSignal`] before starting the next cycle. A stop never interrupts a
//! cycle that is already playing; [`PlaybackSession::halt_ambient_loop`]
//! does. Every cycle lasts at least the ambient fallback duration (the track
//! length unless configured otherwise), whether the track played, ended
//! early, or failed to start.

use super::{select_backend, AudioBackend, BackendError, PlaybackHandle, StopSignal};
use crate::catalog::{AssetCatalog, GeneratedAsset};
use crate::config::AudioConfig;
use crate::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Used when the ambient asset has no nominal length
const DEFAULT_AMBIENT_FALLBACK: Duration = Duration::from_secs(12);

/// Ambient channel state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientState {
    /// Between cycles, or never started
    Idle,
    /// A cycle is in progress (playing, or sleeping in degraded mode)
    Playing,
    /// The stop signal was observed; the loop has exited
    Stopped,
}

/// Outcome of a fire-and-forget sound request
///
/// Dropping it ignores the result; [`OneShot::join`] waits for playback to
/// end and reports what happened.
#[must_use = "drop the OneShot explicitly to ignore the playback outcome"]
pub struct OneShot {
    name: String,
    thread: JoinHandle<std::result::Result<(), BackendError>>,
}

impl OneShot {
    /// Requested sound name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the task has completed
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the task and return its outcome
    pub fn join(self) -> std::result::Result<(), BackendError> {
        let name = self.name;
        self.thread
            .join()
            .unwrap_or_else(|_| Err(BackendError::Panicked(name)))
    }
}

impl std::fmt::Debug for OneShot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneShot")
            .field("name", &self.name)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// State shared between the session and its ambient thread
struct AmbientShared {
    state: Mutex<AmbientState>,
    cycles: AtomicU64,
    current: Mutex<Option<PlaybackHandle>>,
    halted: AtomicBool,
}

impl AmbientShared {
    fn set_state(&self, state: AmbientState) {
        *self.state.lock() = state;
    }
}

struct AmbientLoop {
    stop: StopSignal,
    thread: JoinHandle<()>,
}

/// Schedules playback of catalog sounds over one backend
pub struct PlaybackSession {
    catalog: Arc<AssetCatalog>,
    backend: Arc<dyn AudioBackend>,
    spawn_lock: Arc<Mutex<()>>,
    ambient_fallback: Option<Duration>,
    ambient: Mutex<Option<AmbientLoop>>,
    shared: Arc<AmbientShared>,
}

impl PlaybackSession {
    /// Session over an already generated catalog
    pub fn new(catalog: Arc<AssetCatalog>, backend: Arc<dyn AudioBackend>) -> Self {
        PlaybackSession {
            catalog,
            backend,
            spawn_lock: Arc::new(Mutex::new(())),
            ambient_fallback: None,
            ambient: Mutex::new(None),
            shared: Arc::new(AmbientShared {
                state: Mutex::new(AmbientState::Idle),
                cycles: AtomicU64::new(0),
                current: Mutex::new(None),
                halted: AtomicBool::new(false),
            }),
        }
    }

    /// Build catalog and backend from `config` and generate every asset
    ///
    /// Fails only if the assets cannot be written; a missing audio backend
    /// is not an error.
    pub fn from_config(config: &AudioConfig) -> Result<Self> {
        config.validate()?;
        let mut catalog = match &config.scratch_dir {
            Some(dir) => AssetCatalog::in_dir(config.sound_set, dir)?,
            None => AssetCatalog::new(config.sound_set)?,
        };
        if let Some(seed) = config.seed {
            catalog = catalog.with_seed(seed);
        }
        catalog.generate_all()?;

        let mut session = Self::new(Arc::new(catalog), select_backend(config));
        session.ambient_fallback = config.ambient_fallback();
        Ok(session)
    }

    /// Override the degraded-mode sleep and minimum length of an ambient cycle
    pub fn with_ambient_fallback(mut self, fallback: Duration) -> Self {
        self.ambient_fallback = Some(fallback);
        self
    }

    /// The catalog sounds are played from
    pub fn catalog(&self) -> &Arc<AssetCatalog> {
        &self.catalog
    }

    /// Label of the active backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Re-render every asset in the catalog
    pub fn generate_all_assets(&self) -> Result<Vec<GeneratedAsset>> {
        self.catalog.generate_all()
    }

    /// Play `name` once without blocking the caller
    pub fn play(&self, name: &str) -> OneShot {
        self.spawn_one_shot(name, false)
    }

    /// Re-synthesize a regenerating asset, then play it
    ///
    /// Fixed assets are played as generated.
    pub fn play_regenerated(&self, name: &str) -> OneShot {
        self.spawn_one_shot(name, true)
    }

    fn spawn_one_shot(&self, name: &str, regenerate: bool) -> OneShot {
        let catalog = Arc::clone(&self.catalog);
        let backend = Arc::clone(&self.backend);
        let spawn_lock = Arc::clone(&self.spawn_lock);
        let task_name = name.to_string();

        let thread = thread::spawn(move || {
            let outcome = run_one_shot(
                &catalog,
                backend.as_ref(),
                &spawn_lock,
                &task_name,
                regenerate,
            );
            if let Err(e) = &outcome {
                debug!(sound = %task_name, error = %e, "one-shot skipped");
            }
            outcome
        });

        OneShot {
            name: name.to_string(),
            thread,
        }
    }

    /// Start looping the set's ambient track until `stop` is requested
    ///
    /// Returns immediately. Returns `false` if a loop is already running.
    pub fn start_ambient_loop(&self, stop: StopSignal) -> bool {
        let mut slot = self.ambient.lock();
        if let Some(active) = slot.as_ref() {
            if !active.thread.is_finished() {
                debug!("ambient loop already running");
                return false;
            }
        }
        if let Some(finished) = slot.take() {
            let _ = finished.thread.join();
        }

        let name = self.catalog.sound_set().ambient();
        let fallback = self
            .ambient_fallback
            .or_else(|| self.catalog.descriptor(name).map(|d| d.nominal_duration()))
            .unwrap_or(DEFAULT_AMBIENT_FALLBACK);

        self.shared.halted.store(false, Ordering::SeqCst);
        self.shared.set_state(AmbientState::Idle);

        let ctx = AmbientContext {
            name,
            fallback,
            catalog: Arc::clone(&self.catalog),
            backend: Arc::clone(&self.backend),
            shared: Arc::clone(&self.shared),
            stop: stop.clone(),
        };
        let thread = thread::spawn(move || ctx.run());

        info!(
            sound = name,
            fallback_ms = fallback.as_millis() as u64,
            "ambient loop started"
        );
        *slot = Some(AmbientLoop { stop, thread });
        true
    }

    /// Ask the ambient loop to stop after the current cycle
    pub fn stop_ambient_loop(&self) {
        if let Some(active) = self.ambient.lock().as_ref() {
            active.stop.request_stop();
        }
    }

    /// Stop the ambient loop now, cutting the current cycle short, and wait
    /// for its thread to exit
    pub fn halt_ambient_loop(&self) {
        let Some(active) = self.ambient.lock().take() else {
            return;
        };
        self.shared.halted.store(true, Ordering::SeqCst);
        active.stop.request_stop();
        if let Some(handle) = self.shared.current.lock().take() {
            handle.terminate();
        }
        if active.thread.join().is_err() {
            warn!("ambient loop thread panicked");
        }
        self.shared.set_state(AmbientState::Stopped);
    }

    /// Current ambient channel state
    pub fn ambient_state(&self) -> AmbientState {
        *self.shared.state.lock()
    }

    /// Number of ambient cycles begun since the session was created
    pub fn ambient_cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::SeqCst)
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        // Leave the thread detached; just make sure it winds down
        if let Some(active) = self.ambient.lock().as_ref() {
            self.shared.halted.store(true, Ordering::SeqCst);
            active.stop.request_stop();
            if let Some(handle) = self.shared.current.lock().take() {
                handle.terminate();
            }
        }
    }
}

fn run_one_shot(
    catalog: &AssetCatalog,
    backend: &dyn AudioBackend,
    spawn_lock: &Mutex<()>,
    name: &str,
    regenerate: bool,
) -> std::result::Result<(), BackendError> {
    let descriptor = catalog
        .descriptor(name)
        .ok_or_else(|| BackendError::UnknownAsset(name.to_string()))?;

    if regenerate && descriptor.is_regenerating() {
        catalog
            .regenerate(name)
            .map_err(|e| BackendError::Regenerate {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
    }

    let path = catalog
        .path(name)
        .ok_or_else(|| BackendError::MissingFile(name.to_string()))?;

    let handle = {
        let _guard = spawn_lock.lock();
        backend.play(&path)?
    };
    handle.wait()
}

struct AmbientContext {
    name: &'static str,
    fallback: Duration,
    catalog: Arc<AssetCatalog>,
    backend: Arc<dyn AudioBackend>,
    shared: Arc<AmbientShared>,
    stop: StopSignal,
}

impl AmbientContext {
    fn run(self) {
        let mut degraded = false;

        while !self.stop.is_stopped() {
            self.shared.cycles.fetch_add(1, Ordering::SeqCst);
            self.shared.set_state(AmbientState::Playing);
            let started = Instant::now();

            match self.play_cycle() {
                Ok(()) => {
                    degraded = false;
                    // A player that returns early must not restart the track at once
                    let played = started.elapsed();
                    if played < self.fallback {
                        debug!(
                            sound = self.name,
                            played_ms = played.as_millis() as u64,
                            "ambient playback ended early; holding the cycle"
                        );
                        self.stop.sleep(self.fallback - played);
                    }
                }
                Err(e) => {
                    if !degraded {
                        warn!(
                            sound = self.name,
                            error = %e,
                            "ambient playback failed; pacing loop with silence"
                        );
                        degraded = true;
                    } else {
                        debug!(sound = self.name, error = %e, "ambient playback failed");
                    }
                    self.stop.sleep(self.fallback);
                }
            }

            self.shared.set_state(AmbientState::Idle);
        }

        self.shared.set_state(AmbientState::Stopped);
        debug!(sound = self.name, "ambient loop stopped");
    }

    fn play_cycle(&self) -> std::result::Result<(), BackendError> {
        let path = self
            .catalog
            .path(self.name)
            .ok_or_else(|| BackendError::MissingFile(self.name.to_string()))?;
        let handle = self.backend.play(&path)?;

        *self.shared.current.lock() = Some(handle.clone());
        // A halt may have raced the store above
        if self.shared.halted.load(Ordering::SeqCst) {
            handle.terminate();
        }
        let outcome = handle.wait();
        self.shared.current.lock().take();

        if self.shared.halted.load(Ordering::SeqCst) {
            return Ok(());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SoundSet;
    use crate::playback::{CommandBackend, NullBackend};

    fn null_session() -> PlaybackSession {
        let catalog = AssetCatalog::new(SoundSet::Menu).unwrap();
        catalog.generate_all().unwrap();
        PlaybackSession::new(Arc::new(catalog), Arc::new(NullBackend))
            .with_ambient_fallback(Duration::from_millis(40))
    }

    #[test]
    fn test_unknown_sound_is_reported_not_raised() {
        let session = null_session();
        let err = session.play("trumpet").join().unwrap_err();
        assert!(matches!(err, BackendError::UnknownAsset(name) if name == "trumpet"));
    }

    #[test]
    fn test_play_without_backend_returns_immediately() {
        let session = null_session();
        let started = Instant::now();
        let shot = session.play("click");
        assert!(started.elapsed() < Duration::from_millis(250));
        assert_eq!(shot.name(), "click");
        assert!(matches!(shot.join(), Err(BackendError::Unavailable(_))));
    }

    #[test]
    fn test_second_ambient_loop_is_refused() {
        let session = null_session();
        let stop = StopSignal::new();
        assert!(session.start_ambient_loop(stop.clone()));
        assert!(!session.start_ambient_loop(StopSignal::new()));
        session.halt_ambient_loop();
        assert_eq!(session.ambient_state(), AmbientState::Stopped);
    }

    #[test]
    fn test_ambient_restarts_after_halt() {
        let session = null_session();
        assert!(session.start_ambient_loop(StopSignal::new()));
        session.halt_ambient_loop();
        assert!(session.start_ambient_loop(StopSignal::new()));
        session.halt_ambient_loop();
    }

    #[test]
    fn test_halt_without_loop_is_noop() {
        let session = null_session();
        session.halt_ambient_loop();
        session.stop_ambient_loop();
        assert_eq!(session.ambient_state(), AmbientState::Idle);
        assert_eq!(session.ambient_cycles(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_player_that_exits_at_once_keeps_the_cycle_length() {
        let catalog = AssetCatalog::new(SoundSet::Menu).unwrap();
        catalog.generate_all().unwrap();
        let session = PlaybackSession::new(
            Arc::new(catalog),
            Arc::new(CommandBackend::new("true", Vec::new())),
        )
        .with_ambient_fallback(Duration::from_millis(100));

        assert!(session.start_ambient_loop(StopSignal::new()));
        std::thread::sleep(Duration::from_millis(500));
        session.halt_ambient_loop();
        let cycles = session.ambient_cycles();
        assert!(cycles >= 2 && cycles <= 7, "cycles = {}", cycles);
    }
}
