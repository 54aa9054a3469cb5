//! Process-spawning and silent backends

use super::{ActivePlayback, AudioBackend, BackendError, PlaybackHandle};
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Poll interval while waiting on a player process
const CHILD_POLL_MS: u64 = 20;

/// Environment variable carrying the file path to the Windows player script
pub const FILE_ENV_VAR: &str = "VEILSOUND_FILE";

/// Plays each file by spawning an external player command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    file_env: Option<String>,
}

impl CommandBackend {
    /// Player `program` invoked as `program args... <file>`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandBackend {
            program: program.into(),
            args,
            file_env: None,
        }
    }

    /// Hand the file path to the player in environment variable `var`
    /// instead of appending it to the arguments
    pub fn with_file_env(mut self, var: impl Into<String>) -> Self {
        self.file_env = Some(var.into());
        self
    }

    /// Build from an argv prefix; `None` if it names no program
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// The stock player for the current platform
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("afplay", Vec::new())
        } else if cfg!(windows) {
            // -Command splices trailing arguments into the script, which
            // breaks paths with spaces; read the path from the environment
            Self::new(
                "powershell",
                vec![
                    "-NoProfile".to_string(),
                    "-NonInteractive".to_string(),
                    "-Command".to_string(),
                    format!(
                        "(New-Object Media.SoundPlayer $env:{}).PlaySync()",
                        FILE_ENV_VAR
                    ),
                ],
            )
            .with_file_env(FILE_ENV_VAR)
        } else {
            Self::new("aplay", vec!["-q".to_string()])
        }
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Process invocation that plays `path`
    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        match &self.file_env {
            Some(var) => command.env(var, path),
            None => command.arg(path),
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    /// Whether the program can be found (explicit path or on `PATH`)
    pub fn is_available(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| {
                std::env::split_paths(&paths).any(|dir| executable_in(&dir, &self.program))
            })
            .unwrap_or(false)
    }
}

fn executable_in(dir: &Path, program: &str) -> bool {
    let candidate: PathBuf = dir.join(program);
    if candidate.is_file() {
        return true;
    }
    cfg!(windows) && dir.join(format!("{}.exe", program)).is_file()
}

impl AudioBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn play(&self, path: &Path) -> Result<PlaybackHandle, BackendError> {
        let child = self.command(path).spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                BackendError::Unavailable(format!("'{}' not found", self.program))
            }
            _ => BackendError::Spawn(e),
        })?;
        Ok(PlaybackHandle::new(ChildPlayback {
            child: Mutex::new(child),
        }))
    }
}

/// A running player process
struct ChildPlayback {
    child: Mutex<Child>,
}

impl ActivePlayback for ChildPlayback {
    fn wait(&self) -> Result<(), BackendError> {
        loop {
            // Poll rather than block so terminate() can take the lock
            if let Some(status) = self.child.lock().try_wait()? {
                return if status.success() {
                    Ok(())
                } else {
                    Err(BackendError::Exited(status))
                };
            }
            std::thread::sleep(Duration::from_millis(CHILD_POLL_MS));
        }
    }

    fn terminate(&self) {
        let mut child = self.child.lock();
        if let Ok(None) = child.try_wait() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Backend for hosts without audio; every request is refused
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn name(&self) -> &str {
        "none"
    }

    fn play(&self, _path: &Path) -> Result<PlaybackHandle, BackendError> {
        Err(BackendError::Unavailable("audio is disabled".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_unavailable() {
        let backend = CommandBackend::new("veilsound-no-such-player", Vec::new());
        assert!(!backend.is_available());
        let err = backend.play(Path::new("ambient.wav")).unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }

    #[test]
    fn test_from_argv() {
        let argv = vec!["paplay".to_string(), "--volume".to_string(), "30000".to_string()];
        let backend = CommandBackend::from_argv(&argv).unwrap();
        assert_eq!(backend.program(), "paplay");
        assert_eq!(backend.args, vec!["--volume", "30000"]);
        assert!(CommandBackend::from_argv(&[]).is_none());
        assert!(CommandBackend::from_argv(&[" ".to_string()]).is_none());
    }

    #[test]
    fn test_platform_default_names_a_player() {
        let backend = CommandBackend::platform_default();
        assert!(!backend.program().is_empty());
    }

    #[test]
    fn test_path_is_appended_by_default() {
        let backend = CommandBackend::new("aplay", vec!["-q".to_string()]);
        let command = backend.command(Path::new("/tmp/scratch dir/click.wav"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["-q", "/tmp/scratch dir/click.wav"]);
        assert_eq!(command.get_envs().count(), 0);
    }

    #[test]
    fn test_path_in_environment_stays_whole() {
        let backend = CommandBackend::new("powershell", vec!["-Command".to_string()])
            .with_file_env(FILE_ENV_VAR);
        let path = Path::new(r"C:\Users\Jane Doe\AppData\Local\Temp\click.wav");
        let command = backend.command(path);

        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["-Command"]);
        let envs: Vec<_> = command.get_envs().collect();
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].0, FILE_ENV_VAR);
        assert_eq!(envs[0].1, Some(path.as_os_str()));
    }

    #[cfg(unix)]
    #[test]
    fn test_player_reads_path_from_environment() {
        let dir = tempfile::Builder::new().prefix("scratch dir").tempdir().unwrap();
        let path = dir.path().join("with space.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let script = format!("test -f \"${}\"", FILE_ENV_VAR);
        let backend = CommandBackend::new("sh", vec!["-c".to_string(), script])
            .with_file_env(FILE_ENV_VAR);
        backend.play(&path).unwrap().wait().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_child_playback_wait_and_exit_status() {
        let ok = CommandBackend::new("true", Vec::new());
        ok.play(Path::new("ignored.wav")).unwrap().wait().unwrap();

        let failing = CommandBackend::new("false", Vec::new());
        let err = failing
            .play(Path::new("ignored.wav"))
            .unwrap()
            .wait()
            .unwrap_err();
        assert!(matches!(err, BackendError::Exited(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_child_playback_terminate() {
        // `sleep 30 <file>` is a long-running stand-in for a player
        let backend = CommandBackend::new("sleep", vec!["30".to_string()]);
        let handle = backend.play(Path::new("1")).unwrap();
        let started = std::time::Instant::now();
        handle.terminate();
        assert!(handle.wait().is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
