//! In-process playback through the default output device (rodio)

use super::{ActivePlayback, AudioBackend, BackendError, PlaybackHandle};
use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

/// Plays files on the default output device
///
/// The device stream is not `Send`, so it lives on a dedicated thread for
/// as long as the backend exists; playback goes through its shareable handle.
pub struct DeviceBackend {
    handle: OutputStreamHandle,
    // Dropping the sender lets the stream thread exit and close the device
    _keepalive: Mutex<mpsc::Sender<()>>,
}

impl DeviceBackend {
    /// Open the default output device
    pub fn open_default() -> Result<Self, BackendError> {
        let (handle_tx, handle_rx) = mpsc::channel();
        let (keepalive_tx, keepalive_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("veilsound-device".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = handle_tx.send(Ok(handle));
                    let _ = keepalive_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = handle_tx.send(Err(e.to_string()));
                }
            })?;

        let handle = handle_rx
            .recv()
            .map_err(|_| BackendError::Device("device thread exited".to_string()))?
            .map_err(|e| BackendError::Device(format!("Failed to create audio stream: {}", e)))?;

        Ok(DeviceBackend {
            handle,
            _keepalive: Mutex::new(keepalive_tx),
        })
    }
}

impl AudioBackend for DeviceBackend {
    fn name(&self) -> &str {
        "device"
    }

    fn play(&self, path: &Path) -> Result<PlaybackHandle, BackendError> {
        let file = File::open(path).map_err(|_| {
            BackendError::MissingFile(path.display().to_string())
        })?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| BackendError::Device(format!("Failed to decode {}: {}", path.display(), e)))?;
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| BackendError::Device(format!("Failed to create audio sink: {}", e)))?;
        sink.append(source);
        Ok(PlaybackHandle::new(SinkPlayback { sink }))
    }
}

struct SinkPlayback {
    sink: Sink,
}

impl ActivePlayback for SinkPlayback {
    fn wait(&self) -> Result<(), BackendError> {
        self.sink.sleep_until_end();
        Ok(())
    }

    fn terminate(&self) {
        self.sink.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn try_device() -> Option<DeviceBackend> {
        match DeviceBackend::open_default() {
            Ok(device) => Some(device),
            Err(err) => {
                eprintln!(
                    "Skipping playback::device test (audio backend unavailable): {}",
                    err
                );
                None
            }
        }
    }

    #[test]
    fn test_missing_file() {
        let Some(device) = try_device() else {
            return;
        };
        let err = device.play(Path::new("/nonexistent/ambient.wav")).unwrap_err();
        assert!(matches!(err, BackendError::MissingFile(_)));
    }

    #[test]
    fn test_plays_generated_wav() {
        let Some(device) = try_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blip.wav");
        crate::export::write_wav(&path, &crate::synth::sine(880.0, 0.05, 0.1)).unwrap();

        let handle = device.play(&path).unwrap();
        handle.wait().unwrap();
    }
}
