//! WAV serialization

use super::{BITS_PER_SAMPLE, CHANNELS};
use crate::synth::SAMPLE_RATE;
use crate::{Result, VeilsoundError};
use std::io::{Cursor, Write};
use std::path::Path;

/// Container parameters shared by every generated asset
pub fn wav_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Clip to [-1.0, 1.0] and scale to 16 bits, truncating toward zero
///
/// Non-finite input maps to silence.
pub fn quantize(sample: f32) -> i16 {
    if !sample.is_finite() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode samples into an in-memory WAV file
///
/// Output is bit-identical for identical input.
pub fn encode(samples: &[f32]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, wav_spec())
            .map_err(|e| VeilsoundError::Encode(format!("Failed to start WAV stream: {}", e)))?;

        for &sample in samples {
            writer
                .write_sample(quantize(sample))
                .map_err(|e| VeilsoundError::Encode(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| VeilsoundError::Encode(format!("Failed to finalize WAV: {}", e)))?;
    }
    Ok(cursor.into_inner())
}

/// Encode samples and write them to `path`, replacing any existing file
///
/// The data goes to a sibling temporary file which is then renamed over
/// `path`, so a concurrent reader sees either the old or the new file.
pub fn write_wav(path: &Path, samples: &[f32]) -> Result<()> {
    let bytes = encode(samples)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = tempfile::Builder::new()
        .prefix(".staged-")
        .suffix(".wav")
        .tempfile_in(dir)?;
    staged.write_all(&bytes)?;
    staged.as_file().sync_all()?;
    staged
        .persist(path)
        .map_err(|e| {
            VeilsoundError::Encode(format!("Failed to replace {}: {}", path.display(), e.error))
        })?;
    Ok(())
}
