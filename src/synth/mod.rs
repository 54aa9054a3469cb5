//! Signal Primitives
//!
//! Pure functions producing finite mono sample buffers at a fixed 44.1 kHz
//! rate. Nothing here performs I/O or keeps state between calls.
//!
//! Amplitudes are not limited: layered voices may exceed unity and are
//! hard-clipped later by the encoder.

pub mod envelope;
pub mod mixer;
pub mod oscillator;

pub use envelope::{apply_envelope, envelope, fade_edges};
pub use mixer::{mix, scale};
pub use oscillator::{sine, sine_samples, sweep};

/// Output sample rate of every generated buffer, in Hz
pub const SAMPLE_RATE: u32 = 44_100;

/// Mono audio samples, nominally in [-1.0, 1.0]
pub type SampleBuffer = Vec<f32>;

/// Number of samples covering `duration` seconds (rounded to nearest)
///
/// Negative or non-finite durations are programming errors; they trip a debug
/// assertion and produce an empty buffer in release builds.
pub fn sample_count(duration: f32) -> usize {
    debug_assert!(
        duration.is_finite() && duration >= 0.0,
        "invalid duration: {duration}"
    );
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    (SAMPLE_RATE as f64 * duration as f64).round() as usize
}

/// Duration in seconds of a buffer holding `samples` samples
pub fn duration_of(samples: usize) -> f32 {
    samples as f32 / SAMPLE_RATE as f32
}

/// Join buffers end to end (sequential, not layered)
pub fn concat<B: AsRef<[f32]>>(buffers: &[B]) -> SampleBuffer {
    let total = buffers.iter().map(|b| b.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    for buffer in buffers {
        out.extend_from_slice(buffer.as_ref());
    }
    out
}

/// `n` evenly spaced values from `from` to `to`, both endpoints included
///
/// A single-point ramp yields `from`.
pub(crate) fn ramp(n: usize, from: f32, to: f32) -> impl Iterator<Item = f32> {
    let step = if n > 1 {
        (to as f64 - from as f64) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |k| (from as f64 + step * k as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_count_rounds() {
        assert_eq!(sample_count(1.0), 44_100);
        assert_eq!(sample_count(0.12), 5_292);
        assert_eq!(sample_count(0.0), 0);
    }

    #[test]
    fn test_concat_preserves_order_and_length() {
        let a = vec![1.0, 2.0];
        let b = vec![3.0];
        let joined = concat(&[a, b]);
        assert_eq!(joined, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ramp_endpoints() {
        let values: Vec<f32> = ramp(5, 0.0, 1.0).collect();
        assert_eq!(values.len(), 5);
        assert_relative_eq!(values[0], 0.0);
        assert_relative_eq!(values[2], 0.5);
        assert_relative_eq!(values[4], 1.0);

        let single: Vec<f32> = ramp(1, 1.0, 0.0).collect();
        assert_eq!(single, vec![1.0]);
    }
}
