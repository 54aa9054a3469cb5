//! Sine and swept-sine oscillators

use super::{sample_count, SampleBuffer, SAMPLE_RATE};
use std::f64::consts::TAU;

/// Sine tone of `duration` seconds: `amplitude * sin(2π·f·i/sr)`
pub fn sine(frequency: f32, duration: f32, amplitude: f32) -> SampleBuffer {
    sine_samples(frequency, sample_count(duration), amplitude)
}

/// Sine tone with an explicit sample count
///
/// Used where a layer must match an existing buffer length exactly.
pub fn sine_samples(frequency: f32, samples: usize, amplitude: f32) -> SampleBuffer {
    let omega = TAU * frequency as f64 / SAMPLE_RATE as f64;
    let amplitude = amplitude as f64;
    (0..samples)
        .map(|i| (amplitude * (omega * i as f64).sin()) as f32)
        .collect()
}

/// Linear frequency sweep from `start_freq` to `end_freq`
///
/// The instantaneous frequency is interpolated per sample and integrated into
/// a running phase (`phase[i] = phase[i-1] + 2π·f(i)/sr`), which keeps the
/// waveform continuous across the whole sweep.
pub fn sweep(start_freq: f32, end_freq: f32, duration: f32, amplitude: f32) -> SampleBuffer {
    let n = sample_count(duration);
    let amplitude = amplitude as f64;
    let sr = SAMPLE_RATE as f64;
    let mut phase = 0.0f64;

    super::ramp(n, start_freq, end_freq)
        .map(|freq| {
            phase += TAU * freq as f64 / sr;
            (amplitude * phase.sin()) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Mean frequency over a window estimated from zero crossings
    fn crossing_frequency(window: &[f32]) -> f32 {
        let crossings = window
            .windows(2)
            .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
            .count();
        crossings as f32 * SAMPLE_RATE as f32 / (2.0 * window.len() as f32)
    }

    #[test]
    fn test_sine_length_and_shape() {
        let tone = sine(441.0, 0.5, 0.5);
        assert_eq!(tone.len(), 22_050);
        assert_abs_diff_eq!(tone[0], 0.0, epsilon = 1e-6);
        // 441 Hz has a period of exactly 100 samples; quarter period is the peak
        assert_abs_diff_eq!(tone[25], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(tone[75], -0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_sine_zero_duration_is_empty() {
        assert!(sine(440.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_sweep_frequency_rises_monotonically() {
        let sig = sweep(200.0, 900.0, 0.6, 0.5);
        assert_eq!(sig.len(), 26_460);

        // Six 100 ms windows; expected mean frequency 258, 375, ... 842 Hz
        let estimates: Vec<f32> = sig.chunks(4_410).map(crossing_frequency).collect();
        assert_eq!(estimates.len(), 6);

        for pair in estimates.windows(2) {
            assert!(
                pair[1] > pair[0],
                "frequency must increase across the sweep: {:?}",
                estimates
            );
        }
        assert!(estimates[0] > 230.0 && estimates[0] < 290.0, "{:?}", estimates);
        assert!(estimates[5] > 810.0 && estimates[5] < 870.0, "{:?}", estimates);
    }

    #[test]
    fn test_sweep_is_continuous() {
        // Largest possible step at 900 Hz is 2π·900/44100 radians of phase
        let amp = 0.5f32;
        let max_step = amp * (std::f32::consts::TAU * 900.0 / SAMPLE_RATE as f32) * 1.01;
        let sig = sweep(200.0, 900.0, 0.6, amp);
        for pair in sig.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= max_step);
        }
    }
}
