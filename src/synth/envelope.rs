//! Linear amplitude envelopes

use super::{ramp, sample_count, SampleBuffer};

/// Apply a linear attack/release envelope and return the shaped buffer
pub fn envelope(mut buffer: SampleBuffer, attack: f32, release: f32) -> SampleBuffer {
    apply_envelope(&mut buffer, attack, release);
    buffer
}

/// Shape `buffer` in place: fade in over `attack` seconds, out over `release`
///
/// The attack is clamped to the buffer length. A release longer than the
/// buffer is skipped entirely, leaving the tail untouched. Where the two
/// overlap the release ramp wins.
pub fn apply_envelope(buffer: &mut [f32], attack: f32, release: f32) {
    let n = buffer.len();
    let a = sample_count(attack).min(n);
    let r = sample_count(release);
    let release_start = if r > 0 && r <= n { n - r } else { n };

    let rise = step(a);
    let fall = step(r);
    for (i, sample) in buffer.iter_mut().enumerate() {
        let gain = if i >= release_start {
            1.0 - (i - release_start) as f64 * fall
        } else if i < a {
            i as f64 * rise
        } else {
            continue;
        };
        *sample = (*sample as f64 * gain) as f32;
    }
}

/// Per-sample increment of a 0→1 ramp spanning `len` samples
fn step(len: usize) -> f64 {
    if len > 1 {
        1.0 / (len - 1) as f64
    } else {
        0.0
    }
}

/// Linear fade over a fixed number of samples at both ends
///
/// Used for loopable pads so both ends meet at silence.
pub fn fade_edges(buffer: &mut [f32], fade: usize) {
    let n = buffer.len();
    let fade = fade.min(n);
    for (sample, gain) in buffer[..fade].iter_mut().zip(ramp(fade, 0.0, 1.0)) {
        *sample *= gain;
    }
    for (sample, gain) in buffer[n - fade..].iter_mut().zip(ramp(fade, 1.0, 0.0)) {
        *sample *= gain;
    }
}
