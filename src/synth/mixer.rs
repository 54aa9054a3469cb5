//! Buffer Mixer
//!
//! Layers buffers of different lengths by summation. Shorter inputs are
//! zero-padded on the right; every input starts at index 0.

use super::SampleBuffer;

/// Sum buffers sample by sample into a buffer as long as the longest input
pub fn mix<B: AsRef<[f32]>>(buffers: &[B]) -> SampleBuffer {
    let len = buffers
        .iter()
        .map(|b| b.as_ref().len())
        .max()
        .unwrap_or(0);
    let mut out = vec![0.0f32; len];
    for buffer in buffers {
        for (acc, &sample) in out.iter_mut().zip(buffer.as_ref()) {
            *acc += sample;
        }
    }
    out
}

/// Multiply every sample by `gain`
pub fn scale(mut buffer: SampleBuffer, gain: f32) -> SampleBuffer {
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
    buffer
}
