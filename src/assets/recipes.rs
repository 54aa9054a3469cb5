//! Sound recipes
//!
//! Layering uses [`mix`]; melodic lines use [`concat`]. The constants below
//! are the voicing of each sound and are reproduced as-is, including mixes
//! whose summed amplitude reaches the clip ceiling.

use crate::synth::{
    concat, envelope, fade_edges, mix, sample_count, scale, sine, sine_samples,
    sweep, SampleBuffer, SAMPLE_RATE,
};
use rand::seq::IndexedRandom;
use rand::RngCore;
use std::f64::consts::TAU;

/// Length of the gameplay ambient loop in seconds
pub const AMBIENT_SECS: f32 = 12.0;
/// Length of the title-screen ambient loop in seconds
pub const MENU_AMBIENT_SECS: f32 = 14.0;
/// Length of one sparkle chime in seconds
pub const SPARKLE_SECS: f32 = 0.45;
/// Four 0.12 s arpeggio notes
pub const ZONE_CHARGE_SECS: f32 = 0.48;
/// Length of the flower bloom in seconds
pub const FLOWER_SECS: f32 = 0.5;
/// Length of the cleanse sweep in seconds
pub const CLEANSE_SECS: f32 = 0.6;
/// Length of the stage-complete chord in seconds
pub const STAGE_DONE_SECS: f32 = 1.2;
/// Nine 0.18 s fanfare notes
pub const VICTORY_SECS: f32 = 1.62;
/// Four 0.3 s descending notes
pub const TIMEOUT_SECS: f32 = 1.2;
/// Length of the hover tick in seconds
pub const HOVER_SECS: f32 = 0.06;
/// Length of the click chime in seconds
pub const CLICK_SECS: f32 = 0.18;
/// Candidate sparkle pitches in Hz
pub const SPARKLE_PITCHES: [f32; 4] = [880.0, 1046.0, 1318.0, 1568.0];

/// One layer of a sustained pad: a fundamental plus a quieter partial
struct PadVoice {
    freq: f64,
    amp: f64,
}

/// Render a pad of `voices`, each layered with a partial at `freq * ratio`
/// and `weight` relative amplitude, then modulated by `lfo(t)`.
fn pad(
    voices: &[PadVoice],
    ratio: f64,
    weight: f64,
    duration: f32,
    lfo: impl Fn(f64) -> f64,
) -> SampleBuffer {
    let sr = SAMPLE_RATE as f64;
    (0..sample_count(duration))
        .map(|i| {
            let t = i as f64 / sr;
            let sum: f64 = voices
                .iter()
                .map(|v| {
                    v.amp * (TAU * v.freq * t).sin()
                        + v.amp * weight * (TAU * v.freq * ratio * t).sin()
                })
                .sum();
            (sum * lfo(t)) as f32
        })
        .collect()
}

/// Soft night-veil drone; both ends fade to silence so it loops cleanly
pub fn ambient() -> SampleBuffer {
    // A2, E3, A3, C#4
    let voices = [
        PadVoice { freq: 110.0, amp: 0.18 },
        PadVoice { freq: 164.81, amp: 0.12 },
        PadVoice { freq: 220.0, amp: 0.10 },
        PadVoice { freq: 277.18, amp: 0.07 },
    ];
    let mut sig = pad(&voices, 1.003, 0.4, AMBIENT_SECS, |t| {
        0.7 + 0.3 * (TAU * 0.15 * t).sin()
    });
    fade_edges(&mut sig, 1024);
    scale(sig, 0.55)
}

/// Darker, slower title-screen pad with two interacting LFOs
pub fn menu_ambient() -> SampleBuffer {
    // E2, A2, C3, E3
    let voices = [
        PadVoice { freq: 82.4, amp: 0.20 },
        PadVoice { freq: 110.0, amp: 0.14 },
        PadVoice { freq: 130.8, amp: 0.10 },
        PadVoice { freq: 164.8, amp: 0.07 },
    ];
    let mut sig = pad(&voices, 2.003, 0.3, MENU_AMBIENT_SECS, |t| {
        let slow = 0.65 + 0.35 * (TAU * 0.08 * t).sin();
        let drift = 1.0 + 0.15 * (TAU * 0.19 * t + 1.2).sin();
        slow * drift
    });
    fade_edges(&mut sig, 2048);
    scale(sig, 0.50)
}

/// Short bright chime at a randomly chosen pitch
pub fn sparkle(rng: &mut dyn RngCore) -> SampleBuffer {
    let freq = SPARKLE_PITCHES.choose(rng).copied().unwrap_or(SPARKLE_PITCHES[0]);
    sparkle_at(freq)
}

/// Sparkle chime at a fixed pitch
pub fn sparkle_at(freq: f32) -> SampleBuffer {
    let sig = mix(&[
        sine(freq, SPARKLE_SECS, 0.6),
        sine(freq * 2.0, SPARKLE_SECS, 0.2),
    ]);
    envelope(sig, 0.005, 0.35)
}

/// Ascending four-note arpeggio
pub fn zone_charge() -> SampleBuffer {
    let notes = [523.0, 659.0, 784.0, 1046.0];
    let chunks: Vec<SampleBuffer> = notes
        .iter()
        .map(|&note| envelope(sine(note, 0.12, 0.5), 0.01, 0.07))
        .collect();
    concat(&chunks)
}

/// Soft bloom: a bell whose upper partial dies away over its second half
pub fn flower() -> SampleBuffer {
    let dur = FLOWER_SECS;
    let body = sine(1046.0, dur, 0.4);
    let mut partial = sine(1318.0, dur, 0.3);

    let half = partial.len() / 2;
    let tail = partial.len() - half;
    let step = if tail > 1 { 1.0 / (tail - 1) as f32 } else { 0.0 };
    for (k, sample) in partial[half..].iter_mut().enumerate() {
        *sample *= 1.0 - k as f32 * step;
    }

    envelope(mix(&[body, partial]), 0.005, 0.4)
}

/// Dark-to-light rising sweep
pub fn cleanse() -> SampleBuffer {
    envelope(sweep(200.0, 900.0, CLEANSE_SECS, 0.5), 0.01, 0.3)
}

/// Four-voice chord hit
pub fn stage_done() -> SampleBuffer {
    let chord = [523.0, 659.0, 784.0, 1046.0];
    let voices: Vec<SampleBuffer> = chord
        .iter()
        .map(|&f| envelope(sine(f, STAGE_DONE_SECS, 0.3), 0.01, 0.6))
        .collect();
    scale(mix(&voices), 0.7)
}

/// Fanfare: melody with fifth overtones over a sustained low pad
pub fn victory() -> SampleBuffer {
    let melody = [523.0, 659.0, 784.0, 880.0, 1046.0, 880.0, 784.0, 659.0, 1046.0];
    let notes: Vec<SampleBuffer> = melody
        .iter()
        .map(|&note| {
            let chunk = mix(&[sine(note, 0.18, 0.45), sine(note * 1.5, 0.18, 0.2)]);
            envelope(chunk, 0.01, 0.08)
        })
        .collect();
    let line = concat(&notes);
    let pad = sine_samples(262.0, line.len(), 0.2);
    mix(&[line, pad])
}

/// Sad descending line
pub fn timeout() -> SampleBuffer {
    let notes = [523.0, 440.0, 370.0, 294.0];
    let chunks: Vec<SampleBuffer> = notes
        .iter()
        .map(|&note| envelope(sine(note, 0.3, 0.4), 0.01, 0.2))
        .collect();
    concat(&chunks)
}

/// Menu hover tick with a squared decay
pub fn hover() -> SampleBuffer {
    let mut sig = sine(1200.0, HOVER_SECS, 0.25);
    let n = sig.len();
    let step = if n > 1 { 1.0 / (n - 1) as f32 } else { 0.0 };
    for (k, sample) in sig.iter_mut().enumerate() {
        let decay = 1.0 - k as f32 * step;
        *sample *= decay * decay;
    }
    sig
}

/// Menu click chime with an exponential decay
pub fn click() -> SampleBuffer {
    let mut sig = mix(&[sine(880.0, CLICK_SECS, 0.4), sine(1320.0, CLICK_SECS, 0.2)]);
    let n = sig.len();
    let step = if n > 1 { 5.0 / (n - 1) as f32 } else { 0.0 };
    for (k, sample) in sig.iter_mut().enumerate() {
        *sample *= (-(k as f32) * step).exp() * 0.7;
    }
    sig
}
