//! End-to-end checks of the render → encode → catalog pipeline

use std::fs;
use veilsound::{AssetCatalog, SoundSet};

fn read_pcm(path: &std::path::Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).expect("generated file should be valid WAV");
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

#[test]
fn every_asset_is_canonical_mono_16_bit() {
    for set in [SoundSet::Game, SoundSet::Menu] {
        let catalog = AssetCatalog::new(set).unwrap().with_seed(1);
        let generated = catalog.generate_all().unwrap();
        assert_eq!(generated.len(), set.assets().len());

        for asset in &generated {
            assert_eq!(catalog.path(asset.name).as_deref(), Some(asset.path.as_path()));
            assert_eq!(asset.path.file_name().unwrap(), format!("{}.wav", asset.name).as_str());

            let (spec, samples) = read_pcm(&asset.path);
            assert_eq!(spec.channels, 1, "{}", asset.name);
            assert_eq!(spec.sample_rate, 44_100, "{}", asset.name);
            assert_eq!(spec.bits_per_sample, 16, "{}", asset.name);
            assert_eq!(spec.sample_format, hound::SampleFormat::Int);
            assert_eq!(samples.len(), asset.samples, "{}", asset.name);
            // Hard clip keeps every sample inside the symmetric 16-bit range
            assert!(samples.iter().all(|&s| s >= -32_767), "{}", asset.name);
            assert!(samples.iter().any(|&s| s != 0), "{} is silent", asset.name);

            let bytes = fs::metadata(&asset.path).unwrap().len() as usize;
            assert_eq!(bytes, 44 + 2 * asset.samples, "{}", asset.name);
        }
    }
}

#[test]
fn regeneration_is_idempotent_for_fixed_assets() {
    let catalog = AssetCatalog::new(SoundSet::Game).unwrap().with_seed(3);
    catalog.generate_all().unwrap();
    let first: Vec<(&str, Vec<u8>)> = catalog
        .names()
        .map(|name| (name, fs::read(catalog.path(name).unwrap()).unwrap()))
        .collect();

    catalog.generate_all().unwrap();
    for (name, before) in &first {
        let after = fs::read(catalog.path(name).unwrap()).unwrap();
        if *name == "sparkle" {
            assert_eq!(after.len(), before.len());
            assert_eq!(after[..44], before[..44]);
        } else {
            assert_eq!(&after, before, "{} changed between runs", name);
        }
    }
}

#[test]
fn sparkle_pitch_varies_between_regenerations() {
    let catalog = AssetCatalog::new(SoundSet::Game).unwrap().with_seed(5);
    let mut distinct: Vec<Vec<u8>> = Vec::new();
    for _ in 0..16 {
        let asset = catalog.regenerate("sparkle").unwrap();
        let bytes = fs::read(&asset.path).unwrap();
        if !distinct.contains(&bytes) {
            distinct.push(bytes);
        }
    }
    assert!(distinct.len() > 1);
    assert!(distinct.len() <= 4);
}

#[test]
fn concatenated_and_layered_assets_have_distinct_lengths() {
    let catalog = AssetCatalog::new(SoundSet::Game).unwrap();
    let generated = catalog.generate_all().unwrap();
    let duration = |name: &str| {
        generated
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.duration_secs())
            .unwrap()
    };

    // Four 0.12 s notes in sequence
    assert!((duration("zone_charge") - 0.48).abs() < 0.002);
    // Four 1.2 s voices at once
    assert!((duration("stage_done") - 1.2).abs() < 0.002);
    // Nine 0.18 s notes with the pad underneath
    assert!((duration("victory") - 1.62).abs() < 0.002);
    assert!((duration("timeout") - 1.2).abs() < 0.002);
    assert!((duration("ambient") - 12.0).abs() < 0.002);
}
