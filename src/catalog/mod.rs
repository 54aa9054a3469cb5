//! Asset Catalog & Generation Pipeline
//!
//! Renders every recipe of a [`SoundSet`] into a scratch directory and maps
//! each logical name to its file. Generation is synchronous; playback must
//! not be requested before [`AssetCatalog::generate_all`] returns.

use crate::assets::{AssetDescriptor, SoundSet};
use crate::export::{self, EXTENSION};
use crate::synth::{duration_of, SampleBuffer};
use crate::{Result, VeilsoundError};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info};

/// Where generated files live
#[derive(Debug)]
enum ScratchDir {
    /// Process-scoped temporary directory, removed when the catalog drops
    Temp(TempDir),
    /// Caller-supplied directory, left in place
    Fixed(PathBuf),
}

impl ScratchDir {
    fn path(&self) -> &Path {
        match self {
            ScratchDir::Temp(dir) => dir.path(),
            ScratchDir::Fixed(path) => path,
        }
    }
}

/// Summary of one rendered asset
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAsset {
    /// Catalog name
    pub name: &'static str,
    /// Location of the encoded file
    pub path: PathBuf,
    /// Number of samples written
    pub samples: usize,
}

impl GeneratedAsset {
    /// Rendered length in seconds
    pub fn duration_secs(&self) -> f32 {
        duration_of(self.samples)
    }
}

/// Name → file mapping for one sound set
pub struct AssetCatalog {
    sound_set: SoundSet,
    scratch: ScratchDir,
    paths: RwLock<HashMap<&'static str, PathBuf>>,
    rng: Mutex<StdRng>,
}

impl AssetCatalog {
    /// Create a catalog backed by a fresh temporary directory
    pub fn new(sound_set: SoundSet) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("veilsound-").tempdir()?;
        Ok(Self::with_scratch(sound_set, ScratchDir::Temp(dir)))
    }

    /// Create a catalog that writes into `dir`, creating it if needed
    pub fn in_dir(sound_set: SoundSet, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            VeilsoundError::Encode(format!(
                "Failed to create scratch directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self::with_scratch(sound_set, ScratchDir::Fixed(dir)))
    }

    fn with_scratch(sound_set: SoundSet, scratch: ScratchDir) -> Self {
        AssetCatalog {
            sound_set,
            scratch,
            paths: RwLock::new(HashMap::new()),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Seed the generator used by regenerating assets
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    /// Sound set this catalog renders
    pub fn sound_set(&self) -> SoundSet {
        self.sound_set
    }

    /// Scratch directory holding the generated files
    pub fn dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Every asset name in the set, in table order
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.sound_set.assets().iter().map(|d| d.name)
    }

    /// Descriptor for `name`, if it belongs to this set
    pub fn descriptor(&self, name: &str) -> Option<&'static AssetDescriptor> {
        self.sound_set.find(name)
    }

    /// File path for `name` once it has been generated
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.paths.read().get(name).cloned()
    }

    /// Render every asset and write it to the scratch directory
    ///
    /// Calling this again re-renders and overwrites each file. Fixed assets
    /// come out byte-identical; the regenerating asset draws a fresh pitch.
    pub fn generate_all(&self) -> Result<Vec<GeneratedAsset>> {
        let started = Instant::now();
        let generated = self
            .sound_set
            .assets()
            .iter()
            .map(|descriptor| self.generate(descriptor))
            .collect::<Result<Vec<_>>>()?;

        info!(
            set = %self.sound_set,
            assets = generated.len(),
            dir = %self.dir().display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "audio assets generated"
        );
        Ok(generated)
    }

    /// Re-render a single asset, replacing its file atomically
    pub fn regenerate(&self, name: &str) -> Result<GeneratedAsset> {
        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| VeilsoundError::UnknownAsset(name.to_string()))?;
        self.generate(descriptor)
    }

    /// Render `name` without touching the filesystem
    pub fn render(&self, name: &str) -> Option<SampleBuffer> {
        let descriptor = self.descriptor(name)?;
        Some(self.render_descriptor(descriptor))
    }

    fn render_descriptor(&self, descriptor: &AssetDescriptor) -> SampleBuffer {
        let mut rng = self.rng.lock();
        descriptor.render(&mut *rng)
    }

    fn generate(&self, descriptor: &AssetDescriptor) -> Result<GeneratedAsset> {
        let samples = self.render_descriptor(descriptor);
        let path = self.file_path(descriptor.name);
        export::write_wav(&path, &samples)?;
        debug!(
            asset = descriptor.name,
            samples = samples.len(),
            path = %path.display(),
            "asset written"
        );

        self.paths.write().insert(descriptor.name, path.clone());
        Ok(GeneratedAsset {
            name: descriptor.name,
            path,
            samples: samples.len(),
        })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.dir().join(format!("{}.{}", name, EXTENSION))
    }
}

impl std::fmt::Debug for AssetCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCatalog")
            .field("sound_set", &self.sound_set)
            .field("dir", &self.dir())
            .field("generated", &self.paths.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_unknown_before_generation() {
        let catalog = AssetCatalog::new(SoundSet::Menu).unwrap();
        assert!(catalog.path("hover").is_none());
        catalog.generate_all().unwrap();
        let path = catalog.path("hover").unwrap();
        assert_eq!(path, catalog.dir().join("hover.wav"));
        assert!(path.is_file());
    }

    #[test]
    fn test_regenerate_unknown_asset() {
        let catalog = AssetCatalog::new(SoundSet::Menu).unwrap();
        let err = catalog.regenerate("fanfare").unwrap_err();
        assert!(matches!(err, VeilsoundError::UnknownAsset(name) if name == "fanfare"));
    }

    #[test]
    fn test_in_dir_keeps_files() {
        let parent = tempfile::tempdir().unwrap();
        let dir = parent.path().join("sfx");
        {
            let catalog = AssetCatalog::in_dir(SoundSet::Menu, &dir).unwrap();
            catalog.generate_all().unwrap();
        }
        assert!(dir.join("click.wav").is_file());
        assert!(dir.join("menu_ambient.wav").is_file());
    }

    #[test]
    fn test_temp_dir_removed_on_drop() {
        let catalog = AssetCatalog::new(SoundSet::Menu).unwrap();
        let dir = catalog.dir().to_path_buf();
        assert!(dir.is_dir());
        drop(catalog);
        assert!(!dir.exists());
    }

    #[test]
    fn test_seeded_render_is_reproducible() {
        let a = AssetCatalog::new(SoundSet::Game).unwrap().with_seed(9);
        let b = AssetCatalog::new(SoundSet::Game).unwrap().with_seed(9);
        assert_eq!(a.render("sparkle"), b.render("sparkle"));
        assert!(a.render("lantern").is_none());
    }
}
