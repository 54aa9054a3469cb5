//! Asset Composer
//!
//! Each named sound is a fixed recipe over the [`crate::synth`] primitives.
//! Recipes are grouped into sound sets; a set names the ambient loop it plays
//! under its one-shot effects.

pub mod recipes;

use crate::synth::SampleBuffer;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How a recipe is rendered
#[derive(Clone, Copy)]
pub enum AssetKind {
    /// Deterministic recipe, rendered once at startup
    Fixed(fn() -> SampleBuffer),
    /// Randomized recipe, re-rendered before every trigger
    Regenerating(fn(&mut dyn RngCore) -> SampleBuffer),
}

impl fmt::Debug for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Fixed(_) => f.write_str("Fixed"),
            AssetKind::Regenerating(_) => f.write_str("Regenerating"),
        }
    }
}

/// A logical sound name and the recipe that renders it
#[derive(Debug, Clone, Copy)]
pub struct AssetDescriptor {
    /// Catalog name; also the file stem in the scratch directory
    pub name: &'static str,
    /// Rendering recipe
    pub kind: AssetKind,
    /// Nominal length of the rendered sound in seconds
    pub nominal_secs: f32,
}

impl AssetDescriptor {
    const fn fixed(name: &'static str, nominal_secs: f32, recipe: fn() -> SampleBuffer) -> Self {
        AssetDescriptor {
            name,
            kind: AssetKind::Fixed(recipe),
            nominal_secs,
        }
    }

    const fn regenerating(
        name: &'static str,
        nominal_secs: f32,
        recipe: fn(&mut dyn RngCore) -> SampleBuffer,
    ) -> Self {
        AssetDescriptor {
            name,
            kind: AssetKind::Regenerating(recipe),
            nominal_secs,
        }
    }

    /// Render the recipe; `rng` is only consulted by regenerating assets
    pub fn render(&self, rng: &mut dyn RngCore) -> SampleBuffer {
        match self.kind {
            AssetKind::Fixed(recipe) => recipe(),
            AssetKind::Regenerating(recipe) => recipe(rng),
        }
    }

    /// True for assets that are re-synthesized before each trigger
    pub fn is_regenerating(&self) -> bool {
        matches!(self.kind, AssetKind::Regenerating(_))
    }

    /// Nominal duration as a [`Duration`]
    pub fn nominal_duration(&self) -> Duration {
        Duration::from_secs_f32(self.nominal_secs)
    }
}

/// Gameplay sounds
pub const GAME_ASSETS: &[AssetDescriptor] = &[
    AssetDescriptor::fixed("ambient", recipes::AMBIENT_SECS, recipes::ambient),
    AssetDescriptor::regenerating("sparkle", recipes::SPARKLE_SECS, recipes::sparkle),
    AssetDescriptor::fixed("zone_charge", recipes::ZONE_CHARGE_SECS, recipes::zone_charge),
    AssetDescriptor::fixed("flower", recipes::FLOWER_SECS, recipes::flower),
    AssetDescriptor::fixed("cleanse", recipes::CLEANSE_SECS, recipes::cleanse),
    AssetDescriptor::fixed("stage_done", recipes::STAGE_DONE_SECS, recipes::stage_done),
    AssetDescriptor::fixed("victory", recipes::VICTORY_SECS, recipes::victory),
    AssetDescriptor::fixed("timeout", recipes::TIMEOUT_SECS, recipes::timeout),
];

/// Title-screen sounds
pub const MENU_ASSETS: &[AssetDescriptor] = &[
    AssetDescriptor::fixed("menu_ambient", recipes::MENU_AMBIENT_SECS, recipes::menu_ambient),
    AssetDescriptor::fixed("hover", recipes::HOVER_SECS, recipes::hover),
    AssetDescriptor::fixed("click", recipes::CLICK_SECS, recipes::click),
];

/// A named group of assets sharing one ambient loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundSet {
    /// In-game ambience and effects
    #[default]
    Game,
    /// Title-screen ambience and UI ticks
    Menu,
}

impl SoundSet {
    /// Every asset in this set
    pub fn assets(self) -> &'static [AssetDescriptor] {
        match self {
            SoundSet::Game => GAME_ASSETS,
            SoundSet::Menu => MENU_ASSETS,
        }
    }

    /// Name of the looping ambient asset
    pub fn ambient(self) -> &'static str {
        match self {
            SoundSet::Game => "ambient",
            SoundSet::Menu => "menu_ambient",
        }
    }

    /// Look up a descriptor by name
    pub fn find(self, name: &str) -> Option<&'static AssetDescriptor> {
        self.assets().iter().find(|d| d.name == name)
    }

    /// Parse a set name (`game` or `menu`, case-insensitive)
    pub fn from_name(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "game" => Some(SoundSet::Game),
            "menu" => Some(SoundSet::Menu),
            _ => None,
        }
    }

    /// Lowercase set name
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundSet::Game => "game",
            SoundSet::Menu => "menu",
        }
    }
}

impl fmt::Display for SoundSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
