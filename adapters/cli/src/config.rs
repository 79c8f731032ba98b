//! TOML settings file for the command-line adapter.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use charm_seasons_core::{
    ClipId, GenerationConfig, PrefabId, ProgressionConfig, Season, SeasonAssets, TileId,
};
use serde::Deserialize;

/// Parsed contents of a settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) generation: GenerationConfig,
    pub(crate) progression: ProgressionSettings,
    pub(crate) assets: AssetSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ProgressionSettings {
    charm_quota: u32,
    charms_per_level: usize,
    start_time_secs: f64,
    pickup_bonus_secs: f64,
    pickup_volume: f32,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        let defaults = ProgressionConfig::default();
        Self {
            charm_quota: defaults.charm_quota,
            charms_per_level: defaults.charms_per_level,
            start_time_secs: defaults.start_time.as_secs_f64(),
            pickup_bonus_secs: defaults.pickup_bonus.as_secs_f64(),
            pickup_volume: defaults.pickup_volume,
        }
    }
}

/// Asset overrides; seasons absent from the file keep their built-in assets.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AssetSettings {
    dirt_tile: Option<u16>,
    pickup_clip: Option<String>,
    game_over_clip: Option<String>,
    seasons: BTreeMap<String, SeasonSettings>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SeasonSettings {
    ground_tile: Option<u16>,
    music: Option<String>,
    charm_prefab: Option<String>,
}

impl SeasonSettings {
    fn builtin(season: Season, ground_tile: u16) -> Self {
        Self {
            ground_tile: Some(ground_tile),
            music: Some(format!("{season}-theme")),
            charm_prefab: Some(format!("{season}-charm")),
        }
    }

    fn or(self, fallback: Self) -> Self {
        Self {
            ground_tile: self.ground_tile.or(fallback.ground_tile),
            music: self.music.or(fallback.music),
            charm_prefab: self.charm_prefab.or(fallback.charm_prefab),
        }
    }
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            dirt_tile: Some(9),
            pickup_clip: Some("pickup".to_owned()),
            game_over_clip: Some("game-over".to_owned()),
            seasons: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`, or returns the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid settings in {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }
}

impl ProgressionSettings {
    pub(crate) fn resolve(&self) -> Result<ProgressionConfig> {
        let start_time = Duration::try_from_secs_f64(self.start_time_secs)
            .with_context(|| format!("invalid start_time_secs {}", self.start_time_secs))?;
        let pickup_bonus = Duration::try_from_secs_f64(self.pickup_bonus_secs)
            .with_context(|| format!("invalid pickup_bonus_secs {}", self.pickup_bonus_secs))?;
        Ok(ProgressionConfig {
            charm_quota: self.charm_quota,
            charms_per_level: self.charms_per_level,
            start_time,
            pickup_bonus,
            pickup_volume: self.pickup_volume,
        })
    }
}

impl AssetSettings {
    pub(crate) fn resolve(&self) -> Result<SeasonAssets> {
        let mut assets = SeasonAssets {
            dirt_tile: self.dirt_tile.map(TileId::new),
            pickup_clip: self.pickup_clip.clone().map(ClipId::new),
            game_over_clip: self.game_over_clip.clone().map(ClipId::new),
            ..SeasonAssets::default()
        };

        let mut overrides = BTreeMap::new();
        for (name, settings) in &self.seasons {
            let Some(season) = Season::from_name(name) else {
                bail!("unknown season `{name}` in assets");
            };
            if overrides.insert(season, settings.clone()).is_some() {
                bail!("season `{season}` is configured twice in assets");
            }
        }

        for (season, ground_tile) in Season::ALL.into_iter().zip(1_u16..) {
            let builtin = SeasonSettings::builtin(season, ground_tile);
            let settings = match overrides.remove(&season) {
                Some(settings) => settings.or(builtin),
                None => builtin,
            };
            let _ = assets
                .ground_tiles
                .set(season, settings.ground_tile.map(TileId::new));
            let _ = assets.music.set(season, settings.music.map(ClipId::new));
            let _ = assets
                .charm_prefabs
                .set(season, settings.charm_prefab.map(PrefabId::new));
        }

        Ok(assets)
    }
}
