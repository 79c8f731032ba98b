use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Season, TileId};

/// Fixed table holding one optional entry per season, indexed by ordinal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeasonTable<T> {
    entries: [Option<T>; 4],
}

impl<T> Default for SeasonTable<T> {
    fn default() -> Self {
        Self {
            entries: [None, None, None, None],
        }
    }
}

impl<T> SeasonTable<T> {
    /// Creates a table with every season populated.
    #[must_use]
    pub fn new(spring: T, summer: T, autumn: T, winter: T) -> Self {
        Self {
            entries: [Some(spring), Some(summer), Some(autumn), Some(winter)],
        }
    }

    /// Entry registered for the season, if any.
    #[must_use]
    pub fn get(&self, season: Season) -> Option<&T> {
        self.entries[season.ordinal()].as_ref()
    }

    /// Replaces the entry for the season, returning the previous one.
    pub fn set(&mut self, season: Season, value: Option<T>) -> Option<T> {
        std::mem::replace(&mut self.entries[season.ordinal()], value)
    }
}

/// Identifier of an audio clip owned by the audio collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(String);

impl ClipId {
    /// Wraps the collaborator-defined clip name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Clip name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a collectible prefab owned by the collectible factory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrefabId(String);

impl PrefabId {
    /// Wraps the collaborator-defined prefab name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Prefab name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrefabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-season asset references consumed by generation and collaborators.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeasonAssets {
    /// Surface tile painted for the ground strip and platform tops.
    pub ground_tiles: SeasonTable<TileId>,
    /// Looping ambience for each season.
    pub music: SeasonTable<ClipId>,
    /// Collectible prefab spawned on each season's level.
    pub charm_prefabs: SeasonTable<PrefabId>,
    /// Sub-surface tile painted below platform tops.
    pub dirt_tile: Option<TileId>,
    /// Sound effect played on pickup.
    pub pickup_clip: Option<ClipId>,
    /// Stinger played when the countdown expires.
    pub game_over_clip: Option<ClipId>,
}

impl SeasonAssets {
    /// Surface tile for the season.
    pub fn ground_tile(&self, season: Season) -> Result<TileId, AssetError> {
        self.ground_tiles
            .get(season)
            .copied()
            .ok_or(AssetError::MissingGroundTile { season })
    }

    /// Sub-surface tile to paint below `surface`, when one is configured and distinct.
    #[must_use]
    pub fn subsurface_tile(&self, surface: TileId) -> Option<TileId> {
        self.dirt_tile.filter(|dirt| *dirt != surface)
    }

    /// Ambience clip for the season.
    pub fn music(&self, season: Season) -> Result<&ClipId, AssetError> {
        self.music
            .get(season)
            .ok_or(AssetError::MissingMusic { season })
    }

    /// Charm prefab for the season.
    pub fn charm_prefab(&self, season: Season) -> Result<&PrefabId, AssetError> {
        self.charm_prefabs
            .get(season)
            .ok_or(AssetError::MissingCharmPrefab { season })
    }
}

/// Missing asset references for the active season.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssetError {
    /// No ground tile is registered for the season.
    #[error("no ground tile configured for {season}")]
    MissingGroundTile {
        /// Season that lacks the tile.
        season: Season,
    },
    /// No charm prefab is registered for the season.
    #[error("no charm prefab configured for {season}")]
    MissingCharmPrefab {
        /// Season that lacks the prefab.
        season: Season,
    },
    /// No music clip is registered for the season.
    #[error("no music configured for {season}")]
    MissingMusic {
        /// Season that lacks the clip.
        season: Season,
    },
}
