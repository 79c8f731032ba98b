#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Charm Seasons engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative progress state, and the pure generation systems. Callers
//! submit [`Command`] values describing desired transitions, the world executes
//! them via its `apply` entry point, and then broadcasts [`Event`] values for
//! systems to react to. Systems read the tilemap through [`TileSink`], draw
//! randomness from a [`RandomSource`], and respond with new command batches.

mod assets;
mod config;

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use assets::{AssetError, ClipId, PrefabId, SeasonAssets, SeasonTable};
pub use config::{ConfigError, GenerationConfig, MapSpan, ProgressionConfig};

/// Cyclic gameplay phase that selects terrain visuals, music and charm prefab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    /// First season of every year.
    Spring,
    /// Second season of every year.
    Summer,
    /// Third season of every year.
    Autumn,
    /// Final season before the year counter increments.
    Winter,
}

impl Season {
    /// Every season in cyclic order.
    pub const ALL: [Season; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    /// Zero-based position of the season inside [`Season::ALL`].
    #[must_use]
    pub const fn ordinal(self) -> usize {
        match self {
            Self::Spring => 0,
            Self::Summer => 1,
            Self::Autumn => 2,
            Self::Winter => 3,
        }
    }

    /// Season that follows this one, wrapping from winter back to spring.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::ALL[(self.ordinal() + 1) % Self::ALL.len()]
    }

    /// Lower-case name used by logs and snapshot strings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }

    /// Parses the lower-case name produced by [`Season::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|season| season.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a tile painted into the world grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u16);

impl TileId {
    /// Creates a tile identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Location of a single tilemap cell. `y` grows upward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Cell directly above this one.
    #[must_use]
    pub const fn above(self) -> Self {
        Self::new(self.x, self.y.saturating_add(1))
    }

    /// Cell offset by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// Inclusive rectangle of cells covering every painted tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBounds {
    min: CellCoord,
    max: CellCoord,
}

impl CellBounds {
    /// Creates bounds from two corners, normalising their order.
    #[must_use]
    pub fn new(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min: CellCoord::new(a.x().min(b.x()), a.y().min(b.y())),
            max: CellCoord::new(a.x().max(b.x()), a.y().max(b.y())),
        }
    }

    /// Bottom-left corner.
    #[must_use]
    pub const fn min(&self) -> CellCoord {
        self.min
    }

    /// Top-right corner.
    #[must_use]
    pub const fn max(&self) -> CellCoord {
        self.max
    }

    /// Grows the bounds so they include the provided cell.
    #[must_use]
    pub fn including(self, cell: CellCoord) -> Self {
        Self {
            min: CellCoord::new(self.min.x().min(cell.x()), self.min.y().min(cell.y())),
            max: CellCoord::new(self.max.x().max(cell.x()), self.max.y().max(cell.y())),
        }
    }

    /// Reports whether the cell lies inside the bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        (self.min.x()..=self.max.x()).contains(&cell.x())
            && (self.min.y()..=self.max.y()).contains(&cell.y())
    }
}

/// Unique identifier assigned to a charm placed in the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharmId(u32);

impl CharmId {
    /// Creates a new charm identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Handle returned by a [`CollectibleFactory`] for a spawned collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectibleHandle(u64);

impl CollectibleHandle {
    /// Wraps an adapter-defined handle value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the adapter-defined handle value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Discrete control events delivered by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlEvent {
    /// Player starts moving left.
    MoveLeft,
    /// Player starts moving right.
    MoveRight,
    /// Player requests a jump.
    Jump,
    /// Toggles the paused state.
    Pause,
    /// Requests a full reset of the session.
    Reset,
}

/// Commands that express all permissible progress-state transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Announces the initial season and requests the first level build.
    BeginSession,
    /// Advances the countdown by the provided delta time.
    Tick {
        /// Duration of game time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Registers a charm at a spawn cell selected on the freshly built terrain.
    PlaceCharm {
        /// Empty cell the charm occupies.
        cell: CellCoord,
    },
    /// Removes every charm still placed, ahead of a freshly built level.
    ClearCharms,
    /// Reports that the player picked up a charm.
    CollectCharm {
        /// Identifier of the collected charm.
        charm: CharmId,
    },
    /// Moves to the next season and rebuilds the level.
    AdvanceSeason,
    /// Overrides the current season without touching the year counters.
    SetSeason {
        /// Season to activate.
        season: Season,
    },
    /// Flips the paused flag.
    TogglePause,
    /// Restores default progress. Only honoured while paused or after game over.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the countdown advanced.
    TimeAdvanced {
        /// Duration of game time that elapsed in the tick.
        dt: Duration,
        /// Countdown value after the tick.
        remaining: Duration,
    },
    /// Announces that a new season became active.
    SeasonChanged {
        /// Season that became active.
        season: Season,
        /// Year counter after the change.
        year: u32,
    },
    /// Requests a full terrain rebuild for the provided season and year.
    LevelRebuildRequested {
        /// Season whose terrain must be generated.
        season: Season,
        /// Year counter driving difficulty escalation.
        year: u32,
    },
    /// Confirms that the terrain generator rebuilt the tilemap.
    TerrainGenerated {
        /// Season the terrain was generated for.
        season: Season,
        /// Year counter used during generation.
        year: u32,
    },
    /// Publishes statistics about the freshly built level.
    LevelAnalyzed {
        /// Report describing the level.
        report: LevelReport,
    },
    /// Confirms that a charm was registered at a spawn cell.
    CharmPlaced {
        /// Identifier assigned to the charm.
        charm: CharmId,
        /// Cell the charm occupies.
        cell: CellCoord,
        /// Season the charm belongs to.
        season: Season,
    },
    /// Confirms a pickup and reports the updated progress.
    CharmCollected {
        /// Identifier of the collected charm.
        charm: CharmId,
        /// Charms collected during the current season, after any quota reset.
        charms_collected: u32,
        /// Total score after the pickup.
        score: u32,
        /// Countdown value after the time bonus.
        time_remaining: Duration,
    },
    /// Reports that an uncollected charm was discarded.
    CharmRemoved {
        /// Identifier of the discarded charm.
        charm: CharmId,
    },
    /// Announces that the paused flag changed.
    PauseChanged {
        /// Whether the session is paused after the command.
        paused: bool,
    },
    /// Fired exactly once when the countdown reaches zero.
    GameOver {
        /// Final score.
        score: u32,
    },
    /// Confirms that progress returned to its defaults.
    ProgressReset,
}

/// Immutable snapshot of the progress state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Active season.
    pub season: Season,
    /// Seasons completed in the current year, wrapping at four.
    pub season_in_year: u32,
    /// Completed years.
    pub year: u32,
    /// Charms collected during the current season.
    pub charms_collected: u32,
    /// Total score; never decreases outside of a reset.
    pub score: u32,
    /// Countdown until game over.
    pub time_remaining: Duration,
    /// Whether ticks are frozen.
    pub paused: bool,
    /// One-way game-over latch.
    pub game_over: bool,
}

/// Coverage statistics for a single platform layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerReport {
    /// Base height of the layer including the map offset.
    pub height: i32,
    /// Columns holding at least one tile inside the layer band.
    pub covered_columns: u32,
    /// Longest run of consecutive covered columns.
    pub longest_run: u32,
    /// Longest run of consecutive empty columns.
    pub longest_gap: u32,
    /// Whether a standable surface in the layer can be reached from the ground.
    pub reachable: bool,
}

/// Statistics describing a generated level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelReport {
    /// Columns covered by the ground strip.
    pub ground_columns: u32,
    /// Tiles painted above the ground strip.
    pub platform_tiles: u32,
    /// Per-layer coverage in ascending height order.
    pub layers: Vec<LayerReport>,
    /// Standable surfaces discovered in the level.
    pub total_surfaces: u32,
    /// Standable surfaces reachable from the ground strip.
    pub reachable_surfaces: u32,
}

impl LevelReport {
    /// Heights of layers that hold no reachable surface.
    #[must_use]
    pub fn unreachable_layers(&self) -> Vec<i32> {
        self.layers
            .iter()
            .filter(|layer| !layer.reachable)
            .map(|layer| layer.height)
            .collect()
    }
}

/// Uniform random draws consumed by every stochastic generation step.
pub trait RandomSource {
    /// Returns a uniform float in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Returns a uniform integer in `[low, high]`. Returns `low` when `high < low`.
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32;

    /// Draws a boolean that is `true` with the provided probability.
    fn chance(&mut self, probability: f32) -> bool {
        self.next_unit() < probability
    }

    /// Shuffles the slice in place using Fisher–Yates.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for index in (1..items.len()).rev() {
            let upper = u32::try_from(index).unwrap_or(u32::MAX);
            let swap = self.range_inclusive(0, upper) as usize;
            items.swap(index, swap);
        }
    }
}

/// Tilemap collaborator that stores the only copy of the world grid.
pub trait TileSink {
    /// Paints `tile` into `cell`, replacing any previous tile.
    fn set_tile(&mut self, cell: CellCoord, tile: TileId);

    /// Removes every tile.
    fn clear_all(&mut self);

    /// Returns the tile stored at `cell`, if any.
    fn tile(&self, cell: CellCoord) -> Option<TileId>;

    /// Reports whether `cell` holds a tile.
    fn has_tile(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some()
    }

    /// Smallest rectangle covering every painted tile, or `None` when empty.
    fn bounds(&self) -> Option<CellBounds>;

    /// World-space position of the cell's lower-left corner.
    fn cell_to_world(&self, cell: CellCoord) -> Vec2;
}

/// Collaborator that instantiates collectible objects in the scene.
pub trait CollectibleFactory {
    /// Spawns the prefab at the world position and returns its handle.
    fn spawn(&mut self, prefab: &PrefabId, position: Vec2) -> CollectibleHandle;

    /// Destroys a previously spawned collectible.
    fn despawn(&mut self, handle: CollectibleHandle);
}

/// Collaborator responsible for music and sound effects.
pub trait AudioSink {
    /// Starts looping the provided music clip, replacing the current one.
    fn play_music(&mut self, clip: &ClipId);

    /// Plays a single sound effect.
    fn play_one_shot(&mut self, clip: &ClipId, volume: f32);

    /// Stops the current music.
    fn stop(&mut self);
}

/// Collaborator that displays HUD strings.
pub trait HudSink {
    /// Shows the formatted countdown.
    fn show_time_remaining(&mut self, text: &str);

    /// Shows the formatted score line.
    fn show_score(&mut self, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_cycle_back_to_spring() {
        let mut season = Season::Spring;
        for _ in 0..4 {
            season = season.next();
        }
        assert_eq!(season, Season::Spring);
        assert_eq!(Season::Winter.next(), Season::Spring);
        assert_eq!(Season::Autumn.ordinal(), 2);
    }

    #[test]
    fn season_names_parse_case_insensitively() {
        assert_eq!(Season::from_name("Autumn"), Some(Season::Autumn));
        assert_eq!(Season::from_name("monsoon"), None);
    }

    #[test]
    fn bounds_grow_to_include_cells() {
        let bounds = CellBounds::new(CellCoord::new(3, 4), CellCoord::new(1, 2))
            .including(CellCoord::new(-2, 9));
        assert_eq!(bounds.min(), CellCoord::new(-2, 2));
        assert_eq!(bounds.max(), CellCoord::new(3, 9));
        assert!(bounds.contains(CellCoord::new(0, 5)));
        assert!(!bounds.contains(CellCoord::new(4, 5)));
    }

    struct Counter(u32);

    impl RandomSource for Counter {
        fn next_unit(&mut self) -> f32 {
            0.5
        }

        fn range_inclusive(&mut self, low: u32, _high: u32) -> u32 {
            self.0 += 1;
            low
        }
    }

    #[test]
    fn chance_respects_probability_extremes() {
        let mut source = Counter(0);
        assert!(source.chance(1.0));
        assert!(!source.chance(0.0));
    }

    #[test]
    fn shuffle_draws_once_per_swap() {
        let mut source = Counter(0);
        let mut items = [1, 2, 3, 4];
        source.shuffle(&mut items);
        assert_eq!(source.0, 3);
        assert_eq!(items, [2, 3, 4, 1]);
    }

    #[test]
    fn unreachable_layers_lists_heights() {
        let report = LevelReport {
            layers: vec![
                LayerReport {
                    height: 5,
                    covered_columns: 4,
                    longest_run: 4,
                    longest_gap: 2,
                    reachable: true,
                },
                LayerReport {
                    height: 9,
                    covered_columns: 1,
                    longest_run: 1,
                    longest_gap: 5,
                    reachable: false,
                },
            ],
            ..LevelReport::default()
        };
        assert_eq!(report.unreachable_layers(), vec![9]);
    }

    #[test]
    fn level_report_round_trips_through_bincode() {
        let report = LevelReport {
            ground_columns: 10,
            platform_tiles: 23,
            total_surfaces: 14,
            reachable_surfaces: 12,
            layers: Vec::new(),
        };
        let bytes = bincode::serialize(&report).expect("serialize");
        let restored: LevelReport = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, report);
    }
}
