#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that places charms on freshly generated terrain.

use charm_seasons_core::{
    CellCoord, Command, Event, MapSpan, RandomSource, Season, SeasonAssets, TileSink,
};
use tracing::{debug, warn};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    charms_per_level: usize,
}

impl Config {
    /// Creates a new configuration that places `charms_per_level` charms per build.
    #[must_use]
    pub const fn new(charms_per_level: usize) -> Self {
        Self { charms_per_level }
    }
}

/// Pure system that emits placement commands after every terrain build.
#[derive(Debug)]
pub struct Spawning {
    charms_per_level: usize,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            charms_per_level: config.charms_per_level,
        }
    }

    /// Consumes events and the current tilemap to emit [`Command::PlaceCharm`] commands.
    ///
    /// Builds for a season without a charm prefab are logged and skipped.
    pub fn handle<T, R>(
        &self,
        events: &[Event],
        assets: &SeasonAssets,
        tiles: &T,
        span: MapSpan,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        T: TileSink + ?Sized,
        R: RandomSource,
    {
        for event in events {
            if let Event::TerrainGenerated { season, .. } = *event {
                self.place(season, assets, tiles, span, rng, out);
            }
        }
    }

    /// Emits [`Command::PlaceCharm`] commands for a full set of charms on `tiles`.
    ///
    /// Nothing is placed when the season has no charm prefab.
    pub fn place<T, R>(
        &self,
        season: Season,
        assets: &SeasonAssets,
        tiles: &T,
        span: MapSpan,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        T: TileSink + ?Sized,
        R: RandomSource,
    {
        if let Err(error) = assets.charm_prefab(season) {
            warn!(%error, "charm placement skipped");
            return;
        }

        let cells = select_spawn_cells(tiles, span, self.charms_per_level, rng);
        if cells.len() < self.charms_per_level {
            debug!(
                requested = self.charms_per_level,
                found = cells.len(),
                "fewer spawn cells than requested"
            );
        }
        out.extend(cells.into_iter().map(|cell| Command::PlaceCharm { cell }));
    }
}

/// Selects up to `count` empty cells resting on the topmost tile of a column.
///
/// Candidates are shuffled with `rng` before selection, so equal seeds select
/// equal cells. Columns without any tile yield no candidate.
pub fn select_spawn_cells<T, R>(
    tiles: &T,
    span: MapSpan,
    count: usize,
    rng: &mut R,
) -> Vec<CellCoord>
where
    T: TileSink + ?Sized,
    R: RandomSource,
{
    let Some(bounds) = tiles.bounds() else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }

    let top = bounds.max().y();
    let bottom = bounds.min().y();
    let mut candidates: Vec<CellCoord> = span
        .columns()
        .filter_map(|column| {
            (bottom..=top)
                .rev()
                .map(|row| CellCoord::new(column, row))
                .find(|cell| tiles.has_tile(*cell))
                .map(CellCoord::above)
        })
        .collect();

    rng.shuffle(&mut candidates);

    candidates
        .into_iter()
        .filter(|cell| !tiles.has_tile(*cell))
        .take(count)
        .collect()
}
