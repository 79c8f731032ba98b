#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Terrain generation system that rebuilds the seasonal level.
//!
//! A build wipes the tilemap, paints a flat ground strip across the full map
//! width and then sweeps every platform layer left to right, alternating
//! platform runs and gaps. Run and gap lengths are capped by the player's
//! horizontal jump reach. This keeps gaps jumpable but does not verify the
//! vertical geometry between layers; the analytics system audits that.
//! Platforms never paint into the ground strip row or below it.

mod placer;

use charm_seasons_core::{
    AssetError, CellCoord, ConfigError, Event, GenerationConfig, RandomSource, Season,
    SeasonAssets, TileId, TileSink,
};
use tracing::{debug, info, warn};

pub use placer::{place_platform, ColumnOutcome, PlatformRun};

const DENSITY_PER_YEAR: f32 = 0.05;
const CHAOS_PER_YEAR: f32 = 0.1;

/// Platform placement probability for the year, clamped to `[0, 1]`.
#[must_use]
pub fn effective_density(config: &GenerationConfig, year: u32) -> f32 {
    (config.platform_density + DENSITY_PER_YEAR * year as f32).clamp(0.0, 1.0)
}

/// Chaos level for the year, clamped to `[0, 1]`.
#[must_use]
pub fn effective_chaos(config: &GenerationConfig, year: u32) -> f32 {
    (config.chaos_level + CHAOS_PER_YEAR * year as f32).clamp(0.0, 1.0)
}

/// Whether a run holds a platform or is left open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunKind {
    /// Columns handed to the platform placer.
    Platform(Vec<ColumnOutcome>),
    /// Columns skipped to form a jumpable gap.
    Gap,
}

/// One contiguous span allocated while sweeping a layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerRun {
    /// Zero-based column index where the run starts.
    pub start: u32,
    /// Number of columns the cursor advanced.
    pub length: u32,
    /// Platform or gap.
    pub kind: RunKind,
}

/// Runs produced for a single platform layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSummary {
    /// Base row of the layer including the map offset.
    pub row: i32,
    /// Runs in left-to-right order.
    pub runs: Vec<LayerRun>,
}

/// Record of the decisions taken during a single build.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildSummary {
    /// Season the level was built for.
    pub season: Season,
    /// Year counter used for escalation.
    pub year: u32,
    /// Effective platform density after escalation.
    pub density: f32,
    /// Effective chaos after escalation.
    pub chaos: f32,
    /// Row of the ground strip.
    pub ground_row: i32,
    /// Layers in ascending height order.
    pub layers: Vec<LayerSummary>,
}

/// Pure system that rebuilds the tilemap whenever a level rebuild is requested.
#[derive(Debug)]
pub struct Terrain {
    config: GenerationConfig,
    last_build: Option<BuildSummary>,
}

impl Terrain {
    /// Creates the system after validating the generation parameters.
    pub fn new(config: GenerationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            last_build: None,
        })
    }

    /// Generation parameters used by every build.
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Summary of the most recent successful build.
    #[must_use]
    pub fn last_build(&self) -> Option<&BuildSummary> {
        self.last_build.as_ref()
    }

    /// Consumes rebuild requests and emits [`Event::TerrainGenerated`] for each build.
    ///
    /// A build whose season lacks a ground tile is logged and skipped, leaving
    /// the tilemap untouched.
    pub fn handle<T, R>(
        &mut self,
        events: &[Event],
        assets: &SeasonAssets,
        tiles: &mut T,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) where
        T: TileSink + ?Sized,
        R: RandomSource,
    {
        for event in events {
            let Event::LevelRebuildRequested { season, year } = *event else {
                continue;
            };

            match self.generate(season, year, assets, tiles, rng) {
                Ok(summary) => {
                    self.last_build = Some(summary);
                    out.push(Event::TerrainGenerated { season, year });
                }
                Err(error) => warn!(%error, "terrain build aborted"),
            }
        }
    }

    /// Clears `tiles` and paints a fresh level for the season and year.
    pub fn generate<T, R>(
        &self,
        season: Season,
        year: u32,
        assets: &SeasonAssets,
        tiles: &mut T,
        rng: &mut R,
    ) -> Result<BuildSummary, AssetError>
    where
        T: TileSink + ?Sized,
        R: RandomSource,
    {
        let surface = assets.ground_tile(season)?;
        let subsurface = assets.subsurface_tile(surface);

        tiles.clear_all();

        let ground_row = self.config.ground_row();
        for column in self.config.map_span().columns() {
            tiles.set_tile(CellCoord::new(column, ground_row), surface);
        }

        let density = effective_density(&self.config, year);
        let chaos = effective_chaos(&self.config, year);
        let layers: Vec<LayerSummary> = self
            .config
            .layer_rows()
            .into_iter()
            .map(|row| {
                let sweep = LayerSweep {
                    config: &self.config,
                    row,
                    density,
                    chaos,
                    surface,
                    subsurface,
                };
                sweep.run(tiles, rng)
            })
            .collect();

        info!(
            %season,
            year,
            density,
            chaos,
            layers = layers.len(),
            "terrain generated"
        );

        Ok(BuildSummary {
            season,
            year,
            density,
            chaos,
            ground_row,
            layers,
        })
    }
}

struct LayerSweep<'a> {
    config: &'a GenerationConfig,
    row: i32,
    density: f32,
    chaos: f32,
    surface: TileId,
    subsurface: Option<TileId>,
}

impl LayerSweep<'_> {
    fn run<T, R>(&self, tiles: &mut T, rng: &mut R) -> LayerSummary
    where
        T: TileSink + ?Sized,
        R: RandomSource,
    {
        let config = self.config;
        let span = config.map_span();
        let width = span.width();
        let reach = config.max_jump_horizontal;

        let mut runs = Vec::new();
        let mut cursor = 0_u32;
        while cursor < width {
            let remaining = width - cursor;

            if rng.chance(self.density) {
                let drawn =
                    rng.range_inclusive(config.min_platform_length, config.max_platform_length);
                let length = drawn.min(remaining).min(reach).max(1);
                let platform = PlatformRun {
                    start_column: span.column(cursor),
                    base_row: self.row,
                    length,
                    chaos: self.chaos,
                    surface: self.surface,
                    subsurface: self.subsurface,
                    max_thickness: config.max_platform_thickness,
                    floor_row: config.ground_row().saturating_add(1),
                };
                let columns = place_platform(&platform, tiles, rng);
                runs.push(LayerRun {
                    start: cursor,
                    length,
                    kind: RunKind::Platform(columns),
                });
                cursor += length;
            } else {
                let drawn = rng.range_inclusive(config.min_gap_length, config.max_gap_length);
                let length = drawn.min(reach).max(1);
                runs.push(LayerRun {
                    start: cursor,
                    length,
                    kind: RunKind::Gap,
                });
                cursor = cursor.saturating_add(length);
            }
        }

        debug!(row = self.row, runs = runs.len(), "layer swept");
        LayerSummary {
            row: self.row,
            runs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_is_clamped_in_late_years() {
        let config = GenerationConfig {
            platform_density: 0.4,
            chaos_level: 0.5,
            ..GenerationConfig::default()
        };
        assert!((effective_density(&config, 2) - 0.5).abs() < 1e-6);
        assert!((effective_chaos(&config, 2) - 0.7).abs() < 1e-6);
        assert_eq!(effective_density(&config, 40), 1.0);
        assert_eq!(effective_chaos(&config, 40), 1.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GenerationConfig {
            chaos_level: -0.1,
            ..GenerationConfig::default()
        };
        assert!(Terrain::new(config).is_err());
    }
}
