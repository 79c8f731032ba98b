//! Paints a single platform run with chaos-driven holes, wiggle and thickness.

use charm_seasons_core::{CellCoord, RandomSource, TileId, TileSink};

const HOLE_CHANCE: f32 = 0.05;
const WIGGLE_CHANCE: f32 = 0.2;
const THICK_CHANCE: f32 = 0.7;
const WIGGLE_LIMIT: i32 = 2;

/// Parameters describing one platform run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformRun {
    /// Leftmost cell column of the run.
    pub start_column: i32,
    /// Row the run starts on; wiggle stays within two rows of it.
    pub base_row: i32,
    /// Number of columns in the run.
    pub length: u32,
    /// Effective chaos in `[0, 1]`.
    pub chaos: f32,
    /// Tile painted on the top cell of every column.
    pub surface: TileId,
    /// Tile painted below the top cell; the surface tile is reused when absent.
    pub subsurface: Option<TileId>,
    /// Upper bound on column thickness.
    pub max_thickness: u32,
    /// Lowest row the run may paint; wiggle and thickness stop above the ground strip.
    pub floor_row: i32,
}

/// What the placer did with one column of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnOutcome {
    /// The column was left empty.
    Hole {
        /// Cell column of the hole.
        column: i32,
    },
    /// The column was painted downward from `surface_row`.
    Painted {
        /// Cell column that was painted.
        column: i32,
        /// Row of the top tile.
        surface_row: i32,
        /// Number of tiles painted, top included, after stopping at the floor.
        thickness: u32,
    },
}

/// Paints `run` into `tiles`, one independent decision set per column.
pub fn place_platform<T, R>(run: &PlatformRun, tiles: &mut T, rng: &mut R) -> Vec<ColumnOutcome>
where
    T: TileSink + ?Sized,
    R: RandomSource,
{
    let chaos = run.chaos.clamp(0.0, 1.0);
    let lowest = run.base_row.saturating_sub(WIGGLE_LIMIT).max(run.floor_row);
    let highest = run.base_row.saturating_add(WIGGLE_LIMIT).max(lowest);
    let subsurface = run.subsurface.unwrap_or(run.surface);

    let mut row = run.base_row.clamp(lowest, highest);
    let mut outcomes = Vec::with_capacity(run.length as usize);

    for index in 0..run.length {
        let column = run.start_column.saturating_add_unsigned(index);

        if rng.chance(HOLE_CHANCE * chaos) {
            outcomes.push(ColumnOutcome::Hole { column });
            continue;
        }

        if rng.chance(WIGGLE_CHANCE * chaos) {
            let step = if rng.chance(0.5) { 1 } else { -1 };
            row = row.saturating_add(step).clamp(lowest, highest);
        }

        let headroom = u32::try_from(row.saturating_sub(run.floor_row))
            .unwrap_or(0)
            .saturating_add(1);
        let thickness = column_thickness(chaos, run.max_thickness, rng).min(headroom);
        for depth in 0..thickness {
            let tile = if depth == 0 { run.surface } else { subsurface };
            let depth = i32::try_from(depth).unwrap_or(i32::MAX);
            tiles.set_tile(CellCoord::new(column, row.saturating_sub(depth)), tile);
        }

        outcomes.push(ColumnOutcome::Painted {
            column,
            surface_row: row,
            thickness,
        });
    }

    outcomes
}

/// Samples a thickness in `[1, max_thickness]`, skewed toward the maximum as chaos grows.
fn column_thickness<R: RandomSource>(chaos: f32, max_thickness: u32, rng: &mut R) -> u32 {
    let max_thickness = max_thickness.max(1);
    if !rng.chance(THICK_CHANCE * chaos) {
        return 1;
    }

    let skewed = rng.next_unit().powf(1.0 - chaos);
    let extra = (skewed * (max_thickness - 1) as f32).floor() as u32;
    extra.saturating_add(1).clamp(1, max_thickness)
}
