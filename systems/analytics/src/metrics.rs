use std::{collections::VecDeque, ops::RangeInclusive};

use charm_seasons_core::{CellCoord, GenerationConfig, LayerReport, LevelReport, TileSink};

const BAND_REACH: i32 = 2;

/// Computes coverage statistics and the reachability audit for the level in `tiles`.
pub fn analyze_level<T>(tiles: &T, config: &GenerationConfig) -> LevelReport
where
    T: TileSink + ?Sized,
{
    analyze_with(tiles, config, &mut VecDeque::new())
}

/// Cells holding a tile with air directly above, ordered by column then row.
///
/// Only columns inside the configured map span are inspected.
pub fn standable_surfaces<T>(tiles: &T, config: &GenerationConfig) -> Vec<CellCoord>
where
    T: TileSink + ?Sized,
{
    let rows = occupied_rows(tiles);
    config
        .map_span()
        .columns()
        .flat_map(|column| {
            rows.clone()
                .map(move |row| CellCoord::new(column, row))
                .filter(move |cell| tiles.has_tile(*cell) && !tiles.has_tile(cell.above()))
        })
        .collect()
}

pub(crate) fn analyze_with<T>(
    tiles: &T,
    config: &GenerationConfig,
    frontier: &mut VecDeque<usize>,
) -> LevelReport
where
    T: TileSink + ?Sized,
{
    let span = config.map_span();
    let ground_row = config.ground_row();
    let rows = occupied_rows(tiles);

    let ground_columns = span
        .columns()
        .filter(|column| tiles.has_tile(CellCoord::new(*column, ground_row)))
        .count();
    let platform_tiles = span
        .columns()
        .flat_map(|column| {
            rows.clone()
                .filter(move |row| *row != ground_row)
                .map(move |row| CellCoord::new(column, row))
        })
        .filter(|cell| tiles.has_tile(*cell))
        .count();

    let surfaces = standable_surfaces(tiles, config);
    let reached = reachable_from_ground(&surfaces, ground_row, config, frontier);

    let layers = config
        .layer_rows()
        .into_iter()
        .map(|row| {
            let band = layer_band(row);
            let in_band = |cell: &CellCoord| band.contains(&cell.y()) && cell.y() != ground_row;
            let coverage: Vec<bool> = span
                .columns()
                .map(|column| {
                    band.clone()
                        .map(|y| CellCoord::new(column, y))
                        .any(|cell| in_band(&cell) && tiles.has_tile(cell))
                })
                .collect();
            let reachable = surfaces
                .iter()
                .zip(&reached)
                .any(|(cell, hit)| *hit && in_band(cell));

            LayerReport {
                height: row,
                covered_columns: to_u32(coverage.iter().filter(|hit| **hit).count()),
                longest_run: longest_streak(&coverage, true),
                longest_gap: longest_streak(&coverage, false),
                reachable,
            }
        })
        .collect();

    LevelReport {
        ground_columns: to_u32(ground_columns),
        platform_tiles: to_u32(platform_tiles),
        layers,
        total_surfaces: to_u32(surfaces.len()),
        reachable_surfaces: to_u32(reached.iter().filter(|hit| **hit).count()),
    }
}

/// Breadth-first search over standable surfaces seeded from the ground row.
fn reachable_from_ground(
    surfaces: &[CellCoord],
    ground_row: i32,
    config: &GenerationConfig,
    frontier: &mut VecDeque<usize>,
) -> Vec<bool> {
    let mut reached = vec![false; surfaces.len()];
    frontier.clear();

    for (index, surface) in surfaces.iter().enumerate() {
        if surface.y() == ground_row {
            reached[index] = true;
            frontier.push_back(index);
        }
    }

    while let Some(current) = frontier.pop_front() {
        let from = surfaces[current];
        for (index, to) in surfaces.iter().enumerate() {
            if reached[index] || !can_hop(from, *to, config) {
                continue;
            }
            reached[index] = true;
            frontier.push_back(index);
        }
    }

    reached
}

fn can_hop(from: CellCoord, to: CellCoord, config: &GenerationConfig) -> bool {
    let dx = (i64::from(to.x()) - i64::from(from.x())).abs();
    let rise = i64::from(to.y()) - i64::from(from.y());
    dx <= i64::from(config.max_jump_horizontal) && rise <= i64::from(config.max_jump_vertical)
}

fn layer_band(row: i32) -> RangeInclusive<i32> {
    row.saturating_sub(BAND_REACH)..=row.saturating_add(BAND_REACH)
}

fn occupied_rows<T>(tiles: &T) -> RangeInclusive<i32>
where
    T: TileSink + ?Sized,
{
    match tiles.bounds() {
        Some(bounds) => bounds.min().y()..=bounds.max().y(),
        #[allow(clippy::reversed_empty_ranges)]
        None => 1..=0,
    }
}

fn longest_streak(values: &[bool], wanted: bool) -> u32 {
    let mut best = 0_u32;
    let mut current = 0_u32;
    for value in values {
        if *value == wanted {
            current = current.saturating_add(1);
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

fn to_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
