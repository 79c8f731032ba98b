use charm_seasons_core::{CellBounds, CellCoord, TileId, TileSink};

const AIR: char = '.';
const SURFACE: char = '#';
const DIRT: char = '=';
const CHARM: char = '*';

/// Renders the tilemap as text, top row first.
///
/// Surface tiles draw as `#`, the dirt tile as `=`, charms as `*` and air as
/// `.`. The frame covers the tile bounds grown to include every charm.
#[must_use]
pub fn render_level<T>(tiles: &T, charms: &[CellCoord], dirt: Option<TileId>) -> String
where
    T: TileSink + ?Sized,
{
    let bounds = charms
        .iter()
        .fold(tiles.bounds(), |bounds, cell| {
            Some(match bounds {
                Some(bounds) => bounds.including(*cell),
                None => CellBounds::new(*cell, *cell),
            })
        });
    let Some(bounds) = bounds else {
        return String::new();
    };

    let mut out = String::new();
    for row in (bounds.min().y()..=bounds.max().y()).rev() {
        for column in bounds.min().x()..=bounds.max().x() {
            let cell = CellCoord::new(column, row);
            let glyph = match tiles.tile(cell) {
                Some(tile) if Some(tile) == dirt => DIRT,
                Some(_) => SURFACE,
                None if charms.contains(&cell) => CHARM,
                None => AIR,
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
