use std::collections::BTreeMap;

use charm_seasons_core::{CellBounds, CellCoord, TileId, TileSink};
use glam::Vec2;

/// Sparse in-memory tilemap keyed by cell coordinate.
///
/// Absent cells are air. Bounds are tracked incrementally while painting and
/// recomputed only when the map is cleared.
#[derive(Clone, Debug)]
pub struct SparseTilemap {
    tiles: BTreeMap<CellCoord, TileId>,
    bounds: Option<CellBounds>,
    origin: Vec2,
    cell_size: f32,
}

impl Default for SparseTilemap {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0)
    }
}

impl SparseTilemap {
    /// Creates an empty tilemap whose cell `(0, 0)` sits at `origin`.
    #[must_use]
    pub fn new(origin: Vec2, cell_size: f32) -> Self {
        Self {
            tiles: BTreeMap::new(),
            bounds: None,
            origin,
            cell_size,
        }
    }

    /// Number of painted tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether no tile is painted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterates painted tiles ordered by column, then row.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TileId)> + '_ {
        self.tiles.iter().map(|(cell, tile)| (*cell, *tile))
    }
}

impl TileSink for SparseTilemap {
    fn set_tile(&mut self, cell: CellCoord, tile: TileId) {
        let _ = self.tiles.insert(cell, tile);
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.including(cell),
            None => CellBounds::new(cell, cell),
        });
    }

    fn clear_all(&mut self) {
        self.tiles.clear();
        self.bounds = None;
    }

    fn tile(&self, cell: CellCoord) -> Option<TileId> {
        self.tiles.get(&cell).copied()
    }

    fn bounds(&self) -> Option<CellBounds> {
        self.bounds
    }

    fn cell_to_world(&self, cell: CellCoord) -> Vec2 {
        self.origin + Vec2::new(cell.x() as f32, cell.y() as f32) * self.cell_size
    }
}
