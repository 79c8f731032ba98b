use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use charm_seasons_core::{CellCoord, Season, TileId, TileSink};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "level";
const SNAPSHOT_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Identifier prefix emitted before the season and the encoded payload.
pub const SNAPSHOT_HEADER: &str = "level:v1";

/// Portable copy of a built level: every painted tile plus the charm cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSnapshot {
    /// Season the level was built for.
    pub season: Season,
    /// Painted tiles ordered by row, then column.
    pub tiles: Vec<SnapshotTile>,
    /// Cells occupied by uncollected charms.
    pub charms: Vec<CellCoord>,
}

/// Single painted cell captured within a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTile {
    /// Painted cell.
    pub cell: CellCoord,
    /// Tile stored in the cell.
    pub tile: TileId,
}

#[derive(Serialize, Deserialize)]
struct SerializableSnapshot {
    tiles: Vec<SnapshotTile>,
    charms: Vec<CellCoord>,
}

impl LevelSnapshot {
    /// Captures every tile inside the tilemap bounds.
    #[must_use]
    pub fn capture<T>(tiles: &T, season: Season, charms: &[CellCoord]) -> Self
    where
        T: TileSink + ?Sized,
    {
        let captured = match tiles.bounds() {
            Some(bounds) => (bounds.min().y()..=bounds.max().y())
                .flat_map(|row| {
                    (bounds.min().x()..=bounds.max().x()).map(move |column| CellCoord::new(column, row))
                })
                .filter_map(|cell| tiles.tile(cell).map(|tile| SnapshotTile { cell, tile }))
                .collect(),
            None => Vec::new(),
        };

        Self {
            season,
            tiles: captured,
            charms: charms.to_vec(),
        }
    }

    /// Replaces the contents of `tiles` with the captured level.
    pub fn restore_into<T>(&self, tiles: &mut T)
    where
        T: TileSink + ?Sized,
    {
        tiles.clear_all();
        for entry in &self.tiles {
            tiles.set_tile(entry.cell, entry.tile);
        }
    }

    /// Encodes the snapshot into a single line: `level:v1:<season>:<payload>`.
    pub fn encode(&self) -> Result<String, SnapshotError> {
        let payload = SerializableSnapshot {
            tiles: self.tiles.clone(),
            charms: self.charms.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(SnapshotError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SNAPSHOT_HEADER}:{}:{encoded}", self.season))
    }

    /// Decodes a snapshot from the string produced by [`LevelSnapshot::encode`].
    pub fn decode(value: &str) -> Result<Self, SnapshotError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(SnapshotError::MissingPrefix)?;
        let version = parts.next().ok_or(SnapshotError::MissingVersion)?;
        let season = parts.next().ok_or(SnapshotError::MissingSeason)?;
        let payload = parts.next().ok_or(SnapshotError::MissingPayload)?;
        if parts.next().is_some() {
            return Err(SnapshotError::TrailingSegments);
        }

        if domain != SNAPSHOT_DOMAIN {
            return Err(SnapshotError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version.to_owned()));
        }
        let season =
            Season::from_name(season).ok_or_else(|| SnapshotError::UnknownSeason(season.to_owned()))?;

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SnapshotError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(SnapshotError::InvalidPayload)?;

        Ok(Self {
            season,
            tiles: decoded.tiles,
            charms: decoded.charms,
        })
    }
}

/// Errors that can occur while encoding or decoding level snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The provided string was empty or contained only whitespace.
    #[error("level snapshot was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("level snapshot is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("level snapshot is missing the version")]
    MissingVersion,
    /// The season segment was missing.
    #[error("level snapshot is missing the season")]
    MissingSeason,
    /// The payload segment was missing.
    #[error("level snapshot is missing the payload")]
    MissingPayload,
    /// Extra segments followed the payload.
    #[error("level snapshot has segments after the payload")]
    TrailingSegments,
    /// The prefix segment is not `level`.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment is not supported.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The season segment does not name a season.
    #[error("unknown season '{0}'")]
    UnknownSeason(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}
