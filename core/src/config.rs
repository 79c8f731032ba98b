use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable parameters driving a single terrain build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Number of columns in the map.
    pub map_width: u32,
    /// Height of the ground strip before the map offset is applied.
    pub base_ground_height: u32,
    /// Offset added to every generated cell.
    pub map_offset: (i32, i32),
    /// Height of the lowest platform layer.
    pub first_layer_height: u32,
    /// Height of the highest platform layer, inclusive.
    pub last_layer_height: u32,
    /// Vertical distance between consecutive layers.
    pub layer_step: u32,
    /// Probability of starting a platform at each cursor position.
    pub platform_density: f32,
    /// Randomness intensity for holes, wiggle and thickness.
    pub chaos_level: f32,
    /// Shortest platform run.
    pub min_platform_length: u32,
    /// Longest platform run.
    pub max_platform_length: u32,
    /// Shortest gap between platforms.
    pub min_gap_length: u32,
    /// Longest gap between platforms.
    pub max_gap_length: u32,
    /// Thickest platform column.
    pub max_platform_thickness: u32,
    /// Columns the player clears in one jump.
    pub max_jump_horizontal: u32,
    /// Rows the player climbs in one jump.
    pub max_jump_vertical: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            map_width: 48,
            base_ground_height: 0,
            map_offset: (0, 0),
            first_layer_height: 4,
            last_layer_height: 16,
            layer_step: 4,
            platform_density: 0.35,
            chaos_level: 0.3,
            min_platform_length: 3,
            max_platform_length: 8,
            min_gap_length: 2,
            max_gap_length: 5,
            max_platform_thickness: 3,
            max_jump_horizontal: 5,
            max_jump_vertical: 4,
        }
    }
}

impl GenerationConfig {
    /// Checks the invariants every build relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.platform_density) {
            return Err(ConfigError::OutOfUnitRange {
                field: "platform_density",
                value: self.platform_density,
            });
        }
        if !(0.0..=1.0).contains(&self.chaos_level) {
            return Err(ConfigError::OutOfUnitRange {
                field: "chaos_level",
                value: self.chaos_level,
            });
        }
        check_range(
            "platform_length",
            self.min_platform_length,
            self.max_platform_length,
        )?;
        check_range("gap_length", self.min_gap_length, self.max_gap_length)?;
        if self.max_platform_length == 0 {
            return Err(ConfigError::Zero("max_platform_length"));
        }
        if self.max_platform_thickness == 0 {
            return Err(ConfigError::Zero("max_platform_thickness"));
        }
        if self.max_jump_horizontal == 0 {
            return Err(ConfigError::Zero("max_jump_horizontal"));
        }
        if self.layer_step == 0 {
            return Err(ConfigError::Zero("layer_step"));
        }
        Ok(())
    }

    /// Columns covered by the map once the offset is applied.
    #[must_use]
    pub const fn map_span(&self) -> MapSpan {
        MapSpan::new(self.map_offset.0, self.map_width)
    }

    /// Row of the ground strip including the map offset.
    #[must_use]
    pub fn ground_row(&self) -> i32 {
        to_row(self.base_ground_height, self.map_offset.1)
    }

    /// Base rows of every platform layer including the map offset, bottom first.
    #[must_use]
    pub fn layer_rows(&self) -> Vec<i32> {
        let step = self.layer_step.max(1) as usize;
        (self.first_layer_height..=self.last_layer_height)
            .step_by(step)
            .map(|height| to_row(height, self.map_offset.1))
            .collect()
    }
}

fn to_row(height: u32, offset: i32) -> i32 {
    i32::try_from(height)
        .unwrap_or(i32::MAX)
        .saturating_add(offset)
}

fn check_range(field: &'static str, min: u32, max: u32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}

/// Horizontal extent of the map expressed in cell columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapSpan {
    first_column: i32,
    width: u32,
}

impl MapSpan {
    /// Creates a span starting at `first_column` covering `width` columns.
    #[must_use]
    pub const fn new(first_column: i32, width: u32) -> Self {
        Self {
            first_column,
            width,
        }
    }

    /// Leftmost column of the map.
    #[must_use]
    pub const fn first_column(&self) -> i32 {
        self.first_column
    }

    /// Number of columns in the map.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Iterates every column from left to right.
    pub fn columns(&self) -> impl Iterator<Item = i32> {
        let first = self.first_column;
        (0..self.width).map(move |index| first.saturating_add_unsigned(index))
    }

    /// Converts a zero-based column index into a cell column.
    #[must_use]
    pub const fn column(&self, index: u32) -> i32 {
        self.first_column.saturating_add_unsigned(index)
    }
}

/// Tuning for scoring, the countdown and charm placement.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionConfig {
    /// Charms required per season before the season advances.
    pub charm_quota: u32,
    /// Charms placed on every freshly built level.
    pub charms_per_level: usize,
    /// Countdown value at the start of a session.
    pub start_time: Duration,
    /// Time added to the countdown on every pickup.
    pub pickup_bonus: Duration,
    /// Volume of the pickup sound effect.
    pub pickup_volume: f32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            charm_quota: 3,
            charms_per_level: 3,
            start_time: Duration::from_secs(60),
            pickup_bonus: Duration::from_secs(10),
            pickup_volume: 0.8,
        }
    }
}

/// Reasons a [`GenerationConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A probability-like field lies outside `[0, 1]`.
    #[error("{field} must lie within [0, 1] (received {value})")]
    OutOfUnitRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A minimum exceeds its maximum.
    #[error("min_{field} ({min}) exceeds max_{field} ({max})")]
    InvertedRange {
        /// Base name of the offending pair.
        field: &'static str,
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
    /// A field that must be positive is zero.
    #[error("{0} must be positive")]
    Zero(&'static str),
}
