//! Pyramid type definitions

use std::fmt;

use super::{columns_at, expected_tile_count, rows_at};

/// Deepest pyramid level supported.
///
/// Street-level panoramas top out around zoom 5. Depth 8 is already
/// 43,690 tiles per challenge.
pub const MAX_ZOOM: u8 = 8;

/// Position of one tile inside a panorama pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Zoom level (pyramid depth of this tile)
    pub zoom: u8,
    /// Column, 0 at the left edge of the panorama
    pub x: u32,
    /// Row, 0 at the top edge of the panorama
    pub y: u32,
}

impl TileCoord {
    /// Creates a tile coordinate.
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { zoom, x, y }
    }

    /// Returns true if this coordinate lies inside a pyramid of depth `max_zoom`.
    pub fn is_within(&self, max_zoom: u8) -> bool {
        self.zoom <= max_zoom.min(super::MAX_ZOOM)
            && self.x < columns_at(self.zoom)
            && self.y < rows_at(self.zoom)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.zoom)
    }
}

/// Iterator over all tiles of a pyramid.
///
/// Yields tiles zoom by zoom, column by column, row by row.
#[derive(Debug, Clone)]
pub struct PyramidIter {
    max_zoom: u8,
    zoom: u8,
    x: u32,
    y: u32,
    remaining: u64,
}

impl PyramidIter {
    pub(super) fn new(max_zoom: u8) -> Self {
        Self {
            max_zoom,
            zoom: 0,
            x: 0,
            y: 0,
            remaining: expected_tile_count(max_zoom),
        }
    }
}

impl Iterator for PyramidIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.zoom > self.max_zoom {
                return None;
            }

            if self.x >= columns_at(self.zoom) || self.y >= rows_at(self.zoom) {
                // Level exhausted (or empty, as at zoom 0)
                self.zoom += 1;
                self.x = 0;
                self.y = 0;
                continue;
            }

            let tile = TileCoord::new(self.x, self.y, self.zoom);

            self.y += 1;
            if self.y >= rows_at(self.zoom) {
                self.y = 0;
                self.x += 1;
            }

            self.remaining -= 1;
            return Some(tile);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PyramidIter {
    fn len(&self) -> usize {
        self.remaining as usize
    }
}

impl std::iter::FusedIterator for PyramidIter {}
