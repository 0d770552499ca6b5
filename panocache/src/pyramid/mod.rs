//! Tile pyramid model
//!
//! A panorama is served as a pyramid of image tiles. Zoom level `z` is a grid
//! of `2^z` columns by `floor(2^(z-1))` rows, so the coarsest level (`z = 0`)
//! has no rows at all and contributes no tiles. Every level above it is twice
//! as wide as it is tall, matching the 2:1 equirectangular panorama.
//!
//! Everything here is pure computation: no I/O, no errors.

mod types;

pub use types::{PyramidIter, TileCoord, MAX_ZOOM};

/// Number of tile columns at the given zoom level.
#[inline]
pub fn columns_at(zoom: u8) -> u32 {
    1u32 << zoom.min(MAX_ZOOM)
}

/// Number of tile rows at the given zoom level.
///
/// Zero at `z = 0`: `2^(0-1)` is one half and the row count is its floor.
#[inline]
pub fn rows_at(zoom: u8) -> u32 {
    match zoom.min(MAX_ZOOM) {
        0 => 0,
        z => 1u32 << (z - 1),
    }
}

/// Total number of tiles in a pyramid of depth `max_zoom`.
///
/// Always equal to the length of [`coordinates`] for the same depth.
/// Depths above [`MAX_ZOOM`] are clamped.
pub fn expected_tile_count(max_zoom: u8) -> u64 {
    (0..=max_zoom.min(MAX_ZOOM))
        .map(|z| columns_at(z) as u64 * rows_at(z) as u64)
        .sum()
}

/// Enumerates every tile coordinate of a pyramid of depth `max_zoom`.
///
/// Coordinates come out ordered by zoom, then x, then y. Each call returns
/// a fresh iterator, so the sequence can be walked as many times as needed.
pub fn coordinates(max_zoom: u8) -> PyramidIter {
    PyramidIter::new(max_zoom.min(MAX_ZOOM))
}
