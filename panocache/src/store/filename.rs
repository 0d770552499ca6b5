//! Tile filename convention.
//!
//! Every tile of a cache entry is stored as `tile_{x}_{y}_{zoom}.jpeg`, for
//! example `tile_3_1_2.jpeg` for x = 3, y = 1 at zoom 2. Anything else in the
//! directory (the `.meta` record, temporary files, stray downloads) is not a
//! tile and is ignored when counting.

use regex::Regex;
use std::sync::OnceLock;

use crate::pyramid::TileCoord;

/// Error parsing a tile filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Filename doesn't match the tile pattern
    InvalidPattern,
    /// X coordinate is out of range
    InvalidX(String),
    /// Y coordinate is out of range
    InvalidY(String),
    /// Zoom level is out of range
    InvalidZoom(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidPattern => write!(f, "Filename doesn't match tile pattern"),
            ParseError::InvalidX(s) => write!(f, "Invalid x coordinate: {}", s),
            ParseError::InvalidY(s) => write!(f, "Invalid y coordinate: {}", s),
            ParseError::InvalidZoom(s) => write!(f, "Invalid zoom level: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Pattern: `tile_<x>_<y>_<zoom>.jpeg`
fn tile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^tile_(\d+)_(\d+)_(\d+)\.jpeg$").unwrap())
}

/// Returns the filename under which a tile is stored.
///
/// ```
/// use panocache::pyramid::TileCoord;
/// use panocache::store::tile_filename;
///
/// assert_eq!(tile_filename(&TileCoord::new(3, 1, 2)), "tile_3_1_2.jpeg");
/// ```
pub fn tile_filename(tile: &TileCoord) -> String {
    format!("tile_{}_{}_{}.jpeg", tile.x, tile.y, tile.zoom)
}

/// Parse a tile filename back into its coordinate.
///
/// # Arguments
///
/// * `filename` - Bare filename (no directory), e.g. "tile_3_1_2.jpeg"
pub fn parse_tile_filename(filename: &str) -> Result<TileCoord, ParseError> {
    let captures = tile_pattern()
        .captures(filename)
        .ok_or(ParseError::InvalidPattern)?;

    let x_str = &captures[1];
    let x = x_str
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidX(x_str.to_string()))?;

    let y_str = &captures[2];
    let y = y_str
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidY(y_str.to_string()))?;

    let zoom_str = &captures[3];
    let zoom = zoom_str
        .parse::<u8>()
        .map_err(|_| ParseError::InvalidZoom(zoom_str.to_string()))?;

    Ok(TileCoord::new(x, y, zoom))
}

/// Check whether a filename follows the tile convention.
pub fn is_tile_filename(filename: &str) -> bool {
    tile_pattern().is_match(filename)
}
