//! Tile URL templates.
//!
//! Two URL families exist, selected by the challenge's pano type:
//!
//! - Legacy (photospheres): `https://lh3.ggpht.com/p/{pano}=x{x}-y{y}-z{z}`
//! - Modern (street-level): `https://streetviewpixels-pa.googleapis.com/v1/tile?cb_client=maps_sv.tactile&panoid={pano}&output=tile&x={x}&y={y}&zoom={z}&nbt=1&fover=2`
//!
//! Both base URLs can be replaced, which tests and mirrors rely on.

use crate::challenge::PanoType;
use crate::pyramid::TileCoord;

/// Default base of the legacy tile URL (the panorama id is appended directly).
pub const LEGACY_BASE_URL: &str = "https://lh3.ggpht.com/p/";

/// Default base of the modern tile URL (query parameters are appended).
pub const MODERN_BASE_URL: &str = "https://streetviewpixels-pa.googleapis.com/v1/tile";

/// Builds tile URLs for both pano types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlBuilder {
    legacy_base: String,
    modern_base: String,
}

impl Default for TileUrlBuilder {
    fn default() -> Self {
        Self::new(LEGACY_BASE_URL, MODERN_BASE_URL)
    }
}

impl TileUrlBuilder {
    /// Creates a builder with custom base URLs.
    pub fn new(legacy_base: impl Into<String>, modern_base: impl Into<String>) -> Self {
        Self {
            legacy_base: legacy_base.into(),
            modern_base: modern_base.into(),
        }
    }

    /// Builds the URL of one tile of a panorama.
    pub fn build(&self, pano_type: PanoType, panorama_id: &str, tile: &TileCoord) -> String {
        match pano_type {
            PanoType::Legacy => format!(
                "{}{}=x{}-y{}-z{}",
                self.legacy_base, panorama_id, tile.x, tile.y, tile.zoom
            ),
            PanoType::Modern => format!(
                "{}?cb_client=maps_sv.tactile&panoid={}&output=tile&x={}&y={}&zoom={}&nbt=1&fover=2",
                self.modern_base, panorama_id, tile.x, tile.y, tile.zoom
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_url_construction() {
        let urls = TileUrlBuilder::default();
        let url = urls.build(PanoType::Legacy, "AF1Qabc", &TileCoord::new(3, 1, 2));
        assert_eq!(url, "https://lh3.ggpht.com/p/AF1Qabc=x3-y1-z2");
    }

    #[test]
    fn test_modern_url_construction() {
        let urls = TileUrlBuilder::default();
        let url = urls.build(PanoType::Modern, "abc", &TileCoord::new(1, 0, 1));
        assert_eq!(
            url,
            "https://streetviewpixels-pa.googleapis.com/v1/tile?cb_client=maps_sv.tactile&panoid=abc&output=tile&x=1&y=0&zoom=1&nbt=1&fover=2"
        );
    }

    #[test]
    fn test_custom_bases() {
        let urls = TileUrlBuilder::new("http://localhost/p/", "http://localhost/tile");
        assert_eq!(
            urls.build(PanoType::Legacy, "p1", &TileCoord::new(0, 0, 1)),
            "http://localhost/p/p1=x0-y0-z1"
        );
        assert!(urls
            .build(PanoType::Modern, "p1", &TileCoord::new(0, 0, 1))
            .starts_with("http://localhost/tile?cb_client="));
    }
}
