//! Challenge definitions.
//!
//! A challenge is one panorama the game asks players to locate. The tile
//! pipeline only needs the fields that decide what to download and where to
//! put it; everything else in the compiled challenge map (flags, display
//! hints) is ignored.

mod catalog;

pub use catalog::{ChallengeCatalog, ChallengeError};

use std::fmt;

use serde::Deserialize;

/// Tile-URL scheme required by a panorama id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawPanoType")]
pub enum PanoType {
    /// User-contributed photospheres served from the static image host.
    Legacy,
    /// Official street-level imagery served from the tile API.
    Modern,
}

impl PanoType {
    /// Numeric code used by the compiled challenge map.
    pub fn code(&self) -> u8 {
        match self {
            PanoType::Legacy => 0,
            PanoType::Modern => 1,
        }
    }
}

impl fmt::Display for PanoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanoType::Legacy => write!(f, "legacy"),
            PanoType::Modern => write!(f, "modern"),
        }
    }
}

/// Wire forms accepted for `panoType`: `0`/`1` or `"legacy"`/`"modern"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPanoType {
    Code(u8),
    Name(String),
}

impl TryFrom<RawPanoType> for PanoType {
    type Error = String;

    fn try_from(raw: RawPanoType) -> Result<Self, Self::Error> {
        match raw {
            RawPanoType::Code(code) => [PanoType::Legacy, PanoType::Modern]
                .into_iter()
                .find(|pano_type| pano_type.code() == code)
                .ok_or_else(|| format!("unknown panoType code {}", code)),
            RawPanoType::Name(name) => match name.to_lowercase().as_str() {
                "legacy" => Ok(PanoType::Legacy),
                "modern" => Ok(PanoType::Modern),
                _ => Err(format!("unknown panoType '{}'", name)),
            },
        }
    }
}

/// Identity of a challenge: compartment plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChallengeKey {
    pub compartment: String,
    pub name: String,
}

impl ChallengeKey {
    pub fn new(compartment: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            compartment: compartment.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ChallengeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.compartment, self.name)
    }
}

/// One panorama whose tile pyramid should be cached locally.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    /// Grouping key (first path segment of the cache entry)
    pub compartment: String,
    /// Display name, unique within the compartment; may contain spaces
    pub name: String,
    /// URL scheme for this panorama
    pub pano_type: PanoType,
    /// Upstream panorama id; `None` means the challenge cannot be fetched
    pub panorama_id: Option<String>,
    /// Latitude of the panorama, copied into the cache metadata
    pub lat: f64,
    /// Longitude of the panorama, copied into the cache metadata
    pub lng: f64,
    /// Pyramid depth
    pub max_zoom: u8,
}

impl Challenge {
    /// Creates a challenge without a panorama id at `(0, 0)`.
    pub fn new(
        compartment: impl Into<String>,
        name: impl Into<String>,
        pano_type: PanoType,
        max_zoom: u8,
    ) -> Self {
        Self {
            compartment: compartment.into(),
            name: name.into(),
            pano_type,
            panorama_id: None,
            lat: 0.0,
            lng: 0.0,
            max_zoom,
        }
    }

    /// Sets the upstream panorama id.
    pub fn with_panorama(mut self, panorama_id: impl Into<String>) -> Self {
        self.panorama_id = Some(panorama_id.into());
        self
    }

    /// Sets the panorama location.
    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.lat = lat;
        self.lng = lng;
        self
    }

    /// Returns the compartment/name key of this challenge.
    pub fn key(&self) -> ChallengeKey {
        ChallengeKey::new(&self.compartment, &self.name)
    }

    /// Filesystem and URL safe form of the name.
    pub fn dir_name(&self) -> String {
        sanitize_name(&self.name)
    }
}

/// Normalizes a challenge name for use as a path or route segment.
///
/// Every run of whitespace becomes a single underscore.
///
/// ```
/// use panocache::challenge::sanitize_name;
///
/// assert_eq!(sanitize_name("Eiffel  Tower"), "Eiffel_Tower");
/// ```
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Whether `segment` names exactly one directory below its parent.
pub(crate) fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("plain"), "plain");
        assert_eq!(sanitize_name("two words"), "two_words");
        assert_eq!(sanitize_name("tabs\tand  spaces"), "tabs_and_spaces");
        assert_eq!(sanitize_name(" edge "), "_edge_");
    }

    #[test]
    fn test_is_path_segment() {
        assert!(is_path_segment("europe"));
        assert!(is_path_segment("Old_Town"));
        assert!(is_path_segment("..dots"));
        assert!(!is_path_segment(""));
        assert!(!is_path_segment("."));
        assert!(!is_path_segment(".."));
        assert!(!is_path_segment("a/b"));
        assert!(!is_path_segment("a\\b"));
    }

    #[test]
    fn test_pano_type_codes() {
        assert_eq!(PanoType::Legacy.code(), 0);
        assert_eq!(PanoType::Modern.code(), 1);
        assert_eq!(PanoType::Modern.to_string(), "modern");
    }

    #[test]
    fn test_pano_type_from_json() {
        let legacy: PanoType = serde_json::from_str("0").unwrap();
        let modern: PanoType = serde_json::from_str("\"Modern\"").unwrap();
        assert_eq!(legacy, PanoType::Legacy);
        assert_eq!(modern, PanoType::Modern);

        assert!(serde_json::from_str::<PanoType>("7").is_err());
        assert!(serde_json::from_str::<PanoType>("\"sideways\"").is_err());
    }

    #[test]
    fn test_challenge_key_display() {
        let key = ChallengeKey::new("europe", "Old Town");
        assert_eq!(key.to_string(), "europe/Old Town");
    }

    #[test]
    fn test_dir_name_uses_sanitized_name() {
        let challenge = Challenge {
            compartment: "europe".to_string(),
            name: "Old Town".to_string(),
            pano_type: PanoType::Modern,
            panorama_id: Some("abc".to_string()),
            lat: 0.0,
            lng: 0.0,
            max_zoom: 1,
        };
        assert_eq!(challenge.dir_name(), "Old_Town");
        assert_eq!(challenge.key(), ChallengeKey::new("europe", "Old Town"));
    }
}
