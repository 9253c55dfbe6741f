use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendVersion {
    /// Glance v1 (visibility expressed as an `is_public` flag)
    #[serde(rename = "1")]
    V1,
    /// Glance v2 (explicit `visibility` field, shared/community images)
    #[serde(rename = "2")]
    V2,
}

impl BackendVersion {
    /// Every supported version, in discovery order.
    pub const ALL: [Self; 2] = [Self::V1, Self::V2];

    /// Parse a version string reported by an image endpoint.
    ///
    /// Only the major component is significant: `"1"`, `"1.0"` and `"v1.1"`
    /// all map to [`BackendVersion::V1`]. Returns `None` for anything else.
    pub fn from_string(s: &str) -> Option<Self> {
        match major_component(s) {
            "1" => Some(Self::V1),
            "2" => Some(Self::V2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "1",
            Self::V2 => "2",
        }
    }

    /// Whether a reported version string belongs to this version.
    pub fn matches(&self, reported: &str) -> bool {
        Self::from_string(reported) == Some(*self)
    }

    /// Visibility values this version can represent
    pub fn visibility_values(&self) -> &'static [&'static str] {
        match self {
            Self::V1 => &["public", "private"],
            Self::V2 => &["public", "private", "shared", "community"],
        }
    }

    /// Check if this version can delete custom properties on update
    pub fn supports_property_removal(&self) -> bool {
        matches!(self, Self::V2)
    }
}

impl fmt::Display for BackendVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_str())
    }
}

fn major_component(reported: &str) -> &str {
    let trimmed = reported.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    trimmed.split('.').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major_versions() {
        assert_eq!(BackendVersion::from_string("1"), Some(BackendVersion::V1));
        assert_eq!(BackendVersion::from_string("1.0"), Some(BackendVersion::V1));
        assert_eq!(BackendVersion::from_string("v1.1"), Some(BackendVersion::V1));
        assert_eq!(BackendVersion::from_string("2"), Some(BackendVersion::V2));
        assert_eq!(BackendVersion::from_string("2.15"), Some(BackendVersion::V2));
        assert_eq!(BackendVersion::from_string(" V2.0 "), Some(BackendVersion::V2));
    }

    #[test]
    fn test_parse_unsupported_versions() {
        assert_eq!(BackendVersion::from_string("3.0"), None);
        assert_eq!(BackendVersion::from_string("10.1"), None);
        assert_eq!(BackendVersion::from_string(""), None);
        assert_eq!(BackendVersion::from_string("latest"), None);
    }

    #[test]
    fn test_matches_is_exclusive() {
        assert!(BackendVersion::V1.matches("1.0"));
        assert!(!BackendVersion::V2.matches("1.0"));
        assert!(BackendVersion::V2.matches("2.0"));
        assert!(!BackendVersion::V1.matches("2.0"));
    }

    #[test]
    fn test_round_trip_conversion() {
        for version in BackendVersion::ALL {
            assert_eq!(BackendVersion::from_string(version.as_str()), Some(version));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(BackendVersion::V1.to_string(), "v1");
        assert_eq!(BackendVersion::V2.to_string(), "v2");
    }

    #[test]
    fn test_v1_cannot_represent_shared_images() {
        assert!(!BackendVersion::V1.visibility_values().contains(&"shared"));
        assert!(BackendVersion::V2.visibility_values().contains(&"shared"));
        assert!(!BackendVersion::V1.supports_property_removal());
        assert!(BackendVersion::V2.supports_property_removal());
    }

    #[test]
    fn test_serde_uses_bare_major_version() {
        let json = serde_json::to_string(&BackendVersion::V2).unwrap();
        assert_eq!(json, "\"2\"");
        let parsed: BackendVersion = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(parsed, BackendVersion::V1);
    }
}
