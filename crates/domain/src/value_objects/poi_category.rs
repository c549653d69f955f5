//! Point-of-interest category value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// OSM `amenity` category used to filter POI discovery
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PoiCategory {
    /// `amenity=cafe`
    #[default]
    Cafe,
    /// `amenity=restaurant`
    Restaurant,
    /// `amenity=hotel`
    Hotel,
    /// `amenity=hospital`
    Hospital,
    /// `amenity=pharmacy`
    Pharmacy,
    /// Any other amenity value, passed through verbatim
    Other(String),
}

impl PoiCategory {
    /// The raw OSM tag value
    #[must_use]
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Cafe => "cafe",
            Self::Restaurant => "restaurant",
            Self::Hotel => "hotel",
            Self::Hospital => "hospital",
            Self::Pharmacy => "pharmacy",
            Self::Other(tag) => tag,
        }
    }

    /// Localized label used when a place has no name of its own
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Cafe => "Quán cà phê",
            Self::Restaurant => "Nhà hàng",
            Self::Hotel => "Khách sạn",
            Self::Hospital => "Bệnh viện",
            Self::Pharmacy => "Nhà thuốc",
            Self::Other(tag) => tag,
        }
    }

    /// Synthesized name for the `ordinal`-th unnamed result (1-based)
    #[must_use]
    pub fn fallback_name(&self, ordinal: usize) -> String {
        format!("{} {ordinal}", self.label())
    }

    /// Whether the tag value is safe to embed in an Overpass query
    #[must_use]
    pub fn is_valid_tag(&self) -> bool {
        let tag = self.as_tag();
        !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}

impl From<&str> for PoiCategory {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "cafe" => Self::Cafe,
            "restaurant" => Self::Restaurant,
            "hotel" => Self::Hotel,
            "hospital" => Self::Hospital,
            "pharmacy" => Self::Pharmacy,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PoiCategory {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<PoiCategory> for String {
    fn from(category: PoiCategory) -> Self {
        category.as_tag().to_string()
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_parse() {
        assert_eq!(PoiCategory::from("cafe"), PoiCategory::Cafe);
        assert_eq!(PoiCategory::from(" Pharmacy "), PoiCategory::Pharmacy);
        assert_eq!(
            PoiCategory::from("library"),
            PoiCategory::Other("library".to_string())
        );
    }

    #[test]
    fn fallback_name_is_one_based() {
        assert_eq!(PoiCategory::Cafe.fallback_name(1), "Quán cà phê 1");
        assert_eq!(PoiCategory::Restaurant.fallback_name(3), "Nhà hàng 3");
    }

    #[test]
    fn unknown_category_uses_raw_tag_as_label() {
        assert_eq!(PoiCategory::from("library").fallback_name(2), "library 2");
    }

    #[test]
    fn tag_validation_rejects_quotes() {
        assert!(PoiCategory::Cafe.is_valid_tag());
        assert!(PoiCategory::from("ice_cream").is_valid_tag());
        assert!(!PoiCategory::Other("cafe\"];out;".to_string()).is_valid_tag());
        assert!(!PoiCategory::Other(String::new()).is_valid_tag());
    }

    #[test]
    fn serde_uses_tag_value() {
        let json = serde_json::to_string(&PoiCategory::Hotel).unwrap();
        assert_eq!(json, "\"hotel\"");
        let parsed: PoiCategory = serde_json::from_str("\"cafe\"").unwrap();
        assert_eq!(parsed, PoiCategory::Cafe);
    }
}
