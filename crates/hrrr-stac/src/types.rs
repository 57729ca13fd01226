//! Common STAC types used in Collection and Item documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hrrr_common::BoundingBox;
use hrrr_inventory::LayerMap;

/// A link to a related resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// The URI of the linked resource.
    pub href: String,

    /// The relationship type (e.g., "license", "documentation").
    pub rel: String,

    /// The media type of the linked resource.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// A human-readable title for the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    /// Create a new link with required fields.
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            type_: None,
            title: None,
        }
    }

    /// Set the media type.
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Licensor,
    Producer,
    Processor,
    Host,
}

/// An organization that produces or hosts the data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub name: String,
    pub roles: Vec<ProviderRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Provider {
    pub fn new(name: impl Into<String>, roles: Vec<ProviderRole>) -> Self {
        Self {
            name: name.into(),
            roles,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Spatial and temporal extent of a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

/// Temporal extent intervals; `None` marks an open end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<DateTime<Utc>>; 2]>,
}

impl Extent {
    /// Extent covering `bbox` from `start` onwards.
    pub fn open_ended(bbox: &BoundingBox, start: DateTime<Utc>) -> Self {
        Self {
            spatial: SpatialExtent {
                bbox: vec![bbox.to_array()],
            },
            temporal: TemporalExtent {
                interval: vec![[Some(start), None]],
            },
        }
    }
}

/// GeoJSON polygon geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub type_: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl Geometry {
    /// Polygon tracing the edges of a bounding box.
    pub fn from_bbox(bbox: &BoundingBox) -> Self {
        Self {
            type_: "Polygon".to_string(),
            coordinates: vec![bbox.exterior_ring().to_vec()],
        }
    }
}

/// A file referenced by an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub href: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Byte-addressable messages inside a GRIB2 file.
    #[serde(rename = "grib:layers", skip_serializing_if = "Option::is_none")]
    pub grib_layers: Option<LayerMap>,
}

impl Asset {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            type_: None,
            title: None,
            description: None,
            roles: Vec::new(),
            grib_layers: None,
        }
    }

    /// Instantiate an item-asset definition at `href`.
    pub fn from_definition(href: impl Into<String>, definition: &ItemAsset) -> Self {
        Self {
            href: href.into(),
            type_: definition.type_.clone(),
            title: definition.title.clone(),
            description: definition.description.clone(),
            roles: definition.roles.clone(),
            grib_layers: None,
        }
    }

    pub fn with_layers(mut self, layers: LayerMap) -> Self {
        self.grib_layers = Some(layers);
        self
    }
}

/// Asset definition shared by every item in a collection (item-assets extension).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemAsset {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl ItemAsset {
    pub fn new(type_: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            type_: Some(type_.into()),
            title: None,
            description: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_link_serialization() {
        let link = Link::new("https://creativecommons.org/licenses/by/4.0/", "license")
            .with_type("text/html");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "text/html");
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_open_ended_extent() {
        let start = Utc.with_ymd_and_hms(2014, 7, 30, 0, 0, 0).unwrap();
        let extent = Extent::open_ended(&BoundingBox::new(-10.0, -5.0, 10.0, 5.0), start);
        let json = serde_json::to_value(&extent).unwrap();
        assert_eq!(json["temporal"]["interval"][0][0], "2014-07-30T00:00:00Z");
        assert!(json["temporal"]["interval"][0][1].is_null());
        assert_eq!(json["spatial"]["bbox"][0][2], 10.0);
    }

    #[test]
    fn test_geometry_is_closed_polygon() {
        let geometry = Geometry::from_bbox(&BoundingBox::new(0.0, 0.0, 1.0, 2.0));
        let ring = &geometry.coordinates[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_provider_roles_lowercase() {
        let provider = Provider::new("NOAA", vec![ProviderRole::Producer]);
        let json = serde_json::to_value(&provider).unwrap();
        assert_eq!(json["roles"][0], "producer");
    }
}
