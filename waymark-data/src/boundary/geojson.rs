//! GeoJSON boundary documents and country feature selection.
//!
//! Only the members the loader needs are modelled. Unknown members are
//! ignored, so world datasets with rich property tables parse unchanged.

use serde::Deserialize;
use serde_json::{Map, Value};
use waymark_core::{Boundary, BoundaryPolygon, NestedCoordinates, Ring};

use super::SourceError;

/// Property keys checked against the country aliases, in order.
pub const NAME_PROPERTIES: [&str; 6] = ["ADMIN", "admin", "NAME", "name", "ISO_A3", "iso_a3"];

/// Aliases used when none are configured.
pub const DEFAULT_ALIASES: [&str; 3] = ["ukraine", "ukr", "ukraina"];

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection { features: Vec<Feature> },
    Feature(Feature),
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Option<NestedCoordinates>,
}

/// How a feature is picked when no name matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Accept the only feature of a single-feature collection; otherwise a
    /// name match is required. Used for remote documents.
    MatchOrSole,
    /// Prefer a name match and fall back to the first feature. Used for the
    /// bundled local file.
    MatchOrFirst,
}

/// Case-insensitive matcher over a set of country aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryMatcher {
    aliases: Vec<String>,
}

impl Default for CountryMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES)
    }
}

impl CountryMatcher {
    /// Build a matcher; aliases are compared lowercased and trimmed.
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|alias| alias.as_ref().trim().to_lowercase())
                .filter(|alias| !alias.is_empty())
                .collect(),
        }
    }

    /// Normalised aliases.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// `true` when any name property equals one of the aliases.
    pub fn matches(&self, properties: &Map<String, Value>) -> bool {
        NAME_PROPERTIES
            .iter()
            .filter_map(|key| properties.get(*key).and_then(Value::as_str))
            .map(|value| value.trim().to_lowercase())
            .any(|value| self.aliases.iter().any(|alias| *alias == value))
    }

    fn matches_feature(&self, feature: &Feature) -> bool {
        feature
            .properties
            .as_ref()
            .is_some_and(|properties| self.matches(properties))
    }
}

/// Parse a GeoJSON document and extract the country boundary from it.
///
/// `origin` names the URL or path in error messages.
///
/// # Examples
/// ```
/// use waymark_data::boundary::{CountryMatcher, Selection, parse_boundary};
///
/// let text = r#"{
///   "type": "Feature",
///   "properties": { "ADMIN": "Ukraine" },
///   "geometry": {
///     "type": "Polygon",
///     "coordinates": [[[22, 44], [41, 44], [41, 53], [22, 53], [22, 44]]]
///   }
/// }"#;
/// let boundary = parse_boundary(text, "inline", &CountryMatcher::default(), Selection::MatchOrSole)?;
/// assert!(boundary.contains_lat_lng(50.45, 30.52)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_boundary(
    text: &str,
    origin: &str,
    matcher: &CountryMatcher,
    selection: Selection,
) -> Result<Boundary, SourceError> {
    let document: Document = serde_json::from_str(text).map_err(|err| SourceError::Parse {
        origin: origin.to_owned(),
        message: err.to_string(),
    })?;
    let feature = select_feature(document, matcher, selection).ok_or_else(|| {
        SourceError::NoMatchingFeature {
            origin: origin.to_owned(),
        }
    })?;
    feature_to_boundary(feature, origin)
}

fn select_feature(
    document: Document,
    matcher: &CountryMatcher,
    selection: Selection,
) -> Option<Feature> {
    match document {
        Document::Feature(feature) => match selection {
            Selection::MatchOrSole => matcher.matches_feature(&feature).then_some(feature),
            Selection::MatchOrFirst => Some(feature),
        },
        Document::FeatureCollection { mut features } => {
            if selection == Selection::MatchOrSole && features.len() == 1 {
                return features.pop();
            }
            match features
                .iter()
                .position(|feature| matcher.matches_feature(feature))
            {
                Some(index) => Some(features.swap_remove(index)),
                None if selection == Selection::MatchOrFirst => features.into_iter().next(),
                None => None,
            }
        }
    }
}

fn feature_to_boundary(feature: Feature, origin: &str) -> Result<Boundary, SourceError> {
    let invalid = |message: String| SourceError::InvalidGeometry {
        origin: origin.to_owned(),
        message,
    };
    let name = feature_name(feature.properties.as_ref());
    let geometry = feature
        .geometry
        .ok_or_else(|| invalid("feature has no geometry".to_owned()))?;
    let coordinates = geometry
        .coordinates
        .ok_or_else(|| invalid(format!("{} geometry has no coordinates", geometry.kind)))?;

    let polygons: Vec<Result<BoundaryPolygon, String>> = match geometry.kind.as_str() {
        "Polygon" => vec![polygon_from(&coordinates)],
        "MultiPolygon" => coordinates.children().iter().map(polygon_from).collect(),
        other => return Err(invalid(format!("unsupported geometry type {other}"))),
    };
    let polygons = polygons
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid)?;

    Boundary::new(name, polygons).map_err(|err| invalid(err.to_string()))
}

fn feature_name(properties: Option<&Map<String, Value>>) -> String {
    properties
        .and_then(|properties| {
            NAME_PROPERTIES
                .iter()
                .find_map(|key| properties.get(*key).and_then(Value::as_str))
        })
        .unwrap_or("boundary")
        .to_owned()
}

/// Build one polygon from `[exterior, hole, ...]` ring arrays.
fn polygon_from(coordinates: &NestedCoordinates) -> Result<BoundaryPolygon, String> {
    let mut rings = coordinates.children().iter().map(ring_from);
    let exterior = rings
        .next()
        .ok_or_else(|| "polygon has no rings".to_owned())??;
    let holes = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(BoundaryPolygon { exterior, holes })
}

fn ring_from(coordinates: &NestedCoordinates) -> Result<Ring, String> {
    let vertices = coordinates
        .children()
        .iter()
        .map(|position| {
            position
                .as_coord()
                .ok_or_else(|| "ring contains a malformed position".to_owned())
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ring::new(vertices).map_err(|err| err.to_string())
}
