use crate::error::MeridianTypesError;
use crate::geo::datum::Datum;
use crate::geo::point::GeoPoint2d;
use crate::geo::projection::{LonLat, Projection, WebMercator};
use crate::point::Point2d;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Coordinate reference system.
///
/// A CRS is parsed from its textual definition. Recognized forms are `EPSG:4326`, `EPSG:3857` (and its legacy
/// alias `EPSG:900913`), `+init=epsg:<code>` and PROJ-style `+proj=...` strings. Projections other than geographic
/// coordinates and Web Mercator are kept as [`ProjectionType::Other`] and can only be used when the `geodesy`
/// feature is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs {
    datum: Datum,
    projection_type: ProjectionType,
}

/// Method of projecting geographic coordinates onto a plane.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProjectionType {
    /// Geographic coordinates: x is longitude and y is latitude, both in degrees.
    LonLat,
    /// Spherical Mercator used by most web maps.
    WebMercator,
    /// Any other projection, stored as a PROJ-like definition without `+` prefixes.
    Other(String),
}

impl Crs {
    /// Geographic coordinates on WGS84 ellipsoid.
    pub const WGS84: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::LonLat,
    };

    /// Web Mercator projection.
    pub const EPSG3857: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::WebMercator,
    };

    /// Creates a new CRS.
    pub fn new(datum: Datum, projection_type: ProjectionType) -> Self {
        Self {
            datum,
            projection_type,
        }
    }

    /// Projection method of the CRS.
    pub fn projection_type(&self) -> &ProjectionType {
        &self.projection_type
    }

    /// Reference ellipsoid of the CRS.
    pub fn datum(&self) -> Datum {
        self.datum
    }

    /// Returns true if coordinates in this CRS are degrees of longitude and latitude.
    pub fn is_geographic(&self) -> bool {
        matches!(self.projection_type, ProjectionType::LonLat)
    }

    /// Returns projection from geographic coordinates into this CRS.
    pub fn get_projection(
        &self,
    ) -> Result<Box<dyn Projection<InPoint = GeoPoint2d, OutPoint = Point2d>>, MeridianTypesError>
    {
        match &self.projection_type {
            ProjectionType::LonLat => Ok(Box::new(LonLat)),
            ProjectionType::WebMercator => Ok(Box::new(WebMercator::new(self.datum))),
            ProjectionType::Other(definition) => other_projection(definition),
        }
    }
}

#[cfg(feature = "geodesy")]
fn other_projection(
    definition: &str,
) -> Result<Box<dyn Projection<InPoint = GeoPoint2d, OutPoint = Point2d>>, MeridianTypesError> {
    crate::geo::projection::GeodesyProjection::new(definition)
        .map(|p| Box::new(p) as Box<dyn Projection<InPoint = GeoPoint2d, OutPoint = Point2d>>)
        .ok_or_else(|| MeridianTypesError::ProjectionUnavailable(definition.to_string()))
}

#[cfg(not(feature = "geodesy"))]
fn other_projection(
    definition: &str,
) -> Result<Box<dyn Projection<InPoint = GeoPoint2d, OutPoint = Point2d>>, MeridianTypesError> {
    Err(MeridianTypesError::ProjectionUnavailable(
        definition.to_string(),
    ))
}

impl FromStr for Crs {
    type Err = MeridianTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let code = normalized
            .strip_prefix("epsg:")
            .or_else(|| normalized.strip_prefix("+init=epsg:"));

        if let Some(code) = code {
            return match code {
                "4326" => Ok(Self::WGS84),
                "3857" | "900913" => Ok(Self::EPSG3857),
                _ => Err(MeridianTypesError::UnknownCrs(s.to_string())),
            };
        }

        if normalized == "wgs84" {
            return Ok(Self::WGS84);
        }

        if !normalized.starts_with("+proj=") {
            return Err(MeridianTypesError::UnknownCrs(s.to_string()));
        }

        let definition = s
            .split_whitespace()
            .map(|token| token.trim_start_matches('+'))
            .map(|token| token.strip_prefix("proj=").unwrap_or(token))
            .collect::<Vec<_>>()
            .join(" ");

        let projection_type = match definition.split_whitespace().next() {
            Some("longlat") | Some("latlong") | Some("lonlat") => ProjectionType::LonLat,
            Some("merc") if is_spherical(&definition) => ProjectionType::WebMercator,
            _ => ProjectionType::Other(definition),
        };

        Ok(Self::new(Datum::WGS84, projection_type))
    }
}

fn is_spherical(definition: &str) -> bool {
    definition
        .split_whitespace()
        .any(|token| token == "a=6378137" || token == "r=6378137")
}

impl TryFrom<String> for Crs {
    type Error = MeridianTypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.to_string()
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.projection_type {
            ProjectionType::LonLat => write!(f, "EPSG:4326"),
            ProjectionType::WebMercator => write!(f, "EPSG:3857"),
            ProjectionType::Other(definition) => {
                let mut tokens = definition.split_whitespace();
                if let Some(name) = tokens.next() {
                    write!(f, "+proj={name}")?;
                }
                for token in tokens {
                    write!(f, " +{token}")?;
                }
                Ok(())
            }
        }
    }
}
