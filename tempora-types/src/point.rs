use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A planar point with an optional z coordinate and a spatial reference id.
///
/// `GeoPoint` is the base value of temporal points. Coordinates are treated
/// as Cartesian: interpolation and distance are straight-line.
///
/// # Examples
///
/// ```
/// use tempora_types::GeoPoint;
///
/// let p = GeoPoint::new(1.0, 2.0).with_srid(4326);
/// assert_eq!(p.to_string(), "POINT(1 2)");
///
/// let q: GeoPoint = "POINT Z(0 0 0)".parse().unwrap();
/// assert!(q.has_z());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// The x/y position
    pub point: Point<f64>,
    /// Elevation, present only for 3D points
    pub z: Option<f64>,
    /// Spatial reference id, 0 when unknown
    pub srid: i32,
}

impl GeoPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            point: Point::new(x, y),
            z: None,
            srid: 0,
        }
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self {
            point: Point::new(x, y),
            z: Some(z),
            srid: 0,
        }
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    /// The z coordinate, or 0 for 2D points.
    pub fn z_or_zero(&self) -> f64 {
        self.z.unwrap_or(0.0)
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    /// Project to a 2D `geo` point.
    pub fn to_2d(&self) -> Point<f64> {
        self.point
    }

    /// True when all coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite() && self.z.is_none_or(f64::is_finite)
    }

    /// Euclidean distance, using z when both points carry it.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempora_types::GeoPoint;
    ///
    /// let p1 = GeoPoint::new_3d(0.0, 0.0, 0.0);
    /// let p2 = GeoPoint::new_3d(3.0, 4.0, 12.0);
    /// assert_eq!(p1.distance(&p2), 13.0);
    /// ```
    pub fn distance(&self, other: &GeoPoint) -> f64 {
        match (self.z, other.z) {
            (Some(z1), Some(z2)) => {
                let dx = self.x() - other.x();
                let dy = self.y() - other.y();
                let dz = z1 - z2;
                (dx * dx + dy * dy + dz * dz).sqrt()
            }
            _ => {
                use geo::Distance;
                geo::Euclidean.distance(self.point, other.point)
            }
        }
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        Self {
            point,
            z: None,
            srid: 0,
        }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        point.point
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.z {
            Some(z) => write!(f, "POINT Z({} {} {})", self.x(), self.y(), z),
            None => write!(f, "POINT({} {})", self.x(), self.y()),
        }
    }
}

/// Error returned when a point literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointParseError(String);

impl fmt::Display for PointParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid point literal: {}", self.0)
    }
}

impl std::error::Error for PointParseError {}

impl FromStr for GeoPoint {
    type Err = PointParseError;

    /// Parse `POINT(x y)`, `POINT Z(x y z)` or `POINT(x y z)`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PointParseError(s.to_string());
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let rest = upper.strip_prefix("POINT").ok_or_else(err)?.trim_start();
        let (explicit_z, rest) = match rest.strip_prefix('Z') {
            Some(r) => (true, r.trim_start()),
            None => (false, rest),
        };
        let body = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(err)?;

        let coords = body
            .split_whitespace()
            .map(|c| c.parse::<f64>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;

        match (coords.as_slice(), explicit_z) {
            ([x, y], false) => Ok(GeoPoint::new(*x, *y)),
            ([x, y, z], _) => Ok(GeoPoint::new_3d(*x, *y, *z)),
            _ => Err(err()),
        }
    }
}
