//! Base value domains of temporal values.
//!
//! Every temporal type is generic over a [`BaseValue`]. The trait carries the
//! domain-specific pieces the temporal algorithms need: the type tag, whether
//! linear interpolation is meaningful, the interpolation blend itself, the
//! solvers used for crossings and value restriction, and text I/O.
use crate::boxes::{STBox, TBox, TemporalBox};
use crate::error::{Result, TemporaError};
use crate::io::text::TextParser;
use crate::time::Period;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tempora_types::{GeoPoint, NPoint};

/// Tolerance used by collinearity and crossing tests.
pub const EPSILON: f64 = 1.0e-6;

/// Identifies the value domain of a temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    Bool,
    Int,
    Float,
    Text,
    GeomPoint,
    NPoint,
    Double2,
    Double3,
    Double4,
}

impl BaseType {
    /// Name of the temporal type built over this domain.
    pub fn temporal_name(&self) -> &'static str {
        match self {
            BaseType::Bool => "tbool",
            BaseType::Int => "tint",
            BaseType::Float => "tfloat",
            BaseType::Text => "ttext",
            BaseType::GeomPoint => "tgeompoint",
            BaseType::NPoint => "tnpoint",
            BaseType::Double2 => "tdouble2",
            BaseType::Double3 => "tdouble3",
            BaseType::Double4 => "tdouble4",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.temporal_name())
    }
}

/// A value domain that temporal values can range over.
pub trait BaseValue:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const BASE_TYPE: BaseType;

    /// Whether linear interpolation is meaningful for the domain.
    const CONTINUOUS: bool;

    /// Bounding box kept by sequences of this domain.
    type BBox: TemporalBox<Self>;

    /// Reject values that can never take part in a temporal value, such as NaN.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Check that two values may appear in the same temporal value or be
    /// combined by an operation.
    fn ensure_compatible(&self, _other: &Self) -> Result<()> {
        Ok(())
    }

    /// Check that a linear segment may join the two values.
    fn ensure_linear_segment(&self, _end: &Self) -> Result<()> {
        Ok(())
    }

    /// Value at `fraction` of the linear segment from `self` to `end`.
    fn interpolate(&self, _end: &Self, _fraction: f64) -> Self {
        self.clone()
    }

    /// Fraction strictly inside `(0, 1)` at which the linear segment from
    /// `self` to `end` takes `value`. Endpoint matches are left to the caller.
    fn locate(&self, _end: &Self, _value: &Self) -> Option<f64> {
        None
    }

    /// Fraction strictly inside `(0, 1)` at which two synchronized linear
    /// segments take the same value.
    fn crossing(_start1: &Self, _end1: &Self, _start2: &Self, _end2: &Self) -> Option<f64> {
        None
    }

    /// Whether `mid` lies on the linear segment from `start` to `end` at
    /// `fraction`.
    fn collinear(start: &Self, mid: &Self, end: &Self, fraction: f64) -> bool {
        let _ = fraction;
        start == mid && mid == end
    }

    fn write_text(&self, out: &mut String);

    fn read_text(parser: &mut TextParser<'_>) -> Result<Self>;

    fn srid(&self) -> i32 {
        0
    }

    fn set_srid(&mut self, _srid: i32) {}
}

/// Domains with a total order usable for min/max and ordered comparisons.
pub trait OrderedValue: BaseValue + PartialOrd {}

/// Numeric domains.
pub trait NumericValue: OrderedValue + Copy {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

fn locate_scalar(start: f64, end: f64, value: f64) -> Option<f64> {
    if value == start || value == end {
        return None;
    }
    let (min, max) = if start < end { (start, end) } else { (end, start) };
    if value < min || value > max {
        return None;
    }
    let fraction = (value - start) / (end - start);
    (fraction > 0.0 && fraction < 1.0).then_some(fraction)
}

fn crossing_scalar(x1: f64, x2: f64, x3: f64, x4: f64) -> Option<f64> {
    let denum = x2 - x1 - x4 + x3;
    if denum == 0.0 {
        return None;
    }
    let fraction = (x3 - x1) / denum;
    (fraction > 0.0 && fraction < 1.0).then_some(fraction)
}

impl BaseValue for bool {
    const BASE_TYPE: BaseType = BaseType::Bool;
    const CONTINUOUS: bool = false;
    type BBox = Period;

    fn write_text(&self, out: &mut String) {
        out.push(if *self { 't' } else { 'f' });
    }

    fn read_text(parser: &mut TextParser<'_>) -> Result<Self> {
        let position = parser.position();
        let token = parser.take_token()?;
        match token.to_ascii_lowercase().as_str() {
            "t" | "true" => Ok(true),
            "f" | "false" => Ok(false),
            _ => Err(TemporaError::parse(
                position,
                format!("invalid boolean '{}'", token),
            )),
        }
    }
}

impl OrderedValue for bool {}

impl BaseValue for i32 {
    const BASE_TYPE: BaseType = BaseType::Int;
    const CONTINUOUS: bool = false;
    type BBox = TBox;

    fn write_text(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }

    fn read_text(parser: &mut TextParser<'_>) -> Result<Self> {
        let position = parser.position();
        let token = parser.take_token()?;
        token
            .parse::<i32>()
            .map_err(|_| TemporaError::parse(position, format!("invalid integer '{}'", token)))
    }
}

impl OrderedValue for i32 {}

impl NumericValue for i32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round() as i32
    }
}

impl BaseValue for f64 {
    const BASE_TYPE: BaseType = BaseType::Float;
    const CONTINUOUS: bool = true;
    type BBox = TBox;

    fn validate(&self) -> Result<()> {
        if self.is_nan() {
            return Err(TemporaError::invalid("NaN is not a valid float value"));
        }
        Ok(())
    }

    fn interpolate(&self, end: &Self, fraction: f64) -> Self {
        self + (end - self) * fraction
    }

    fn locate(&self, end: &Self, value: &Self) -> Option<f64> {
        locate_scalar(*self, *end, *value)
    }

    fn crossing(start1: &Self, end1: &Self, start2: &Self, end2: &Self) -> Option<f64> {
        crossing_scalar(*start1, *end1, *start2, *end2)
    }

    fn collinear(start: &Self, mid: &Self, end: &Self, fraction: f64) -> bool {
        (mid - start.interpolate(end, fraction)).abs() <= EPSILON
    }

    fn write_text(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }

    fn read_text(parser: &mut TextParser<'_>) -> Result<Self> {
        let position = parser.position();
        let token = parser.take_token()?;
        token
            .parse::<f64>()
            .map_err(|_| TemporaError::parse(position, format!("invalid float '{}'", token)))
    }
}

impl OrderedValue for f64 {}

impl NumericValue for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

impl BaseValue for String {
    const BASE_TYPE: BaseType = BaseType::Text;
    const CONTINUOUS: bool = false;
    type BBox = Period;

    fn write_text(&self, out: &mut String) {
        out.push('"');
        for c in self.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }

    fn read_text(parser: &mut TextParser<'_>) -> Result<Self> {
        if parser.peek() == Some('"') {
            return parser.take_quoted();
        }
        Ok(parser.take_token()?.to_string())
    }
}

impl OrderedValue for String {}

fn point_coords(p: &GeoPoint) -> [f64; 3] {
    [p.x(), p.y(), p.z_or_zero()]
}

impl BaseValue for GeoPoint {
    const BASE_TYPE: BaseType = BaseType::GeomPoint;
    const CONTINUOUS: bool = true;
    type BBox = STBox;

    fn validate(&self) -> Result<()> {
        if !self.is_finite() {
            return Err(TemporaError::invalid(format!(
                "point coordinates must be finite: {}",
                self
            )));
        }
        Ok(())
    }

    fn ensure_compatible(&self, other: &Self) -> Result<()> {
        if self.srid != other.srid {
            return Err(TemporaError::invalid(format!(
                "operation on mixed SRID: {} and {}",
                self.srid, other.srid
            )));
        }
        if self.has_z() != other.has_z() {
            return Err(TemporaError::invalid(
                "operation on mixed 2D/3D dimensions",
            ));
        }
        Ok(())
    }

    fn interpolate(&self, end: &Self, fraction: f64) -> Self {
        let x = self.x() + (end.x() - self.x()) * fraction;
        let y = self.y() + (end.y() - self.y()) * fraction;
        let mut point = match (self.z, end.z) {
            (Some(z1), Some(z2)) => GeoPoint::new_3d(x, y, z1 + (z2 - z1) * fraction),
            _ => GeoPoint::new(x, y),
        };
        point.srid = self.srid;
        point
    }

    fn locate(&self, end: &Self, value: &Self) -> Option<f64> {
        if value == self || value == end {
            return None;
        }
        let a = point_coords(self);
        let b = point_coords(end);
        let p = point_coords(value);
        let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let len2 = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];
        if len2 == 0.0 {
            return None;
        }
        let fraction =
            ((p[0] - a[0]) * d[0] + (p[1] - a[1]) * d[1] + (p[2] - a[2]) * d[2]) / len2;
        if fraction <= 0.0 || fraction >= 1.0 {
            return None;
        }
        (self.interpolate(end, fraction).distance(value) <= EPSILON).then_some(fraction)
    }

    fn crossing(start1: &Self, end1: &Self, start2: &Self, end2: &Self) -> Option<f64> {
        let p1 = point_coords(start1);
        let p2 = point_coords(end1);
        let q1 = point_coords(start2);
        let q2 = point_coords(end2);
        let mut fraction: Option<f64> = None;
        for axis in 0..3 {
            let denum = p2[axis] - p1[axis] - q2[axis] + q1[axis];
            if denum == 0.0 {
                // Parallel along this axis: they must coincide on it throughout.
                if (p1[axis] - q1[axis]).abs() > EPSILON {
                    return None;
                }
                continue;
            }
            let f = (q1[axis] - p1[axis]) / denum;
            match fraction {
                Some(prev) if (prev - f).abs() > EPSILON => return None,
                Some(_) => {}
                None => fraction = Some(f),
            }
        }
        fraction.filter(|f| *f > 0.0 && *f < 1.0)
    }

    fn collinear(start: &Self, mid: &Self, end: &Self, fraction: f64) -> bool {
        start.interpolate(end, fraction).distance(mid) <= EPSILON
    }

    fn write_text(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }

    fn read_text(parser: &mut TextParser<'_>) -> Result<Self> {
        let position = parser.position();
        let literal = parser.take_through_close_paren()?;
        literal
            .parse::<GeoPoint>()
            .map_err(|e| TemporaError::parse(position, e.to_string()))
    }

    fn srid(&self) -> i32 {
        self.srid
    }

    fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }
}

impl BaseValue for NPoint {
    const BASE_TYPE: BaseType = BaseType::NPoint;
    const CONTINUOUS: bool = true;
    type BBox = Period;

    fn validate(&self) -> Result<()> {
        if !self.is_valid() {
            return Err(TemporaError::invalid(format!(
                "network point position must be in [0, 1]: {}",
                self
            )));
        }
        Ok(())
    }

    fn ensure_linear_segment(&self, end: &Self) -> Result<()> {
        if !self.same_route(end) {
            return Err(TemporaError::invalid(format!(
                "linear segment between different routes {} and {}",
                self.rid, end.rid
            )));
        }
        Ok(())
    }

    fn interpolate(&self, end: &Self, fraction: f64) -> Self {
        NPoint::new(self.rid, self.pos + (end.pos - self.pos) * fraction)
    }

    fn locate(&self, end: &Self, value: &Self) -> Option<f64> {
        if !self.same_route(value) || !self.same_route(end) {
            return None;
        }
        locate_scalar(self.pos, end.pos, value.pos)
    }

    fn crossing(start1: &Self, end1: &Self, start2: &Self, end2: &Self) -> Option<f64> {
        if !start1.same_route(start2) {
            return None;
        }
        crossing_scalar(start1.pos, end1.pos, start2.pos, end2.pos)
    }

    fn collinear(start: &Self, mid: &Self, end: &Self, fraction: f64) -> bool {
        start.same_route(mid)
            && mid.same_route(end)
            && (mid.pos - start.interpolate(end, fraction).pos).abs() <= EPSILON
    }

    fn write_text(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }

    fn read_text(parser: &mut TextParser<'_>) -> Result<Self> {
        let position = parser.position();
        let literal = parser.take_through_close_paren()?;
        literal
            .parse::<NPoint>()
            .map_err(|e| TemporaError::parse(position, e.to_string()))
    }
}

macro_rules! double_value {
    ($name:ident, $tag:ident, $($field:tt),+) => {
        impl BaseValue for $name {
            const BASE_TYPE: BaseType = BaseType::$tag;
            const CONTINUOUS: bool = true;
            type BBox = Period;

            fn interpolate(&self, end: &Self, fraction: f64) -> Self {
                $name($(self.$field + (end.$field - self.$field) * fraction),+)
            }

            fn collinear(start: &Self, mid: &Self, end: &Self, fraction: f64) -> bool {
                let expected = start.interpolate(end, fraction);
                true $(&& (mid.$field - expected.$field).abs() <= EPSILON)+
            }

            fn write_text(&self, out: &mut String) {
                let parts: Vec<String> = vec![$(self.$field.to_string()),+];
                out.push('(');
                out.push_str(&parts.join(","));
                out.push(')');
            }

            fn read_text(parser: &mut TextParser<'_>) -> Result<Self> {
                let position = parser.position();
                let literal = parser.take_through_close_paren()?;
                let values = literal
                    .trim()
                    .strip_prefix('(')
                    .and_then(|r| r.strip_suffix(')'))
                    .ok_or_else(|| TemporaError::parse(position, "expected parenthesized tuple"))?
                    .split(',')
                    .map(|v| v.trim().parse::<f64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| TemporaError::parse(position, e.to_string()))?;
                let mut iter = values.into_iter();
                let value = $name($({
                    let _ = stringify!($field);
                    iter.next().ok_or_else(|| TemporaError::parse(position, "too few components"))?
                }),+);
                if iter.next().is_some() {
                    return Err(TemporaError::parse(position, "too many components"));
                }
                Ok(value)
            }
        }

        impl std::ops::Add for $name {
            type Output = $name;

            fn add(self, other: $name) -> $name {
                $name($(self.$field + other.$field),+)
            }
        }
    };
}

/// Running (sum, count) state of the average aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Double2(pub f64, pub f64);

/// Running (x, y, count) state of the 2D centroid aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Double3(pub f64, pub f64, pub f64);

/// Running (x, y, z, count) state of the 3D centroid aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Double4(pub f64, pub f64, pub f64, pub f64);

double_value!(Double2, Double2, 0, 1);
double_value!(Double3, Double3, 0, 1, 2);
double_value!(Double4, Double4, 0, 1, 2, 3);

/// Check that all values are valid and mutually compatible.
pub(crate) fn ensure_values<'a, V: BaseValue>(mut values: impl Iterator<Item = &'a V>) -> Result<()> {
    let Some(first) = values.next() else {
        return Ok(());
    };
    first.validate()?;
    for value in values {
        value.validate()?;
        first.ensure_compatible(value)?;
    }
    Ok(())
}

/// Bounding box of a single value at a timestamp.
pub(crate) fn instant_box<V: BaseValue>(value: &V, t: tempora_types::Timestamp) -> V::BBox {
    <V::BBox as TemporalBox<V>>::from_instant(value, t)
}
