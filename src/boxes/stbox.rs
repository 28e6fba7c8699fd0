use super::TemporalBox;
use super::split::SplitBox;
use crate::time::Period;
use rstar::{AABB, RTreeObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use tempora_types::{GeoPoint, Timestamp};

/// Spatio-temporal box of a temporal point.
///
/// The z extent is meaningful only when `has_z` is set; 2D boxes keep it at
/// zero. All points boxed together share one SRID.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct STBox {
    pub xmin: f64,
    pub ymin: f64,
    pub zmin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmax: f64,
    pub tmin: Timestamp,
    pub tmax: Timestamp,
    pub has_z: bool,
    pub srid: i32,
}

impl STBox {
    pub fn period(&self) -> Period {
        Period::closed_unchecked(self.tmin, self.tmax)
    }

    pub fn union(&self, other: &STBox) -> STBox {
        STBox {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            zmin: self.zmin.min(other.zmin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
            zmax: self.zmax.max(other.zmax),
            tmin: self.tmin.min(other.tmin),
            tmax: self.tmax.max(other.tmax),
            has_z: self.has_z && other.has_z,
            srid: self.srid,
        }
    }

    pub fn overlaps(&self, other: &STBox) -> bool {
        let z_overlaps = !(self.has_z && other.has_z)
            || (self.zmin <= other.zmax && other.zmin <= self.zmax);
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
            && z_overlaps
            && self.tmin <= other.tmax
            && other.tmin <= self.tmax
    }

    pub fn contains(&self, other: &STBox) -> bool {
        let z_contains =
            !(self.has_z && other.has_z) || (self.zmin <= other.zmin && other.zmax <= self.zmax);
        self.xmin <= other.xmin
            && other.xmax <= self.xmax
            && self.ymin <= other.ymin
            && other.ymax <= self.ymax
            && z_contains
            && self.tmin <= other.tmin
            && other.tmax <= self.tmax
    }

    /// Whether `point` lies within the spatial extent.
    pub fn contains_point(&self, point: &GeoPoint) -> bool {
        let z_ok = !(self.has_z && point.has_z())
            || (self.zmin..=self.zmax).contains(&point.z_or_zero());
        (self.xmin..=self.xmax).contains(&point.x())
            && (self.ymin..=self.ymax).contains(&point.y())
            && z_ok
    }
}

impl TemporalBox<GeoPoint> for STBox {
    fn from_instant(value: &GeoPoint, t: Timestamp) -> Self {
        let z = value.z_or_zero();
        STBox {
            xmin: value.x(),
            ymin: value.y(),
            zmin: z,
            xmax: value.x(),
            ymax: value.y(),
            zmax: z,
            tmin: t,
            tmax: t,
            has_z: value.has_z(),
            srid: value.srid,
        }
    }

    fn expand(&mut self, other: &Self) {
        *self = self.union(other);
    }

    fn period(&self) -> Period {
        STBox::period(self)
    }
}

impl fmt::Display for STBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.srid != 0 {
            write!(f, "SRID={};", self.srid)?;
        }
        if self.has_z {
            write!(
                f,
                "STBOX ZT(({},{},{},{}),({},{},{},{}))",
                self.xmin, self.ymin, self.zmin, self.tmin, self.xmax, self.ymax, self.zmax, self.tmax
            )
        } else {
            write!(
                f,
                "STBOX T(({},{},{}),({},{},{}))",
                self.xmin, self.ymin, self.tmin, self.xmax, self.ymax, self.tmax
            )
        }
    }
}

impl RTreeObject for STBox {
    type Envelope = AABB<[f64; 4]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.xmin, self.ymin, self.zmin, self.tmin.micros() as f64],
            [self.xmax, self.ymax, self.zmax, self.tmax.micros() as f64],
        )
    }
}

impl SplitBox for STBox {
    fn axis_count(&self) -> usize {
        if self.has_z { 4 } else { 3 }
    }

    fn axis_range(&self, axis: usize) -> (f64, f64) {
        match (axis, self.has_z) {
            (0, _) => (self.xmin, self.xmax),
            (1, _) => (self.ymin, self.ymax),
            (2, true) => (self.zmin, self.zmax),
            _ => (self.tmin.micros() as f64, self.tmax.micros() as f64),
        }
    }

    fn union(&self, other: &Self) -> Self {
        STBox::union(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stbox_from_points() {
        let bbox = STBox::from_instants([
            (&GeoPoint::new(1.0, 5.0), Timestamp::from_secs(3)),
            (&GeoPoint::new(-1.0, 2.0), Timestamp::from_secs(1)),
        ])
        .unwrap();
        assert_eq!((bbox.xmin, bbox.xmax), (-1.0, 1.0));
        assert_eq!((bbox.ymin, bbox.ymax), (2.0, 5.0));
        assert_eq!(bbox.tmin, Timestamp::from_secs(1));
        assert!(!bbox.has_z);
    }

    #[test]
    fn test_stbox_overlap_and_contains() {
        let a = STBox::from_instant(&GeoPoint::new(0.0, 0.0), Timestamp::from_secs(0));
        let mut b = a;
        b.expand_instant(&GeoPoint::new(2.0, 2.0), Timestamp::from_secs(2));
        assert!(b.contains(&a));
        assert!(b.overlaps(&a));
        assert!(b.contains_point(&GeoPoint::new(1.0, 1.5)));
        assert!(!b.contains_point(&GeoPoint::new(3.0, 1.5)));
    }

    #[test]
    fn test_stbox_display() {
        let point = GeoPoint::new_3d(1.0, 2.0, 3.0).with_srid(4326);
        let bbox = STBox::from_instant(&point, Timestamp::from_secs(0));
        assert_eq!(
            bbox.to_string(),
            "SRID=4326;STBOX ZT((1,2,3,1970-01-01 00:00:00+00),(1,2,3,1970-01-01 00:00:00+00))"
        );
    }

    #[test]
    fn test_stbox_split_axes() {
        let flat = STBox::from_instant(&GeoPoint::new(0.0, 0.0), Timestamp::from_secs(7));
        assert_eq!(flat.axis_count(), 3);
        assert_eq!(flat.axis_range(2), (7_000_000.0, 7_000_000.0));
    }
}
