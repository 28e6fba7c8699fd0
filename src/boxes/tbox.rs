use super::TemporalBox;
use super::split::SplitBox;
use crate::base::NumericValue;
use crate::error::{Result, TemporaError};
use crate::time::{FloatSpan, Period};
use rstar::{AABB, RTreeObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use tempora_types::Timestamp;

/// Value-range by time-range box of a temporal number.
///
/// # Examples
///
/// ```
/// use tempora::boxes::TBox;
/// use tempora_types::Timestamp;
///
/// let a = TBox::new(1.0, 3.0, Timestamp::from_secs(0), Timestamp::from_secs(10)).unwrap();
/// let b = TBox::new(2.0, 5.0, Timestamp::from_secs(5), Timestamp::from_secs(20)).unwrap();
/// assert!(a.overlaps(&b));
/// assert_eq!(a.union(&b).xmax, 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TBox {
    pub xmin: f64,
    pub xmax: f64,
    pub tmin: Timestamp,
    pub tmax: Timestamp,
}

impl TBox {
    pub fn new(xmin: f64, xmax: f64, tmin: Timestamp, tmax: Timestamp) -> Result<Self> {
        if xmin.is_nan() || xmax.is_nan() {
            return Err(TemporaError::invalid("box bounds must not be NaN"));
        }
        if xmin > xmax || tmin > tmax {
            return Err(TemporaError::invalid(format!(
                "box minimum must not exceed maximum: ({}, {}) ({}, {})",
                xmin, xmax, tmin, tmax
            )));
        }
        Ok(Self {
            xmin,
            xmax,
            tmin,
            tmax,
        })
    }

    /// Closed value extent.
    pub fn value_span(&self) -> FloatSpan {
        FloatSpan::closed_unchecked(self.xmin, self.xmax)
    }

    pub fn period(&self) -> Period {
        Period::closed_unchecked(self.tmin, self.tmax)
    }

    pub fn union(&self, other: &TBox) -> TBox {
        TBox {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            tmin: self.tmin.min(other.tmin),
            tmax: self.tmax.max(other.tmax),
        }
    }

    pub fn intersection(&self, other: &TBox) -> Option<TBox> {
        if !self.overlaps(other) {
            return None;
        }
        Some(TBox {
            xmin: self.xmin.max(other.xmin),
            xmax: self.xmax.min(other.xmax),
            tmin: self.tmin.max(other.tmin),
            tmax: self.tmax.min(other.tmax),
        })
    }

    pub fn overlaps(&self, other: &TBox) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.tmin <= other.tmax
            && other.tmin <= self.tmax
    }

    pub fn contains(&self, other: &TBox) -> bool {
        self.xmin <= other.xmin
            && other.xmax <= self.xmax
            && self.tmin <= other.tmin
            && other.tmax <= self.tmax
    }
}

impl<V: NumericValue> TemporalBox<V> for TBox {
    fn from_instant(value: &V, t: Timestamp) -> Self {
        let x = value.to_f64();
        TBox {
            xmin: x,
            xmax: x,
            tmin: t,
            tmax: t,
        }
    }

    fn expand(&mut self, other: &Self) {
        *self = self.union(other);
    }

    fn period(&self) -> Period {
        TBox::period(self)
    }
}

impl fmt::Display for TBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TBOX(({},{}),({},{}))",
            self.xmin, self.tmin, self.xmax, self.tmax
        )
    }
}

impl RTreeObject for TBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.xmin, self.tmin.micros() as f64],
            [self.xmax, self.tmax.micros() as f64],
        )
    }
}

impl SplitBox for TBox {
    fn axis_count(&self) -> usize {
        2
    }

    fn axis_range(&self, axis: usize) -> (f64, f64) {
        match axis {
            0 => (self.xmin, self.xmax),
            _ => (self.tmin.micros() as f64, self.tmax.micros() as f64),
        }
    }

    fn union(&self, other: &Self) -> Self {
        TBox::union(self, other)
    }
}
