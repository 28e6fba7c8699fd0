//! The aggregate functions.
//!
//! An aggregate maps every input value into a state value, folds two states
//! that meet at the same instant, and maps the final state to the output.
//! Averages and centroids carry running sums and counts as their state.
use crate::base::{BaseValue, Double2, Double3, Double4, NumericValue, OrderedValue};
use crate::error::{Result, TemporaError};
use crate::ops::ArithValue;
use tempora_types::GeoPoint;

/// Transform, combine and finish hooks of one temporal aggregate.
pub trait TemporalAggregate<V: BaseValue> {
    /// Value stored in the skip-list fragments
    type State: BaseValue;
    /// Value of the final result
    type Output: BaseValue;

    /// Whether linear fragments must be split where they cross before
    /// combining, as needed by minimum and maximum.
    const CROSSINGS: bool = false;

    /// Called with the first value of each input before it is transformed.
    fn check(&mut self, _value: &V) -> Result<()> {
        Ok(())
    }

    /// Reconcile the parameters of two partial states.
    fn absorb(&mut self, _other: &Self) -> Result<()> {
        Ok(())
    }

    fn transform(&self, value: &V) -> Self::State;

    /// Fold two states meeting at the same instant. Fails when the folded
    /// value leaves its domain.
    fn combine(&self, a: &Self::State, b: &Self::State) -> Result<Self::State>;

    fn finish(&self, state: &Self::State) -> Self::Output;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TMin;

impl<V: OrderedValue> TemporalAggregate<V> for TMin {
    type State = V;
    type Output = V;
    const CROSSINGS: bool = true;

    fn transform(&self, value: &V) -> V {
        value.clone()
    }

    fn combine(&self, a: &V, b: &V) -> Result<V> {
        Ok(if b < a { b.clone() } else { a.clone() })
    }

    fn finish(&self, state: &V) -> V {
        state.clone()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TMax;

impl<V: OrderedValue> TemporalAggregate<V> for TMax {
    type State = V;
    type Output = V;
    const CROSSINGS: bool = true;

    fn transform(&self, value: &V) -> V {
        value.clone()
    }

    fn combine(&self, a: &V, b: &V) -> Result<V> {
        Ok(if b > a { b.clone() } else { a.clone() })
    }

    fn finish(&self, state: &V) -> V {
        state.clone()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TSum;

impl<V: ArithValue> TemporalAggregate<V> for TSum {
    type State = V;
    type Output = V;

    fn transform(&self, value: &V) -> V {
        *value
    }

    fn combine(&self, a: &V, b: &V) -> Result<V> {
        a.try_add(*b)
    }

    fn finish(&self, state: &V) -> V {
        *state
    }
}

/// Number of values defined at each instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct TCount;

impl<V: BaseValue> TemporalAggregate<V> for TCount {
    type State = i32;
    type Output = i32;

    fn transform(&self, _value: &V) -> i32 {
        1
    }

    fn combine(&self, a: &i32, b: &i32) -> Result<i32> {
        a.try_add(*b)
    }

    fn finish(&self, state: &i32) -> i32 {
        *state
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TAvg;

impl<V: NumericValue> TemporalAggregate<V> for TAvg {
    type State = Double2;
    type Output = f64;

    fn transform(&self, value: &V) -> Double2 {
        Double2(value.to_f64(), 1.0)
    }

    fn combine(&self, a: &Double2, b: &Double2) -> Result<Double2> {
        Ok(*a + *b)
    }

    fn finish(&self, state: &Double2) -> f64 {
        state.0 / state.1
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TAnd;

impl TemporalAggregate<bool> for TAnd {
    type State = bool;
    type Output = bool;

    fn transform(&self, value: &bool) -> bool {
        *value
    }

    fn combine(&self, a: &bool, b: &bool) -> Result<bool> {
        Ok(*a && *b)
    }

    fn finish(&self, state: &bool) -> bool {
        *state
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TOr;

impl TemporalAggregate<bool> for TOr {
    type State = bool;
    type Output = bool;

    fn transform(&self, value: &bool) -> bool {
        *value
    }

    fn combine(&self, a: &bool, b: &bool) -> Result<bool> {
        Ok(*a || *b)
    }

    fn finish(&self, state: &bool) -> bool {
        *state
    }
}

fn check_point(srid: &mut Option<i32>, has_z: bool, value: &GeoPoint) -> Result<()> {
    if value.has_z() != has_z {
        return Err(TemporaError::invalid(
            "centroid of points with mixed 2D/3D dimensions",
        ));
    }
    absorb_srid(srid, Some(value.srid))
}

fn absorb_srid(srid: &mut Option<i32>, other: Option<i32>) -> Result<()> {
    match (*srid, other) {
        (Some(a), Some(b)) if a != b => Err(TemporaError::invalid(format!(
            "centroid of points with mixed SRID: {} and {}",
            a, b
        ))),
        (None, other) => {
            *srid = other;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Centroid of 2D temporal points.
#[derive(Debug, Clone, Copy, Default)]
pub struct TCentroid {
    srid: Option<i32>,
}

impl TemporalAggregate<GeoPoint> for TCentroid {
    type State = Double3;
    type Output = GeoPoint;

    fn check(&mut self, value: &GeoPoint) -> Result<()> {
        check_point(&mut self.srid, false, value)
    }

    fn absorb(&mut self, other: &Self) -> Result<()> {
        absorb_srid(&mut self.srid, other.srid)
    }

    fn transform(&self, value: &GeoPoint) -> Double3 {
        Double3(value.x(), value.y(), 1.0)
    }

    fn combine(&self, a: &Double3, b: &Double3) -> Result<Double3> {
        Ok(*a + *b)
    }

    fn finish(&self, state: &Double3) -> GeoPoint {
        GeoPoint::new(state.0 / state.2, state.1 / state.2).with_srid(self.srid.unwrap_or(0))
    }
}

/// Centroid of 3D temporal points.
#[derive(Debug, Clone, Copy, Default)]
pub struct TCentroid3D {
    srid: Option<i32>,
}

impl TemporalAggregate<GeoPoint> for TCentroid3D {
    type State = Double4;
    type Output = GeoPoint;

    fn check(&mut self, value: &GeoPoint) -> Result<()> {
        check_point(&mut self.srid, true, value)
    }

    fn absorb(&mut self, other: &Self) -> Result<()> {
        absorb_srid(&mut self.srid, other.srid)
    }

    fn transform(&self, value: &GeoPoint) -> Double4 {
        Double4(value.x(), value.y(), value.z_or_zero(), 1.0)
    }

    fn combine(&self, a: &Double4, b: &Double4) -> Result<Double4> {
        Ok(*a + *b)
    }

    fn finish(&self, state: &Double4) -> GeoPoint {
        GeoPoint::new_3d(state.0 / state.3, state.1 / state.3, state.2 / state.3)
            .with_srid(self.srid.unwrap_or(0))
    }
}
