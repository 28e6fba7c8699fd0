//! Temporal arithmetic.
use crate::base::{EPSILON, NumericValue};
use crate::error::{Result, TemporaError};
use crate::lifting::{LiftOptions, try_lift_binary, try_lift_scalar};
use crate::temporal::Temporal;
use smallvec::SmallVec;

/// Numeric domains closed under the four operations. Integer results that
/// leave the domain are reported as errors instead of wrapping.
pub trait ArithValue: NumericValue {
    fn try_add(self, other: Self) -> Result<Self>;
    fn try_sub(self, other: Self) -> Result<Self>;
    fn try_mul(self, other: Self) -> Result<Self>;
    fn try_div(self, other: Self) -> Result<Self>;
}

fn int_overflow(op: &str, a: i32, b: i32) -> TemporaError {
    TemporaError::OutOfRange(format!("integer out of range: {a} {op} {b}"))
}

impl ArithValue for i32 {
    fn try_add(self, other: Self) -> Result<Self> {
        self.checked_add(other).ok_or_else(|| int_overflow("+", self, other))
    }

    fn try_sub(self, other: Self) -> Result<Self> {
        self.checked_sub(other).ok_or_else(|| int_overflow("-", self, other))
    }

    fn try_mul(self, other: Self) -> Result<Self> {
        self.checked_mul(other).ok_or_else(|| int_overflow("*", self, other))
    }

    fn try_div(self, other: Self) -> Result<Self> {
        if other == 0 {
            return Err(TemporaError::DivisionByZero);
        }
        self.checked_div(other).ok_or_else(|| int_overflow("/", self, other))
    }
}

impl ArithValue for f64 {
    fn try_add(self, other: Self) -> Result<Self> {
        Ok(self + other)
    }

    fn try_sub(self, other: Self) -> Result<Self> {
        Ok(self - other)
    }

    fn try_mul(self, other: Self) -> Result<Self> {
        Ok(self * other)
    }

    fn try_div(self, other: Self) -> Result<Self> {
        Ok(self / other)
    }
}

/// Turning point of the product or quotient of two linear segments, taken
/// halfway between the zeros of the two segments.
fn turning_point<V: NumericValue>(a1: &V, a2: &V, b1: &V, b2: &V) -> SmallVec<[f64; 2]> {
    let (x1, x2, x3, x4) = (a1.to_f64(), a2.to_f64(), b1.to_f64(), b2.to_f64());
    let mut result = SmallVec::new();
    if x2 == x1 || x4 == x3 {
        return result;
    }
    let d1 = -x1 / (x2 - x1);
    let d2 = -x3 / (x4 - x3);
    let fraction = d1.min(d2) + (d1.max(d2) - d1.min(d2)) / 2.0;
    if fraction > EPSILON && fraction < 1.0 - EPSILON {
        result.push(fraction);
    }
    result
}

fn linear<'a, V>() -> LiftOptions<'a, V> {
    LiftOptions::new().with_linear()
}

/// # Examples
///
/// ```
/// use tempora::prelude::*;
/// use tempora::ops::add;
///
/// let a: Temporal<f64> = "[1@2000-01-01, 2@2000-01-02]".parse().unwrap();
/// let b: Temporal<f64> = "[3@2000-01-01, 1@2000-01-02]".parse().unwrap();
/// let sum = add(&a, &b).unwrap().unwrap();
/// assert_eq!(sum.to_string(), "[4@2000-01-01 00:00:00+00, 3@2000-01-02 00:00:00+00]");
/// ```
pub fn add<V: ArithValue>(a: &Temporal<V>, b: &Temporal<V>) -> Result<Option<Temporal<V>>> {
    try_lift_binary(a, b, |x, y| x.try_add(*y), linear())
}

pub fn add_scalar<V: ArithValue>(a: &Temporal<V>, value: V) -> Result<Temporal<V>> {
    try_lift_scalar(a, &value, |x, y| x.try_add(*y), linear())
}

pub fn scalar_add<V: ArithValue>(value: V, a: &Temporal<V>) -> Result<Temporal<V>> {
    try_lift_scalar(a, &value, |x, y| x.try_add(*y), linear().with_invert(true))
}

pub fn sub<V: ArithValue>(a: &Temporal<V>, b: &Temporal<V>) -> Result<Option<Temporal<V>>> {
    try_lift_binary(a, b, |x, y| x.try_sub(*y), linear())
}

pub fn sub_scalar<V: ArithValue>(a: &Temporal<V>, value: V) -> Result<Temporal<V>> {
    try_lift_scalar(a, &value, |x, y| x.try_sub(*y), linear())
}

pub fn scalar_sub<V: ArithValue>(value: V, a: &Temporal<V>) -> Result<Temporal<V>> {
    try_lift_scalar(a, &value, |x, y| x.try_sub(*y), linear().with_invert(true))
}

/// Product of two temporal numbers. Linear operands get an extra instant at
/// the turning point of the product.
pub fn mul<V: ArithValue>(a: &Temporal<V>, b: &Temporal<V>) -> Result<Option<Temporal<V>>> {
    try_lift_binary(a, b, |x, y| x.try_mul(*y), linear().with_split(&turning_point::<V>))
}

pub fn mul_scalar<V: ArithValue>(a: &Temporal<V>, value: V) -> Result<Temporal<V>> {
    try_lift_scalar(a, &value, |x, y| x.try_mul(*y), linear())
}

pub fn scalar_mul<V: ArithValue>(value: V, a: &Temporal<V>) -> Result<Temporal<V>> {
    try_lift_scalar(a, &value, |x, y| x.try_mul(*y), linear().with_invert(true))
}

/// Quotient of two temporal numbers.
///
/// Fails with [`TemporaError::DivisionByZero`] when the divisor is ever zero
/// while the dividend is defined.
pub fn div<V: ArithValue>(a: &Temporal<V>, b: &Temporal<V>) -> Result<Option<Temporal<V>>> {
    let Some(divisor) = b.at_periodset(&a.time()) else {
        return Ok(None);
    };
    if divisor.ever_eq(&V::from_f64(0.0)) {
        return Err(TemporaError::DivisionByZero);
    }
    try_lift_binary(a, b, |x, y| x.try_div(*y), linear().with_split(&turning_point::<V>))
}

pub fn div_scalar<V: ArithValue>(a: &Temporal<V>, value: V) -> Result<Temporal<V>> {
    if value.to_f64().abs() < EPSILON {
        return Err(TemporaError::DivisionByZero);
    }
    try_lift_scalar(a, &value, |x, y| x.try_div(*y), linear())
}

pub fn scalar_div<V: ArithValue>(value: V, a: &Temporal<V>) -> Result<Temporal<V>> {
    if a.ever_eq(&V::from_f64(0.0)) {
        return Err(TemporaError::DivisionByZero);
    }
    try_lift_scalar(a, &value, |x, y| x.try_div(*y), linear().with_invert(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_types::Timestamp;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn parse<V: crate::base::BaseValue>(text: &str) -> Temporal<V> {
        text.parse().unwrap()
    }

    #[test]
    fn test_scalar_forms() {
        let a = parse::<f64>("[2@1970-01-01 00:00:00, 4@1970-01-01 00:00:10]");
        assert_eq!(add_scalar(&a, 1.0).unwrap().value_at_timestamp(ts(5)).unwrap(), 4.0);
        assert_eq!(sub_scalar(&a, 1.0).unwrap().value_at_timestamp(ts(0)).unwrap(), 1.0);
        assert_eq!(scalar_sub(10.0, &a).unwrap().value_at_timestamp(ts(10)).unwrap(), 6.0);
        assert_eq!(mul_scalar(&a, 2.0).unwrap().value_at_timestamp(ts(10)).unwrap(), 8.0);
        assert_eq!(scalar_div(8.0, &a).unwrap().value_at_timestamp(ts(0)).unwrap(), 4.0);
        assert_eq!(div_scalar(&a, 2.0).unwrap().value_at_timestamp(ts(0)).unwrap(), 1.0);
        assert_eq!(scalar_add(1.0, &a).unwrap(), add_scalar(&a, 1.0).unwrap());
        assert_eq!(scalar_mul(3.0, &a).unwrap(), mul_scalar(&a, 3.0).unwrap());
    }

    #[test]
    fn test_product_turning_point() {
        let a = parse::<f64>("[-1@1970-01-01 00:00:00, 1@1970-01-01 00:00:10]");
        let b = parse::<f64>("[1@1970-01-01 00:00:00, -1@1970-01-01 00:00:10]");
        let product = mul(&a, &b).unwrap().unwrap();
        assert_eq!(product.timestamps(), vec![ts(0), ts(5), ts(10)]);
        assert_eq!(product.value_at_timestamp(ts(5)).unwrap(), 0.0);
        assert_eq!(product.value_at_timestamp(ts(0)).unwrap(), -1.0);
    }

    #[test]
    fn test_division_by_zero() {
        let a = parse::<f64>("[1@1970-01-01 00:00:00, 2@1970-01-01 00:00:10]");
        let crosses_zero = parse::<f64>("[-1@1970-01-01 00:00:00, 1@1970-01-01 00:00:10]");
        assert_eq!(div(&a, &crosses_zero), Err(TemporaError::DivisionByZero));
        assert_eq!(div_scalar(&a, 0.0), Err(TemporaError::DivisionByZero));
        assert_eq!(scalar_div(1.0, &crosses_zero), Err(TemporaError::DivisionByZero));

        // Zero outside the dividend's time extent is fine.
        let late = parse::<f64>("[1@1970-01-01 00:00:10, 0@1970-01-01 00:00:20]");
        let q = div(&a, &late).unwrap().unwrap();
        assert_eq!(q.value_at_timestamp(ts(10)).unwrap(), 2.0);
    }

    #[test]
    fn test_integer_arithmetic_is_stepwise() {
        let a = parse::<i32>("[7@1970-01-01 00:00:00, 9@1970-01-01 00:00:10]");
        let b = parse::<i32>("[2@1970-01-01 00:00:00, 2@1970-01-01 00:00:10]");
        let q = div(&a, &b).unwrap().unwrap();
        assert_eq!(q.value_at_timestamp(ts(5)).unwrap(), 3);
        assert_eq!(q.value_at_timestamp(ts(10)).unwrap(), 4);
        let d = sub(&a, &b).unwrap().unwrap();
        assert_eq!(d.interpolation(), Some(crate::temporal::Interpolation::Stepwise));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let big = parse::<i32>("[2147483647@1970-01-01 00:00:00, 2147483647@1970-01-01 00:00:10]");
        assert!(matches!(add_scalar(&big, 1), Err(TemporaError::OutOfRange(_))));
        assert!(matches!(add(&big, &big), Err(TemporaError::OutOfRange(_))));
        assert!(matches!(mul_scalar(&big, 2), Err(TemporaError::OutOfRange(_))));
        assert!(matches!(scalar_sub(-2, &big), Err(TemporaError::OutOfRange(_))));

        let min = parse::<i32>("{-2147483648@1970-01-01 00:00:00, 5@1970-01-01 00:00:10}");
        assert!(matches!(div_scalar(&min, -1), Err(TemporaError::OutOfRange(_))));
        assert!(matches!(sub_scalar(&min, 1), Err(TemporaError::OutOfRange(_))));

        // In-range results are unaffected.
        let sum = add_scalar(&big, -7).unwrap();
        assert_eq!(sum.value_at_timestamp(ts(5)).unwrap(), 2147483640);
    }
}
