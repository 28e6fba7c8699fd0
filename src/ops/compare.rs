//! Temporal comparisons.
//!
//! Results are temporal booleans that switch value exactly where the operands
//! cross, including crossings between samples of linear operands.
use crate::base::{BaseValue, OrderedValue};
use crate::error::Result;
use crate::lifting::{LiftOptions, lift_binary, lift_scalar};
use crate::temporal::Temporal;

macro_rules! comparison {
    ($(#[$doc:meta])* $name:ident, $scalar:ident, $bound:ident, $op:tt) => {
        $(#[$doc])*
        pub fn $name<V: $bound>(a: &Temporal<V>, b: &Temporal<V>) -> Result<Option<Temporal<bool>>> {
            lift_binary(a, b, |x, y| x $op y, LiftOptions::new().with_crossings())
        }

        pub fn $scalar<V: $bound>(a: &Temporal<V>, value: &V) -> Result<Temporal<bool>> {
            lift_scalar(a, value, |x, y| x $op y, LiftOptions::new().with_crossings())
        }
    };
}

comparison!(
    /// Temporal equality.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempora::prelude::*;
    /// use tempora::ops::teq;
    ///
    /// let a: Temporal<f64> = "[0@2000-01-01 00:00:00, 10@2000-01-01 00:00:10]".parse().unwrap();
    /// let b: Temporal<f64> = "[10@2000-01-01 00:00:00, 0@2000-01-01 00:00:10]".parse().unwrap();
    /// let eq = teq(&a, &b).unwrap().unwrap();
    /// let crossing = Timestamp::parse("2000-01-01 00:00:05").unwrap();
    /// assert!(eq.value_at_timestamp(crossing).unwrap());
    /// ```
    teq, teq_scalar, BaseValue, ==
);
comparison!(tne, tne_scalar, BaseValue, !=);
comparison!(tlt, tlt_scalar, OrderedValue, <);
comparison!(tle, tle_scalar, OrderedValue, <=);
comparison!(tgt, tgt_scalar, OrderedValue, >);
comparison!(tge, tge_scalar, OrderedValue, >=);
