//! Ever and always comparisons against a constant.
//!
//! `ever_*` holds when the comparison is true at some instant of the time
//! extent and `always_*` when it is true at every one. Both look at what the
//! value actually takes: a linear segment leaving an excluded bound never
//! takes the bound value, while it does take every value strictly between
//! its ends.
use super::Temporal;
use crate::base::{BaseValue, OrderedValue};

impl<V: BaseValue> Temporal<V> {
    /// # Examples
    ///
    /// ```
    /// use tempora::prelude::*;
    ///
    /// let seq: Temporal<f64> = "(1@2000-01-01, 3@2000-01-02]".parse().unwrap();
    /// assert!(seq.ever_eq(&2.0));
    /// assert!(!seq.ever_eq(&1.0));
    /// ```
    pub fn ever_eq(&self, value: &V) -> bool {
        matches!(self.at_value(value), Ok(Some(_)))
    }

    pub fn always_eq(&self, value: &V) -> bool {
        self.instants().iter().all(|inst| inst.value() == value)
    }

    pub fn ever_ne(&self, value: &V) -> bool {
        !self.always_eq(value)
    }

    pub fn always_ne(&self, value: &V) -> bool {
        !self.ever_eq(value)
    }
}

impl<V: OrderedValue> Temporal<V> {
    // Stepwise segments hold their start value and linear ones pass
    // arbitrarily close to an excluded end, so a strict comparison holds
    // somewhere exactly when it holds at one of the instants.
    pub fn ever_lt(&self, value: &V) -> bool {
        self.instants().iter().any(|inst| inst.value() < value)
    }

    pub fn ever_gt(&self, value: &V) -> bool {
        self.instants().iter().any(|inst| inst.value() > value)
    }

    pub fn ever_le(&self, value: &V) -> bool {
        self.ever_lt(value) || self.ever_eq(value)
    }

    pub fn ever_ge(&self, value: &V) -> bool {
        self.ever_gt(value) || self.ever_eq(value)
    }

    pub fn always_lt(&self, value: &V) -> bool {
        !self.ever_ge(value)
    }

    pub fn always_le(&self, value: &V) -> bool {
        !self.ever_gt(value)
    }

    pub fn always_gt(&self, value: &V) -> bool {
        !self.ever_le(value)
    }

    pub fn always_ge(&self, value: &V) -> bool {
        !self.ever_lt(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Temporal<f64> {
        text.parse().unwrap()
    }

    #[test]
    fn test_excluded_bounds_are_not_taken() {
        let seq = parse("(1@2000-01-01, 3@2000-01-02)");
        assert!(!seq.ever_eq(&1.0));
        assert!(!seq.ever_eq(&3.0));
        assert!(seq.always_lt(&3.0));
        assert!(seq.always_gt(&1.0));
        assert!(!seq.ever_le(&1.0));
        assert!(seq.ever_lt(&1.5));
    }

    #[test]
    fn test_included_bounds_are_taken() {
        let seq = parse("[1@2000-01-01, 3@2000-01-02]");
        assert!(seq.ever_le(&1.0));
        assert!(!seq.always_gt(&1.0));
        assert!(seq.always_ge(&1.0));
        assert!(seq.always_le(&3.0));
    }

    #[test]
    fn test_interior_values_of_linear_segments() {
        let seq = parse("[1@2000-01-01, 3@2000-01-02]");
        assert!(seq.ever_eq(&2.5));
        let step = parse("Interp=Stepwise;[1@2000-01-01, 3@2000-01-02]");
        assert!(!step.ever_eq(&2.5));
    }

    #[test]
    fn test_always_eq() {
        let constant = parse("[2@2000-01-01, 2@2000-01-02]");
        assert!(constant.always_eq(&2.0));
        assert!(!constant.ever_ne(&2.0));
        let varying = parse("{2@2000-01-01, 3@2000-01-02}");
        assert!(!varying.always_eq(&2.0));
        assert!(varying.always_ne(&4.0));
    }
}
