//! Temporal boolean operators.
use crate::error::Result;
use crate::lifting::{LiftOptions, lift_binary, lift_scalar, lift_unary};
use crate::temporal::Temporal;

pub fn tand(a: &Temporal<bool>, b: &Temporal<bool>) -> Result<Option<Temporal<bool>>> {
    lift_binary(a, b, |x, y| *x && *y, LiftOptions::new())
}

pub fn tand_scalar(a: &Temporal<bool>, value: bool) -> Result<Temporal<bool>> {
    lift_scalar(a, &value, |x, y| *x && *y, LiftOptions::new())
}

pub fn tor(a: &Temporal<bool>, b: &Temporal<bool>) -> Result<Option<Temporal<bool>>> {
    lift_binary(a, b, |x, y| *x || *y, LiftOptions::new())
}

pub fn tor_scalar(a: &Temporal<bool>, value: bool) -> Result<Temporal<bool>> {
    lift_scalar(a, &value, |x, y| *x || *y, LiftOptions::new())
}

pub fn tnot(a: &Temporal<bool>) -> Result<Temporal<bool>> {
    lift_unary(a, |x| !*x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_types::Timestamp;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn parse(text: &str) -> Temporal<bool> {
        text.parse().unwrap()
    }

    #[test]
    fn test_and_or() {
        let a = parse("[t@1970-01-01 00:00:00, f@1970-01-01 00:00:10, f@1970-01-01 00:00:20]");
        let b = parse("[t@1970-01-01 00:00:05, t@1970-01-01 00:00:15]");
        let and = tand(&a, &b).unwrap().unwrap();
        assert!(and.value_at_timestamp(ts(5)).unwrap());
        assert!(!and.value_at_timestamp(ts(12)).unwrap());
        let or = tor(&a, &b).unwrap().unwrap();
        assert!(or.always_eq(&true));
        assert_eq!(or.num_instants(), 2);
    }

    #[test]
    fn test_not_and_scalars() {
        let a = parse("{t@1970-01-01 00:00:00, f@1970-01-01 00:00:10}");
        let not = tnot(&a).unwrap();
        assert_eq!(not.values(), vec![false, true]);
        assert!(tand_scalar(&a, false).unwrap().always_eq(&false));
        assert!(tor_scalar(&a, true).unwrap().always_eq(&true));
    }
}
