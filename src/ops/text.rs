//! Temporal text functions.
use crate::error::Result;
use crate::lifting::{LiftOptions, lift_binary, lift_scalar, lift_unary};
use crate::temporal::Temporal;

fn concat(x: &String, y: &String) -> String {
    let mut out = String::with_capacity(x.len() + y.len());
    out.push_str(x);
    out.push_str(y);
    out
}

pub fn textcat(a: &Temporal<String>, b: &Temporal<String>) -> Result<Option<Temporal<String>>> {
    lift_binary(a, b, concat, LiftOptions::new())
}

/// Append a constant to every value.
pub fn textcat_scalar(a: &Temporal<String>, value: &str) -> Result<Temporal<String>> {
    lift_scalar(a, &value.to_string(), concat, LiftOptions::new())
}

/// Prepend a constant to every value.
pub fn scalar_textcat(value: &str, a: &Temporal<String>) -> Result<Temporal<String>> {
    lift_scalar(a, &value.to_string(), concat, LiftOptions::new().with_invert(true))
}

pub fn upper(a: &Temporal<String>) -> Result<Temporal<String>> {
    lift_unary(a, |x| x.to_uppercase())
}

pub fn lower(a: &Temporal<String>) -> Result<Temporal<String>> {
    lift_unary(a, |x| x.to_lowercase())
}
