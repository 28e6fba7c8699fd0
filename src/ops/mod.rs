//! Lifted operations over temporal values.
//!
//! Temporal-temporal forms return `Ok(None)` when the operands share no
//! instant. Scalar forms are defined wherever the temporal operand is; the
//! `scalar_*` spelling puts the constant on the left.

pub mod arith;
pub mod boolean;
pub mod compare;
pub mod numeric;
pub mod spatial;
pub mod text;

pub use arith::{
    ArithValue, add, add_scalar, div, div_scalar, mul, mul_scalar, scalar_add, scalar_div, scalar_mul,
    scalar_sub, sub, sub_scalar,
};
pub use boolean::{tand, tand_scalar, tnot, tor, tor_scalar};
pub use compare::{
    teq, teq_scalar, tge, tge_scalar, tgt, tgt_scalar, tle, tle_scalar, tlt, tlt_scalar, tne, tne_scalar,
};
pub use numeric::{integral, twavg};
pub use spatial::{
    cumulative_length, distance, distance_point, length, speed, tdwithin, tdwithin_point, trajectory,
};
pub use text::{lower, scalar_textcat, textcat, textcat_scalar, upper};
