//! Core value types for the `tempora` temporal library.
//!
//! This crate holds the leaf types that every temporal value is built from:
//! the microsecond [`Timestamp`](timestamp::Timestamp), the planar
//! [`GeoPoint`](point::GeoPoint) and the network-constrained
//! [`NPoint`](npoint::NPoint).

pub mod npoint;
pub mod point;
pub mod timestamp;

pub use npoint::NPoint;
pub use point::GeoPoint;
pub use timestamp::{Timestamp, TimestampParseError};
