//! Temporal types for moving objects: values that change over time.
//!
//! A temporal value is an instant, an instant set, a sequence or a sequence
//! set over a base domain such as floats, text or points. Values are built
//! through validating constructors, are immutable afterwards, and support
//! interpolation, restriction, lifted operators and temporal aggregation.
//!
//! ```rust
//! use tempora::prelude::*;
//!
//! let seq: Temporal<f64> = "[1@2000-01-01, 2@2000-01-02, 1@2000-01-03]".parse()?;
//! let noon = Timestamp::parse("2000-01-01 12:00:00")?;
//! assert_eq!(seq.value_at_timestamp(noon)?, 1.5);
//!
//! let crossings = seq.at_value(&1.5)?.expect("the value is reached twice");
//! assert_eq!(crossings.num_instants(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod agg;
pub mod base;
pub mod boxes;
pub mod config;
pub mod error;
pub mod io;
pub mod lifting;
pub mod ops;
pub mod simplify;
pub mod temporal;
pub mod time;

pub use base::{BaseType, BaseValue, NumericValue, OrderedValue};
pub use boxes::{STBox, TBox, TemporalBox};
pub use config::Config;
pub use error::{Result, TemporaError};
pub use temporal::{
    Interpolation, SequenceBuilder, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal,
    TemporalSubtype,
};
pub use time::{FloatSpan, IntSpan, Period, PeriodSet, Span, SpanSet, TimestampSet};

pub use tempora_types::{GeoPoint, NPoint, Timestamp};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Result, TemporaError};

    pub use crate::{
        Interpolation, SequenceBuilder, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal,
    };

    pub use crate::{FloatSpan, IntSpan, Period, PeriodSet, Span, SpanSet, TimestampSet};

    pub use crate::{STBox, TBox};

    pub use crate::{GeoPoint, NPoint, Timestamp};

    pub use crate::Config;
}
