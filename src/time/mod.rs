//! Time and value extents: spans, span sets and timestamp sets.

pub mod span;
pub mod spanset;
pub mod timestampset;

pub use span::{FloatSpan, IntSpan, Period, Span, SpanBound};
pub use spanset::{PeriodSet, SpanSet};
pub use timestampset::TimestampSet;
