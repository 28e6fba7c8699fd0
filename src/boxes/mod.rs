//! Bounding boxes of temporal values.
//!
//! A box pairs a value extent with a time extent. Boxes are built once when a
//! temporal value is constructed and only ever grow through [`TemporalBox::expand`].
//! Numeric values use [`TBox`], points use [`STBox`] and every other domain is
//! boxed by its [`Period`](crate::time::Period) alone.

pub mod split;
pub mod stbox;
pub mod tbox;

pub use split::{Split, SplitBox, consider_split};
pub use stbox::STBox;
pub use tbox::TBox;

use crate::base::BaseValue;
use crate::time::Period;
use std::fmt;
use tempora_types::Timestamp;

/// A bounding box over a value domain `V` and time.
pub trait TemporalBox<V>: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync {
    /// Box of one value at one instant.
    fn from_instant(value: &V, t: Timestamp) -> Self;

    /// Widen `self` to also cover `other`. Never shrinks.
    fn expand(&mut self, other: &Self);

    /// Closed time extent of the box.
    fn period(&self) -> Period;

    /// Widen `self` to cover one more instant.
    fn expand_instant(&mut self, value: &V, t: Timestamp) {
        self.expand(&Self::from_instant(value, t));
    }

    /// Box covering every `(value, timestamp)` pair, or `None` when empty.
    fn from_instants<'a, I>(instants: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a V, Timestamp)>,
        V: 'a,
    {
        let mut iter = instants.into_iter();
        let (value, t) = iter.next()?;
        let mut bbox = Self::from_instant(value, t);
        for (value, t) in iter {
            bbox.expand_instant(value, t);
        }
        Some(bbox)
    }
}

impl<V: BaseValue> TemporalBox<V> for Period {
    fn from_instant(_value: &V, t: Timestamp) -> Self {
        Period::instant(t)
    }

    fn expand(&mut self, other: &Self) {
        *self = self.merge(other);
    }

    fn period(&self) -> Period {
        *self
    }
}
