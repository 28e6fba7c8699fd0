//! A single value at a single timestamp.
use crate::base::{BaseValue, instant_box};
use crate::error::{Result, TemporaError};
use crate::time::Period;
use serde::{Deserialize, Serialize};
use tempora_types::Timestamp;

/// One `(value, timestamp)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TInstant<V> {
    value: V,
    t: Timestamp,
}

impl<V: BaseValue> TInstant<V> {
    pub fn new(value: V, t: Timestamp) -> Self {
        Self { value, t }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.t
    }

    pub fn period(&self) -> Period {
        Period::instant(self.t)
    }

    pub fn bbox(&self) -> V::BBox {
        instant_box(&self.value, self.t)
    }

    pub fn value_at_timestamp(&self, t: Timestamp) -> Result<V> {
        if t == self.t {
            Ok(self.value.clone())
        } else {
            Err(TemporaError::OutOfRange(format!(
                "timestamp {} differs from instant at {}",
                t, self.t
            )))
        }
    }

    pub fn shift(&self, delta: i64) -> Self {
        Self {
            value: self.value.clone(),
            t: self.t.add_micros(delta),
        }
    }

    /// Same value moved to another timestamp.
    pub(crate) fn with_timestamp(&self, t: Timestamp) -> Self {
        Self {
            value: self.value.clone(),
            t,
        }
    }
}
