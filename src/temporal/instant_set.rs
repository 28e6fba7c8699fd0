//! Discrete temporal values: instants without interpolation between them.
use super::TInstant;
use crate::base::{BaseValue, ensure_values};
use crate::boxes::TemporalBox;
use crate::error::{Result, TemporaError};
use crate::time::{Period, PeriodSet, TimestampSet};
use tempora_types::Timestamp;

/// Instants at strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TInstantSet<V: BaseValue> {
    instants: Vec<TInstant<V>>,
    bbox: V::BBox,
}

impl<V: BaseValue> TInstantSet<V> {
    /// Build from instants in strictly increasing time order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempora::prelude::*;
    ///
    /// let set = TInstantSet::new(vec![
    ///     TInstant::new(1, Timestamp::from_secs(0)),
    ///     TInstant::new(2, Timestamp::from_secs(5)),
    /// ])
    /// .unwrap();
    /// assert_eq!(set.find_timestamp(Timestamp::from_secs(5)), Ok(1));
    /// assert_eq!(set.find_timestamp(Timestamp::from_secs(3)), Err(1));
    /// ```
    pub fn new(instants: Vec<TInstant<V>>) -> Result<Self> {
        if instants.is_empty() {
            return Err(TemporaError::invalid("an instant set needs at least one instant"));
        }
        ensure_values(instants.iter().map(|inst| inst.value()))?;
        if let Some(pair) = instants
            .windows(2)
            .find(|pair| pair[0].timestamp() >= pair[1].timestamp())
        {
            return Err(TemporaError::invalid(format!(
                "timestamps must be strictly increasing: {} then {}",
                pair[0].timestamp(),
                pair[1].timestamp()
            )));
        }
        let bbox = V::BBox::from_instants(instants.iter().map(|inst| (inst.value(), inst.timestamp())))
            .ok_or_else(|| TemporaError::invalid("an instant set needs at least one instant"))?;
        Ok(Self { instants, bbox })
    }

    pub fn instants(&self) -> &[TInstant<V>] {
        &self.instants
    }

    pub fn num_instants(&self) -> usize {
        self.instants.len()
    }

    pub fn instant_n(&self, n: usize) -> Option<&TInstant<V>> {
        self.instants.get(n)
    }

    pub fn start_instant(&self) -> &TInstant<V> {
        &self.instants[0]
    }

    pub fn end_instant(&self) -> &TInstant<V> {
        &self.instants[self.instants.len() - 1]
    }

    pub fn bbox(&self) -> &V::BBox {
        &self.bbox
    }

    pub fn period(&self) -> Period {
        Period::closed_unchecked(self.start_instant().timestamp(), self.end_instant().timestamp())
    }

    pub fn time(&self) -> PeriodSet {
        PeriodSet::from_normalized(self.instants.iter().map(|inst| inst.period()).collect())
    }

    pub fn timestamps(&self) -> TimestampSet {
        TimestampSet::from_sorted(self.instants.iter().map(|inst| inst.timestamp()).collect())
    }

    /// Binary search: `Ok(position)` when found, `Err(insertion point)` otherwise.
    pub fn find_timestamp(&self, t: Timestamp) -> std::result::Result<usize, usize> {
        self.instants.binary_search_by(|inst| inst.timestamp().cmp(&t))
    }

    pub fn value_at_timestamp(&self, t: Timestamp) -> Result<V> {
        match self.find_timestamp(t) {
            Ok(i) => Ok(self.instants[i].value().clone()),
            Err(_) => Err(TemporaError::OutOfRange(format!(
                "timestamp {} is not an instant of the set",
                t
            ))),
        }
    }

    pub fn shift(&self, delta: i64) -> Self {
        let instants: Vec<TInstant<V>> = self.instants.iter().map(|inst| inst.shift(delta)).collect();
        let bbox = V::BBox::from_instants(instants.iter().map(|inst| (inst.value(), inst.timestamp())))
            .unwrap_or_else(|| self.bbox.clone());
        Self { instants, bbox }
    }

    /// Build from instants already known to be valid and ordered.
    pub(crate) fn from_valid(instants: Vec<TInstant<V>>) -> Option<Self> {
        let bbox = V::BBox::from_instants(instants.iter().map(|inst| (inst.value(), inst.timestamp())))?;
        Some(Self { instants, bbox })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    #[test]
    fn test_rejects_unordered_and_empty() {
        assert!(TInstantSet::<i32>::new(vec![]).is_err());
        let dup = TInstantSet::new(vec![TInstant::new(1, ts(1)), TInstant::new(2, ts(1))]);
        assert!(matches!(dup, Err(TemporaError::InvalidArgument(_))));
        let back = TInstantSet::new(vec![TInstant::new(1, ts(2)), TInstant::new(2, ts(1))]);
        assert!(back.is_err());
    }

    #[test]
    fn test_find_timestamp() {
        let set = TInstantSet::new(vec![
            TInstant::new(1, ts(0)),
            TInstant::new(2, ts(10)),
            TInstant::new(3, ts(20)),
        ])
        .unwrap();
        assert_eq!(set.find_timestamp(ts(0)), Ok(0));
        assert_eq!(set.find_timestamp(ts(20)), Ok(2));
        assert_eq!(set.find_timestamp(ts(15)), Err(2));
        assert_eq!(set.find_timestamp(ts(25)), Err(3));
        assert_eq!(set.value_at_timestamp(ts(10)).unwrap(), 2);
        assert!(set.value_at_timestamp(ts(5)).is_err());
    }

    #[test]
    fn test_time_is_discrete() {
        let set = TInstantSet::new(vec![TInstant::new(true, ts(0)), TInstant::new(false, ts(10))]).unwrap();
        let time = set.time();
        assert_eq!(time.num_spans(), 2);
        assert!(time.contains_value(ts(10)));
        assert!(!time.contains_value(ts(5)));
        assert_eq!(set.period().upper(), ts(10));
        assert_eq!(set.timestamps().len(), 2);
    }
}
