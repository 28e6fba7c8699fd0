//! Incremental sequence construction.
use super::sequence::normalize_instants;
use super::{Interpolation, TInstant, TSequence};
use crate::base::{BaseValue, instant_box};
use crate::boxes::TemporalBox;
use crate::error::{Result, TemporaError};

/// Collects instants one at a time while maintaining the bounding box.
///
/// Every pushed instant is checked against the previous one, so a failed
/// push leaves the builder as it was. [`SequenceBuilder::finish`] hands the
/// accumulated box to the immutable sequence.
///
/// # Examples
///
/// ```
/// use tempora::prelude::*;
///
/// let mut builder = SequenceBuilder::new(Interpolation::Linear).unwrap();
/// builder.push(TInstant::new(1.0, Timestamp::from_secs(0))).unwrap();
/// builder.push(TInstant::new(3.0, Timestamp::from_secs(10))).unwrap();
/// assert!(builder.push(TInstant::new(2.0, Timestamp::from_secs(5))).is_err());
///
/// let seq = builder.finish(true).unwrap();
/// assert_eq!(seq.num_instants(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceBuilder<V: BaseValue> {
    instants: Vec<TInstant<V>>,
    interp: Interpolation,
    lower_inc: bool,
    bbox: Option<V::BBox>,
}

impl<V: BaseValue> SequenceBuilder<V> {
    pub fn new(interp: Interpolation) -> Result<Self> {
        Self::with_capacity(interp, 0)
    }

    pub fn with_capacity(interp: Interpolation, capacity: usize) -> Result<Self> {
        if interp == Interpolation::Linear && !V::CONTINUOUS {
            return Err(TemporaError::invalid(format!(
                "{} values cannot be linearly interpolated",
                V::BASE_TYPE
            )));
        }
        Ok(Self {
            instants: Vec::with_capacity(capacity),
            interp,
            lower_inc: true,
            bbox: None,
        })
    }

    /// Set whether the first timestamp belongs to the sequence.
    pub fn lower_inc(mut self, lower_inc: bool) -> Self {
        self.lower_inc = lower_inc;
        self
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn last(&self) -> Option<&TInstant<V>> {
        self.instants.last()
    }

    /// Box of everything pushed so far.
    pub fn bbox(&self) -> Option<&V::BBox> {
        self.bbox.as_ref()
    }

    pub fn push(&mut self, inst: TInstant<V>) -> Result<()> {
        inst.value().validate()?;
        if let Some(last) = self.instants.last() {
            if inst.timestamp() <= last.timestamp() {
                return Err(TemporaError::invalid(format!(
                    "timestamps must be strictly increasing: {} then {}",
                    last.timestamp(),
                    inst.timestamp()
                )));
            }
            self.instants[0].value().ensure_compatible(inst.value())?;
            if self.interp == Interpolation::Linear {
                last.value().ensure_linear_segment(inst.value())?;
            }
        }
        match self.bbox.as_mut() {
            Some(bbox) => bbox.expand_instant(inst.value(), inst.timestamp()),
            None => self.bbox = Some(instant_box(inst.value(), inst.timestamp())),
        }
        self.instants.push(inst);
        Ok(())
    }

    /// Push unless the timestamp repeats the last one.
    pub(crate) fn push_distinct(&mut self, inst: TInstant<V>) -> Result<()> {
        if self.last().is_some_and(|last| last.timestamp() == inst.timestamp()) {
            return Ok(());
        }
        self.push(inst)
    }

    /// Normalize and freeze into a sequence.
    pub fn finish(self, upper_inc: bool) -> Result<TSequence<V>> {
        let Some(bbox) = self.bbox else {
            return Err(TemporaError::invalid("a sequence needs at least one instant"));
        };
        let n = self.instants.len();
        let (lower_inc, upper_inc) = if n == 1 { (true, true) } else { (self.lower_inc, upper_inc) };
        if self.interp == Interpolation::Stepwise
            && n > 1
            && !upper_inc
            && self.instants[n - 1].value() != self.instants[n - 2].value()
        {
            return Err(TemporaError::invalid(
                "a stepwise sequence with an exclusive upper bound must end on its previous value",
            ));
        }
        let instants = normalize_instants(self.instants, self.interp);
        Ok(TSequence::from_parts(instants, lower_inc, upper_inc, self.interp, bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_types::Timestamp;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    #[test]
    fn test_box_grows_with_pushes() {
        let mut builder = SequenceBuilder::new(Interpolation::Linear).unwrap();
        builder.push(TInstant::new(5.0, ts(0))).unwrap();
        builder.push(TInstant::new(1.0, ts(1))).unwrap();
        builder.push(TInstant::new(9.0, ts(2))).unwrap();
        let bbox = builder.bbox().unwrap();
        assert_eq!((bbox.xmin, bbox.xmax), (1.0, 9.0));
        let seq = builder.finish(false).unwrap();
        assert_eq!(seq.bbox().tmax, ts(2));
        assert!(!seq.upper_inc());
    }

    #[test]
    fn test_failed_push_keeps_state() {
        let mut builder = SequenceBuilder::new(Interpolation::Linear).unwrap();
        builder.push(TInstant::new(1.0, ts(5))).unwrap();
        assert!(builder.push(TInstant::new(2.0, ts(5))).is_err());
        assert!(builder.push(TInstant::new(f64::NAN, ts(6))).is_err());
        assert_eq!(builder.len(), 1);
        let seq = builder.finish(false).unwrap();
        assert!(seq.lower_inc() && seq.upper_inc());
    }

    #[test]
    fn test_discrete_domain_rejects_linear() {
        assert!(SequenceBuilder::<bool>::new(Interpolation::Linear).is_err());
        assert!(SequenceBuilder::<bool>::new(Interpolation::Stepwise).unwrap().finish(true).is_err());
    }

    #[test]
    fn test_finish_matches_constructor() {
        let instants = vec![
            TInstant::new(1, ts(0)),
            TInstant::new(1, ts(1)),
            TInstant::new(4, ts(2)),
        ];
        let mut builder = SequenceBuilder::new(Interpolation::Stepwise).unwrap();
        for inst in instants.clone() {
            builder.push(inst).unwrap();
        }
        let built = builder.finish(true).unwrap();
        let direct = TSequence::new(instants, true, true, Interpolation::Stepwise).unwrap();
        assert_eq!(built, direct);
    }
}
