//! Temporal values in their four shapes.
//!
//! A [`Temporal`] is exactly one of an instant, an instant set, a sequence or
//! a sequence set. Each shape owns its instants and caches its bounding box at
//! construction; after that it is immutable.
//!
//! # Examples
//!
//! ```
//! use tempora::prelude::*;
//!
//! let seq: Temporal<f64> = "[0@2000-01-01 00:00:00, 10@2000-01-01 00:00:10]".parse().unwrap();
//! let t = Timestamp::parse("2000-01-01 00:00:05").unwrap();
//! assert_eq!(seq.value_at_timestamp(t).unwrap(), 5.0);
//! ```

pub mod builder;
pub mod ever;
pub mod instant;
pub mod instant_set;
pub mod restrict;
pub mod sequence;
pub mod sequence_set;
pub mod sync;

pub use builder::SequenceBuilder;
pub use instant::TInstant;
pub use instant_set::TInstantSet;
pub use sequence::TSequence;
pub use sequence_set::TSequenceSet;
pub use sync::synchronize;

use crate::base::{BaseValue, OrderedValue};
use crate::error::{Result, TemporaError};
use crate::time::{Period, PeriodSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use tempora_types::Timestamp;

/// How values evolve between two consecutive instants of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    /// The value holds until the next instant.
    Stepwise,
    /// The value moves along a straight line to the next instant.
    Linear,
}

impl Interpolation {
    /// Linear for continuous domains, stepwise otherwise.
    pub fn default_for<V: BaseValue>() -> Self {
        if V::CONTINUOUS {
            Interpolation::Linear
        } else {
            Interpolation::Stepwise
        }
    }
}

/// Shape tag of a temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemporalSubtype {
    Instant,
    InstantSet,
    Sequence,
    SequenceSet,
}

impl fmt::Display for TemporalSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemporalSubtype::Instant => "instant",
            TemporalSubtype::InstantSet => "instant set",
            TemporalSubtype::Sequence => "sequence",
            TemporalSubtype::SequenceSet => "sequence set",
        };
        f.write_str(name)
    }
}

/// A value that varies over time.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal<V: BaseValue> {
    Instant(TInstant<V>),
    InstantSet(TInstantSet<V>),
    Sequence(TSequence<V>),
    SequenceSet(TSequenceSet<V>),
}

impl<V: BaseValue> From<TInstant<V>> for Temporal<V> {
    fn from(inst: TInstant<V>) -> Self {
        Temporal::Instant(inst)
    }
}

impl<V: BaseValue> From<TInstantSet<V>> for Temporal<V> {
    fn from(set: TInstantSet<V>) -> Self {
        Temporal::InstantSet(set)
    }
}

impl<V: BaseValue> From<TSequence<V>> for Temporal<V> {
    fn from(seq: TSequence<V>) -> Self {
        Temporal::Sequence(seq)
    }
}

impl<V: BaseValue> From<TSequenceSet<V>> for Temporal<V> {
    fn from(set: TSequenceSet<V>) -> Self {
        Temporal::SequenceSet(set)
    }
}

impl<V: BaseValue> Temporal<V> {
    /// Build a temporal instant after validating the value.
    pub fn instant(value: V, t: Timestamp) -> Result<Self> {
        value.validate()?;
        Ok(Temporal::Instant(TInstant::new(value, t)))
    }

    /// Wrap a list of sequences, collapsing a single one into a sequence.
    pub(crate) fn from_sequences(mut sequences: Vec<TSequence<V>>) -> Result<Option<Self>> {
        Ok(match sequences.len() {
            0 => None,
            1 => sequences.pop().map(Temporal::Sequence),
            _ => Some(Temporal::SequenceSet(TSequenceSet::new(sequences)?)),
        })
    }

    pub fn subtype(&self) -> TemporalSubtype {
        match self {
            Temporal::Instant(_) => TemporalSubtype::Instant,
            Temporal::InstantSet(_) => TemporalSubtype::InstantSet,
            Temporal::Sequence(_) => TemporalSubtype::Sequence,
            Temporal::SequenceSet(_) => TemporalSubtype::SequenceSet,
        }
    }

    /// Interpolation of continuous shapes; `None` for instants and instant sets.
    pub fn interpolation(&self) -> Option<Interpolation> {
        match self {
            Temporal::Instant(_) | Temporal::InstantSet(_) => None,
            Temporal::Sequence(seq) => Some(seq.interpolation()),
            Temporal::SequenceSet(set) => Some(set.interpolation()),
        }
    }

    pub fn bbox(&self) -> V::BBox {
        match self {
            Temporal::Instant(inst) => inst.bbox(),
            Temporal::InstantSet(set) => set.bbox().clone(),
            Temporal::Sequence(seq) => seq.bbox().clone(),
            Temporal::SequenceSet(set) => set.bbox().clone(),
        }
    }

    /// Bounding period, keeping the bound inclusivity of continuous shapes.
    pub fn period(&self) -> Period {
        match self {
            Temporal::Instant(inst) => inst.period(),
            Temporal::InstantSet(set) => set.period(),
            Temporal::Sequence(seq) => seq.period(),
            Temporal::SequenceSet(set) => set.period(),
        }
    }

    /// Exact time extent.
    pub fn time(&self) -> PeriodSet {
        match self {
            Temporal::Instant(inst) => PeriodSet::from(inst.period()),
            Temporal::InstantSet(set) => set.time(),
            Temporal::Sequence(seq) => PeriodSet::from(seq.period()),
            Temporal::SequenceSet(set) => set.time(),
        }
    }

    /// Total duration in microseconds; zero for instants and instant sets.
    pub fn duration(&self) -> i64 {
        match self {
            Temporal::Instant(_) | Temporal::InstantSet(_) => 0,
            Temporal::Sequence(seq) => seq.duration(),
            Temporal::SequenceSet(set) => set.duration(),
        }
    }

    pub fn num_instants(&self) -> usize {
        match self {
            Temporal::Instant(_) => 1,
            Temporal::InstantSet(set) => set.num_instants(),
            Temporal::Sequence(seq) => seq.num_instants(),
            Temporal::SequenceSet(set) => set.num_instants(),
        }
    }

    /// Every instant in time order.
    pub fn instants(&self) -> Vec<&TInstant<V>> {
        match self {
            Temporal::Instant(inst) => vec![inst],
            Temporal::InstantSet(set) => set.instants().iter().collect(),
            Temporal::Sequence(seq) => seq.instants().iter().collect(),
            Temporal::SequenceSet(set) => set.instants().collect(),
        }
    }

    pub fn start_instant(&self) -> &TInstant<V> {
        match self {
            Temporal::Instant(inst) => inst,
            Temporal::InstantSet(set) => set.start_instant(),
            Temporal::Sequence(seq) => seq.start_instant(),
            Temporal::SequenceSet(set) => set.start_sequence().start_instant(),
        }
    }

    pub fn end_instant(&self) -> &TInstant<V> {
        match self {
            Temporal::Instant(inst) => inst,
            Temporal::InstantSet(set) => set.end_instant(),
            Temporal::Sequence(seq) => seq.end_instant(),
            Temporal::SequenceSet(set) => set.end_sequence().end_instant(),
        }
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.start_instant().timestamp()
    }

    pub fn end_timestamp(&self) -> Timestamp {
        self.end_instant().timestamp()
    }

    /// Distinct timestamps in increasing order.
    pub fn timestamps(&self) -> Vec<Timestamp> {
        let mut times: Vec<Timestamp> = self.instants().iter().map(|inst| inst.timestamp()).collect();
        times.dedup();
        times
    }

    /// Distinct instant values in order of first appearance.
    pub fn values(&self) -> Vec<V> {
        let mut values: Vec<V> = Vec::new();
        for inst in self.instants() {
            if !values.contains(inst.value()) {
                values.push(inst.value().clone());
            }
        }
        values
    }

    /// Value at `t`, failing with `OutOfRange` outside the time extent.
    pub fn value_at_timestamp(&self, t: Timestamp) -> Result<V> {
        match self {
            Temporal::Instant(inst) => inst.value_at_timestamp(t),
            Temporal::InstantSet(set) => set.value_at_timestamp(t),
            Temporal::Sequence(seq) => seq.value_at_timestamp(t),
            Temporal::SequenceSet(set) => set.value_at_timestamp(t),
        }
    }

    /// Move the value in time by `delta` microseconds.
    pub fn shift(&self, delta: i64) -> Self {
        match self {
            Temporal::Instant(inst) => Temporal::Instant(inst.shift(delta)),
            Temporal::InstantSet(set) => Temporal::InstantSet(set.shift(delta)),
            Temporal::Sequence(seq) => Temporal::Sequence(seq.shift(delta)),
            Temporal::SequenceSet(set) => Temporal::SequenceSet(set.shift(delta)),
        }
    }

    /// View as a sequence set.
    ///
    /// Instants become one single-instant sequence each. Discrete domains
    /// take stepwise interpolation, continuous ones linear.
    pub fn to_sequence_set(&self) -> TSequenceSet<V> {
        match self {
            Temporal::Instant(inst) => TSequenceSet::from_sequence(TSequence::from_instant(inst.clone())),
            Temporal::InstantSet(set) => TSequenceSet::from_instants(set.instants()),
            Temporal::Sequence(seq) => TSequenceSet::from_sequence(seq.clone()),
            Temporal::SequenceSet(set) => set.clone(),
        }
    }

    /// Sequences making up a continuous value; instants become single-instant sequences.
    pub(crate) fn sequences(&self) -> Vec<TSequence<V>> {
        match self {
            Temporal::Sequence(seq) => vec![seq.clone()],
            Temporal::SequenceSet(set) => set.sequences().to_vec(),
            other => other.to_sequence_set().sequences().to_vec(),
        }
    }

    /// SRID of point values, zero otherwise.
    pub fn srid(&self) -> i32 {
        self.start_instant().value().srid()
    }

    /// Fail unless both values share interpolation.
    pub(crate) fn ensure_same_interpolation(&self, other: &Self) -> Result<()> {
        if let (Some(a), Some(b)) = (self.interpolation(), other.interpolation())
            && a != b
        {
            return Err(TemporaError::invalid(format!(
                "interpolation mismatch: {:?} and {:?}",
                a, b
            )));
        }
        Ok(())
    }

    /// Fail unless values of both operands can be combined.
    pub(crate) fn ensure_compatible(&self, other: &Self) -> Result<()> {
        self.start_instant()
            .value()
            .ensure_compatible(other.start_instant().value())
    }
}

impl<V: OrderedValue> Temporal<V> {
    /// Smallest value taken at any instant.
    pub fn min_value(&self) -> V {
        self.fold_values(|best, value| value < best)
    }

    /// Largest value taken at any instant.
    pub fn max_value(&self) -> V {
        self.fold_values(|best, value| value > best)
    }

    fn fold_values(&self, better: impl Fn(&V, &V) -> bool) -> V {
        let instants = self.instants();
        let mut best = instants[0].value();
        for inst in &instants[1..] {
            if better(best, inst.value()) {
                best = inst.value();
            }
        }
        best.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn float_seq(points: &[(f64, i64)]) -> TSequence<f64> {
        let instants = points.iter().map(|&(v, t)| TInstant::new(v, ts(t))).collect();
        TSequence::new(instants, true, true, Interpolation::Linear).unwrap()
    }

    #[test]
    fn test_accessors_across_variants() {
        let seq: Temporal<f64> = float_seq(&[(1.0, 0), (5.0, 10), (2.0, 20)]).into();
        assert_eq!(seq.subtype(), TemporalSubtype::Sequence);
        assert_eq!(seq.num_instants(), 3);
        assert_eq!(seq.start_timestamp(), ts(0));
        assert_eq!(seq.end_timestamp(), ts(20));
        assert_eq!(seq.min_value(), 1.0);
        assert_eq!(seq.max_value(), 5.0);
        assert_eq!(seq.duration(), 20_000_000);
        assert_eq!(seq.interpolation(), Some(Interpolation::Linear));

        let inst = Temporal::instant(3, ts(4)).unwrap();
        assert_eq!(inst.num_instants(), 1);
        assert_eq!(inst.duration(), 0);
        assert_eq!(inst.interpolation(), None);
        assert!(Temporal::instant(f64::NAN, ts(0)).is_err());
    }

    #[test]
    fn test_values_are_distinct() {
        let seq = TSequence::new(
            vec![TInstant::new(1, ts(0)), TInstant::new(2, ts(1)), TInstant::new(1, ts(2))],
            true,
            true,
            Interpolation::Stepwise,
        )
        .unwrap();
        assert_eq!(Temporal::from(seq).values(), vec![1, 2]);
    }

    #[test]
    fn test_timestamps_dedup_junctions() {
        let a = TSequence::new(
            vec![TInstant::new(1, ts(0)), TInstant::new(1, ts(5))],
            true,
            false,
            Interpolation::Stepwise,
        )
        .unwrap();
        let b = TSequence::new(
            vec![TInstant::new(2, ts(5)), TInstant::new(2, ts(9))],
            true,
            true,
            Interpolation::Stepwise,
        )
        .unwrap();
        let set = TSequenceSet::make(vec![a, b], false).unwrap();
        assert_eq!(Temporal::from(set).timestamps(), vec![ts(0), ts(5), ts(9)]);
    }

    #[test]
    fn test_to_sequence_set_of_instant_set() {
        let set = TInstantSet::new(vec![TInstant::new(true, ts(0)), TInstant::new(false, ts(3))]).unwrap();
        let seqset = Temporal::from(set).to_sequence_set();
        assert_eq!(seqset.num_sequences(), 2);
        assert_eq!(seqset.interpolation(), Interpolation::Stepwise);
    }

    #[test]
    fn test_shift_moves_everything() {
        let seq: Temporal<f64> = float_seq(&[(1.0, 0), (2.0, 10)]).into();
        let shifted = seq.shift(1_000_000);
        assert_eq!(shifted.start_timestamp(), ts(1));
        assert_eq!(shifted.period().upper(), ts(11));
    }
}
