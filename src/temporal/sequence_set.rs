//! Temporal values made of several disjoint sequences.
use super::sequence::normalize_instants;
use super::{Interpolation, TInstant, TSequence};
use crate::boxes::TemporalBox;
use crate::base::BaseValue;
use crate::error::{Result, TemporaError};
use crate::time::{Period, PeriodSet};
use tempora_types::Timestamp;

/// Sequences with increasing, non-overlapping periods.
#[derive(Debug, Clone, PartialEq)]
pub struct TSequenceSet<V: BaseValue> {
    sequences: Vec<TSequence<V>>,
    bbox: V::BBox,
}

fn validate<V: BaseValue>(sequences: &[TSequence<V>]) -> Result<()> {
    let Some(first) = sequences.first() else {
        return Err(TemporaError::invalid("a sequence set needs at least one sequence"));
    };
    let first_value = first.start_instant().value();
    for seq in sequences {
        if seq.interpolation() != first.interpolation() {
            return Err(TemporaError::invalid(
                "all sequences of a set must share interpolation",
            ));
        }
        first_value.ensure_compatible(seq.start_instant().value())?;
    }
    for pair in sequences.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ordered = a.end_timestamp() < b.start_timestamp()
            || (a.end_timestamp() == b.start_timestamp() && !(a.upper_inc() && b.lower_inc()));
        if !ordered {
            return Err(TemporaError::invalid(format!(
                "sequence periods must be increasing and disjoint: {} then {}",
                a.period(),
                b.period()
            )));
        }
    }
    Ok(())
}

/// Join two sequences meeting at one timestamp when the result keeps the
/// same values at every instant.
fn join<V: BaseValue>(a: &TSequence<V>, b: &TSequence<V>) -> Option<TSequence<V>> {
    if a.end_timestamp() != b.start_timestamp() || !(a.upper_inc() || b.lower_inc()) {
        return None;
    }
    let a_last = a.end_instant().value();
    let b_first = b.start_instant().value();
    let mut instants: Vec<TInstant<V>> = a.instants().to_vec();
    if a.interpolation() == Interpolation::Stepwise && !a.upper_inc() {
        // The value at the junction comes from `b`.
        instants.pop();
        instants.extend_from_slice(b.instants());
    } else if a_last == b_first {
        instants.extend_from_slice(&b.instants()[1..]);
    } else {
        return None;
    }
    TSequence::new(instants, a.lower_inc(), b.upper_inc(), a.interpolation()).ok()
}

/// Merge consecutive sequences that form one continuous piece.
pub(crate) fn normalize_sequences<V: BaseValue>(sequences: Vec<TSequence<V>>) -> Vec<TSequence<V>> {
    let mut result: Vec<TSequence<V>> = Vec::with_capacity(sequences.len());
    for seq in sequences {
        if let Some(last) = result.last_mut()
            && let Some(joined) = join(last, &seq)
        {
            *last = joined;
            continue;
        }
        result.push(seq);
    }
    result
}

impl<V: BaseValue> TSequenceSet<V> {
    /// Build and normalize a sequence set.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempora::prelude::*;
    ///
    /// let set: TSequenceSet<f64> =
    ///     "{[1@2000-01-01, 2@2000-01-02), [2@2000-01-02, 3@2000-01-03]}".parse().unwrap();
    /// // Touching sequences that agree at the junction merge into one.
    /// assert_eq!(set.num_sequences(), 1);
    /// ```
    pub fn new(sequences: Vec<TSequence<V>>) -> Result<Self> {
        Self::make(sequences, true)
    }

    /// Build a sequence set, normalizing only when asked.
    pub fn make(sequences: Vec<TSequence<V>>, normalize: bool) -> Result<Self> {
        validate(&sequences)?;
        let sequences = if normalize {
            normalize_sequences(sequences)
        } else {
            sequences
        };
        Ok(Self::from_valid(sequences))
    }

    pub fn from_sequence(seq: TSequence<V>) -> Self {
        Self::from_valid(vec![seq])
    }

    /// One single-instant sequence per instant.
    pub(crate) fn from_instants(instants: &[TInstant<V>]) -> Self {
        Self::from_valid(
            instants
                .iter()
                .map(|inst| TSequence::from_instant(inst.clone()))
                .collect(),
        )
    }

    pub(crate) fn from_valid(sequences: Vec<TSequence<V>>) -> Self {
        let mut bbox = sequences[0].bbox().clone();
        for seq in &sequences[1..] {
            bbox.expand(seq.bbox());
        }
        Self { sequences, bbox }
    }

    pub fn sequences(&self) -> &[TSequence<V>] {
        &self.sequences
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn sequence_n(&self, n: usize) -> Option<&TSequence<V>> {
        self.sequences.get(n)
    }

    pub fn start_sequence(&self) -> &TSequence<V> {
        &self.sequences[0]
    }

    pub fn end_sequence(&self) -> &TSequence<V> {
        &self.sequences[self.sequences.len() - 1]
    }

    pub fn interpolation(&self) -> Interpolation {
        self.sequences[0].interpolation()
    }

    pub fn bbox(&self) -> &V::BBox {
        &self.bbox
    }

    /// Bounding period from the first lower to the last upper bound.
    pub fn period(&self) -> Period {
        let (first, last) = (self.start_sequence(), self.end_sequence());
        Period::new_unchecked(
            first.start_timestamp(),
            last.end_timestamp(),
            first.lower_inc(),
            last.upper_inc(),
        )
    }

    pub fn time(&self) -> PeriodSet {
        PeriodSet::new(self.sequences.iter().map(|seq| seq.period()).collect())
            .unwrap_or_else(|_| PeriodSet::from(self.period()))
    }

    /// Sum of the sequence durations in microseconds.
    pub fn duration(&self) -> i64 {
        self.sequences.iter().map(|seq| seq.duration()).sum()
    }

    pub fn num_instants(&self) -> usize {
        self.sequences.iter().map(|seq| seq.num_instants()).sum()
    }

    pub fn instants(&self) -> impl Iterator<Item = &TInstant<V>> {
        self.sequences.iter().flat_map(|seq| seq.instants().iter())
    }

    /// Index of the sequence holding `t`, or `None` when `t` falls in a gap
    /// or outside the set.
    pub fn find_timestamp(&self, t: Timestamp) -> Option<usize> {
        let i = self
            .sequences
            .partition_point(|seq| seq.end_timestamp() < t || (seq.end_timestamp() == t && !seq.upper_inc()));
        self.sequences
            .get(i)
            .filter(|seq| seq.period().contains_value(t))
            .map(|_| i)
    }

    pub fn value_at_timestamp(&self, t: Timestamp) -> Result<V> {
        match self.find_timestamp(t) {
            Some(i) => self.sequences[i].value_at_timestamp(t),
            None => Err(TemporaError::OutOfRange(format!(
                "timestamp {} is outside the sequence set",
                t
            ))),
        }
    }

    pub fn shift(&self, delta: i64) -> Self {
        Self::from_valid(self.sequences.iter().map(|seq| seq.shift(delta)).collect())
    }

    /// Normalize the instants of every sequence and merge touching ones.
    pub fn normalize(&self) -> Self {
        let sequences = self
            .sequences
            .iter()
            .map(|seq| {
                let instants = normalize_instants(seq.instants().to_vec(), seq.interpolation());
                TSequence::from_valid(instants, seq.lower_inc(), seq.upper_inc(), seq.interpolation())
            })
            .collect();
        Self::from_valid(normalize_sequences(sequences))
    }
}
