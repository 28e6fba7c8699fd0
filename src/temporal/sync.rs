//! Synchronization of two temporal values onto a shared timestamp grid.
use super::{Interpolation, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal};
use crate::base::BaseValue;
use crate::error::Result;
use log::trace;
use std::cmp::Ordering;
use tempora_types::Timestamp;

/// Pairs of sequence indexes whose periods overlap, found by a merge-join.
pub(crate) fn overlapping_pairs<V: BaseValue>(a: &[TSequence<V>], b: &[TSequence<V>]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (pa, pb) = (a[i].period(), b[j].period());
        if pa.overlaps(&pb) {
            pairs.push((i, j));
        }
        match pa.cmp_upper(&pb) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    pairs
}

/// Union of both timestamp lists restricted to `[lower, upper]`.
fn merged_timestamps<V: BaseValue>(
    a: &TSequence<V>,
    b: &TSequence<V>,
    lower: Timestamp,
    upper: Timestamp,
) -> Vec<Timestamp> {
    let inside = |t: &Timestamp| *t > lower && *t < upper;
    let mut ta = a.instants().iter().map(|inst| inst.timestamp()).filter(inside).peekable();
    let mut tb = b.instants().iter().map(|inst| inst.timestamp()).filter(inside).peekable();
    let mut times = vec![lower];
    loop {
        let next = match (ta.peek(), tb.peek()) {
            (Some(&x), Some(&y)) => match x.cmp(&y) {
                Ordering::Less => ta.next(),
                Ordering::Greater => tb.next(),
                Ordering::Equal => {
                    tb.next();
                    ta.next()
                }
            },
            (Some(_), None) => ta.next(),
            (None, Some(_)) => tb.next(),
            (None, None) => break,
        };
        times.extend(next);
    }
    times.push(upper);
    times
}

/// Where the two value functions meet inside a segment: the fraction of the
/// segment and the value both take there.
///
/// Both sides get the same value at the crossing even though the crossing
/// timestamp is rounded to a microsecond. A side that is constant over the
/// segment lends its value; otherwise it is `a` at the exact fraction.
fn segment_crossing<V: BaseValue>(
    a: &TSequence<V>,
    b: &TSequence<V>,
    t1: Timestamp,
    t2: Timestamp,
) -> Option<(f64, V)> {
    let (a1, a2) = (a.value_at(t1), a.value_at(t2));
    let (b1, b2) = (b.value_at(t1), b.value_at(t2));
    match (a.interpolation(), b.interpolation()) {
        (Interpolation::Linear, Interpolation::Linear) => {
            if a1 == b1 || a2 == b2 {
                return None;
            }
            let fraction = V::crossing(&a1, &a2, &b1, &b2)?;
            let shared = if b1 == b2 {
                b1
            } else if a1 == a2 {
                a1
            } else {
                a1.interpolate(&a2, fraction)
            };
            Some((fraction, shared))
        }
        (Interpolation::Linear, Interpolation::Stepwise) => a1.locate(&a2, &b1).map(|f| (f, b1)),
        (Interpolation::Stepwise, Interpolation::Linear) => b1.locate(&b2, &a1).map(|f| (f, a1)),
        (Interpolation::Stepwise, Interpolation::Stepwise) => None,
    }
}

/// Restrict two sequences to their common period and resample both on the
/// union of their timestamps.
///
/// With `crossings`, timestamps where the two value functions meet inside a
/// segment are added as well. This applies whenever at least one side is
/// linear. The outputs are not normalized, so both keep exactly the same
/// timestamps. `None` when the periods do not overlap.
///
/// # Examples
///
/// ```
/// use tempora::prelude::*;
/// use tempora::temporal::synchronize;
///
/// let up: TSequence<f64> = "[0@2000-01-01 00:00:00, 10@2000-01-01 00:00:10]".parse().unwrap();
/// let down: TSequence<f64> = "[10@2000-01-01 00:00:00, 0@2000-01-01 00:00:10]".parse().unwrap();
/// let (a, b) = synchronize(&up, &down, true).unwrap();
/// assert_eq!(a.num_instants(), 3);
/// assert_eq!(a.instants()[1].value(), b.instants()[1].value());
/// ```
pub fn synchronize<V: BaseValue>(
    a: &TSequence<V>,
    b: &TSequence<V>,
    crossings: bool,
) -> Option<(TSequence<V>, TSequence<V>)> {
    let inter = a.period().intersection(&b.period())?;
    let (lower, upper) = (inter.lower(), inter.upper());
    if inter.is_instant() {
        return Some((
            TSequence::from_valid(vec![TInstant::new(a.value_at(lower), lower)], true, true, a.interpolation()),
            TSequence::from_valid(vec![TInstant::new(b.value_at(lower), lower)], true, true, b.interpolation()),
        ));
    }

    let times = merged_timestamps(a, b, lower, upper);
    // Crossing instants carry the value both sides take there.
    let mut grid: Vec<(Timestamp, Option<V>)> = Vec::with_capacity(times.len());
    if crossings && (a.is_linear() || b.is_linear()) {
        for pair in times.windows(2) {
            grid.push((pair[0], None));
            if let Some((fraction, shared)) = segment_crossing(a, b, pair[0], pair[1]) {
                let t = pair[0].interpolate(pair[1], fraction);
                if t > pair[0] && t < pair[1] {
                    trace!("crossing inserted at {}", t);
                    grid.push((t, Some(shared)));
                }
            }
        }
        grid.push((upper, None));
    } else {
        grid.extend(times.into_iter().map(|t| (t, None)));
    }

    let resample = |seq: &TSequence<V>| {
        let mut instants: Vec<TInstant<V>> = grid
            .iter()
            .map(|(t, shared)| TInstant::new(shared.clone().unwrap_or_else(|| seq.value_at(*t)), *t))
            .collect();
        let n = instants.len();
        if seq.interpolation() == Interpolation::Stepwise && !inter.upper_inc() && n > 1 {
            instants[n - 1] = instants[n - 2].with_timestamp(upper);
        }
        TSequence::from_valid(instants, inter.lower_inc(), inter.upper_inc(), seq.interpolation())
    };
    Some((resample(a), resample(b)))
}

/// Instants of `a` and `b` at the timestamps where both are defined.
fn synchronize_discrete<V: BaseValue>(a: &Temporal<V>, b: &Temporal<V>) -> (Vec<TInstant<V>>, Vec<TInstant<V>>) {
    let (discrete, other, swapped) = match a {
        Temporal::Instant(_) | Temporal::InstantSet(_) => (a, b, false),
        _ => (b, a, true),
    };
    let mut left = Vec::new();
    let mut right = Vec::new();
    for inst in discrete.instants() {
        if let Ok(value) = other.value_at_timestamp(inst.timestamp()) {
            left.push(inst.clone());
            right.push(TInstant::new(value, inst.timestamp()));
        }
    }
    if swapped { (right, left) } else { (left, right) }
}

impl<V: BaseValue> Temporal<V> {
    /// Synchronize two temporal values of any shape.
    ///
    /// Discrete operands keep only the timestamps both values define.
    /// Continuous operands are merge-joined sequence by sequence. `None` when
    /// the time extents do not intersect.
    pub fn synchronize(&self, other: &Self, crossings: bool) -> Result<Option<(Self, Self)>> {
        self.ensure_compatible(other)?;
        let discrete = |t: &Self| matches!(t, Temporal::Instant(_) | Temporal::InstantSet(_));
        if discrete(self) || discrete(other) {
            let (left, right) = synchronize_discrete(self, other);
            let both_instants = matches!(self, Temporal::Instant(_)) || matches!(other, Temporal::Instant(_));
            let wrap = |instants: Vec<TInstant<V>>| -> Option<Self> {
                if both_instants {
                    instants.into_iter().next().map(Temporal::Instant)
                } else {
                    TInstantSet::from_valid(instants).map(Temporal::InstantSet)
                }
            };
            return Ok(wrap(left).zip(wrap(right)));
        }

        let seqs_a = self.sequences();
        let seqs_b = other.sequences();
        let mut left = Vec::new();
        let mut right = Vec::new();
        for (i, j) in overlapping_pairs(&seqs_a, &seqs_b) {
            if let Some((sa, sb)) = synchronize(&seqs_a[i], &seqs_b[j], crossings) {
                left.push(sa);
                right.push(sb);
            }
        }
        if left.is_empty() {
            return Ok(None);
        }
        if let (Temporal::Sequence(_), Temporal::Sequence(_)) = (self, other)
            && let (Some(sa), Some(sb)) = (left.pop(), right.pop())
        {
            return Ok(Some((Temporal::Sequence(sa), Temporal::Sequence(sb))));
        }
        Ok(Some((
            Temporal::SequenceSet(TSequenceSet::from_valid(left)),
            Temporal::SequenceSet(TSequenceSet::from_valid(right)),
        )))
    }
}
