//! Temporal aggregation.
//!
//! An [`Aggregator`] keeps the partial result as a skip-list of disjoint
//! fragments ordered by time: instants for discrete inputs, sequences for
//! continuous ones. Each new input is spliced in, and fragments that meet in
//! time are combined by the aggregate function. Two aggregators over disjoint
//! inputs can be combined, which makes the fold usable from parallel workers.
//!
//! # Examples
//!
//! ```
//! use tempora::prelude::*;
//! use tempora::agg::{Aggregator, TSum};
//!
//! let a: Temporal<i32> = "[1@2000-01-03, 2@2000-01-04]".parse().unwrap();
//! let b: Temporal<i32> = "[3@2000-01-01, 4@2000-01-05]".parse().unwrap();
//!
//! let mut agg = Aggregator::new(TSum, &Config::default()).unwrap();
//! agg.transition(&a).unwrap();
//! agg.transition(&b).unwrap();
//! let sum = agg.finalize().unwrap().unwrap();
//! assert_eq!(sum.value_at_timestamp("2000-01-03".parse().unwrap()).unwrap(), 4);
//! ```

pub mod functions;
pub mod skiplist;

pub use functions::{TAnd, TAvg, TCentroid, TCentroid3D, TCount, TMax, TMin, TOr, TSum, TemporalAggregate};
pub use skiplist::{SkipList, Timed};

use crate::base::{BaseValue, NumericValue, OrderedValue};
use crate::boxes::TemporalBox;
use crate::config::Config;
use crate::error::{Result, TemporaError};
use crate::ops::ArithValue;
use crate::temporal::sequence_set::normalize_sequences;
use crate::temporal::sync::overlapping_pairs;
use crate::temporal::{Interpolation, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal, synchronize};
use crate::time::PeriodSet;
use std::cmp::Ordering;
use std::marker::PhantomData;
use tempora_types::GeoPoint;

enum State<S: BaseValue> {
    Empty,
    Instants(SkipList<TInstant<S>>),
    Sequences(SkipList<TSequence<S>>, Interpolation),
}

/// Incremental state of one temporal aggregate.
pub struct Aggregator<V: BaseValue, A: TemporalAggregate<V>> {
    func: A,
    config: Config,
    state: State<A::State>,
    _value: PhantomData<V>,
}

/// Merge two time-ordered instant lists, combining instants at equal
/// timestamps.
fn merge_instants<S, F>(old: Vec<TInstant<S>>, new: Vec<TInstant<S>>, combine: F) -> Result<Vec<TInstant<S>>>
where
    S: BaseValue,
    F: Fn(&S, &S) -> Result<S>,
{
    let mut result = Vec::with_capacity(old.len() + new.len());
    let mut old = old.into_iter().peekable();
    let mut new = new.into_iter().peekable();
    loop {
        let next = match (old.peek(), new.peek()) {
            (Some(a), Some(b)) => match a.timestamp().cmp(&b.timestamp()) {
                Ordering::Less => old.next(),
                Ordering::Greater => new.next(),
                Ordering::Equal => match (old.next(), new.next()) {
                    (Some(a), Some(b)) => Some(TInstant::new(combine(a.value(), b.value())?, a.timestamp())),
                    _ => None,
                },
            },
            (Some(_), None) => old.next(),
            (None, Some(_)) => new.next(),
            (None, None) => break,
        };
        result.extend(next);
    }
    Ok(result)
}

fn sequences_time<S: BaseValue>(sequences: &[TSequence<S>]) -> Option<PeriodSet> {
    PeriodSet::from_spans(sequences.iter().map(|seq| seq.period()).collect())
}

/// Merge two time-ordered lists of disjoint sequences. Where both lists are
/// defined the values are combined; elsewhere each list is copied.
fn merge_sequences<S, F>(
    old: Vec<TSequence<S>>,
    new: Vec<TSequence<S>>,
    combine: F,
    crossings: bool,
) -> Result<Vec<TSequence<S>>>
where
    S: BaseValue,
    F: Fn(&S, &S) -> Result<S>,
{
    let mut pieces = Vec::with_capacity(old.len() + new.len() + 2);
    if let Some(time_new) = sequences_time(&new) {
        for seq in &old {
            pieces.extend(seq.minus_periodset(&time_new));
        }
    }
    if let Some(time_old) = sequences_time(&old) {
        for seq in &new {
            pieces.extend(seq.minus_periodset(&time_old));
        }
    }
    for (i, j) in overlapping_pairs(&old, &new) {
        let Some((sa, sb)) = synchronize(&old[i], &new[j], crossings) else {
            continue;
        };
        let instants = sa
            .instants()
            .iter()
            .zip(sb.instants())
            .map(|(a, b)| Ok(TInstant::new(combine(a.value(), b.value())?, a.timestamp())))
            .collect::<Result<Vec<_>>>()?;
        pieces.push(TSequence::new(instants, sa.lower_inc(), sa.upper_inc(), sa.interpolation())?);
    }
    pieces.sort_by(|a, b| a.period().cmp_lower(&b.period()));
    Ok(normalize_sequences(pieces))
}

impl<V: BaseValue, A: TemporalAggregate<V>> Aggregator<V, A> {
    pub fn new(func: A, config: &Config) -> Result<Self> {
        config.validate().map_err(TemporaError::Config)?;
        Ok(Self {
            func,
            config: config.clone(),
            state: State::Empty,
            _value: PhantomData,
        })
    }

    /// Number of fragments currently held.
    pub fn len(&self) -> usize {
        match &self.state {
            State::Empty => 0,
            State::Instants(list) => list.len(),
            State::Sequences(list, _) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn transform_sequence(&self, seq: &TSequence<V>) -> Result<TSequence<A::State>> {
        let instants = seq
            .instants()
            .iter()
            .map(|inst| TInstant::new(self.func.transform(inst.value()), inst.timestamp()))
            .collect();
        let interp = if <A::State as BaseValue>::CONTINUOUS {
            seq.interpolation()
        } else {
            Interpolation::Stepwise
        };
        TSequence::new(instants, seq.lower_inc(), seq.upper_inc(), interp)
    }

    /// Fold one temporal value into the state.
    ///
    /// Fails with [`TemporaError::Aggregation`] when the value's shape or
    /// interpolation differs from the values folded so far.
    pub fn transition(&mut self, temp: &Temporal<V>) -> Result<()> {
        self.func.check(temp.start_instant().value())?;
        match temp {
            Temporal::Instant(_) | Temporal::InstantSet(_) => {
                let fragments: Vec<TInstant<A::State>> = temp
                    .instants()
                    .into_iter()
                    .map(|inst| TInstant::new(self.func.transform(inst.value()), inst.timestamp()))
                    .collect();
                self.splice_instants(fragments)
            }
            Temporal::Sequence(_) | Temporal::SequenceSet(_) => {
                let interp = temp.interpolation().unwrap_or(Interpolation::Stepwise);
                let fragments = temp
                    .sequences()
                    .iter()
                    .map(|seq| self.transform_sequence(seq))
                    .collect::<Result<Vec<_>>>()?;
                self.splice_sequences(fragments, interp)
            }
        }
    }

    fn splice_instants(&mut self, fragments: Vec<TInstant<A::State>>) -> Result<()> {
        let func = &self.func;
        match &mut self.state {
            State::Empty => {
                self.state = State::Instants(SkipList::from_values(&self.config.aggregation, fragments)?);
                Ok(())
            }
            State::Instants(list) => list.splice(fragments, |old, new| {
                merge_instants(old, new, |a, b| func.combine(a, b))
            }),
            State::Sequences(..) => Err(TemporaError::Aggregation(
                "cannot aggregate instants with sequences".to_string(),
            )),
        }
    }

    fn splice_sequences(&mut self, fragments: Vec<TSequence<A::State>>, interp: Interpolation) -> Result<()> {
        let func = &self.func;
        match &mut self.state {
            State::Empty => {
                self.state = State::Sequences(SkipList::from_values(&self.config.aggregation, fragments)?, interp);
                Ok(())
            }
            State::Sequences(list, current) => {
                if *current != interp {
                    return Err(TemporaError::Aggregation(
                        "cannot aggregate stepwise with linear sequences".to_string(),
                    ));
                }
                list.splice(fragments, |old, new| {
                    merge_sequences(old, new, |a, b| func.combine(a, b), A::CROSSINGS)
                })
            }
            State::Instants(_) => Err(TemporaError::Aggregation(
                "cannot aggregate sequences with instants".to_string(),
            )),
        }
    }

    /// Merge the partial state of another aggregator into this one.
    pub fn combine(&mut self, other: Self) -> Result<()> {
        self.func.absorb(&other.func)?;
        match other.state {
            State::Empty => Ok(()),
            State::Instants(list) => self.splice_instants(list.into_values()),
            State::Sequences(list, interp) => self.splice_sequences(list.into_values(), interp),
        }
    }

    /// The aggregated temporal value, or `None` when nothing was folded.
    ///
    /// Discrete inputs produce an instant set, continuous inputs a sequence
    /// set.
    pub fn finalize(self) -> Result<Option<Temporal<A::Output>>> {
        let func = self.func;
        match self.state {
            State::Empty => Ok(None),
            State::Instants(list) => {
                let instants = list
                    .into_values()
                    .into_iter()
                    .map(|inst| TInstant::new(func.finish(inst.value()), inst.timestamp()))
                    .collect();
                Ok(Some(Temporal::InstantSet(TInstantSet::new(instants)?)))
            }
            State::Sequences(list, _) => {
                let sequences = list
                    .into_values()
                    .into_iter()
                    .map(|seq| {
                        let interp = if <A::Output as BaseValue>::CONTINUOUS {
                            seq.interpolation()
                        } else {
                            Interpolation::Stepwise
                        };
                        let instants = seq
                            .instants()
                            .iter()
                            .map(|inst| TInstant::new(func.finish(inst.value()), inst.timestamp()))
                            .collect();
                        TSequence::new(instants, seq.lower_inc(), seq.upper_inc(), interp)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Some(Temporal::SequenceSet(TSequenceSet::new(sequences)?)))
            }
        }
    }
}

/// Fold `values` with `func`.
pub fn aggregate<V, A>(func: A, values: &[Temporal<V>], config: &Config) -> Result<Option<Temporal<A::Output>>>
where
    V: BaseValue,
    A: TemporalAggregate<V>,
{
    let mut agg = Aggregator::new(func, config)?;
    for temp in values {
        agg.transition(temp)?;
    }
    agg.finalize()
}

pub fn tmin<V: OrderedValue>(values: &[Temporal<V>], config: &Config) -> Result<Option<Temporal<V>>> {
    aggregate(TMin, values, config)
}

pub fn tmax<V: OrderedValue>(values: &[Temporal<V>], config: &Config) -> Result<Option<Temporal<V>>> {
    aggregate(TMax, values, config)
}

pub fn tsum<V: ArithValue>(values: &[Temporal<V>], config: &Config) -> Result<Option<Temporal<V>>> {
    aggregate(TSum, values, config)
}

pub fn tcount<V: BaseValue>(values: &[Temporal<V>], config: &Config) -> Result<Option<Temporal<i32>>> {
    aggregate(TCount, values, config)
}

pub fn tavg<V: NumericValue>(values: &[Temporal<V>], config: &Config) -> Result<Option<Temporal<f64>>> {
    aggregate(TAvg, values, config)
}

/// Centroid of temporal points, in 3D when the first input has z.
pub fn tcentroid(values: &[Temporal<GeoPoint>], config: &Config) -> Result<Option<Temporal<GeoPoint>>> {
    match values.first() {
        Some(first) if first.start_instant().value().has_z() => aggregate(TCentroid3D::default(), values, config),
        _ => aggregate(TCentroid::default(), values, config),
    }
}

pub fn tand(values: &[Temporal<bool>], config: &Config) -> Result<Option<Temporal<bool>>> {
    aggregate(TAnd, values, config)
}

pub fn tor(values: &[Temporal<bool>], config: &Config) -> Result<Option<Temporal<bool>>> {
    aggregate(TOr, values, config)
}

/// Bounding box of all values, or `None` for an empty input.
pub fn extent<'a, V, I>(values: I) -> Option<V::BBox>
where
    V: BaseValue + 'a,
    I: IntoIterator<Item = &'a Temporal<V>>,
{
    values.into_iter().fold(None, |acc, temp| {
        let bbox = temp.bbox();
        Some(match acc {
            Some(mut acc) => {
                <V::BBox as TemporalBox<V>>::expand(&mut acc, &bbox);
                acc
            }
            None => bbox,
        })
    })
}
