//! Restriction of temporal values to parts of their time or value domain.
//!
//! `at_*` keeps the part of a value inside the argument and `minus_*` the
//! part outside. Results that would be empty are `None`; continuous results
//! made of several pieces become sequence sets.
use super::sequence::normalize_instants;
use super::sequence_set::normalize_sequences;
use super::{Interpolation, TInstant, TInstantSet, TSequence, Temporal};
use crate::base::{BaseValue, NumericValue, OrderedValue};
use crate::error::Result;
use crate::time::{FloatSpan, Period, PeriodSet, TimestampSet};
use tempora_types::Timestamp;

impl<V: BaseValue> TSequence<V> {
    pub fn at_timestamp(&self, t: Timestamp) -> Option<TInstant<V>> {
        self.period()
            .contains_value(t)
            .then(|| TInstant::new(self.value_at(t), t))
    }

    /// Part of the sequence inside `period`.
    pub fn at_period(&self, period: &Period) -> Option<TSequence<V>> {
        let inter = self.period().intersection(period)?;
        let (lower, upper) = (inter.lower(), inter.upper());
        let interp = self.interpolation();
        if inter.is_instant() {
            return Some(TSequence::from_valid(
                vec![TInstant::new(self.value_at(lower), lower)],
                true,
                true,
                interp,
            ));
        }
        let instants = self.instants();
        let first = instants.partition_point(|inst| inst.timestamp() <= lower);
        let last = instants.partition_point(|inst| inst.timestamp() < upper);
        let mut result = Vec::with_capacity(last.saturating_sub(first) + 2);
        result.push(TInstant::new(self.value_at(lower), lower));
        result.extend_from_slice(&instants[first..last.max(first)]);
        let mut end_value = self.value_at(upper);
        if interp == Interpolation::Stepwise && !inter.upper_inc() {
            end_value = result[result.len() - 1].value().clone();
        }
        result.push(TInstant::new(end_value, upper));
        Some(TSequence::from_valid(
            normalize_instants(result, interp),
            inter.lower_inc(),
            inter.upper_inc(),
            interp,
        ))
    }

    /// Pieces of the sequence inside the periods of `periods`.
    pub fn at_periodset(&self, periods: &PeriodSet) -> Vec<TSequence<V>> {
        let period = self.period();
        let spans = periods.spans();
        let start = spans.partition_point(|span| span.is_left_of(&period));
        spans[start..]
            .iter()
            .take_while(|span| !period.is_left_of(span))
            .filter_map(|span| self.at_period(span))
            .collect()
    }

    pub fn minus_periodset(&self, periods: &PeriodSet) -> Vec<TSequence<V>> {
        match PeriodSet::from(self.period()).minus(periods) {
            Some(rest) => self.at_periodset(&rest),
            None => Vec::new(),
        }
    }

    /// Pieces where the sequence equals `value`.
    ///
    /// A linear segment passing through `value` contributes a single
    /// instant; a constant segment equal to it contributes the whole segment.
    pub fn at_value(&self, value: &V) -> Vec<TSequence<V>> {
        let instants = self.instants();
        let n = instants.len();
        let interp = self.interpolation();
        if n == 1 {
            return if instants[0].value() == value {
                vec![self.clone()]
            } else {
                Vec::new()
            };
        }
        let single = |t: Timestamp| TSequence::from_valid(vec![TInstant::new(value.clone(), t)], true, true, interp);
        let mut pieces = Vec::new();
        for i in 0..n - 1 {
            let (inst1, inst2) = (&instants[i], &instants[i + 1]);
            let (t1, t2) = (inst1.timestamp(), inst2.timestamp());
            let lower_inc = i > 0 || self.lower_inc();
            let upper_inc = i == n - 2 && self.upper_inc();
            let (v1, v2) = (inst1.value(), inst2.value());
            match interp {
                Interpolation::Stepwise => {
                    if v1 == value {
                        pieces.push(TSequence::from_valid(
                            vec![TInstant::new(value.clone(), t1), TInstant::new(value.clone(), t2)],
                            lower_inc,
                            false,
                            interp,
                        ));
                    }
                    if upper_inc && v2 == value {
                        pieces.push(single(t2));
                    }
                }
                Interpolation::Linear => {
                    if v1 == v2 {
                        if v1 == value {
                            pieces.push(TSequence::from_valid(
                                vec![TInstant::new(value.clone(), t1), TInstant::new(value.clone(), t2)],
                                lower_inc,
                                upper_inc,
                                interp,
                            ));
                        }
                    } else if v1 == value {
                        if lower_inc {
                            pieces.push(single(t1));
                        }
                    } else if v2 == value {
                        if upper_inc {
                            pieces.push(single(t2));
                        }
                    } else if let Some(fraction) = v1.locate(v2, value) {
                        let t = t1.interpolate(t2, fraction);
                        if t > t1 && t < t2 {
                            pieces.push(single(t));
                        }
                    }
                }
            }
        }
        normalize_sequences(pieces)
    }

    pub fn minus_value(&self, value: &V) -> Vec<TSequence<V>> {
        let pieces = self.at_value(value);
        if pieces.is_empty() {
            return vec![self.clone()];
        }
        let time = PeriodSet::from_normalized(pieces.iter().map(|seq| seq.period()).collect());
        self.minus_periodset(&time)
    }
}

impl<V: NumericValue> TSequence<V> {
    /// Periods during which the value lies within `span`.
    fn span_periods(&self, span: &FloatSpan) -> Vec<Period> {
        let instants = self.instants();
        let n = instants.len();
        let contains = |x: f64| span.contains_value(x);
        if n == 1 {
            return if contains(instants[0].value().to_f64()) {
                vec![self.period()]
            } else {
                Vec::new()
            };
        }
        let mut periods = Vec::new();
        for i in 0..n - 1 {
            let (t1, t2) = (instants[i].timestamp(), instants[i + 1].timestamp());
            let (x1, x2) = (instants[i].value().to_f64(), instants[i + 1].value().to_f64());
            let seg_lower_inc = i > 0 || self.lower_inc();
            let seg_upper_inc = i == n - 2 && self.upper_inc();
            if !self.is_linear() {
                if contains(x1) {
                    periods.extend(Period::new(t1, t2, seg_lower_inc, false).ok());
                }
                if seg_upper_inc && contains(x2) {
                    periods.push(Period::instant(t2));
                }
                continue;
            }
            if x1 == x2 {
                if contains(x1) {
                    periods.extend(Period::new(t1, t2, seg_lower_inc, seg_upper_inc).ok());
                }
                continue;
            }
            let fraction = |x: f64| (x - x1) / (x2 - x1);
            let (lo, lo_inc, hi, hi_inc) = (span.lower(), span.lower_inc(), span.upper(), span.upper_inc());
            // Entering and leaving the span along the segment direction.
            let ((f_start, start_inc), (f_end, end_inc)) = if x2 > x1 {
                let start = if lo > x1 {
                    (fraction(lo), lo_inc)
                } else {
                    (0.0, seg_lower_inc && (lo < x1 || lo_inc))
                };
                let end = if hi < x2 {
                    (fraction(hi), hi_inc)
                } else {
                    (1.0, seg_upper_inc && (hi > x2 || hi_inc))
                };
                (start, end)
            } else {
                let start = if hi < x1 {
                    (fraction(hi), hi_inc)
                } else {
                    (0.0, seg_lower_inc && (hi > x1 || hi_inc))
                };
                let end = if lo > x2 {
                    (fraction(lo), lo_inc)
                } else {
                    (1.0, seg_upper_inc && (lo < x2 || lo_inc))
                };
                (start, end)
            };
            if f_start > f_end || f_start > 1.0 || f_end < 0.0 {
                continue;
            }
            let start = t1.interpolate(t2, f_start);
            let end = t1.interpolate(t2, f_end);
            periods.extend(Period::new(start, end, start_inc, end_inc).ok());
        }
        periods
    }

    /// Pieces whose values fall within `span`.
    pub fn at_span(&self, span: &FloatSpan) -> Vec<TSequence<V>> {
        match PeriodSet::from_spans(self.span_periods(span)) {
            Some(time) => self.at_periodset(&time),
            None => Vec::new(),
        }
    }

    pub fn minus_span(&self, span: &FloatSpan) -> Vec<TSequence<V>> {
        match PeriodSet::from_spans(self.span_periods(span)) {
            Some(time) => self.minus_periodset(&time),
            None => vec![self.clone()],
        }
    }
}

impl<V: BaseValue> Temporal<V> {
    /// Keep the instants of a discrete value accepted by `keep`.
    fn filter_instants(&self, keep: impl Fn(&TInstant<V>) -> bool) -> Option<Self> {
        match self {
            Temporal::Instant(inst) => keep(inst).then(|| self.clone()),
            Temporal::InstantSet(set) => {
                let kept: Vec<TInstant<V>> = set.instants().iter().filter(|inst| keep(inst)).cloned().collect();
                TInstantSet::from_valid(kept).map(Temporal::InstantSet)
            }
            Temporal::Sequence(_) | Temporal::SequenceSet(_) => None,
        }
    }

    /// Apply `f` to every sequence and gather the pieces.
    fn map_sequences(&self, f: impl Fn(&TSequence<V>) -> Vec<TSequence<V>>) -> Option<Self> {
        let pieces: Vec<TSequence<V>> = self.sequences().iter().flat_map(f).collect();
        Temporal::from_sequences(normalize_sequences(pieces)).ok().flatten()
    }

    fn is_discrete(&self) -> bool {
        matches!(self, Temporal::Instant(_) | Temporal::InstantSet(_))
    }

    /// The instant at `t`, if the value is defined there.
    pub fn at_timestamp(&self, t: Timestamp) -> Option<Self> {
        self.value_at_timestamp(t)
            .ok()
            .map(|value| Temporal::Instant(TInstant::new(value, t)))
    }

    pub fn minus_timestamp(&self, t: Timestamp) -> Option<Self> {
        if self.is_discrete() {
            return self.filter_instants(|inst| inst.timestamp() != t);
        }
        self.minus_periodset(&PeriodSet::from(Period::instant(t)))
    }

    pub fn at_timestampset(&self, times: &TimestampSet) -> Option<Self> {
        match self {
            Temporal::Instant(_) | Temporal::InstantSet(_) => {
                self.filter_instants(|inst| times.contains(inst.timestamp()))
            }
            _ => {
                let instants: Vec<TInstant<V>> = times
                    .times()
                    .iter()
                    .filter_map(|&t| self.value_at_timestamp(t).ok().map(|value| TInstant::new(value, t)))
                    .collect();
                TInstantSet::from_valid(instants).map(Temporal::InstantSet)
            }
        }
    }

    pub fn minus_timestampset(&self, times: &TimestampSet) -> Option<Self> {
        if self.is_discrete() {
            return self.filter_instants(|inst| !times.contains(inst.timestamp()));
        }
        self.minus_periodset(&times.to_periodset())
    }

    pub fn at_period(&self, period: &Period) -> Option<Self> {
        if self.is_discrete() {
            return self.filter_instants(|inst| period.contains_value(inst.timestamp()));
        }
        self.map_sequences(|seq| seq.at_period(period).into_iter().collect())
    }

    pub fn minus_period(&self, period: &Period) -> Option<Self> {
        self.minus_periodset(&PeriodSet::from(*period))
    }

    pub fn at_periodset(&self, periods: &PeriodSet) -> Option<Self> {
        if self.is_discrete() {
            return self.filter_instants(|inst| periods.contains_value(inst.timestamp()));
        }
        self.map_sequences(|seq| seq.at_periodset(periods))
    }

    pub fn minus_periodset(&self, periods: &PeriodSet) -> Option<Self> {
        if self.is_discrete() {
            return self.filter_instants(|inst| !periods.contains_value(inst.timestamp()));
        }
        self.map_sequences(|seq| seq.minus_periodset(periods))
    }

    /// Restriction to the times where the value equals `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempora::prelude::*;
    ///
    /// let seq: Temporal<f64> = "[1@2000-01-01, 2@2000-01-02, 1@2000-01-03]".parse().unwrap();
    /// let at = seq.at_value(&1.5).unwrap().unwrap();
    /// assert_eq!(at.num_instants(), 2);
    /// ```
    pub fn at_value(&self, value: &V) -> Result<Option<Self>> {
        value.validate()?;
        self.start_instant().value().ensure_compatible(value)?;
        if self.is_discrete() {
            return Ok(self.filter_instants(|inst| inst.value() == value));
        }
        Ok(self.map_sequences(|seq| seq.at_value(value)))
    }

    pub fn minus_value(&self, value: &V) -> Result<Option<Self>> {
        value.validate()?;
        self.start_instant().value().ensure_compatible(value)?;
        if self.is_discrete() {
            return Ok(self.filter_instants(|inst| inst.value() != value));
        }
        Ok(self.map_sequences(|seq| seq.minus_value(value)))
    }

    /// Restriction to the times where the value is one of `values`.
    pub fn at_values(&self, values: &[V]) -> Result<Option<Self>> {
        let mut time: Option<PeriodSet> = None;
        for value in values {
            if let Some(part) = self.at_value(value)? {
                let part_time = part.time();
                time = Some(match time {
                    Some(acc) => acc.union(&part_time),
                    None => part_time,
                });
            }
        }
        Ok(time.and_then(|time| self.at_periodset(&time)))
    }
}

impl<V: OrderedValue> Temporal<V> {
    /// Restriction to the instants where the minimum value is taken.
    pub fn at_min(&self) -> Option<Self> {
        self.at_value(&self.min_value()).ok().flatten()
    }

    pub fn at_max(&self) -> Option<Self> {
        self.at_value(&self.max_value()).ok().flatten()
    }
}

impl<V: NumericValue> Temporal<V> {
    /// Restriction to the times where the value lies within `span`.
    pub fn at_span(&self, span: &FloatSpan) -> Option<Self> {
        if self.is_discrete() {
            return self.filter_instants(|inst| span.contains_value(inst.value().to_f64()));
        }
        self.map_sequences(|seq| seq.at_span(span))
    }

    pub fn minus_span(&self, span: &FloatSpan) -> Option<Self> {
        if self.is_discrete() {
            return self.filter_instants(|inst| !span.contains_value(inst.value().to_f64()));
        }
        self.map_sequences(|seq| seq.minus_span(span))
    }
}
