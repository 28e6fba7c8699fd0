//! Continuous temporal values over a single time interval.
use super::{Interpolation, TInstant};
use crate::base::{BaseValue, ensure_values, instant_box};
use crate::boxes::TemporalBox;
use crate::error::{Result, TemporaError};
use crate::time::Period;
use tempora_types::Timestamp;

/// An ordered run of instants sharing one interpolation.
///
/// Between consecutive instants a stepwise sequence holds the earlier value
/// and a linear sequence blends towards the later one. The bound flags say
/// whether the first and last timestamps belong to the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TSequence<V: BaseValue> {
    instants: Vec<TInstant<V>>,
    lower_inc: bool,
    upper_inc: bool,
    interp: Interpolation,
    bbox: V::BBox,
}

/// Bounding box of a non-empty run of instants.
pub(crate) fn instants_bbox<V: BaseValue>(instants: &[TInstant<V>]) -> V::BBox {
    let mut bbox = instant_box(instants[0].value(), instants[0].timestamp());
    for inst in &instants[1..] {
        bbox.expand_instant(inst.value(), inst.timestamp());
    }
    bbox
}

fn validate<V: BaseValue>(
    instants: &[TInstant<V>],
    lower_inc: bool,
    upper_inc: bool,
    interp: Interpolation,
) -> Result<()> {
    let n = instants.len();
    if n == 0 {
        return Err(TemporaError::invalid("a sequence needs at least one instant"));
    }
    if n == 1 && !(lower_inc && upper_inc) {
        return Err(TemporaError::invalid(
            "a single-instant sequence must include both bounds",
        ));
    }
    if interp == Interpolation::Linear && !V::CONTINUOUS {
        return Err(TemporaError::invalid(format!(
            "{} values cannot be linearly interpolated",
            V::BASE_TYPE
        )));
    }
    ensure_values(instants.iter().map(|inst| inst.value()))?;
    for pair in instants.windows(2) {
        if pair[0].timestamp() >= pair[1].timestamp() {
            return Err(TemporaError::invalid(format!(
                "timestamps must be strictly increasing: {} then {}",
                pair[0].timestamp(),
                pair[1].timestamp()
            )));
        }
        if interp == Interpolation::Linear {
            pair[0].value().ensure_linear_segment(pair[1].value())?;
        }
    }
    if interp == Interpolation::Stepwise && n > 1 && !upper_inc && instants[n - 1].value() != instants[n - 2].value() {
        return Err(TemporaError::invalid(
            "a stepwise sequence with an exclusive upper bound must end on its previous value",
        ));
    }
    Ok(())
}

/// Drop instants that add no information.
///
/// A stepwise instant is redundant when it repeats the previous value; a
/// linear one when it lies on the segment joining its neighbours.
pub(crate) fn normalize_instants<V: BaseValue>(
    instants: Vec<TInstant<V>>,
    interp: Interpolation,
) -> Vec<TInstant<V>> {
    if instants.len() <= 2 {
        return instants;
    }
    let mut iter = instants.into_iter();
    let mut result: Vec<TInstant<V>> = iter.by_ref().take(2).collect();
    for inst in iter {
        let len = result.len();
        let (first, mid) = (&result[len - 2], &result[len - 1]);
        let redundant = match interp {
            Interpolation::Stepwise => first.value() == mid.value(),
            Interpolation::Linear => {
                let fraction = mid
                    .timestamp()
                    .fraction_between(first.timestamp(), inst.timestamp());
                V::collinear(first.value(), mid.value(), inst.value(), fraction)
            }
        };
        if redundant {
            result[len - 1] = inst;
        } else {
            result.push(inst);
        }
    }
    result
}

impl<V: BaseValue> TSequence<V> {
    /// Build and normalize a sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempora::prelude::*;
    ///
    /// let seq = TSequence::new(
    ///     vec![
    ///         TInstant::new(0.0, Timestamp::from_secs(0)),
    ///         TInstant::new(5.0, Timestamp::from_secs(5)),
    ///         TInstant::new(10.0, Timestamp::from_secs(10)),
    ///     ],
    ///     true,
    ///     true,
    ///     Interpolation::Linear,
    /// )
    /// .unwrap();
    /// // The middle instant lies on the line and is dropped.
    /// assert_eq!(seq.num_instants(), 2);
    /// ```
    pub fn new(
        instants: Vec<TInstant<V>>,
        lower_inc: bool,
        upper_inc: bool,
        interp: Interpolation,
    ) -> Result<Self> {
        Self::make(instants, lower_inc, upper_inc, interp, true)
    }

    /// Build a sequence, normalizing only when asked.
    pub fn make(
        instants: Vec<TInstant<V>>,
        lower_inc: bool,
        upper_inc: bool,
        interp: Interpolation,
        normalize: bool,
    ) -> Result<Self> {
        validate(&instants, lower_inc, upper_inc, interp)?;
        let instants = if normalize {
            normalize_instants(instants, interp)
        } else {
            instants
        };
        Ok(Self::from_valid(instants, lower_inc, upper_inc, interp))
    }

    /// Single-instant sequence with the default interpolation of the domain.
    pub fn from_instant(inst: TInstant<V>) -> Self {
        Self::from_valid(vec![inst], true, true, Interpolation::default_for::<V>())
    }

    pub(crate) fn from_valid(
        instants: Vec<TInstant<V>>,
        lower_inc: bool,
        upper_inc: bool,
        interp: Interpolation,
    ) -> Self {
        let bbox = instants_bbox(&instants);
        Self {
            instants,
            lower_inc,
            upper_inc,
            interp,
            bbox,
        }
    }

    /// Assemble from instants and a box already checked by a builder.
    pub(crate) fn from_parts(
        instants: Vec<TInstant<V>>,
        lower_inc: bool,
        upper_inc: bool,
        interp: Interpolation,
        bbox: V::BBox,
    ) -> Self {
        Self {
            instants,
            lower_inc,
            upper_inc,
            interp,
            bbox,
        }
    }

    pub fn instants(&self) -> &[TInstant<V>] {
        &self.instants
    }

    pub fn into_instants(self) -> Vec<TInstant<V>> {
        self.instants
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

    pub fn start_timestamp(&self) -> Timestamp {
        self.start_instant().timestamp()
    }

    pub fn end_timestamp(&self) -> Timestamp {
        self.end_instant().timestamp()
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interp
    }

    pub fn is_linear(&self) -> bool {
        self.interp == Interpolation::Linear
    }

    pub fn bbox(&self) -> &V::BBox {
        &self.bbox
    }

    pub fn period(&self) -> Period {
        Period::new_unchecked(
            self.start_timestamp(),
            self.end_timestamp(),
            self.lower_inc,
            self.upper_inc,
        )
    }

    /// Duration in microseconds.
    pub fn duration(&self) -> i64 {
        self.end_timestamp().micros_since(self.start_timestamp())
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.instants.iter().map(|inst| inst.timestamp()).collect()
    }

    pub fn shift(&self, delta: i64) -> Self {
        let instants = self.instants.iter().map(|inst| inst.shift(delta)).collect();
        Self::from_valid(instants, self.lower_inc, self.upper_inc, self.interp)
    }

    /// Index of the segment whose closed extent holds `t`, or `None` when `t`
    /// falls outside the sequence, respecting bound inclusivity.
    ///
    /// The segment `i` spans instants `i` and `i + 1`; a single-instant
    /// sequence has the one segment `0`.
    pub fn find_timestamp(&self, t: Timestamp) -> Option<usize> {
        if !self.period().contains_value(t) {
            return None;
        }
        let last = self.instants.len().saturating_sub(2);
        Some(match self.instants.binary_search_by(|inst| inst.timestamp().cmp(&t)) {
            Ok(i) => i.min(last),
            Err(i) => i - 1,
        })
    }

    /// Value at `t`, failing with `OutOfRange` outside the sequence.
    pub fn value_at_timestamp(&self, t: Timestamp) -> Result<V> {
        if !self.period().contains_value(t) {
            return Err(TemporaError::OutOfRange(format!(
                "timestamp {} is outside the sequence period {}",
                t,
                self.period()
            )));
        }
        Ok(self.value_at(t))
    }

    /// Value at `t` anywhere on the closure of the sequence period.
    ///
    /// Excluded bounds still report the limit value, which is what
    /// synchronization and restriction need at their cut points.
    pub(crate) fn value_at(&self, t: Timestamp) -> V {
        let n = self.instants.len();
        match self.instants.binary_search_by(|inst| inst.timestamp().cmp(&t)) {
            Ok(i) => self.instants[i].value().clone(),
            Err(0) => self.instants[0].value().clone(),
            Err(i) if i >= n => self.instants[n - 1].value().clone(),
            Err(i) => self.segment_value(i - 1, t),
        }
    }

    /// Value at `t` within segment `i`.
    pub(crate) fn segment_value(&self, i: usize, t: Timestamp) -> V {
        let start = &self.instants[i];
        let Some(end) = self.instants.get(i + 1) else {
            return start.value().clone();
        };
        if t <= start.timestamp() {
            return start.value().clone();
        }
        if t >= end.timestamp() {
            return end.value().clone();
        }
        match self.interp {
            Interpolation::Stepwise => start.value().clone(),
            Interpolation::Linear => {
                let fraction = t.fraction_between(start.timestamp(), end.timestamp());
                start.value().interpolate(end.value(), fraction)
            }
        }
    }
}
