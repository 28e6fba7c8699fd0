//! Lifting scalar operations to temporal values.
//!
//! A binary operation on two temporal values synchronizes them first and then
//! applies the scalar operation at every shared instant. Two things make the
//! result exact rather than sampled:
//!
//! * with `crossings`, synchronization adds the instants where the operands
//!   meet, so a comparison flips exactly there;
//! * a split function can add the instants where the result itself turns,
//!   such as the minimum of a distance or the roots of `distance = d`.
//!
//! Between consecutive instants the result either interpolates linearly, when
//! the operation keeps linearity, or is constant. A constant result is
//! sampled in the middle of each segment, so a value that differs from the
//! one at the segment start opens a new piece.
use crate::base::BaseValue;
use crate::error::{Result, TemporaError};
use crate::temporal::sync::overlapping_pairs;
use crate::temporal::{
    Interpolation, SequenceBuilder, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal, synchronize,
};
use smallvec::SmallVec;
use std::mem;
use tempora_types::Timestamp;

/// Fractions in `(0, 1)` of a segment where the lifted result needs an
/// extra instant. Receives the start and end values of both operands.
pub type SplitFn<'a, V> = &'a dyn Fn(&V, &V, &V, &V) -> SmallVec<[f64; 2]>;

/// How a binary operation is lifted.
pub struct LiftOptions<'a, V> {
    /// Apply the operation with swapped arguments.
    pub invert: bool,
    /// Add the instants where the operands take the same value.
    pub crossings: bool,
    /// The result interpolates linearly when an operand does.
    pub linear: bool,
    pub split: Option<SplitFn<'a, V>>,
}

impl<V> Clone for LiftOptions<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for LiftOptions<'_, V> {}

impl<V> Default for LiftOptions<'_, V> {
    fn default() -> Self {
        Self {
            invert: false,
            crossings: false,
            linear: false,
            split: None,
        }
    }
}

impl<'a, V> LiftOptions<'a, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn with_crossings(mut self) -> Self {
        self.crossings = true;
        self
    }

    pub fn with_linear(mut self) -> Self {
        self.linear = true;
        self
    }

    pub fn with_split(mut self, split: SplitFn<'a, V>) -> Self {
        self.split = Some(split);
        self
    }
}

/// Apply `f` to every instant, keeping the shape of the value.
///
/// `f` must preserve linearity when the result domain is continuous.
pub fn lift_unary<V, R, F>(temp: &Temporal<V>, f: F) -> Result<Temporal<R>>
where
    V: BaseValue,
    R: BaseValue,
    F: Fn(&V) -> R,
{
    let map_instant = |inst: &TInstant<V>| TInstant::new(f(inst.value()), inst.timestamp());
    let map_sequence = |seq: &TSequence<V>| {
        let interp = if R::CONTINUOUS {
            seq.interpolation()
        } else {
            Interpolation::Stepwise
        };
        TSequence::new(
            seq.instants().iter().map(map_instant).collect(),
            seq.lower_inc(),
            seq.upper_inc(),
            interp,
        )
    };
    Ok(match temp {
        Temporal::Instant(inst) => {
            let mapped = map_instant(inst);
            mapped.value().validate()?;
            Temporal::Instant(mapped)
        }
        Temporal::InstantSet(set) => {
            Temporal::InstantSet(TInstantSet::new(set.instants().iter().map(map_instant).collect())?)
        }
        Temporal::Sequence(seq) => Temporal::Sequence(map_sequence(seq)?),
        Temporal::SequenceSet(set) => Temporal::SequenceSet(TSequenceSet::new(
            set.sequences().iter().map(map_sequence).collect::<Result<Vec<_>>>()?,
        )?),
    })
}

/// Lift a binary operation over two temporal values.
///
/// `None` when the operands share no instant.
pub fn lift_binary<V, R, F>(
    a: &Temporal<V>,
    b: &Temporal<V>,
    op: F,
    opts: LiftOptions<'_, V>,
) -> Result<Option<Temporal<R>>>
where
    V: BaseValue,
    R: BaseValue,
    F: Fn(&V, &V) -> R,
{
    try_lift_binary(a, b, |x, y| Ok(op(x, y)), opts)
}

/// Lift a binary operation that may fail, such as checked integer
/// arithmetic. The first failure aborts the whole operation.
pub fn try_lift_binary<V, R, F>(
    a: &Temporal<V>,
    b: &Temporal<V>,
    op: F,
    opts: LiftOptions<'_, V>,
) -> Result<Option<Temporal<R>>>
where
    V: BaseValue,
    R: BaseValue,
    F: Fn(&V, &V) -> Result<R>,
{
    a.ensure_compatible(b)?;
    a.ensure_same_interpolation(b)?;
    let apply = |x: &V, y: &V| if opts.invert { op(y, x) } else { op(x, y) };

    let discrete = |t: &Temporal<V>| matches!(t, Temporal::Instant(_) | Temporal::InstantSet(_));
    if discrete(a) || discrete(b) {
        let Some((sa, sb)) = a.synchronize(b, false)? else {
            return Ok(None);
        };
        let instants = sa
            .instants()
            .iter()
            .zip(sb.instants())
            .map(|(x, y)| Ok(TInstant::new(apply(x.value(), y.value())?, x.timestamp())))
            .collect::<Result<Vec<TInstant<R>>>>()?;
        return Ok(Some(match sa {
            Temporal::Instant(_) => Temporal::instant(instants[0].value().clone(), instants[0].timestamp())?,
            _ => Temporal::InstantSet(TInstantSet::new(instants)?),
        }));
    }

    let seqs_a = a.sequences();
    let seqs_b = b.sequences();
    let mut pieces = Vec::new();
    for (i, j) in overlapping_pairs(&seqs_a, &seqs_b) {
        pieces.extend(lift_sequences(&seqs_a[i], &seqs_b[j], &apply, &opts)?);
    }
    Temporal::from_sequences(pieces)
}

/// Lift a binary operation between a temporal value and a constant.
///
/// With `opts.invert` the constant is the left argument.
pub fn lift_scalar<V, R, F>(temp: &Temporal<V>, scalar: &V, op: F, opts: LiftOptions<'_, V>) -> Result<Temporal<R>>
where
    V: BaseValue,
    R: BaseValue,
    F: Fn(&V, &V) -> R,
{
    try_lift_scalar(temp, scalar, |x, y| Ok(op(x, y)), opts)
}

/// Fallible form of [`lift_scalar`].
pub fn try_lift_scalar<V, R, F>(
    temp: &Temporal<V>,
    scalar: &V,
    op: F,
    opts: LiftOptions<'_, V>,
) -> Result<Temporal<R>>
where
    V: BaseValue,
    R: BaseValue,
    F: Fn(&V, &V) -> Result<R>,
{
    scalar.validate()?;
    temp.start_instant().value().ensure_compatible(scalar)?;
    let apply = |x: &V, y: &V| if opts.invert { op(y, x) } else { op(x, y) };
    let map_instant =
        |inst: &TInstant<V>| -> Result<TInstant<R>> { Ok(TInstant::new(apply(inst.value(), scalar)?, inst.timestamp())) };

    match temp {
        Temporal::Instant(inst) => {
            let mapped = map_instant(inst)?;
            Temporal::instant(mapped.value().clone(), mapped.timestamp())
        }
        Temporal::InstantSet(set) => Ok(Temporal::InstantSet(TInstantSet::new(
            set.instants().iter().map(map_instant).collect::<Result<Vec<_>>>()?,
        )?)),
        Temporal::Sequence(_) | Temporal::SequenceSet(_) => {
            let mut pieces = Vec::new();
            for seq in temp.sequences() {
                let constant = constant_like(scalar, &seq);
                pieces.extend(lift_sequences(&seq, &constant, &apply, &opts)?);
            }
            Temporal::from_sequences(pieces)?
                .ok_or_else(|| TemporaError::invalid("lifting produced an empty result"))
        }
    }
}

/// A constant sequence over the period of `seq`.
fn constant_like<V: BaseValue>(value: &V, seq: &TSequence<V>) -> TSequence<V> {
    let mut instants = vec![TInstant::new(value.clone(), seq.start_timestamp())];
    if seq.num_instants() > 1 {
        instants.push(TInstant::new(value.clone(), seq.end_timestamp()));
    }
    TSequence::from_valid(instants, seq.lower_inc(), seq.upper_inc(), seq.interpolation())
}

/// Values of a synchronized sequence at the start of a segment and just
/// before its end.
fn segment_values<V: BaseValue>(seq: &TSequence<V>, t1: Timestamp, t2: Timestamp) -> (V, V) {
    let start = seq.value_at(t1);
    let end = if seq.is_linear() {
        seq.value_at(t2)
    } else {
        start.clone()
    };
    (start, end)
}

/// Synchronized timestamps plus the split points of every segment.
fn refined_timestamps<V: BaseValue>(a: &TSequence<V>, b: &TSequence<V>, split: Option<SplitFn<'_, V>>) -> Vec<Timestamp> {
    let times = a.timestamps();
    let Some(split) = split else {
        return times;
    };
    let mut refined = Vec::with_capacity(times.len());
    for pair in times.windows(2) {
        let (t1, t2) = (pair[0], pair[1]);
        refined.push(t1);
        let (a1, a2) = segment_values(a, t1, t2);
        let (b1, b2) = segment_values(b, t1, t2);
        let mut fractions = split(&a1, &a2, &b1, &b2);
        fractions.retain(|f| *f > 0.0 && *f < 1.0);
        fractions.sort_by(|x, y| x.total_cmp(y));
        for fraction in fractions {
            let t = t1.interpolate(t2, fraction);
            if t > t1 && t < t2 && refined.last().is_some_and(|last| *last < t) {
                refined.push(t);
            }
        }
    }
    refined.extend(times.last().copied());
    refined
}

fn lift_sequences<V, R, F>(
    a: &TSequence<V>,
    b: &TSequence<V>,
    apply: &F,
    opts: &LiftOptions<'_, V>,
) -> Result<Vec<TSequence<R>>>
where
    V: BaseValue,
    R: BaseValue,
    F: Fn(&V, &V) -> Result<R>,
{
    let Some((sa, sb)) = synchronize(a, b, opts.crossings) else {
        return Ok(Vec::new());
    };
    let eval = |t: Timestamp| apply(&sa.value_at(t), &sb.value_at(t));
    let out_interp = if R::CONTINUOUS && opts.linear && (sa.is_linear() || sb.is_linear()) {
        Interpolation::Linear
    } else {
        Interpolation::Stepwise
    };
    if sa.num_instants() == 1 {
        let t = sa.start_timestamp();
        return Ok(vec![TSequence::from_valid(vec![TInstant::new(eval(t)?, t)], true, true, out_interp)]);
    }

    let times = refined_timestamps(&sa, &sb, opts.split);
    let last = times[times.len() - 1];
    let mut done = Vec::new();
    let mut builder = SequenceBuilder::with_capacity(out_interp, times.len())?.lower_inc(sa.lower_inc());

    match out_interp {
        Interpolation::Linear => {
            let mut end_limit = None;
            for pair in times.windows(2) {
                let (t1, t2) = (pair[0], pair[1]);
                let start = eval(t1)?;
                if builder.last().is_some_and(|inst| inst.value() != &start) {
                    let finished = mem::replace(&mut builder, SequenceBuilder::new(out_interp)?);
                    done.push(finished.finish(false)?);
                }
                builder.push_distinct(TInstant::new(start, t1))?;
                let (_, a2) = segment_values(&sa, t1, t2);
                let (_, b2) = segment_values(&sb, t1, t2);
                let limit = apply(&a2, &b2)?;
                builder.push(TInstant::new(limit.clone(), t2))?;
                end_limit = Some(limit);
            }
            let actual = eval(last)?;
            if sa.upper_inc() && end_limit.as_ref() != Some(&actual) {
                done.push(builder.finish(false)?);
                done.push(TSequence::from_valid(vec![TInstant::new(actual, last)], true, true, out_interp));
            } else {
                done.push(builder.finish(sa.upper_inc())?);
            }
        }
        Interpolation::Stepwise => {
            let mut interior = None;
            for (k, pair) in times.windows(2).enumerate() {
                let (t1, t2) = (pair[0], pair[1]);
                let (a1, a2) = segment_values(&sa, t1, t2);
                let (b1, b2) = segment_values(&sb, t1, t2);
                let middle = apply(&a1.interpolate(&a2, 0.5), &b1.interpolate(&b2, 0.5))?;
                let start = apply(&a1, &b1)?;
                if k == 0 && !sa.lower_inc() {
                    builder.push(TInstant::new(middle.clone(), t1))?;
                } else if middle != start {
                    builder.push(TInstant::new(start, t1))?;
                    let finished = mem::replace(&mut builder, SequenceBuilder::new(out_interp)?.lower_inc(false));
                    done.push(finished.finish(true)?);
                    builder.push(TInstant::new(middle.clone(), t1))?;
                } else {
                    builder.push(TInstant::new(start, t1))?;
                }
                interior = Some(middle);
            }
            let actual = eval(last)?;
            match interior {
                Some(held) if sa.upper_inc() && held == actual => {
                    builder.push(TInstant::new(actual, last))?;
                    done.push(builder.finish(true)?);
                }
                Some(held) => {
                    builder.push(TInstant::new(held, last))?;
                    done.push(builder.finish(false)?);
                    if sa.upper_inc() {
                        done.push(TSequence::from_valid(vec![TInstant::new(actual, last)], true, true, out_interp));
                    }
                }
                None => {}
            }
        }
    }
    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Period;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn parse<V: BaseValue>(text: &str) -> Temporal<V> {
        text.parse().unwrap()
    }

    const UP: &str = "[0@1970-01-01 00:00:00, 10@1970-01-01 00:00:10]";
    const DOWN: &str = "[10@1970-01-01 00:00:00, 0@1970-01-01 00:00:10]";

    #[test]
    fn test_linear_sum_is_linear() {
        let sum = lift_binary(
            &parse::<f64>(UP),
            &parse::<f64>(DOWN),
            |x, y| x + y,
            LiftOptions::new().with_linear(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(sum.interpolation(), Some(Interpolation::Linear));
        assert!(sum.always_eq(&10.0));
        assert_eq!(sum.num_instants(), 2);
    }

    #[test]
    fn test_comparison_flips_at_crossing() {
        let lt = lift_binary(
            &parse::<f64>(UP),
            &parse::<f64>(DOWN),
            |x, y| x < y,
            LiftOptions::new().with_crossings(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(lt.value_at_timestamp(ts(0)).unwrap(), true);
        assert_eq!(lt.value_at_timestamp(ts(4)).unwrap(), true);
        assert_eq!(lt.value_at_timestamp(ts(5)).unwrap(), false);
        assert_eq!(lt.value_at_timestamp(ts(6)).unwrap(), false);
        assert_eq!(lt.value_at_timestamp(ts(10)).unwrap(), false);
    }

    #[test]
    fn test_equality_holds_only_at_crossing() {
        let eq = lift_binary(
            &parse::<f64>(UP),
            &parse::<f64>(DOWN),
            |x, y| x == y,
            LiftOptions::new().with_crossings(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(eq.value_at_timestamp(ts(5)).unwrap(), true);
        assert_eq!(eq.value_at_timestamp(ts(3)).unwrap(), false);
        assert_eq!(eq.value_at_timestamp(ts(7)).unwrap(), false);
        assert_eq!(eq.subtype(), crate::temporal::TemporalSubtype::SequenceSet);
    }

    #[test]
    fn test_scalar_comparison_with_invert() {
        let up = parse::<f64>(UP);
        let gt = lift_scalar(&up, &4.0, |x, y| x > y, LiftOptions::new().with_crossings()).unwrap();
        assert_eq!(gt.value_at_timestamp(ts(4)).unwrap(), false);
        assert_eq!(gt.value_at_timestamp(ts(5)).unwrap(), true);

        let inverted = lift_scalar(
            &up,
            &4.0,
            |x, y| x > y,
            LiftOptions::new().with_crossings().with_invert(true),
        )
        .unwrap();
        assert_eq!(inverted.value_at_timestamp(ts(3)).unwrap(), true);
        assert_eq!(inverted.value_at_timestamp(ts(4)).unwrap(), false);
    }

    #[test]
    fn test_stepwise_operands() {
        let a = parse::<i32>("[1@1970-01-01 00:00:00, 2@1970-01-01 00:00:10, 2@1970-01-01 00:00:20]");
        let b = parse::<i32>("[5@1970-01-01 00:00:05, 3@1970-01-01 00:00:15, 3@1970-01-01 00:00:30]");
        let sum = lift_binary(&a, &b, |x, y| x + y, LiftOptions::new().with_linear()).unwrap().unwrap();
        assert_eq!(sum.interpolation(), Some(Interpolation::Stepwise));
        assert_eq!(sum.period(), Period::new(ts(5), ts(20), true, true).unwrap());
        assert_eq!(sum.value_at_timestamp(ts(5)).unwrap(), 6);
        assert_eq!(sum.value_at_timestamp(ts(10)).unwrap(), 7);
        assert_eq!(sum.value_at_timestamp(ts(15)).unwrap(), 5);
        assert_eq!(sum.value_at_timestamp(ts(20)).unwrap(), 5);
    }

    #[test]
    fn test_discrete_operands() {
        let set = parse::<i32>("{1@1970-01-01 00:00:00, 2@1970-01-01 00:00:05, 3@1970-01-01 00:00:50}");
        let seq = parse::<i32>("[10@1970-01-01 00:00:00, 20@1970-01-01 00:00:10]");
        let sum = lift_binary(&set, &seq, |x, y| x + y, LiftOptions::new()).unwrap().unwrap();
        assert_eq!(sum.subtype(), crate::temporal::TemporalSubtype::InstantSet);
        assert_eq!(sum.num_instants(), 2);
        assert_eq!(sum.value_at_timestamp(ts(5)).unwrap(), 12);
    }

    #[test]
    fn test_disjoint_operands() {
        let a = parse::<f64>(UP);
        let b = parse::<f64>("[1@1970-01-01 00:01:00, 2@1970-01-01 00:02:00]");
        let none: Option<Temporal<f64>> = lift_binary(&a, &b, |x, y| x + y, LiftOptions::new()).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_interpolation_mismatch_fails() {
        let a = parse::<f64>(UP);
        let b = parse::<f64>("Interp=Stepwise;[1@1970-01-01 00:00:00, 2@1970-01-01 00:00:10]");
        let result: Result<Option<Temporal<f64>>> = lift_binary(&a, &b, |x, y| x + y, LiftOptions::new());
        assert!(matches!(result, Err(TemporaError::InvalidArgument(_))));
    }

    #[test]
    fn test_unary_keeps_shape() {
        let up = parse::<f64>(UP);
        let neg = lift_unary(&up, |x| -x).unwrap();
        assert_eq!(neg.value_at_timestamp(ts(5)).unwrap(), -5.0);
        assert_eq!(neg.interpolation(), Some(Interpolation::Linear));
    }
}
