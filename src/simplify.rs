//! Trajectory simplification for temporal floats and points.
//!
//! Both algorithms measure how far an instant strays from the chord between
//! two kept instants at the same moment in time, so a point that is on the
//! path but early or late still counts as a deviation. With a speed
//! tolerance, an instant is also kept when dropping it would change the
//! apparent speed by more than the tolerance.
//!
//! [`simplify`] is a single greedy pass that only looks at the next instant.
//! [`simplify_dp`] is the recursive Douglas-Peucker split, which examines
//! every instant between two kept ones and never under-simplifies a long
//! gentle curve.
use crate::base::BaseValue;
use crate::config::Config;
use crate::error::{Result, TemporaError};
use crate::temporal::{TInstant, TSequence, TSequenceSet, Temporal};
use log::debug;
use tempora_types::GeoPoint;

/// Values with a distance between them.
pub trait Metric: BaseValue {
    fn gap(&self, other: &Self) -> f64;
}

impl Metric for f64 {
    fn gap(&self, other: &Self) -> f64 {
        (self - other).abs()
    }
}

impl Metric for GeoPoint {
    fn gap(&self, other: &Self) -> f64 {
        self.distance(other)
    }
}

#[derive(Clone, Copy)]
struct Tolerance {
    dist: f64,
    speed: Option<f64>,
}

impl Tolerance {
    fn new(dist: f64, speed: Option<f64>) -> Result<Self> {
        let check = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(TemporaError::invalid(format!(
                    "{} tolerance must be a non-negative finite number: {}",
                    name, value
                )))
            }
        };
        check("distance", dist)?;
        if let Some(speed) = speed {
            check("speed", speed)?;
        }
        Ok(Self { dist, speed })
    }
}

fn speed<V: Metric>(from: &TInstant<V>, to: &TInstant<V>) -> f64 {
    let secs = to.timestamp().micros_since(from.timestamp()) as f64 / 1_000_000.0;
    from.value().gap(to.value()) / secs
}

/// Distance of `inst` from the chord `start..end` at its own timestamp.
fn deviation<V: Metric>(start: &TInstant<V>, end: &TInstant<V>, inst: &TInstant<V>) -> f64 {
    let fraction = inst.timestamp().fraction_between(start.timestamp(), end.timestamp());
    start.value().interpolate(end.value(), fraction).gap(inst.value())
}

fn greedy_keep<V: Metric>(instants: &[TInstant<V>], tol: Tolerance) -> Vec<usize> {
    let n = instants.len();
    let mut keep = vec![0];
    let mut anchor = 0;
    for k in 1..n - 1 {
        let mut droppable = deviation(&instants[anchor], &instants[k + 1], &instants[k]) <= tol.dist;
        if let Some(eps_speed) = tol.speed {
            let before = speed(&instants[anchor], &instants[k]);
            let after = speed(&instants[k], &instants[k + 1]);
            droppable &= (before - after).abs() <= eps_speed;
        }
        if !droppable {
            keep.push(k);
            anchor = k;
        }
    }
    keep.push(n - 1);
    keep
}

struct Split {
    index: usize,
    dist: f64,
    delta_speed: f64,
}

fn find_split<V: Metric>(instants: &[TInstant<V>], first: usize, last: usize, with_speed: bool) -> Option<Split> {
    if first + 1 >= last {
        return None;
    }
    let (start, end) = (&instants[first], &instants[last]);
    let chord_speed = if with_speed { speed(start, end) } else { 0.0 };
    let mut best: Option<Split> = None;
    for k in first + 1..last {
        let dist = deviation(start, end, &instants[k]);
        if best.as_ref().is_none_or(|b| dist > b.dist) {
            let delta_speed = if with_speed {
                (chord_speed - speed(&instants[k - 1], &instants[k])).abs()
            } else {
                0.0
            };
            best = Some(Split {
                index: k,
                dist,
                delta_speed,
            });
        }
    }
    best
}

fn dp_keep<V: Metric>(instants: &[TInstant<V>], tol: Tolerance, min_points: usize) -> Vec<usize> {
    let mut keep = vec![0];
    let mut stack = vec![instants.len() - 1];
    let mut anchor = 0;
    while let Some(&last) = stack.last() {
        let split = find_split(instants, anchor, last, tol.speed.is_some()).filter(|split| {
            split.dist > tol.dist
                || tol.speed.is_some_and(|eps| split.delta_speed > eps)
                || keep.len() + stack.len() < min_points
        });
        match split {
            Some(split) => stack.push(split.index),
            None => {
                keep.push(last);
                anchor = last;
                stack.pop();
            }
        }
    }
    keep
}

fn rebuild<V: Metric>(seq: &TSequence<V>, keep: Vec<usize>) -> Result<TSequence<V>> {
    let instants: Vec<TInstant<V>> = keep.into_iter().map(|i| seq.instants()[i].clone()).collect();
    debug!(
        "Simplified sequence from {} to {} instants",
        seq.num_instants(),
        instants.len()
    );
    TSequence::new(instants, seq.lower_inc(), seq.upper_inc(), seq.interpolation())
}

fn map_shape<V, F>(temp: &Temporal<V>, simplify_seq: F) -> Result<Temporal<V>>
where
    V: Metric,
    F: Fn(&TSequence<V>) -> Result<TSequence<V>>,
{
    Ok(match temp {
        Temporal::Instant(_) | Temporal::InstantSet(_) => temp.clone(),
        Temporal::Sequence(seq) => Temporal::Sequence(simplify_seq(seq)?),
        Temporal::SequenceSet(set) => Temporal::SequenceSet(TSequenceSet::new(
            set.sequences()
                .iter()
                .map(simplify_seq)
                .collect::<Result<Vec<_>>>()?,
        )?),
    })
}

/// Greedy neighbor-only simplification.
///
/// Each instant is tested against the chord from the last kept instant to
/// its immediate successor. Instants, instant sets, stepwise sequences and
/// sequences of fewer than three instants are returned unchanged.
///
/// # Examples
///
/// ```
/// use tempora::prelude::*;
/// use tempora::simplify::simplify;
///
/// let temp: Temporal<f64> = "[0@2000-01-01 00:00:00, 1.02@2000-01-01 00:00:10, 2@2000-01-01 00:00:20]"
///     .parse()
///     .unwrap();
/// let simple = simplify(&temp, 0.1, None).unwrap();
/// assert_eq!(simple.num_instants(), 2);
/// ```
pub fn simplify<V: Metric>(temp: &Temporal<V>, eps_dist: f64, eps_speed: Option<f64>) -> Result<Temporal<V>> {
    let tol = Tolerance::new(eps_dist, eps_speed)?;
    map_shape(temp, |seq| {
        if !seq.is_linear() || seq.num_instants() < 3 {
            return Ok(seq.clone());
        }
        rebuild(seq, greedy_keep(seq.instants(), tol))
    })
}

/// Douglas-Peucker simplification.
///
/// Keeps splitting at the instant farthest from the current chord until every
/// dropped instant is within tolerance and at least
/// `config.simplify.min_points` instants remain.
pub fn simplify_dp<V: Metric>(
    temp: &Temporal<V>,
    eps_dist: f64,
    eps_speed: Option<f64>,
    config: &Config,
) -> Result<Temporal<V>> {
    let tol = Tolerance::new(eps_dist, eps_speed)?;
    let min_points = config.simplify.min_points;
    map_shape(temp, |seq| {
        if !seq.is_linear() || seq.num_instants() < 3 {
            return Ok(seq.clone());
        }
        rebuild(seq, dp_keep(seq.instants(), tol, min_points))
    })
}
