//! Temporal point operations.
//!
//! Distances are Cartesian, in the units of the coordinates. Speeds are in
//! those units per second.
use crate::error::{Result, TemporaError};
use crate::lifting::{LiftOptions, lift_binary, lift_scalar};
use crate::temporal::{Interpolation, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal};
use geo::{Coord, LineString};
use smallvec::SmallVec;
use tempora_types::GeoPoint;

fn delta(p: &GeoPoint, q: &GeoPoint) -> [f64; 3] {
    [p.x() - q.x(), p.y() - q.y(), p.z_or_zero() - q.z_or_zero()]
}

fn dot(u: [f64; 3], v: [f64; 3]) -> f64 {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

/// Offset at the start of a segment pair and its change over the segment.
fn relative_motion(a1: &GeoPoint, a2: &GeoPoint, b1: &GeoPoint, b2: &GeoPoint) -> ([f64; 3], [f64; 3]) {
    let d0 = delta(a1, b1);
    let d1 = delta(a2, b2);
    (d0, [d1[0] - d0[0], d1[1] - d0[1], d1[2] - d0[2]])
}

/// Fraction of the segment where the two points come closest.
fn closest_approach(a1: &GeoPoint, a2: &GeoPoint, b1: &GeoPoint, b2: &GeoPoint) -> SmallVec<[f64; 2]> {
    let (d0, dv) = relative_motion(a1, a2, b1, b2);
    let len2 = dot(dv, dv);
    let mut result = SmallVec::new();
    if len2 > 0.0 {
        result.push(-dot(d0, dv) / len2);
    }
    result
}

/// Fractions where the distance between the two points equals `d`.
fn distance_crossings(a1: &GeoPoint, a2: &GeoPoint, b1: &GeoPoint, b2: &GeoPoint, d: f64) -> SmallVec<[f64; 2]> {
    let (d0, dv) = relative_motion(a1, a2, b1, b2);
    let a = dot(dv, dv);
    let b = 2.0 * dot(d0, dv);
    let c = dot(d0, d0) - d * d;
    let mut result = SmallVec::new();
    if a == 0.0 {
        return result;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return result;
    }
    let root = disc.sqrt();
    result.push((-b - root) / (2.0 * a));
    if root > 0.0 {
        result.push((-b + root) / (2.0 * a));
    }
    result
}

fn ensure_distance(d: f64) -> Result<()> {
    if !d.is_finite() || d < 0.0 {
        return Err(TemporaError::invalid(format!(
            "distance must be a non-negative finite number: {}",
            d
        )));
    }
    Ok(())
}

/// Temporal distance between two temporal points.
///
/// # Examples
///
/// ```
/// use tempora::prelude::*;
/// use tempora::ops::distance;
///
/// let a: Temporal<GeoPoint> = "[POINT(0 0)@2000-01-01 00:00:00, POINT(10 0)@2000-01-01 00:00:10]".parse().unwrap();
/// let b: Temporal<GeoPoint> = "[POINT(10 0)@2000-01-01 00:00:00, POINT(0 0)@2000-01-01 00:00:10]".parse().unwrap();
/// let d = distance(&a, &b).unwrap().unwrap();
/// assert_eq!(d.min_value(), 0.0);
/// ```
pub fn distance(a: &Temporal<GeoPoint>, b: &Temporal<GeoPoint>) -> Result<Option<Temporal<f64>>> {
    lift_binary(
        a,
        b,
        |p, q| p.distance(q),
        LiftOptions::new().with_linear().with_split(&closest_approach),
    )
}

/// Temporal distance between a temporal point and a fixed point.
pub fn distance_point(a: &Temporal<GeoPoint>, point: &GeoPoint) -> Result<Temporal<f64>> {
    lift_scalar(
        a,
        point,
        |p, q| p.distance(q),
        LiftOptions::new().with_linear().with_split(&closest_approach),
    )
}

/// Whether two temporal points are within distance `d` of each other.
pub fn tdwithin(a: &Temporal<GeoPoint>, b: &Temporal<GeoPoint>, d: f64) -> Result<Option<Temporal<bool>>> {
    ensure_distance(d)?;
    let split = move |a1: &GeoPoint, a2: &GeoPoint, b1: &GeoPoint, b2: &GeoPoint| distance_crossings(a1, a2, b1, b2, d);
    lift_binary(a, b, |p, q| p.distance(q) <= d, LiftOptions::new().with_split(&split))
}

pub fn tdwithin_point(a: &Temporal<GeoPoint>, point: &GeoPoint, d: f64) -> Result<Temporal<bool>> {
    ensure_distance(d)?;
    let split = move |a1: &GeoPoint, a2: &GeoPoint, b1: &GeoPoint, b2: &GeoPoint| distance_crossings(a1, a2, b1, b2, d);
    lift_scalar(a, point, |p, q| p.distance(q) <= d, LiftOptions::new().with_split(&split))
}

fn sequence_length(seq: &TSequence<GeoPoint>) -> f64 {
    if !seq.is_linear() {
        return 0.0;
    }
    seq.instants()
        .windows(2)
        .map(|pair| pair[0].value().distance(pair[1].value()))
        .sum()
}

/// Distance travelled. Stepwise and discrete points do not travel.
pub fn length(temp: &Temporal<GeoPoint>) -> f64 {
    match temp {
        Temporal::Instant(_) | Temporal::InstantSet(_) => 0.0,
        Temporal::Sequence(seq) => sequence_length(seq),
        Temporal::SequenceSet(set) => set.sequences().iter().map(sequence_length).sum(),
    }
}

fn cumulative_sequence(seq: &TSequence<GeoPoint>, start: f64) -> Result<TSequence<f64>> {
    let mut total = start;
    let mut prev: Option<&GeoPoint> = None;
    let mut instants = Vec::with_capacity(seq.num_instants());
    for inst in seq.instants() {
        if seq.is_linear()
            && let Some(p) = prev
        {
            total += p.distance(inst.value());
        }
        prev = Some(inst.value());
        instants.push(TInstant::new(total, inst.timestamp()));
    }
    TSequence::new(instants, seq.lower_inc(), seq.upper_inc(), seq.interpolation())
}

/// Distance travelled up to each instant, carried across sequences.
pub fn cumulative_length(temp: &Temporal<GeoPoint>) -> Result<Temporal<f64>> {
    match temp {
        Temporal::Instant(inst) => Temporal::instant(0.0, inst.timestamp()),
        Temporal::InstantSet(set) => Ok(Temporal::InstantSet(TInstantSet::new(
            set.instants()
                .iter()
                .map(|inst| TInstant::new(0.0, inst.timestamp()))
                .collect(),
        )?)),
        Temporal::Sequence(seq) => Ok(Temporal::Sequence(cumulative_sequence(seq, 0.0)?)),
        Temporal::SequenceSet(set) => {
            let mut total = 0.0;
            let mut sequences = Vec::with_capacity(set.num_sequences());
            for seq in set.sequences() {
                let cumulative = cumulative_sequence(seq, total)?;
                total = *cumulative.end_instant().value();
                sequences.push(cumulative);
            }
            Ok(Temporal::SequenceSet(TSequenceSet::new(sequences)?))
        }
    }
}

fn speed_sequence(seq: &TSequence<GeoPoint>) -> Result<TSequence<f64>> {
    let instants = seq.instants();
    if instants.len() == 1 {
        return TSequence::new(
            vec![TInstant::new(0.0, instants[0].timestamp())],
            true,
            true,
            Interpolation::Stepwise,
        );
    }
    let mut out = Vec::with_capacity(instants.len());
    let mut last = 0.0;
    for pair in instants.windows(2) {
        let secs = pair[1].timestamp().micros_since(pair[0].timestamp()) as f64 / 1_000_000.0;
        last = pair[0].value().distance(pair[1].value()) / secs;
        out.push(TInstant::new(last, pair[0].timestamp()));
    }
    out.push(TInstant::new(last, seq.end_timestamp()));
    TSequence::new(out, seq.lower_inc(), seq.upper_inc(), Interpolation::Stepwise)
}

/// Speed as a stepwise temporal float, one step per segment.
///
/// `None` for instants and instant sets. Stepwise points have no defined
/// speed and are rejected.
pub fn speed(temp: &Temporal<GeoPoint>) -> Result<Option<Temporal<f64>>> {
    if matches!(temp.interpolation(), Some(Interpolation::Stepwise)) {
        return Err(TemporaError::invalid("speed requires linear interpolation"));
    }
    Ok(match temp {
        Temporal::Instant(_) | Temporal::InstantSet(_) => None,
        Temporal::Sequence(seq) => Some(Temporal::Sequence(speed_sequence(seq)?)),
        Temporal::SequenceSet(set) => Some(Temporal::SequenceSet(TSequenceSet::new(
            set.sequences().iter().map(speed_sequence).collect::<Result<Vec<_>>>()?,
        )?)),
    })
}

/// The 2D path traced by the point, in time order, without repeated
/// consecutive positions.
pub fn trajectory(temp: &Temporal<GeoPoint>) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(temp.num_instants());
    for inst in temp.instants() {
        let coord = inst.value().point.0;
        if coords.last() != Some(&coord) {
            coords.push(coord);
        }
    }
    LineString::new(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_types::Timestamp;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn parse(text: &str) -> Temporal<GeoPoint> {
        text.parse().unwrap()
    }

    fn crossing_pair() -> (Temporal<GeoPoint>, Temporal<GeoPoint>) {
        (
            parse("[POINT(0 0)@1970-01-01 00:00:00, POINT(10 0)@1970-01-01 00:00:10]"),
            parse("[POINT(10 0)@1970-01-01 00:00:00, POINT(0 0)@1970-01-01 00:00:10]"),
        )
    }

    #[test]
    fn test_distance_turning_point() {
        let (a, b) = crossing_pair();
        let d = distance(&a, &b).unwrap().unwrap();
        assert_eq!(d.num_instants(), 3);
        assert_eq!(d.value_at_timestamp(ts(5)).unwrap(), 0.0);
        assert_eq!(d.value_at_timestamp(ts(0)).unwrap(), 10.0);
        assert!((d.value_at_timestamp(ts(2)).unwrap() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_point() {
        let (a, _) = crossing_pair();
        let d = distance_point(&a, &GeoPoint::new(5.0, 5.0)).unwrap();
        assert_eq!(d.value_at_timestamp(ts(5)).unwrap(), 5.0);
        assert_eq!(d.min_value(), 5.0);
    }

    #[test]
    fn test_dwithin_splits_at_threshold() {
        let (a, b) = crossing_pair();
        let within = tdwithin(&a, &b, 4.0).unwrap().unwrap();
        assert!(!within.value_at_timestamp(ts(2)).unwrap());
        assert!(within.value_at_timestamp(ts(5)).unwrap());
        assert!(!within.value_at_timestamp(ts(8)).unwrap());

        let near = tdwithin_point(&a, &GeoPoint::new(10.0, 0.0), 2.0).unwrap();
        assert!(!near.value_at_timestamp(ts(5)).unwrap());
        assert!(near.value_at_timestamp(ts(10)).unwrap());
        assert!(tdwithin(&a, &b, -1.0).is_err());
    }

    #[test]
    fn test_length_and_cumulative_length() {
        let a = parse(
            "{[POINT(0 0)@1970-01-01 00:00:00, POINT(3 4)@1970-01-01 00:00:10], \
             [POINT(3 4)@1970-01-01 00:00:20, POINT(3 0)@1970-01-01 00:00:30]}",
        );
        assert_eq!(length(&a), 9.0);
        let cumulative = cumulative_length(&a).unwrap();
        assert_eq!(cumulative.value_at_timestamp(ts(10)).unwrap(), 5.0);
        assert_eq!(cumulative.value_at_timestamp(ts(25)).unwrap(), 7.0);
        assert_eq!(cumulative.end_instant().value(), &9.0);

        let stepwise = parse("Interp=Stepwise;[POINT(0 0)@1970-01-01 00:00:00, POINT(3 4)@1970-01-01 00:00:10]");
        assert_eq!(length(&stepwise), 0.0);
    }

    #[test]
    fn test_speed() {
        let a = parse(
            "[POINT(0 0)@1970-01-01 00:00:00, POINT(10 0)@1970-01-01 00:00:10, POINT(10 40)@1970-01-01 00:00:20]",
        );
        let s = speed(&a).unwrap().unwrap();
        assert_eq!(s.interpolation(), Some(Interpolation::Stepwise));
        assert_eq!(s.value_at_timestamp(ts(5)).unwrap(), 1.0);
        assert_eq!(s.value_at_timestamp(ts(15)).unwrap(), 4.0);

        let stepwise = parse("Interp=Stepwise;[POINT(0 0)@1970-01-01 00:00:00, POINT(3 4)@1970-01-01 00:00:10]");
        assert!(speed(&stepwise).is_err());
        let discrete = parse("{POINT(0 0)@1970-01-01 00:00:00, POINT(3 4)@1970-01-01 00:00:10}");
        assert!(speed(&discrete).unwrap().is_none());
    }

    #[test]
    fn test_trajectory_skips_repeats() {
        let a = parse(
            "{[POINT(0 0)@1970-01-01 00:00:00, POINT(1 1)@1970-01-01 00:00:10], \
             [POINT(1 1)@1970-01-01 00:00:20, POINT(2 0)@1970-01-01 00:00:30]}",
        );
        let line = trajectory(&a);
        assert_eq!(line.0.len(), 3);
        assert_eq!(line.0[2], Coord { x: 2.0, y: 0.0 });
    }
}
