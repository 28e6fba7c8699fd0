//! Time-weighted summaries of temporal numbers.
use crate::base::NumericValue;
use crate::temporal::{TSequence, Temporal};

fn seconds(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}

fn sequence_integral<V: NumericValue>(seq: &TSequence<V>) -> f64 {
    seq.instants()
        .windows(2)
        .map(|pair| {
            let dt = seconds(pair[1].timestamp().micros_since(pair[0].timestamp()));
            let v1 = pair[0].value().to_f64();
            if seq.is_linear() {
                (v1 + pair[1].value().to_f64()) / 2.0 * dt
            } else {
                v1 * dt
            }
        })
        .sum()
}

/// Area under the value curve, in value-seconds. Zero for instants and
/// instant sets.
pub fn integral<V: NumericValue>(temp: &Temporal<V>) -> f64 {
    match temp {
        Temporal::Instant(_) | Temporal::InstantSet(_) => 0.0,
        Temporal::Sequence(seq) => sequence_integral(seq),
        Temporal::SequenceSet(set) => set.sequences().iter().map(sequence_integral).sum(),
    }
}

/// Time-weighted average.
///
/// Values without duration fall back to the plain mean of their instants.
///
/// # Examples
///
/// ```
/// use tempora::prelude::*;
/// use tempora::ops::twavg;
///
/// let temp: Temporal<f64> = "[0@2000-01-01 00:00:00, 10@2000-01-01 00:00:10]".parse().unwrap();
/// assert_eq!(twavg(&temp), 5.0);
/// ```
pub fn twavg<V: NumericValue>(temp: &Temporal<V>) -> f64 {
    let duration = temp.duration();
    if duration == 0 {
        let instants = temp.instants();
        let sum: f64 = instants.iter().map(|inst| inst.value().to_f64()).sum();
        return sum / instants.len() as f64;
    }
    integral(temp) / seconds(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<V: crate::base::BaseValue>(text: &str) -> Temporal<V> {
        text.parse().unwrap()
    }

    #[test]
    fn test_linear_integral() {
        let temp = parse::<f64>("[0@1970-01-01 00:00:00, 10@1970-01-01 00:00:10]");
        assert_eq!(integral(&temp), 50.0);
        assert_eq!(twavg(&temp), 5.0);
    }

    #[test]
    fn test_stepwise_integral() {
        let temp = parse::<i32>("[1@1970-01-01 00:00:00, 3@1970-01-01 00:00:10, 3@1970-01-01 00:00:20]");
        assert_eq!(integral(&temp), 40.0);
        assert_eq!(twavg(&temp), 2.0);
    }

    #[test]
    fn test_sequence_set_skips_gaps() {
        let temp = parse::<f64>(
            "{[2@1970-01-01 00:00:00, 2@1970-01-01 00:00:10], [4@1970-01-01 00:01:00, 4@1970-01-01 00:01:10]}",
        );
        assert_eq!(integral(&temp), 60.0);
        assert_eq!(twavg(&temp), 3.0);
    }

    #[test]
    fn test_instantaneous_values_use_plain_mean() {
        let temp = parse::<i32>("{1@1970-01-01 00:00:00, 3@1970-01-01 00:00:10}");
        assert_eq!(integral(&temp), 0.0);
        assert_eq!(twavg(&temp), 2.0);
    }
}
