use super::span::Period;
use super::spanset::PeriodSet;
use crate::error::{Result, TemporaError};
use crate::io::text::TextParser;
use std::fmt;
use std::str::FromStr;
use tempora_types::Timestamp;

/// A non-empty, strictly increasing set of timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampSet {
    times: Vec<Timestamp>,
}

impl TimestampSet {
    /// Build from strictly increasing timestamps.
    pub fn new(times: Vec<Timestamp>) -> Result<Self> {
        if times.is_empty() {
            return Err(TemporaError::invalid("a timestamp set needs at least one timestamp"));
        }
        if let Some(pair) = times.windows(2).find(|w| w[0] >= w[1]) {
            return Err(TemporaError::invalid(format!(
                "timestamps must be strictly increasing: {} then {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { times })
    }

    /// Build from timestamps in any order, dropping duplicates.
    pub fn from_unsorted(mut times: Vec<Timestamp>) -> Result<Self> {
        times.sort_unstable();
        times.dedup();
        Self::new(times)
    }

    /// Wrap timestamps known to be non-empty and strictly increasing.
    pub(crate) fn from_sorted(times: Vec<Timestamp>) -> Self {
        debug_assert!(!times.is_empty());
        Self { times }
    }

    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn start(&self) -> Timestamp {
        self.times[0]
    }

    pub fn end(&self) -> Timestamp {
        self.times[self.times.len() - 1]
    }

    /// Binary search; `Ok(position)` when present.
    pub fn find_timestamp(&self, t: Timestamp) -> std::result::Result<usize, usize> {
        self.times.binary_search(&t)
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        self.find_timestamp(t).is_ok()
    }

    /// Closed period from the first to the last timestamp.
    pub fn to_period(&self) -> Period {
        Period::closed_unchecked(self.start(), self.end())
    }

    /// One instantaneous period per timestamp.
    pub fn to_periodset(&self) -> PeriodSet {
        PeriodSet::from_normalized(self.times.iter().map(|&t| Period::instant(t)).collect())
    }

    /// Timestamps falling within `period`.
    pub fn at_period(&self, period: &Period) -> Option<Self> {
        let times: Vec<Timestamp> = self
            .times
            .iter()
            .copied()
            .filter(|&t| period.contains_value(t))
            .collect();
        (!times.is_empty()).then_some(Self { times })
    }

    pub fn shift(&self, delta: i64) -> Self {
        Self {
            times: self.times.iter().map(|t| t.add_micros(delta)).collect(),
        }
    }
}

impl fmt::Display for TimestampSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, t) in self.times.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", t)?;
        }
        f.write_str("}")
    }
}

impl FromStr for TimestampSet {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = TextParser::new(s);
        parser.expect('{')?;
        let mut times = vec![parser.read_timestamp()?];
        while parser.eat(',') {
            times.push(parser.read_timestamp()?);
        }
        parser.expect('}')?;
        parser.finish()?;
        Self::new(times)
    }
}
