use super::span::{Span, SpanBound, cmp_bound};
use crate::error::{Result, TemporaError};
use crate::io::text::TextParser;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tempora_types::Timestamp;

/// An ordered set of disjoint, non-adjacent spans.
///
/// Every constructor normalizes: spans are sorted and any that overlap or
/// touch are merged, so two span sets covering the same points are equal.
///
/// # Examples
///
/// ```
/// use tempora::time::{Span, SpanSet};
///
/// let set = SpanSet::new(vec![
///     Span::new(5, 7, true, true).unwrap(),
///     Span::new(1, 3, true, false).unwrap(),
///     Span::new(3, 4, true, true).unwrap(),
/// ])
/// .unwrap();
/// assert_eq!(set.to_string(), "{[1, 4], [5, 7]}");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpanSet<T: SpanBound> {
    spans: Vec<Span<T>>,
}

/// A set of disjoint periods.
pub type PeriodSet = SpanSet<Timestamp>;

/// Sort spans by lower bound and merge those that overlap or touch.
pub fn normalize<T: SpanBound>(mut spans: Vec<Span<T>>) -> Vec<Span<T>> {
    spans.sort_by(|a, b| a.cmp_lower(b));
    let mut merged: Vec<Span<T>> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(last) = merged.last_mut()
            && (last.overlaps(&span) || last.adjacent(&span))
        {
            *last = last.merge(&span);
        } else {
            merged.push(span);
        }
    }
    merged
}

impl<T: SpanBound> SpanSet<T> {
    /// Build a normalized set from spans in any order.
    pub fn new(spans: Vec<Span<T>>) -> Result<Self> {
        if spans.is_empty() {
            return Err(TemporaError::invalid("a span set needs at least one span"));
        }
        Ok(Self {
            spans: normalize(spans),
        })
    }

    /// Build from spans known to be sorted, disjoint and non-adjacent.
    pub(crate) fn from_normalized(spans: Vec<Span<T>>) -> Self {
        debug_assert!(!spans.is_empty());
        Self { spans }
    }

    /// Like [`SpanSet::new`], but `None` for an empty input.
    pub(crate) fn from_spans(spans: Vec<Span<T>>) -> Option<Self> {
        (!spans.is_empty()).then(|| Self {
            spans: normalize(spans),
        })
    }

    pub fn spans(&self) -> &[Span<T>] {
        &self.spans
    }

    pub fn num_spans(&self) -> usize {
        self.spans.len()
    }

    pub fn start_span(&self) -> &Span<T> {
        &self.spans[0]
    }

    pub fn end_span(&self) -> &Span<T> {
        &self.spans[self.spans.len() - 1]
    }

    /// Bounding span of the set.
    pub fn span(&self) -> Span<T> {
        self.start_span().merge(self.end_span())
    }

    /// Sum of the widths of the spans.
    pub fn width(&self) -> f64 {
        self.spans.iter().map(Span::width).sum()
    }

    /// Binary search for the span containing `value`.
    ///
    /// Returns `Ok(index)` when found and `Err(index)` with the insertion
    /// position otherwise.
    pub fn find_value(&self, value: T) -> std::result::Result<usize, usize> {
        self.spans.binary_search_by(|span| {
            if span.contains_value(value) {
                Ordering::Equal
            } else if cmp_bound(&span.upper(), &value) != Ordering::Greater {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        })
    }

    pub fn contains_value(&self, value: T) -> bool {
        self.find_value(value).is_ok()
    }

    pub fn contains_span(&self, span: &Span<T>) -> bool {
        self.spans.iter().any(|s| s.contains_span(span))
    }

    pub fn overlaps_span(&self, span: &Span<T>) -> bool {
        self.spans.iter().any(|s| s.overlaps(span))
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut spans = self.spans.clone();
        spans.extend_from_slice(&other.spans);
        Self {
            spans: normalize(spans),
        }
    }

    /// Merge-join intersection.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.spans.len() && j < other.spans.len() {
            let a = &self.spans[i];
            let b = &other.spans[j];
            if let Some(inter) = a.intersection(b) {
                result.push(inter);
            }
            if a.cmp_upper(b) == Ordering::Greater {
                j += 1;
            } else {
                i += 1;
            }
        }
        (!result.is_empty()).then(|| Self::from_normalized(result))
    }

    pub fn intersection_span(&self, span: &Span<T>) -> Option<Self> {
        self.intersection(&Self::from_normalized(vec![*span]))
    }

    /// Points of `self` not in `other`.
    pub fn minus(&self, other: &Self) -> Option<Self> {
        let mut result = Vec::new();
        let mut j = 0;
        for span in &self.spans {
            let mut current = Some(*span);
            while let Some(piece) = current {
                while j < other.spans.len() && other.spans[j].is_left_of(&piece) {
                    j += 1;
                }
                if j >= other.spans.len() || piece.is_left_of(&other.spans[j]) {
                    result.push(piece);
                    break;
                }
                let cutter = other.spans[j];
                current = None;
                for part in piece.minus(&cutter) {
                    if part.is_left_of(&cutter) {
                        result.push(part);
                    } else {
                        current = Some(part);
                    }
                }
                if current.is_some() {
                    j += 1;
                }
            }
        }
        (!result.is_empty()).then(|| Self::from_normalized(result))
    }

    pub fn minus_span(&self, span: &Span<T>) -> Option<Self> {
        self.minus(&Self::from_normalized(vec![*span]))
    }
}

impl SpanSet<Timestamp> {
    /// Total length of the periods in microseconds.
    pub fn duration(&self) -> i64 {
        self.spans.iter().map(Span::duration).sum()
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.start_span().lower()
    }

    pub fn end_timestamp(&self) -> Timestamp {
        self.end_span().upper()
    }

    pub fn shift(&self, delta: i64) -> Self {
        Self::from_normalized(self.spans.iter().map(|p| p.shift(delta)).collect())
    }
}

impl<T: SpanBound> From<Span<T>> for SpanSet<T> {
    fn from(span: Span<T>) -> Self {
        Self::from_normalized(vec![span])
    }
}

impl<T: SpanBound> fmt::Display for SpanSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", span)?;
        }
        f.write_str("}")
    }
}

impl<T: SpanBound> FromStr for SpanSet<T> {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = TextParser::new(s);
        parser.expect('{')?;
        let mut spans = vec![Span::read(&mut parser)?];
        while parser.eat(',') {
            spans.push(Span::read(&mut parser)?);
        }
        parser.expect('}')?;
        parser.finish()?;
        Self::new(spans)
    }
}
