use super::spanset::SpanSet;
use crate::error::{Result, TemporaError};
use crate::io::text::TextParser;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tempora_types::Timestamp;

/// An orderable domain that spans can range over.
pub trait SpanBound: Copy + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Width of `[lower, upper]` as a float.
    fn width_between(lower: Self, upper: Self) -> f64;

    fn is_valid_bound(&self) -> bool {
        true
    }

    fn read_bound(parser: &mut TextParser<'_>) -> Result<Self>;
}

impl SpanBound for Timestamp {
    fn width_between(lower: Self, upper: Self) -> f64 {
        upper.micros_since(lower) as f64
    }

    fn read_bound(parser: &mut TextParser<'_>) -> Result<Self> {
        parser.read_timestamp()
    }
}

impl SpanBound for i32 {
    fn width_between(lower: Self, upper: Self) -> f64 {
        upper as f64 - lower as f64
    }

    fn read_bound(parser: &mut TextParser<'_>) -> Result<Self> {
        let position = parser.position();
        let token = parser.take_token()?;
        token
            .parse()
            .map_err(|_| TemporaError::parse(position, format!("invalid integer '{}'", token)))
    }
}

impl SpanBound for f64 {
    fn width_between(lower: Self, upper: Self) -> f64 {
        upper - lower
    }

    fn is_valid_bound(&self) -> bool {
        !self.is_nan()
    }

    fn read_bound(parser: &mut TextParser<'_>) -> Result<Self> {
        let position = parser.position();
        let token = parser.take_token()?;
        token
            .parse()
            .map_err(|_| TemporaError::parse(position, format!("invalid float '{}'", token)))
    }
}

pub(crate) fn cmp_bound<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Compare two lower bounds. At equal values an inclusive bound comes first.
pub(crate) fn cmp_lower<T: PartialOrd>(a: &T, a_inc: bool, b: &T, b_inc: bool) -> Ordering {
    cmp_bound(a, b).then_with(|| match (a_inc, b_inc) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    })
}

/// Compare two upper bounds. At equal values an inclusive bound comes last.
pub(crate) fn cmp_upper<T: PartialOrd>(a: &T, a_inc: bool, b: &T, b_inc: bool) -> Ordering {
    cmp_bound(a, b).then_with(|| match (a_inc, b_inc) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    })
}

/// A non-empty interval over an ordered domain with inclusive or exclusive
/// bounds.
///
/// # Examples
///
/// ```
/// use tempora::time::Span;
///
/// let a = Span::new(1, 5, true, false).unwrap();
/// let b = Span::new(3, 8, true, true).unwrap();
/// assert!(a.overlaps(&b));
/// assert_eq!(a.intersection(&b), Some(Span::new(3, 5, true, false).unwrap()));
/// assert!(Span::new(5, 5, true, false).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span<T: SpanBound> {
    lower: T,
    upper: T,
    lower_inc: bool,
    upper_inc: bool,
}

/// A span of timestamps.
pub type Period = Span<Timestamp>;
pub type IntSpan = Span<i32>;
pub type FloatSpan = Span<f64>;

impl<T: SpanBound> Span<T> {
    /// Construct a span, rejecting inverted and empty intervals.
    pub fn new(lower: T, upper: T, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        if !lower.is_valid_bound() || !upper.is_valid_bound() {
            return Err(TemporaError::invalid("span bounds must be comparable values"));
        }
        match cmp_bound(&lower, &upper) {
            Ordering::Greater => Err(TemporaError::invalid(format!(
                "span lower bound must be less than or equal to its upper bound: {} > {}",
                lower, upper
            ))),
            Ordering::Equal if !(lower_inc && upper_inc) => Err(TemporaError::invalid(format!(
                "span with equal bounds {} must be inclusive on both sides",
                lower
            ))),
            _ => Ok(Self {
                lower,
                upper,
                lower_inc,
                upper_inc,
            }),
        }
    }

    /// The single-point span `[value, value]`.
    pub fn instant(value: T) -> Self {
        Self {
            lower: value,
            upper: value,
            lower_inc: true,
            upper_inc: true,
        }
    }

    /// `[lower, upper]` for bounds already known to be ordered.
    pub(crate) fn closed_unchecked(lower: T, upper: T) -> Self {
        Self {
            lower,
            upper,
            lower_inc: true,
            upper_inc: true,
        }
    }

    /// Bounds already validated by the caller.
    pub(crate) fn new_unchecked(lower: T, upper: T, lower_inc: bool, upper_inc: bool) -> Self {
        Self {
            lower,
            upper,
            lower_inc,
            upper_inc,
        }
    }

    pub fn lower(&self) -> T {
        self.lower
    }

    pub fn upper(&self) -> T {
        self.upper
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn is_instant(&self) -> bool {
        cmp_bound(&self.lower, &self.upper) == Ordering::Equal
    }

    pub fn width(&self) -> f64 {
        T::width_between(self.lower, self.upper)
    }

    pub(crate) fn cmp_lower(&self, other: &Self) -> Ordering {
        cmp_lower(&self.lower, self.lower_inc, &other.lower, other.lower_inc)
    }

    pub(crate) fn cmp_upper(&self, other: &Self) -> Ordering {
        cmp_upper(&self.upper, self.upper_inc, &other.upper, other.upper_inc)
    }

    pub fn contains_value(&self, value: T) -> bool {
        let after_lower = match cmp_bound(&self.lower, &value) {
            Ordering::Less => true,
            Ordering::Equal => self.lower_inc,
            Ordering::Greater => false,
        };
        let before_upper = match cmp_bound(&value, &self.upper) {
            Ordering::Less => true,
            Ordering::Equal => self.upper_inc,
            Ordering::Greater => false,
        };
        after_lower && before_upper
    }

    pub fn contains_span(&self, other: &Self) -> bool {
        self.cmp_lower(other) != Ordering::Greater && self.cmp_upper(other) != Ordering::Less
    }

    /// True when every point of `self` precedes every point of `other`.
    pub fn is_left_of(&self, other: &Self) -> bool {
        match cmp_bound(&self.upper, &other.lower) {
            Ordering::Less => true,
            Ordering::Equal => !(self.upper_inc && other.lower_inc),
            Ordering::Greater => false,
        }
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_left_of(other) && !other.is_left_of(self)
    }

    /// True when the spans touch at one bound without sharing a point.
    pub fn adjacent(&self, other: &Self) -> bool {
        let touches = |a: &Self, b: &Self| {
            cmp_bound(&a.upper, &b.lower) == Ordering::Equal && a.upper_inc != b.lower_inc
        };
        touches(self, other) || touches(other, self)
    }

    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let (lower, lower_inc) = if self.cmp_lower(other) == Ordering::Less {
            (other.lower, other.lower_inc)
        } else {
            (self.lower, self.lower_inc)
        };
        let (upper, upper_inc) = if self.cmp_upper(other) == Ordering::Greater {
            (other.upper, other.upper_inc)
        } else {
            (self.upper, self.upper_inc)
        };
        Some(Self::new_unchecked(lower, upper, lower_inc, upper_inc))
    }

    /// Smallest span containing both spans.
    pub fn merge(&self, other: &Self) -> Self {
        let (lower, lower_inc) = if self.cmp_lower(other) == Ordering::Greater {
            (other.lower, other.lower_inc)
        } else {
            (self.lower, self.lower_inc)
        };
        let (upper, upper_inc) = if self.cmp_upper(other) == Ordering::Less {
            (other.upper, other.upper_inc)
        } else {
            (self.upper, self.upper_inc)
        };
        Self::new_unchecked(lower, upper, lower_inc, upper_inc)
    }

    /// Set union; disjoint spans give a two-span set.
    pub fn union(&self, other: &Self) -> SpanSet<T> {
        SpanSet::from_normalized(if self.overlaps(other) || self.adjacent(other) {
            vec![self.merge(other)]
        } else if self.cmp_lower(other) == Ordering::Less {
            vec![*self, *other]
        } else {
            vec![*other, *self]
        })
    }

    /// Set difference, as zero, one or two spans in order.
    pub fn minus(&self, other: &Self) -> Vec<Self> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        let mut result = Vec::with_capacity(2);
        if self.cmp_lower(other) == Ordering::Less
            && let Ok(left) = Self::new(self.lower, other.lower, self.lower_inc, !other.lower_inc)
        {
            result.push(left);
        }
        if self.cmp_upper(other) == Ordering::Greater
            && let Ok(right) = Self::new(other.upper, self.upper, !other.upper_inc, self.upper_inc)
        {
            result.push(right);
        }
        result
    }
}

impl Span<Timestamp> {
    /// Length of the period in microseconds.
    pub fn duration(&self) -> i64 {
        self.upper.micros_since(self.lower)
    }

    /// Move both bounds by `delta` microseconds.
    pub fn shift(&self, delta: i64) -> Self {
        Self::new_unchecked(
            self.lower.add_micros(delta),
            self.upper.add_micros(delta),
            self.lower_inc,
            self.upper_inc,
        )
    }
}

impl<T: SpanBound> fmt::Display for Span<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_inc { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_inc { ']' } else { ')' }
        )
    }
}

impl<T: SpanBound> Span<T> {
    pub(crate) fn read(parser: &mut TextParser<'_>) -> Result<Self> {
        let position = parser.position();
        let lower_inc = match parser.peek() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(TemporaError::parse(position, "expected '[' or '('")),
        };
        parser.advance();
        let lower = T::read_bound(parser)?;
        parser.expect(',')?;
        let upper = T::read_bound(parser)?;
        let upper_inc = match parser.peek() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(parser.error("expected ']' or ')'")),
        };
        parser.advance();
        Self::new(lower, upper, lower_inc, upper_inc)
    }
}

impl<T: SpanBound> FromStr for Span<T> {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = TextParser::new(s);
        let span = Self::read(&mut parser)?;
        parser.finish()?;
        Ok(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(lower: i32, upper: i32, lower_inc: bool, upper_inc: bool) -> IntSpan {
        Span::new(lower, upper, lower_inc, upper_inc).unwrap()
    }

    #[test]
    fn test_span_construction_errors() {
        assert!(matches!(
            Span::new(3, 1, true, true),
            Err(TemporaError::InvalidArgument(_))
        ));
        assert!(Span::new(1, 1, true, false).is_err());
        assert!(Span::new(f64::NAN, 1.0, true, true).is_err());
        assert!(Span::new(1, 1, true, true).unwrap().is_instant());
    }

    #[test]
    fn test_span_contains_value_respects_bounds() {
        let s = span(1, 5, false, true);
        assert!(!s.contains_value(1));
        assert!(s.contains_value(3));
        assert!(s.contains_value(5));
        assert!(!s.contains_value(6));
    }

    #[test]
    fn test_span_overlap_and_adjacency() {
        let a = span(1, 3, true, false);
        let b = span(3, 5, true, true);
        let c = span(3, 5, false, true);
        assert!(!a.overlaps(&b));
        assert!(a.adjacent(&b));
        assert!(a.is_left_of(&b));
        assert!(!a.adjacent(&c));
        assert!(!a.overlaps(&c));

        let d = span(1, 3, true, true);
        assert!(d.overlaps(&b));
        assert!(!d.adjacent(&b));
    }

    #[test]
    fn test_span_intersection_and_merge() {
        let a = span(1, 5, true, false);
        let b = span(3, 8, false, true);
        assert_eq!(a.intersection(&b), Some(span(3, 5, false, false)));
        assert_eq!(a.merge(&b), span(1, 8, true, true));
        assert_eq!(span(1, 2, true, true).intersection(&span(3, 4, true, true)), None);
    }

    #[test]
    fn test_span_union() {
        let a = span(1, 3, true, false);
        let b = span(3, 5, true, true);
        assert_eq!(a.union(&b).spans(), &[span(1, 5, true, true)]);

        let c = span(7, 9, true, true);
        let u = a.union(&c);
        assert_eq!(u.num_spans(), 2);
        assert_eq!(u.spans()[0], a);
    }

    #[test]
    fn test_span_minus() {
        let a = span(1, 10, true, true);
        assert_eq!(
            a.minus(&span(3, 5, true, false)),
            vec![span(1, 3, true, false), span(5, 10, true, true)]
        );
        assert!(a.minus(&span(0, 20, true, true)).is_empty());
        assert_eq!(a.minus(&span(1, 1, true, true)), vec![span(1, 10, false, true)]);
        assert_eq!(a.minus(&span(20, 30, true, true)), vec![a]);
    }

    #[test]
    fn test_span_text_round_trip() {
        let p: Period = "[2000-01-01 00:00:00+00, 2000-01-02 00:00:00+00)".parse().unwrap();
        assert_eq!(p.duration(), 86_400_000_000);
        assert_eq!(
            p.to_string(),
            "[2000-01-01 00:00:00+00, 2000-01-02 00:00:00+00)"
        );
        let f: FloatSpan = "(1.5, 2.5]".parse().unwrap();
        assert_eq!(f.to_string(), "(1.5, 2.5]");
        assert!("[2, 1]".parse::<IntSpan>().is_err());
        assert!("[1, 2] x".parse::<IntSpan>().is_err());
    }
}
