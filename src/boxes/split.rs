//! Node split heuristic for tree indexes over boxes.
//!
//! Implements the double sorting split: every axis is projected to intervals,
//! candidate splits are enumerated from the sorted lower and upper bounds, and
//! the split with the least overlap that keeps both groups above a minimum
//! fill ratio wins. Across axes a later axis only replaces the current choice
//! with a strictly smaller overlap or a strictly wider range, so exact ties
//! keep the axis examined first.
use std::cmp::Ordering;

/// Minimum share of entries each group must receive.
pub const LIMIT_RATIO: f64 = 0.3;

/// A box that can be split along numbered axes.
pub trait SplitBox: Clone {
    fn axis_count(&self) -> usize;

    /// `(min, max)` of the box along `axis`.
    fn axis_range(&self, axis: usize) -> (f64, f64);

    fn union(&self, other: &Self) -> Self;

    /// Product of the axis extents.
    fn volume(&self) -> f64 {
        (0..self.axis_count())
            .map(|axis| {
                let (min, max) = self.axis_range(axis);
                max - min
            })
            .product()
    }

    /// Growth in volume caused by adding `other` to `self`.
    fn penalty(&self, other: &Self) -> f64 {
        self.union(other).volume() - self.volume()
    }
}

/// Entry indexes assigned to each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    lower: f64,
    upper: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    axis: usize,
    ratio: f64,
    overlap: f64,
    range: f64,
    left_upper: f64,
    right_lower: f64,
}

fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

struct SplitContext {
    entries: usize,
    best: Option<Candidate>,
}

impl SplitContext {
    fn consider(
        &mut self,
        axis: usize,
        range: f64,
        right_lower: f64,
        min_left_count: usize,
        left_upper: f64,
        max_left_count: usize,
    ) {
        let left_count = if min_left_count >= self.entries.div_ceil(2) {
            min_left_count
        } else if max_left_count <= self.entries / 2 {
            max_left_count
        } else {
            self.entries / 2
        };
        let right_count = self.entries - left_count;
        let ratio = left_count.min(right_count) as f64 / self.entries as f64;
        if ratio <= LIMIT_RATIO {
            return;
        }

        let overlap = if range > 0.0 {
            (left_upper - right_lower) / range
        } else {
            0.0
        };

        let select = match &self.best {
            None => true,
            Some(best) if best.axis == axis => {
                overlap < best.overlap || (overlap == best.overlap && ratio > best.ratio)
            }
            Some(best) => {
                non_negative(overlap) < non_negative(best.overlap)
                    || (range > best.range
                        && non_negative(overlap) <= non_negative(best.overlap))
            }
        };

        if select {
            self.best = Some(Candidate {
                axis,
                ratio,
                overlap,
                range,
                left_upper,
                right_lower,
            });
        }
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Choose a split of `boxes` into two groups.
///
/// Returns `None` for fewer than two entries.
///
/// # Examples
///
/// ```
/// use tempora::boxes::{consider_split, TBox};
/// use tempora_types::Timestamp;
///
/// let boxes: Vec<TBox> = (0..10)
///     .map(|i| {
///         let x = if i < 5 { i as f64 } else { 100.0 + i as f64 };
///         TBox::new(x, x + 1.0, Timestamp::from_secs(0), Timestamp::from_secs(1)).unwrap()
///     })
///     .collect();
/// let split = consider_split(&boxes).unwrap();
/// assert_eq!(split.left, vec![0, 1, 2, 3, 4]);
/// assert_eq!(split.right, vec![5, 6, 7, 8, 9]);
/// ```
pub fn consider_split<B: SplitBox>(boxes: &[B]) -> Option<Split> {
    let n = boxes.len();
    if n < 2 {
        return None;
    }

    let bounding = boxes[1..]
        .iter()
        .fold(boxes[0].clone(), |acc, b| acc.union(b));
    let axes = boxes.iter().map(SplitBox::axis_count).min().unwrap_or(0);

    let mut context = SplitContext {
        entries: n,
        best: None,
    };

    for axis in 0..axes {
        let (min, max) = bounding.axis_range(axis);
        let range = max - min;

        let mut by_lower: Vec<Interval> = boxes
            .iter()
            .map(|b| {
                let (lower, upper) = b.axis_range(axis);
                Interval { lower, upper }
            })
            .collect();
        let mut by_upper = by_lower.clone();
        by_lower.sort_by(|a, b| cmp_f64(a.lower, b.lower).then(cmp_f64(a.upper, b.upper)));
        by_upper.sort_by(|a, b| cmp_f64(a.upper, b.upper).then(cmp_f64(a.lower, b.lower)));

        // Lower bound of the right group, smallest possible upper bound of the left.
        let mut i1 = 0;
        let mut i2 = 0;
        let mut right_lower = by_lower[0].lower;
        let mut left_upper = by_upper[0].lower;
        loop {
            while i1 < n && right_lower == by_lower[i1].lower {
                if left_upper < by_lower[i1].upper {
                    left_upper = by_lower[i1].upper;
                }
                i1 += 1;
            }
            if i1 >= n {
                break;
            }
            right_lower = by_lower[i1].lower;
            while i2 < n && by_upper[i2].upper <= left_upper {
                i2 += 1;
            }
            context.consider(axis, range, right_lower, i1, left_upper, i2);
        }

        // Upper bound of the left group, greatest possible lower bound of the right.
        let mut i1 = n as isize - 1;
        let mut i2 = n as isize - 1;
        let mut right_lower = by_lower[n - 1].upper;
        let mut left_upper = by_upper[n - 1].upper;
        loop {
            while i2 >= 0 && left_upper == by_upper[i2 as usize].upper {
                if right_lower > by_upper[i2 as usize].lower {
                    right_lower = by_upper[i2 as usize].lower;
                }
                i2 -= 1;
            }
            if i2 < 0 {
                break;
            }
            left_upper = by_upper[i2 as usize].upper;
            while i1 >= 0 && by_lower[i1 as usize].lower >= right_lower {
                i1 -= 1;
            }
            context.consider(
                axis,
                range,
                right_lower,
                (i1 + 1) as usize,
                left_upper,
                (i2 + 1) as usize,
            );
        }
    }

    let Some(best) = context.best else {
        return Some(fallback_split(n));
    };

    let mut split = Split {
        left: Vec::new(),
        right: Vec::new(),
    };
    let mut left_box: Option<B> = None;
    let mut right_box: Option<B> = None;
    let mut common = Vec::new();

    let place = |side_box: &mut Option<B>, side: &mut Vec<usize>, index: usize| {
        *side_box = Some(match side_box.take() {
            Some(current) => current.union(&boxes[index]),
            None => boxes[index].clone(),
        });
        side.push(index);
    };

    for (index, b) in boxes.iter().enumerate() {
        let (lower, upper) = b.axis_range(best.axis);
        if upper <= best.left_upper {
            if lower >= best.right_lower {
                common.push(index);
            } else {
                place(&mut left_box, &mut split.left, index);
            }
        } else {
            place(&mut right_box, &mut split.right, index);
        }
    }

    if !common.is_empty() {
        let min_count = (LIMIT_RATIO * n as f64).ceil() as usize;
        let penalty = |side_box: &Option<B>, index: usize| {
            side_box
                .as_ref()
                .map_or(0.0, |side| side.penalty(&boxes[index]))
        };

        let mut deltas: Vec<(usize, f64)> = common
            .iter()
            .map(|&index| {
                let delta = (penalty(&left_box, index) - penalty(&right_box, index)).abs();
                (index, delta)
            })
            .collect();
        deltas.sort_by(|a, b| cmp_f64(a.1, b.1));

        let total = deltas.len();
        for (position, (index, _)) in deltas.into_iter().enumerate() {
            let remaining = total - position;
            if split.left.len() + remaining <= min_count {
                place(&mut left_box, &mut split.left, index);
            } else if split.right.len() + remaining <= min_count {
                place(&mut right_box, &mut split.right, index);
            } else if penalty(&left_box, index) < penalty(&right_box, index) {
                place(&mut left_box, &mut split.left, index);
            } else {
                place(&mut right_box, &mut split.right, index);
            }
        }
    }

    log::trace!(
        "split {} boxes on axis {}: {} left, {} right",
        n,
        best.axis,
        split.left.len(),
        split.right.len()
    );
    Some(split)
}

/// Half of the entries on each side.
fn fallback_split(n: usize) -> Split {
    let half = n / 2;
    Split {
        left: (0..half).collect(),
        right: (half..n).collect(),
    }
}
