//! Skip-list of time-ordered aggregation fragments.
//!
//! Nodes live in one arena vector and link to each other by index. Slot 0 is
//! the head. Freed slots are recycled by later insertions.
use crate::config::AggregationConfig;
use crate::error::Result;
use crate::temporal::{TInstant, TSequence};
use crate::time::Period;
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use smallvec::{SmallVec, smallvec};

const HEAD: usize = 0;

/// Anything with a time extent that can be kept in time order.
pub trait Timed {
    fn period(&self) -> Period;
}

impl<V: crate::base::BaseValue> Timed for TInstant<V> {
    fn period(&self) -> Period {
        Period::instant(self.timestamp())
    }
}

impl<V: crate::base::BaseValue> Timed for TSequence<V> {
    fn period(&self) -> Period {
        TSequence::period(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Before,
    During,
    After,
}

struct Node<T> {
    value: Option<T>,
    next: SmallVec<[Option<usize>; 4]>,
}

/// An ordered list of disjoint fragments supporting splice-with-merge.
pub struct SkipList<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    len: usize,
    max_level: usize,
    rng: SmallRng,
}

impl<T: Timed> SkipList<T> {
    /// An empty list with `config.initial_capacity` slots reserved.
    pub fn new(config: &AggregationConfig) -> Result<Self> {
        let mut nodes = Vec::new();
        nodes.try_reserve(config.initial_capacity.saturating_add(1))?;
        nodes.push(Node {
            value: None,
            next: smallvec![None],
        });
        Ok(Self {
            nodes,
            free: Vec::new(),
            len: 0,
            max_level: config.max_level,
            rng: SmallRng::seed_from_u64(config.seed),
        })
    }

    /// A list holding `values`, which must already be in time order.
    pub fn from_values(config: &AggregationConfig, values: Vec<T>) -> Result<Self> {
        let mut list = Self::new(config)?;
        let mut update = vec![HEAD; list.height()];
        list.insert_run(&mut update, values)?;
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn height(&self) -> usize {
        self.nodes[HEAD].next.len()
    }

    /// Fragments in time order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let mut cur = self.nodes[HEAD].next[0];
        std::iter::from_fn(move || {
            let index = cur?;
            let node = &self.nodes[index];
            cur = node.next[0];
            node.value.as_ref()
        })
    }

    pub fn into_values(mut self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.len);
        let mut cur = self.nodes[HEAD].next[0];
        while let Some(index) = cur {
            let node = &mut self.nodes[index];
            cur = node.next[0];
            values.extend(node.value.take());
        }
        values
    }

    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < self.max_level && self.rng.gen_bool(0.5) {
            level += 1;
        }
        level
    }

    fn position(&self, index: usize, span: &Period) -> Position {
        let Some(value) = self.nodes[index].value.as_ref() else {
            return Position::Before;
        };
        let period = value.period();
        if period.upper() < span.lower() {
            Position::Before
        } else if period.lower() > span.upper() {
            Position::After
        } else {
            Position::During
        }
    }

    fn alloc(&mut self, value: T, height: usize) -> Result<usize> {
        let node = Node {
            value: Some(value),
            next: smallvec![None; height],
        };
        if let Some(index) = self.free.pop() {
            self.nodes[index] = node;
            return Ok(index);
        }
        self.nodes.try_reserve(1)?;
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    /// Insert `values` in order after the predecessors in `update`.
    fn insert_run(&mut self, update: &mut Vec<usize>, values: Vec<T>) -> Result<()> {
        for value in values {
            let height = self.random_level();
            if height > self.height() {
                self.nodes[HEAD].next.resize(height, None);
                update.resize(height, HEAD);
            }
            let index = self.alloc(value, height)?;
            for (level, prev) in update.iter_mut().enumerate().take(height) {
                self.nodes[index].next[level] = self.nodes[*prev].next[level];
                self.nodes[*prev].next[level] = Some(index);
                *prev = index;
            }
            self.len += 1;
        }
        Ok(())
    }

    /// Replace the fragments overlapping `values` by `merge(old, values)`.
    ///
    /// `values` must be in time order. When nothing overlaps, `values` are
    /// inserted as they are and `merge` is not called.
    pub fn splice<F>(&mut self, values: Vec<T>, merge: F) -> Result<()>
    where
        F: FnOnce(Vec<T>, Vec<T>) -> Result<Vec<T>>,
    {
        let (Some(first), Some(last)) = (values.first(), values.last()) else {
            return Ok(());
        };
        let span = first.period().merge(&last.period());

        let mut update = vec![HEAD; self.height()];
        let mut cur = HEAD;
        for level in (0..self.height()).rev() {
            while let Some(next) = self.nodes[cur].next[level]
                && self.position(next, &span) == Position::Before
            {
                cur = next;
            }
            update[level] = cur;
        }

        let mut spliced = Vec::new();
        while let Some(candidate) = self.nodes[update[0]].next[0]
            && self.position(candidate, &span) == Position::During
        {
            for level in 0..self.nodes[candidate].next.len() {
                let prev = update[level];
                if self.nodes[prev].next[level] == Some(candidate) {
                    self.nodes[prev].next[level] = self.nodes[candidate].next[level];
                }
            }
            let node = &mut self.nodes[candidate];
            spliced.extend(node.value.take());
            node.next.clear();
            self.free.push(candidate);
            self.len -= 1;
        }

        let removed = spliced.len();
        let merged = if spliced.is_empty() {
            values
        } else {
            merge(spliced, values)?
        };
        debug!(
            "Skip-list splice removed {} and inserted {} elements",
            removed,
            merged.len()
        );
        self.insert_run(&mut update, merged)
    }
}
