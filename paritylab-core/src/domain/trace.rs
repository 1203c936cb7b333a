//! Per-tick signal trace.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

use super::{Signal, Tick};

/// Ordered mapping from tick to signal.
///
/// Iteration is always in ascending tick order. Insertion keeps the first
/// signal recorded for a tick; later inserts for the same tick are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    entries: BTreeMap<Tick, Signal>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `signal` for `tick` unless the tick is already present.
    ///
    /// Returns `false` when the tick was a duplicate and nothing changed.
    pub fn insert_first(&mut self, tick: Tick, signal: Signal) -> bool {
        match self.entries.entry(tick) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(signal);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, tick: Tick) -> Option<Signal> {
        self.entries.get(&tick).copied()
    }

    pub fn contains(&self, tick: Tick) -> bool {
        self.entries.contains_key(&tick)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tick, Signal)> + '_ {
        self.entries.iter().map(|(&t, &s)| (t, s))
    }

    pub fn ticks(&self) -> impl Iterator<Item = Tick> + '_ {
        self.entries.keys().copied()
    }

    pub fn first_tick(&self) -> Option<Tick> {
        self.entries.keys().next().copied()
    }

    pub fn last_tick(&self) -> Option<Tick> {
        self.entries.keys().next_back().copied()
    }

    /// Signals in tick order.
    pub fn signals(&self) -> Vec<Signal> {
        self.entries.values().copied().collect()
    }
}

impl FromIterator<(Tick, Signal)> for Trace {
    /// First occurrence per tick wins, matching [`Trace::insert_first`].
    fn from_iter<I: IntoIterator<Item = (Tick, Signal)>>(iter: I) -> Self {
        let mut trace = Trace::new();
        for (tick, signal) in iter {
            trace.insert_first(tick, signal);
        }
        trace
    }
}
