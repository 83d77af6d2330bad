//! Bar data manager for the chart module.
//!
//! Holds the ordered bar sequence with timestamp indexing and caches the
//! price extrema of the last visible window.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::object::Bar;

use super::viewport::{price_extrema, Viewport};

/// Manages bar data with datetime-based indexing
#[derive(Debug, Default)]
pub struct BarManager {
    /// Ordered list of bar data
    bars: Vec<Bar>,
    /// Map from datetime to index
    datetime_index_map: HashMap<DateTime<Utc>, usize>,
    /// Price range of the last window asked for
    price_range: Option<(Viewport, Option<(f64, f64)>)>,
    /// Bumped on every data change so derived series know to recompute
    revision: u64,
}

impl BarManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the series. Bars are expected in ascending time order.
    pub fn set_bars(&mut self, bars: Vec<Bar>) {
        self.datetime_index_map = bars.iter().enumerate().map(|(ix, bar)| (bar.t, ix)).collect();
        self.bars = bars;
        self.touch();
    }

    /// Update the last bar in place or append a newer one.
    pub fn update_bar(&mut self, bar: Bar) {
        match self.datetime_index_map.get(&bar.t) {
            Some(&ix) => self.bars[ix] = bar,
            None => {
                self.datetime_index_map.insert(bar.t, self.bars.len());
                self.bars.push(bar);
            }
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.price_range = None;
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get total number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn get(&self, ix: usize) -> Option<&Bar> {
        self.bars.get(ix)
    }

    /// Index of the bar stamped exactly `t`
    pub fn index_of(&self, t: DateTime<Utc>) -> Option<usize> {
        self.datetime_index_map.get(&t).copied()
    }

    /// Exact match, else the bar closest in time
    pub fn nearest_index(&self, t: DateTime<Utc>) -> Option<usize> {
        if let Some(ix) = self.index_of(t) {
            return Some(ix);
        }
        if self.bars.is_empty() {
            return None;
        }
        let after = self.bars.partition_point(|bar| bar.t < t);
        if after == 0 {
            return Some(0);
        }
        if after == self.bars.len() {
            return Some(after - 1);
        }
        let before_gap = t - self.bars[after - 1].t;
        let after_gap = self.bars[after].t - t;
        Some(if after_gap < before_gap { after } else { after - 1 })
    }

    /// Low/high extrema of the window. Only the last window is kept, until
    /// the view or the data changes.
    pub fn price_range(&mut self, view: Viewport) -> Option<(f64, f64)> {
        if let Some((cached, range)) = self.price_range {
            if cached == view {
                return range;
            }
        }
        let range = price_extrema(&self.bars, view);
        self.price_range = Some((view, range));
        range
    }

    /// Clear all data
    pub fn clear_all(&mut self) {
        self.bars.clear();
        self.datetime_index_map.clear();
        self.touch();
    }
}
