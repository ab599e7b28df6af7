//! Bar storage split into historical / display / pending partitions.
//!
//! `full = historical ++ display` at all times. Pending bars move into
//! `display` one at a time, in order.

use crate::domain::bar::Bar;
use crate::domain::error::{GameError, Partition};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    historical: Vec<Bar>,
    display: Vec<Bar>,
    pending: VecDeque<Bar>,
}

impl TimeSeries {
    /// Builds a series from the three feed partitions.
    ///
    /// Timestamps must be strictly increasing across the concatenation
    /// `historical ++ display_seed ++ pending`; nothing is re-sorted.
    pub fn load(
        historical: Vec<Bar>,
        display_seed: Vec<Bar>,
        pending: Vec<Bar>,
    ) -> Result<Self, GameError> {
        if display_seed.is_empty() {
            return Err(GameError::DataGap);
        }

        let partitions = [
            (Partition::Historical, &historical),
            (Partition::Display, &display_seed),
            (Partition::Pending, &pending),
        ];
        let mut prev = None;
        for (partition, bars) in partitions {
            for (index, bar) in bars.iter().enumerate() {
                if let Some(prev_time) = prev {
                    if bar.time <= prev_time {
                        return Err(GameError::OrderViolation {
                            partition,
                            index,
                            time: bar.time,
                        });
                    }
                }
                prev = Some(bar.time);
            }
        }

        Ok(Self {
            historical,
            display: display_seed,
            pending: pending.into(),
        })
    }

    /// Moves the head of `pending` onto the end of `display`.
    pub fn append_next(&mut self) -> Result<&Bar, GameError> {
        let bar = self.pending.pop_front().ok_or(GameError::EmptyPending)?;
        self.display.push(bar);
        Ok(&self.display[self.display.len() - 1])
    }

    pub fn historical(&self) -> &[Bar] {
        &self.historical
    }

    pub fn display(&self) -> &[Bar] {
        &self.display
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Most recently revealed bar.
    pub fn last(&self) -> Option<&Bar> {
        self.display.last()
    }

    /// Display closes only.
    pub fn closes(&self) -> Vec<f64> {
        self.display.iter().map(|b| b.close).collect()
    }

    /// Historical closes followed by display closes.
    pub fn full_closes(&self) -> Vec<f64> {
        self.historical
            .iter()
            .chain(self.display.iter())
            .map(|b| b.close)
            .collect()
    }

    /// Index in the full series where display bar 0 sits.
    pub fn display_offset(&self) -> usize {
        self.historical.len()
    }
}
