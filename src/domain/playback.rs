//! Bar-by-bar reveal of the trading session.
//!
//! Steps are one-way: each reveals the next pending bar and recomputes the
//! indicators before the new price becomes visible.

use crate::domain::bar::Bar;
use crate::domain::error::GameError;
use crate::domain::indicator_engine::{IndicatorEngine, IndicatorSet};
use crate::domain::time_series::TimeSeries;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Running,
    Finished,
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    series: TimeSeries,
    engine: IndicatorEngine,
    indicators: IndicatorSet,
    state: PlaybackState,
}

impl PlaybackController {
    pub fn new(series: TimeSeries, engine: IndicatorEngine) -> Self {
        let indicators = engine.recompute(&series);
        let state = if series.has_pending() {
            PlaybackState::Running
        } else {
            PlaybackState::Finished
        };
        Self {
            series,
            engine,
            indicators,
            state,
        }
    }

    /// Reveals the next bar. `Ok(false)` means nothing was left to reveal.
    pub fn step(&mut self) -> Result<bool, GameError> {
        if self.state == PlaybackState::Finished {
            return Ok(false);
        }

        let bar = self.series.append_next()?;
        debug!(time = %bar.time, close = bar.close, "bar revealed");
        self.indicators = self.engine.recompute(&self.series);

        if !self.series.has_pending() {
            self.state = PlaybackState::Finished;
        }
        Ok(true)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        !self.series.has_pending() && self.current_index() + 1 == self.series.display().len()
    }

    pub fn current_index(&self) -> usize {
        self.series.display().len().saturating_sub(1)
    }

    /// The newest revealed bar. The display seed is never empty.
    pub fn current_bar(&self) -> &Bar {
        &self.series.display()[self.current_index()]
    }

    pub fn current_price(&self) -> f64 {
        self.current_bar().close
    }

    pub fn remaining(&self) -> usize {
        self.series.pending_len()
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }
}
