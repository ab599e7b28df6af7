//! One game: the feed's bars, the playback cursor and the margin account.
//!
//! Player actions map one-to-one onto methods here. Each either applies
//! completely or returns a `GameError` with the session unchanged.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::domain::bar::Bar;
use crate::domain::error::GameError;
use crate::domain::feed::{Company, GameFeed};
use crate::domain::game_config::GameConfig;
use crate::domain::indicator_engine::IndicatorEngine;
use crate::domain::ledger::MarginLedger;
use crate::domain::playback::PlaybackController;
use crate::domain::position::{ClosedTrade, Position, Side};
use crate::domain::render::{compute_render_model, IndicatorToggle, RenderModel, VisibilityFlags};
use crate::domain::result::GameResult;
use crate::domain::time_series::TimeSeries;

#[derive(Debug, Clone)]
pub struct GameSession {
    company: Company,
    config: GameConfig,
    playback: PlaybackController,
    ledger: MarginLedger,
    visibility: VisibilityFlags,
    trades: Vec<ClosedTrade>,
    entry_time: Option<NaiveDateTime>,
    ended: bool,
}

impl GameSession {
    pub fn start(feed: GameFeed, config: GameConfig) -> Result<Self, GameError> {
        if feed.historical.is_empty() {
            warn!(
                code = %feed.company.code,
                "no historical prices; indicators warm up from the display bars"
            );
        }

        let series = TimeSeries::load(feed.historical, feed.prices, feed.additional_prices)?;
        let engine = IndicatorEngine::new(config.indicators.clone());
        let playback = PlaybackController::new(series, engine);
        let mut ledger = MarginLedger::new(config.initial_cash, config.margin_rate);
        ledger.mark_to_market(playback.current_price());

        info!(
            code = %feed.company.code,
            name = %feed.company.name,
            date = %feed.company.date,
            visible = playback.series().display().len(),
            pending = playback.remaining(),
            "game started"
        );

        Ok(Self {
            company: feed.company,
            visibility: config.visibility,
            config,
            playback,
            ledger,
            trades: Vec::new(),
            entry_time: None,
            ended: false,
        })
    }

    /// Reveals the next bar and marks the open position to its close.
    pub fn advance(&mut self) -> Result<&Bar, GameError> {
        if self.ended || !self.playback.step()? {
            return Err(GameError::GameFinished);
        }
        let price = self.playback.current_price();
        self.ledger.mark_to_market(price);
        Ok(self.playback.current_bar())
    }

    pub fn open_long(&mut self, quantity: u32) -> Result<&Position, GameError> {
        self.open(Side::Long, quantity)
    }

    pub fn open_short(&mut self, quantity: u32) -> Result<&Position, GameError> {
        self.open(Side::Short, quantity)
    }

    fn open(&mut self, side: Side, quantity: u32) -> Result<&Position, GameError> {
        if self.ended {
            return Err(GameError::GameFinished);
        }
        self.config.check_quantity(quantity)?;
        let price = self.playback.current_price();
        let time = self.playback.current_bar().time;
        let position = self.ledger.open(side, quantity, price)?;
        self.entry_time = Some(time);
        Ok(position)
    }

    /// Closes the open position at the current price.
    pub fn close_position(&mut self) -> Result<ClosedTrade, GameError> {
        if self.ended {
            return Err(GameError::GameFinished);
        }
        self.settle()
    }

    fn settle(&mut self) -> Result<ClosedTrade, GameError> {
        let position = self.ledger.position().cloned().ok_or(GameError::NoPosition)?;
        let bar = self.playback.current_bar();
        let (exit_price, exit_time) = (bar.close, bar.time);

        let pnl = self.ledger.close(exit_price)?;
        let trade = ClosedTrade {
            side: position.side,
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price,
            entry_time: self.entry_time.take().unwrap_or(exit_time),
            exit_time,
            pnl,
        };
        self.trades.push(trade.clone());
        Ok(trade)
    }

    /// Ends the game, settling any open position at the current price.
    /// Calling it again returns the same result.
    pub fn finish(&mut self) -> GameResult {
        if !self.ended {
            match self.settle() {
                Ok(trade) => info!(side = %trade.side, pnl = trade.pnl, "position settled at finish"),
                Err(GameError::NoPosition) => {}
                Err(e) => warn!(error = %e, "open position could not be settled"),
            }
            self.ended = true;
        }
        let result = GameResult::from_ledger(&self.ledger);
        info!(
            final_assets = result.final_assets,
            profit_loss = result.profit_loss,
            rating = result.rating,
            trades = self.trades.len(),
            "game finished"
        );
        result
    }

    pub fn toggle(&mut self, which: IndicatorToggle) -> bool {
        self.visibility.toggle(which)
    }

    pub fn render_model(&self) -> RenderModel {
        compute_render_model(
            self.playback.series(),
            self.playback.indicators(),
            &self.visibility,
        )
        .with_company(&self.company)
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.ledger.unrealized_pnl(self.current_price())
    }

    pub fn current_price(&self) -> f64 {
        self.playback.current_price()
    }

    pub fn current_bar(&self) -> &Bar {
        self.playback.current_bar()
    }

    /// True once no bar is left to reveal or the player has finished.
    pub fn is_finished(&self) -> bool {
        self.ended || self.playback.is_finished()
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ledger(&self) -> &MarginLedger {
        &self.ledger
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn trades(&self) -> &[ClosedTrade] {
        &self.trades
    }

    pub fn visibility(&self) -> &VisibilityFlags {
        &self.visibility
    }
}
