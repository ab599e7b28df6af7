//! End-to-end game tests through the public API.
//!
//! Tests cover:
//! - The three-bar trading scenario (open, step, close, finish)
//! - Feed loading through `FeedPort` and the JSON adapter
//! - Indicator warm-up with and without historical bars
//! - Rejected actions leave the session unchanged
//! - Result export and ranking persistence

mod common;

use approx::assert_relative_eq;
use common::*;
use protrade::adapters::csv_ranking_adapter::CsvRankingAdapter;
use protrade::adapters::json_feed_adapter::JsonFeedAdapter;
use protrade::domain::error::GameError;
use protrade::domain::game_config::GameConfig;
use protrade::domain::indicator::sma;
use protrade::domain::ledger::LedgerState;
use protrade::domain::playback::PlaybackState;
use protrade::domain::position::Side;
use protrade::domain::render::IndicatorToggle;
use protrade::domain::result::RankingEntry;
use protrade::domain::session::GameSession;
use protrade::ports::feed_port::FeedPort;
use protrade::ports::result_port::ResultPort;

mod trading_scenario {
    use super::*;

    #[test]
    fn open_step_close_finish() {
        let port = MockFeedPort::new(scenario_feed());
        let mut session = GameSession::start(port.fetch_feed().unwrap(), GameConfig::default())
            .unwrap();

        let pos = session.open_long(100).unwrap();
        assert_relative_eq!(pos.margin_held, 30_000.0);
        assert_relative_eq!(session.ledger().cash(), 970_000.0);
        assert_eq!(session.ledger().state(), LedgerState::Open);

        let bar = session.advance().unwrap();
        assert_eq!(bar.time, at(1, 9, 5));
        assert_relative_eq!(session.unrealized_pnl(), 1_000.0);

        let trade = session.close_position().unwrap();
        assert_relative_eq!(trade.pnl, 1_000.0);
        assert_relative_eq!(session.ledger().cash(), 1_001_000.0);
        assert_relative_eq!(session.ledger().realized_pnl(), 1_000.0);
        assert_eq!(session.ledger().state(), LedgerState::Flat);

        session.advance().unwrap();
        assert!(session.is_finished());
        assert_eq!(session.playback().state(), PlaybackState::Finished);
        assert_eq!(session.playback().remaining(), 0);

        let result = session.finish();
        assert_eq!(result.final_assets, 1_001_000);
        assert_eq!(result.profit_loss, 1_000);
        assert_eq!(result.rating, 6);
    }

    #[test]
    fn short_trade_loses_when_price_rises() {
        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        session.open_short(300).unwrap();
        session.advance().unwrap();
        assert_relative_eq!(session.unrealized_pnl(), -3_000.0);

        let trade = session.close_position().unwrap();
        assert_eq!(trade.side, Side::Short);
        assert_relative_eq!(trade.exit_price, 1010.0);
        assert_relative_eq!(session.ledger().cash(), 997_000.0);
    }

    #[test]
    fn finish_with_open_position_settles_at_current_price() {
        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        session.open_long(500).unwrap();
        session.advance().unwrap();
        session.advance().unwrap();

        let result = session.finish();
        // 500 × (1005 − 1000)
        assert_eq!(result.profit_loss, 2_500);
        assert_eq!(result.final_assets, 1_002_500);
        assert_eq!(session.trades().len(), 1);
        assert_eq!(session.trades()[0].exit_time, at(1, 9, 10));
    }

    #[test]
    fn finish_without_trading_keeps_initial_cash() {
        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        let result = session.finish();
        assert_eq!(result.final_assets, 1_000_000);
        assert_eq!(result.profit_loss, 0);
        assert_eq!(result.rating, 6);
    }
}

mod rejected_actions {
    use super::*;

    #[test]
    fn second_open_is_rejected() {
        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        session.open_long(100).unwrap();
        let before = session.ledger().clone();

        assert!(matches!(
            session.open_short(100),
            Err(GameError::PositionAlreadyOpen)
        ));
        assert_eq!(session.ledger(), &before);
    }

    #[test]
    fn close_while_flat_is_rejected() {
        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        assert!(matches!(
            session.close_position(),
            Err(GameError::NoPosition)
        ));
        assert!(session.trades().is_empty());
    }

    #[test]
    fn insufficient_margin_leaves_state_unchanged() {
        let config = GameConfig {
            initial_cash: 100_000.0,
            ..GameConfig::default()
        };
        let mut feed = scenario_feed();
        feed.prices = vec![make_bar(at(1, 9, 0), 2_000.0)];
        let mut session = GameSession::start(feed, config).unwrap();

        let err = session.open_long(500).unwrap_err();
        match err {
            GameError::InsufficientMargin {
                required,
                available,
            } => {
                assert_relative_eq!(required, 300_000.0);
                assert_relative_eq!(available, 100_000.0);
            }
            other => panic!("expected InsufficientMargin, got {other:?}"),
        }
        assert_eq!(session.ledger().state(), LedgerState::Flat);
        assert_relative_eq!(session.ledger().cash(), 100_000.0);
    }

    #[test]
    fn advance_after_last_bar_is_game_finished() {
        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        session.advance().unwrap();
        session.advance().unwrap();
        let index = session.playback().current_index();

        assert!(matches!(session.advance(), Err(GameError::GameFinished)));
        assert_eq!(session.playback().current_index(), index);
    }

    #[test]
    fn actions_after_finish_are_rejected() {
        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        session.finish();
        assert!(matches!(session.advance(), Err(GameError::GameFinished)));
        assert!(matches!(session.open_long(100), Err(GameError::GameFinished)));
        assert!(matches!(
            session.close_position(),
            Err(GameError::GameFinished)
        ));
    }
}

mod feed_loading {
    use super::*;

    #[test]
    fn failing_port_surfaces_feed_error() {
        let port = MockFeedPort::failing("no data for 2024-03-01");
        assert!(matches!(
            port.fetch_feed(),
            Err(GameError::FeedParse { .. })
        ));
    }

    #[test]
    fn json_chart_payload_starts_a_session() {
        let feed = JsonFeedAdapter::from_string(chart_json())
            .fetch_feed()
            .unwrap();
        let mut session = GameSession::start(feed, GameConfig::default()).unwrap();

        assert_eq!(session.company().code, "6758");
        assert_eq!(session.playback().series().display().len(), 3);
        assert_relative_eq!(session.current_price(), 13_120.0);

        session.advance().unwrap();
        assert_relative_eq!(session.current_price(), 13_180.0);
    }

    #[test]
    fn out_of_order_feed_is_rejected() {
        let mut feed = scenario_feed();
        feed.additional_prices.swap(0, 1);
        assert!(matches!(
            GameSession::start(feed, GameConfig::default()),
            Err(GameError::OrderViolation { .. })
        ));
    }

    #[test]
    fn pending_overlapping_display_is_rejected() {
        let mut feed = scenario_feed();
        feed.additional_prices[0].time = at(1, 9, 0);
        assert!(matches!(
            GameSession::start(feed, GameConfig::default()),
            Err(GameError::OrderViolation { index: 0, .. })
        ));
    }
}

mod indicator_warm_up {
    use super::*;

    #[test]
    fn history_fills_the_moving_average_from_the_first_display_bar() {
        let with = GameSession::start(session_feed(true), GameConfig::default()).unwrap();
        let without = GameSession::start(session_feed(false), GameConfig::default()).unwrap();

        let ma_with = with.playback().indicators().ma_long().unwrap();
        let ma_without = without.playback().indicators().ma_long().unwrap();

        assert_eq!(ma_with.len(), with.playback().series().display().len());
        assert_eq!(ma_with.defined_count(), ma_with.len());
        assert_eq!(ma_without.defined_count(), 0);
    }

    #[test]
    fn aligned_values_match_full_series_sma() {
        let session = GameSession::start(session_feed(true), GameConfig::default()).unwrap();
        let series = session.playback().series();
        let offset = series.historical().len();
        let full = sma(&series.full_closes(), 5);

        let aligned = session.playback().indicators().ma_short().unwrap();
        for (j, point) in aligned.values.iter().enumerate() {
            assert_eq!(point.time, series.display()[j].time);
        }
        assert_eq!(aligned.simple_values(), full[offset..].to_vec());
    }

    #[test]
    fn each_step_extends_every_indicator() {
        let mut session = GameSession::start(session_feed(false), GameConfig::default()).unwrap();
        let before = session.playback().series().display().len();
        session.advance().unwrap();

        let set = session.playback().indicators();
        for s in [
            set.ma_short(),
            set.ma_long(),
            set.bollinger_bands(),
            set.macd(),
            set.rsi(),
            set.rci_short(),
            set.rci_long(),
        ] {
            assert_eq!(s.unwrap().len(), before + 1);
        }
    }

    #[test]
    fn render_model_tracks_toggles() {
        let mut session = GameSession::start(session_feed(true), GameConfig::default()).unwrap();
        session.toggle(IndicatorToggle::Macd);
        session.toggle(IndicatorToggle::Rci);

        let model = session.render_model();
        let names: Vec<&str> = model.overlays.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["MA5", "MA25", "MACD", "RCI"]);
        assert_eq!(model.times.len(), model.candles.len());
    }

    #[test]
    fn previous_session_close_is_flagged() {
        let mut feed = session_feed(false);
        feed.additional_prices.clear();
        let last = feed.prices.pop().unwrap();
        assert_eq!(last.time, at(4, 9, 0));

        let session = GameSession::start(feed, GameConfig::default()).unwrap();
        assert_eq!(session.render_model().current_time, "15:30");
        assert!(session.render_model().at_market_close);
    }
}

mod result_export {
    use super::*;

    #[test]
    fn finished_game_is_saved_to_ranking() {
        let dir = tempfile::TempDir::new().unwrap();
        let board = CsvRankingAdapter::new(dir.path().join("rankings.csv"));

        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        session.open_long(100).unwrap();
        session.advance().unwrap();
        let result = session.finish();

        let entry = RankingEntry::new("yamada", Some("yamada_trade"), result).unwrap();
        board.save(&entry).unwrap();

        let saved = board.read_entries().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].result.final_assets, 1_001_000);
        assert_eq!(saved[0].twitter_username.as_deref(), Some("yamada_trade"));
    }

    #[test]
    fn invalid_player_is_not_saved() {
        let mut session = GameSession::start(scenario_feed(), GameConfig::default()).unwrap();
        let result = session.finish();
        assert!(matches!(
            RankingEntry::new("", None, result),
            Err(GameError::InvalidPlayer { .. })
        ));
    }
}
