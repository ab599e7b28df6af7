//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_ranking_adapter::{CsvRankingAdapter, LEADERBOARD_LIMIT};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_feed_adapter::JsonFeedAdapter;
use crate::domain::config_validation::validate_game_config;
use crate::domain::error::GameError;
use crate::domain::feed::GameFeed;
use crate::domain::game_config::{
    GameConfig, IndicatorSettings, DEFAULT_INITIAL_CASH, DEFAULT_LOT_SIZE, DEFAULT_MARGIN_RATE,
    DEFAULT_MAX_LOTS,
};
use crate::domain::ledger::rating;
use crate::domain::render::{IndicatorToggle, VisibilityFlags};
use crate::domain::result::{GameResult, RankingEntry};
use crate::domain::session::GameSession;
use crate::ports::config_port::ConfigPort;
use crate::ports::feed_port::FeedPort;
use crate::ports::result_port::ResultPort;

#[derive(Parser, Debug)]
#[command(name = "protrade", about = "Intraday stock trading replay game")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one session from a chart feed
    Play {
        #[arg(short, long)]
        feed: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Read actions from a file instead of stdin
        #[arg(short, long)]
        script: Option<PathBuf>,
        #[arg(short, long)]
        username: Option<String>,
        /// X (Twitter) handle shown on the leaderboard
        #[arg(long)]
        twitter: Option<String>,
        /// Leaderboard CSV; overrides [ranking] path
        #[arg(short, long)]
        ranking: Option<PathBuf>,
    },
    /// Show what a chart feed contains
    Info {
        #[arg(short, long)]
        feed: PathBuf,
    },
    /// Validate a game configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the leaderboard: each player's best game
    Ranking {
        #[arg(short, long)]
        ranking: PathBuf,
        #[arg(short, long, default_value_t = LEADERBOARD_LIMIT)]
        limit: usize,
    },
    /// Print the 1-10 rating for a profit/loss
    Rating {
        #[arg(long, allow_hyphen_values = true)]
        profit_loss: i64,
        #[arg(long, default_value_t = DEFAULT_INITIAL_CASH as i64)]
        initial_cash: i64,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Play {
            feed,
            config,
            script,
            username,
            twitter,
            ranking,
        } => run_play(&PlayOptions {
            feed,
            config,
            script,
            username,
            twitter,
            ranking,
        }),
        Command::Info { feed } => run_info(&feed),
        Command::Validate { config } => run_validate(&config),
        Command::Ranking { ranking, limit } => run_ranking(ranking, limit),
        Command::Rating {
            profit_loss,
            initial_cash,
        } => run_rating(profit_loss, initial_cash),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Validates the settings and assembles a [`GameConfig`]. Absent keys take
/// the defaults: 1,000,000 cash, 30% margin, 100-share lots up to 5 lots.
pub fn build_game_config(adapter: &dyn ConfigPort) -> Result<GameConfig, GameError> {
    validate_game_config(adapter)?;

    let defaults = IndicatorSettings::default();
    let period = |key: &str, default: usize| -> usize {
        adapter.get_int("indicators", key, default as i64) as usize
    };
    let indicators = IndicatorSettings {
        ma_short: period("ma_short", defaults.ma_short),
        ma_long: period("ma_long", defaults.ma_long),
        bollinger_period: period("bollinger_period", defaults.bollinger_period),
        macd_fast: period("macd_fast", defaults.macd_fast),
        macd_slow: period("macd_slow", defaults.macd_slow),
        macd_signal: period("macd_signal", defaults.macd_signal),
        rsi_period: period("rsi_period", defaults.rsi_period),
        rci_short: period("rci_short", defaults.rci_short),
        rci_long: period("rci_long", defaults.rci_long),
    };

    let shown = VisibilityFlags::default();
    let flag = |key: &str, default: bool| adapter.get_bool("display", key, default);
    let visibility = VisibilityFlags {
        indicators: flag("indicators", shown.indicators),
        ma_short: flag("ma_short", shown.ma_short),
        ma_long: flag("ma_long", shown.ma_long),
        bollinger: flag("bollinger", shown.bollinger),
        macd: flag("macd", shown.macd),
        rsi: flag("rsi", shown.rsi),
        rci: flag("rci", shown.rci),
    };

    Ok(GameConfig {
        initial_cash: adapter.get_double("game", "initial_cash", DEFAULT_INITIAL_CASH),
        margin_rate: adapter.get_double("game", "margin_rate", DEFAULT_MARGIN_RATE),
        lot_size: adapter.get_int("game", "lot_size", i64::from(DEFAULT_LOT_SIZE)) as u32,
        max_lots: adapter.get_int("game", "max_lots", i64::from(DEFAULT_MAX_LOTS)) as u32,
        indicators,
        visibility,
    })
}

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Next,
    Buy(u32),
    Sell(u32),
    Close,
    Status,
    Toggle(IndicatorToggle),
    Render,
    Finish,
    Quit,
}

/// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_action(line: &str) -> Result<Option<PlayerAction>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let arg = words.next();
    if let Some(extra) = words.next() {
        return Err(format!("unexpected argument '{extra}'"));
    }

    let quantity = |arg: Option<&str>| -> Result<u32, String> {
        let arg = arg.ok_or_else(|| format!("{verb} needs a quantity"))?;
        arg.parse()
            .map_err(|_| format!("invalid quantity '{arg}'"))
    };

    let action = match verb.as_str() {
        "next" | "n" => PlayerAction::Next,
        "buy" | "long" => PlayerAction::Buy(quantity(arg)?),
        "sell" | "short" => PlayerAction::Sell(quantity(arg)?),
        "close" => PlayerAction::Close,
        "status" => PlayerAction::Status,
        "toggle" => {
            let which = arg.ok_or_else(|| "toggle needs an indicator".to_string())?;
            PlayerAction::Toggle(which.parse()?)
        }
        "render" => PlayerAction::Render,
        "finish" => PlayerAction::Finish,
        "quit" | "exit" => PlayerAction::Quit,
        other => return Err(format!("unknown action '{other}'")),
    };
    Ok(Some(action))
}

/// How a scripted or interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Finished(GameResult),
    Quit,
}

/// Applies actions read from `input` until `finish`, `quit` or end of input.
/// End of input finishes the game. Rejected actions are reported on `out`
/// and leave the session unchanged.
pub fn run_actions<R: BufRead, W: Write>(
    session: &mut GameSession,
    input: R,
    out: &mut W,
) -> Result<PlayOutcome, GameError> {
    for line in input.lines() {
        let action = match parse_action(&line?) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(reason) => {
                writeln!(out, "rejected: {reason}")?;
                continue;
            }
        };

        match action {
            PlayerAction::Finish => return finish(session, out),
            PlayerAction::Quit => {
                writeln!(out, "quit without finishing")?;
                return Ok(PlayOutcome::Quit);
            }
            other => {
                if let Err(err) = apply(session, other, out) {
                    if !err.is_rejection() {
                        return Err(err);
                    }
                    writeln!(out, "rejected: {err}")?;
                }
            }
        }
    }
    finish(session, out)
}

fn apply<W: Write>(
    session: &mut GameSession,
    action: PlayerAction,
    out: &mut W,
) -> Result<(), GameError> {
    match action {
        PlayerAction::Next => {
            let bar = session.advance()?;
            writeln!(
                out,
                "{} o={} h={} l={} c={} v={}",
                bar.time_label(),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            )?;
            if session.render_model().at_market_close {
                writeln!(out, "market closed")?;
            }
        }
        PlayerAction::Buy(quantity) => {
            let p = session.open_long(quantity)?;
            writeln!(
                out,
                "opened {} {} @ {} (margin {:.0})",
                p.side, p.quantity, p.entry_price, p.margin_held
            )?;
        }
        PlayerAction::Sell(quantity) => {
            let p = session.open_short(quantity)?;
            writeln!(
                out,
                "opened {} {} @ {} (margin {:.0})",
                p.side, p.quantity, p.entry_price, p.margin_held
            )?;
        }
        PlayerAction::Close => {
            let trade = session.close_position()?;
            writeln!(
                out,
                "closed {} {} @ {} pnl {:+.0}",
                trade.side, trade.quantity, trade.exit_price, trade.pnl
            )?;
        }
        PlayerAction::Status => write_status(session, out)?,
        PlayerAction::Toggle(which) => {
            let on = session.toggle(which);
            writeln!(out, "{:?}: {}", which, if on { "on" } else { "off" })?;
        }
        PlayerAction::Render => {
            let json = serde_json::to_string(&session.render_model()).map_err(|e| {
                GameError::Io(io::Error::new(io::ErrorKind::InvalidData, e))
            })?;
            writeln!(out, "{json}")?;
        }
        PlayerAction::Finish | PlayerAction::Quit => {}
    }
    Ok(())
}

fn write_status<W: Write>(session: &GameSession, out: &mut W) -> Result<(), GameError> {
    let bar = session.current_bar();
    let ledger = session.ledger();
    writeln!(
        out,
        "{} {} {} price={}",
        session.company().code,
        session.company().date,
        bar.time_label(),
        bar.close
    )?;
    match ledger.position() {
        Some(p) => writeln!(
            out,
            "position: {} {} @ {} unrealized {:+.0} value {:.0}",
            p.side,
            p.quantity,
            p.entry_price,
            session.unrealized_pnl(),
            p.market_value(session.current_price())
        )?,
        None => writeln!(out, "position: none")?,
    }
    writeln!(
        out,
        "cash={:.0} equity={:.0} realized={:+.0} remaining={}",
        ledger.cash(),
        ledger.equity(session.current_price()),
        ledger.realized_pnl(),
        session.playback().remaining()
    )?;
    Ok(())
}

fn finish<W: Write>(session: &mut GameSession, out: &mut W) -> Result<PlayOutcome, GameError> {
    let result = session.finish();
    writeln!(out, "final assets: {}", result.final_assets)?;
    writeln!(out, "profit/loss: {:+}", result.profit_loss)?;
    writeln!(out, "rating: {}/10", result.rating)?;
    Ok(PlayOutcome::Finished(result))
}

struct PlayOptions {
    feed: PathBuf,
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    username: Option<String>,
    twitter: Option<String>,
    ranking: Option<PathBuf>,
}

fn run_play(opts: &PlayOptions) -> ExitCode {
    let adapter = match opts.config.as_deref().map(load_config).transpose() {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match adapter.as_ref().map(|a| build_game_config(a)).transpose() {
        Ok(c) => c.unwrap_or_default(),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let ranking_path = opts.ranking.clone().or_else(|| {
        adapter
            .as_ref()
            .and_then(|a| a.get_string("ranking", "path"))
            .map(PathBuf::from)
    });

    // Reject a bad player name before the session starts.
    if let Some(name) = opts.username.as_deref() {
        let probe = GameResult {
            final_assets: 0,
            profit_loss: 0,
            rating: 1,
        };
        if let Err(e) = RankingEntry::new(name, opts.twitter.as_deref(), probe) {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let feed = match load_feed(&opts.feed) {
        Ok(f) => f,
        Err(code) => return code,
    };
    let mut session = match GameSession::start(feed, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = match &opts.script {
        Some(path) => match File::open(path) {
            Ok(file) => run_actions(&mut session, BufReader::new(file), &mut out),
            Err(e) => {
                eprintln!("error: failed to open {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        },
        None => run_actions(&mut session, io::stdin().lock(), &mut out),
    };

    let result = match outcome {
        Ok(PlayOutcome::Finished(result)) => result,
        Ok(PlayOutcome::Quit) => return ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match (opts.username.as_deref(), ranking_path) {
        (Some(name), Some(path)) => {
            let saved = RankingEntry::new(name, opts.twitter.as_deref(), result)
                .and_then(|entry| CsvRankingAdapter::new(path.clone()).save(&entry));
            if let Err(e) = saved {
                eprintln!("error: {e}");
                return (&e).into();
            }
            info!(path = %path.display(), "result saved to ranking");
        }
        (Some(_), None) => warn!("no ranking path configured; result not saved"),
        _ => {}
    }
    ExitCode::SUCCESS
}

fn load_feed(path: &Path) -> Result<GameFeed, ExitCode> {
    JsonFeedAdapter::from_file(path).fetch_feed().map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_info(feed_path: &Path) -> ExitCode {
    let feed = match load_feed(feed_path) {
        Ok(f) => f,
        Err(code) => return code,
    };

    println!("Company:    {} {}", feed.company.code, feed.company.name);
    println!("Date:       {}", feed.company.date);
    println!("Historical: {} bars", feed.historical.len());
    println!("Display:    {} bars", feed.prices.len());
    println!("Pending:    {} bars", feed.additional_prices.len());

    let first = feed.historical.first().or(feed.prices.first());
    let last = feed
        .additional_prices
        .last()
        .or(feed.prices.last())
        .or(feed.historical.last());
    match (first, last) {
        (Some(first), Some(last)) => println!("Range:      {} .. {}", first.time, last.time),
        _ => println!("Range:      (no bars)"),
    }
    ExitCode::SUCCESS
}

/// One line per leaderboard row, e.g. ` 1. alice (@alice_fx) 1020000 +20000 7/10`.
pub fn write_leaderboard<W: Write>(entries: &[RankingEntry], out: &mut W) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "no rankings yet");
    }
    for (rank, entry) in entries.iter().enumerate() {
        let handle = entry
            .twitter_username
            .as_deref()
            .map(|h| format!(" (@{h})"))
            .unwrap_or_default();
        writeln!(
            out,
            "{:>2}. {}{} {} {:+} {}/10",
            rank + 1,
            entry.username,
            handle,
            entry.result.final_assets,
            entry.result.profit_loss,
            entry.result.rating
        )?;
    }
    Ok(())
}

fn run_ranking(path: PathBuf, limit: usize) -> ExitCode {
    let entries = match CsvRankingAdapter::new(path).top(limit) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = write_leaderboard(&entries, &mut io::stdout().lock()) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match build_game_config(&adapter) {
        Ok(config) => {
            eprintln!(
                "  cash={} margin={} lot_size={} max_quantity={}",
                config.initial_cash,
                config.margin_rate,
                config.lot_size,
                config.max_quantity()
            );
            eprintln!("\nGame configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_rating(profit_loss: i64, initial_cash: i64) -> ExitCode {
    if initial_cash <= 0 {
        let err = GameError::ConfigInvalid {
            section: "game".into(),
            key: "initial_cash".into(),
            reason: "initial_cash must be positive".into(),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }
    println!("{}", rating(profit_loss as f64, initial_cash as f64));
    ExitCode::SUCCESS
}
