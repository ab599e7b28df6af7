//! Presentation snapshot handed to whatever draws the chart.
//!
//! `compute_render_model` is rebuilt from scratch after every step; the
//! renderer keeps no game state of its own.

use crate::domain::bar::Bar;
use crate::domain::feed::Company;
use crate::domain::indicator::{IndicatorSeries, IndicatorValue};
use crate::domain::indicator_engine::IndicatorSet;
use crate::domain::time_series::TimeSeries;
use chrono::Timelike;
use serde::Serialize;
use std::str::FromStr;

/// Wall-clock time of the last 5-minute bar of the session.
pub const MARKET_CLOSE: (u32, u32) = (15, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibilityFlags {
    /// Master switch; when off no overlay is drawn.
    pub indicators: bool,
    pub ma_short: bool,
    pub ma_long: bool,
    pub bollinger: bool,
    pub macd: bool,
    pub rsi: bool,
    pub rci: bool,
}

impl Default for VisibilityFlags {
    fn default() -> Self {
        Self {
            indicators: true,
            ma_short: true,
            ma_long: true,
            bollinger: false,
            macd: false,
            rsi: false,
            rci: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorToggle {
    All,
    MaShort,
    MaLong,
    Bollinger,
    Macd,
    Rsi,
    Rci,
}

impl FromStr for IndicatorToggle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "indicators" => Ok(Self::All),
            "ma5" | "ma_short" => Ok(Self::MaShort),
            "ma25" | "ma_long" => Ok(Self::MaLong),
            "bb" | "bollinger" => Ok(Self::Bollinger),
            "macd" => Ok(Self::Macd),
            "rsi" => Ok(Self::Rsi),
            "rci" => Ok(Self::Rci),
            other => Err(format!("unknown indicator '{other}'")),
        }
    }
}

impl VisibilityFlags {
    /// Flips one flag and returns its new value.
    pub fn toggle(&mut self, which: IndicatorToggle) -> bool {
        let flag = match which {
            IndicatorToggle::All => &mut self.indicators,
            IndicatorToggle::MaShort => &mut self.ma_short,
            IndicatorToggle::MaLong => &mut self.ma_long,
            IndicatorToggle::Bollinger => &mut self.bollinger,
            IndicatorToggle::Macd => &mut self.macd,
            IndicatorToggle::Rsi => &mut self.rsi,
            IndicatorToggle::Rci => &mut self.rci,
        };
        *flag = !*flag;
        *flag
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    Price,
    Macd,
    Rsi,
    Rci,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub name: String,
    /// `None` serializes as `null`: no value, not zero.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub name: String,
    pub pane: Pane,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    pub times: Vec<String>,
    /// `[open, close, low, high]` per bar.
    pub candles: Vec<[f64; 4]>,
    pub volumes: Vec<i64>,
    pub current_time: String,
    pub current_price: f64,
    /// True only when the current bar is stamped exactly 15:30.
    pub at_market_close: bool,
    pub overlays: Vec<Overlay>,
}

impl RenderModel {
    pub fn with_company(mut self, company: &Company) -> Self {
        self.company = Some(company.clone());
        self
    }
}

pub fn compute_render_model(
    series: &TimeSeries,
    indicators: &IndicatorSet,
    flags: &VisibilityFlags,
) -> RenderModel {
    let display = series.display();
    let current = series.last();

    RenderModel {
        company: None,
        times: display.iter().map(Bar::time_label).collect(),
        candles: display
            .iter()
            .map(|b| [b.open, b.close, b.low, b.high])
            .collect(),
        volumes: display.iter().map(|b| b.volume).collect(),
        current_time: current.map(Bar::time_label).unwrap_or_default(),
        current_price: current.map_or(0.0, |b| b.close),
        at_market_close: current.is_some_and(|b| {
            (b.time.hour(), b.time.minute()) == MARKET_CLOSE
        }),
        overlays: build_overlays(indicators, flags),
    }
}

fn build_overlays(indicators: &IndicatorSet, flags: &VisibilityFlags) -> Vec<Overlay> {
    let mut overlays = Vec::new();
    if !flags.indicators {
        return overlays;
    }
    let settings = indicators.settings();

    if flags.ma_short {
        if let Some(s) = indicators.ma_short() {
            overlays.push(single_line(
                format!("MA{}", settings.ma_short),
                Pane::Price,
                s,
            ));
        }
    }
    if flags.ma_long {
        if let Some(s) = indicators.ma_long() {
            overlays.push(single_line(
                format!("MA{}", settings.ma_long),
                Pane::Price,
                s,
            ));
        }
    }
    if flags.bollinger {
        if let Some(s) = indicators.bollinger_bands() {
            overlays.push(bollinger_overlay(s));
        }
    }
    if flags.macd {
        if let Some(s) = indicators.macd() {
            overlays.push(macd_overlay(s));
        }
    }
    if flags.rsi {
        if let Some(s) = indicators.rsi() {
            overlays.push(single_line(
                format!("RSI{}", settings.rsi_period),
                Pane::Rsi,
                s,
            ));
        }
    }
    if flags.rci {
        let lines: Vec<Line> = [
            (settings.rci_short, indicators.rci_short()),
            (settings.rci_long, indicators.rci_long()),
        ]
        .into_iter()
        .filter_map(|(period, s)| {
            s.map(|s| Line {
                name: format!("RCI{}", period),
                values: s.simple_values(),
            })
        })
        .collect();
        overlays.push(Overlay {
            name: "RCI".into(),
            pane: Pane::Rci,
            lines,
        });
    }

    overlays
}

fn single_line(name: String, pane: Pane, series: &IndicatorSeries) -> Overlay {
    Overlay {
        lines: vec![Line {
            name: name.clone(),
            values: series.simple_values(),
        }],
        name,
        pane,
    }
}

fn extract_lines<const N: usize>(
    series: &IndicatorSeries,
    names: [&str; N],
    pick: impl Fn(&IndicatorValue) -> Option<[f64; N]>,
) -> Vec<Line> {
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(series.len()); N];
    for point in &series.values {
        let row = point.value.as_ref().and_then(&pick);
        for (k, column) in columns.iter_mut().enumerate() {
            column.push(row.map(|r| r[k]));
        }
    }
    names
        .iter()
        .zip(columns)
        .map(|(name, values)| Line {
            name: name.to_string(),
            values,
        })
        .collect()
}

fn bollinger_overlay(series: &IndicatorSeries) -> Overlay {
    let lines = extract_lines(
        series,
        ["+2σ", "+1σ", "middle", "-1σ", "-2σ"],
        |v| match *v {
            IndicatorValue::BollingerBands {
                upper2,
                upper1,
                middle,
                lower1,
                lower2,
            } => Some([upper2, upper1, middle, lower1, lower2]),
            _ => None,
        },
    );
    Overlay {
        name: "BB".into(),
        pane: Pane::Price,
        lines,
    }
}

fn macd_overlay(series: &IndicatorSeries) -> Overlay {
    let lines = extract_lines(series, ["MACD", "signal", "histogram"], |v| match *v {
        IndicatorValue::Macd {
            line,
            signal,
            histogram,
        } => Some([line, signal, histogram]),
        _ => None,
    });
    Overlay {
        name: "MACD".into(),
        pane: Pane::Macd,
        lines,
    }
}
