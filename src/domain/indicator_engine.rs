//! Full-series indicator recompute with display alignment.
//!
//! Every recompute runs over `historical ++ display` and then drops the
//! historical prefix, so point `j` of each output series belongs to
//! `display[j]` even when its lookback reached into warm-up bars.

use crate::domain::bar::Bar;
use crate::domain::game_config::IndicatorSettings;
use crate::domain::indicator::{
    bollinger, bollinger_two_band, ema, macd, rci, rsi, sma, IndicatorPoint, IndicatorSeries,
    IndicatorType, IndicatorValue,
};
use crate::domain::indicator::macd::first_surfaced_index;
use crate::domain::time_series::TimeSeries;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    settings: IndicatorSettings,
}

/// Display-aligned results of one recompute.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    settings: IndicatorSettings,
    series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorEngine {
    pub fn new(settings: IndicatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        let s = &self.settings;
        vec![
            IndicatorType::Sma(s.ma_short),
            IndicatorType::Sma(s.ma_long),
            IndicatorType::BollingerBands {
                period: s.bollinger_period,
            },
            IndicatorType::Macd {
                fast: s.macd_fast,
                slow: s.macd_slow,
                signal: s.macd_signal,
            },
            IndicatorType::Rsi(s.rsi_period),
            IndicatorType::Rci(s.rci_short),
            IndicatorType::Rci(s.rci_long),
        ]
    }

    pub fn recompute(&self, series: &TimeSeries) -> IndicatorSet {
        let full = series.full_closes();
        let offset = series.display_offset();
        let shown = series.display();

        let computed: HashMap<IndicatorType, IndicatorSeries> = self
            .indicator_types()
            .into_iter()
            .map(|t| {
                let s = compute_aligned(&full, offset, shown, &t);
                (t, s)
            })
            .collect();

        debug!(
            bars = full.len(),
            visible = shown.len(),
            indicators = computed.len(),
            "indicators recomputed"
        );

        IndicatorSet {
            settings: self.settings.clone(),
            series: computed,
        }
    }
}

/// Computes one indicator over `full` closes and keeps the display window.
pub fn compute_aligned(
    full: &[f64],
    offset: usize,
    display: &[Bar],
    indicator_type: &IndicatorType,
) -> IndicatorSeries {
    let raw = compute_raw(full, offset, indicator_type);

    let values = display
        .iter()
        .zip(raw.into_iter().skip(offset))
        .map(|(bar, value)| IndicatorPoint {
            time: bar.time,
            value,
        })
        .collect();

    IndicatorSeries {
        indicator_type: indicator_type.clone(),
        values,
    }
}

fn simple(values: Vec<Option<f64>>) -> Vec<Option<IndicatorValue>> {
    values
        .into_iter()
        .map(|v| v.map(IndicatorValue::Simple))
        .collect()
}

/// MACD counts its `slow - 1` lookback in display bars only, so warm-up
/// bars never surface a MACD point.
fn compute_raw(
    full: &[f64],
    offset: usize,
    indicator_type: &IndicatorType,
) -> Vec<Option<IndicatorValue>> {
    match indicator_type {
        IndicatorType::Sma(period) => simple(sma(full, *period)),
        IndicatorType::Rsi(period) => simple(rsi(full, *period)),
        IndicatorType::Rci(period) => simple(rci(full, *period)),
        IndicatorType::Ema(period) => {
            let values = ema(full, *period);
            if values.is_empty() {
                vec![None; full.len()]
            } else {
                values
                    .into_iter()
                    .map(|v| Some(IndicatorValue::Simple(v)))
                    .collect()
            }
        }
        IndicatorType::Macd { fast, slow, signal } => {
            let points = macd(full, *fast, *slow, *signal);
            let first = offset + first_surfaced_index(*slow);
            (0..full.len())
                .map(|i| {
                    if i < first {
                        return None;
                    }
                    points.get(i).map(|p| IndicatorValue::Macd {
                        line: p.line,
                        signal: p.signal,
                        histogram: p.histogram,
                    })
                })
                .collect()
        }
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => bollinger(full, *period, *stddev_mult_x100 as f64 / 100.0)
            .into_iter()
            .map(|b| {
                b.map(|b| IndicatorValue::Bollinger {
                    upper: b.upper,
                    middle: b.middle,
                    lower: b.lower,
                })
            })
            .collect(),
        IndicatorType::BollingerBands { period } => bollinger_two_band(full, *period)
            .into_iter()
            .map(|b| {
                b.map(|b| IndicatorValue::BollingerBands {
                    upper2: b.upper2,
                    upper1: b.upper1,
                    middle: b.middle,
                    lower1: b.lower1,
                    lower2: b.lower2,
                })
            })
            .collect(),
    }
}

impl IndicatorSet {
    pub fn get(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.series.get(indicator_type)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn ma_short(&self) -> Option<&IndicatorSeries> {
        self.get(&IndicatorType::Sma(self.settings.ma_short))
    }

    pub fn ma_long(&self) -> Option<&IndicatorSeries> {
        self.get(&IndicatorType::Sma(self.settings.ma_long))
    }

    pub fn bollinger_bands(&self) -> Option<&IndicatorSeries> {
        self.get(&IndicatorType::BollingerBands {
            period: self.settings.bollinger_period,
        })
    }

    pub fn macd(&self) -> Option<&IndicatorSeries> {
        self.get(&IndicatorType::Macd {
            fast: self.settings.macd_fast,
            slow: self.settings.macd_slow,
            signal: self.settings.macd_signal,
        })
    }

    pub fn rsi(&self) -> Option<&IndicatorSeries> {
        self.get(&IndicatorType::Rsi(self.settings.rsi_period))
    }

    pub fn rci_short(&self) -> Option<&IndicatorSeries> {
        self.get(&IndicatorType::Rci(self.settings.rci_short))
    }

    pub fn rci_long(&self) -> Option<&IndicatorSeries> {
        self.get(&IndicatorType::Rci(self.settings.rci_long))
    }
}
