//! Configuration validation.
//!
//! Validates every game and indicator setting before a session starts.
//! Absent keys are checked at their default values.

use crate::domain::error::GameError;
use crate::domain::game_config::{
    IndicatorSettings, DEFAULT_INITIAL_CASH, DEFAULT_LOT_SIZE, DEFAULT_MARGIN_RATE,
    DEFAULT_MAX_LOTS,
};
use crate::ports::config_port::ConfigPort;

pub fn validate_game_config(config: &dyn ConfigPort) -> Result<(), GameError> {
    validate_initial_cash(config)?;
    validate_margin_rate(config)?;
    validate_lots(config)?;
    validate_indicator_periods(config)?;
    validate_macd_order(config)?;
    validate_ranking_path(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> GameError {
    GameError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), GameError> {
    let value = config.get_double("game", "initial_cash", DEFAULT_INITIAL_CASH);
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid("game", "initial_cash", "initial_cash must be positive"));
    }
    Ok(())
}

fn validate_margin_rate(config: &dyn ConfigPort) -> Result<(), GameError> {
    let value = config.get_double("game", "margin_rate", DEFAULT_MARGIN_RATE);
    if value <= 0.0 || value > 1.0 || value.is_nan() {
        return Err(invalid(
            "game",
            "margin_rate",
            "margin_rate must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_lots(config: &dyn ConfigPort) -> Result<(), GameError> {
    let mut values = [0u32; 2];
    for (slot, (key, default)) in values
        .iter_mut()
        .zip([("lot_size", DEFAULT_LOT_SIZE), ("max_lots", DEFAULT_MAX_LOTS)])
    {
        let value = config.get_int("game", key, i64::from(default));
        *slot = u32::try_from(value)
            .ok()
            .filter(|v| *v >= 1)
            .ok_or_else(|| invalid("game", key, format!("{} must be at least 1", key)))?;
    }

    let [lot_size, max_lots] = values;
    if lot_size.checked_mul(max_lots).is_none() {
        return Err(invalid(
            "game",
            "max_lots",
            format!("lot_size * max_lots must not exceed {}", u32::MAX),
        ));
    }
    Ok(())
}

fn validate_indicator_periods(config: &dyn ConfigPort) -> Result<(), GameError> {
    let defaults = IndicatorSettings::default();
    let periods = [
        ("ma_short", defaults.ma_short),
        ("ma_long", defaults.ma_long),
        ("bollinger_period", defaults.bollinger_period),
        ("macd_fast", defaults.macd_fast),
        ("macd_slow", defaults.macd_slow),
        ("macd_signal", defaults.macd_signal),
        ("rsi_period", defaults.rsi_period),
        ("rci_short", defaults.rci_short),
        ("rci_long", defaults.rci_long),
    ];
    for (key, default) in periods {
        let value = config.get_int("indicators", key, default as i64);
        if value < 1 {
            return Err(invalid(
                "indicators",
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }
    Ok(())
}

fn validate_macd_order(config: &dyn ConfigPort) -> Result<(), GameError> {
    let defaults = IndicatorSettings::default();
    let fast = config.get_int("indicators", "macd_fast", defaults.macd_fast as i64);
    let slow = config.get_int("indicators", "macd_slow", defaults.macd_slow as i64);
    if fast >= slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

fn validate_ranking_path(config: &dyn ConfigPort) -> Result<(), GameError> {
    match config.get_string("ranking", "path") {
        Some(p) if p.trim().is_empty() => Err(invalid(
            "ranking",
            "path",
            "path must not be empty when given",
        )),
        _ => Ok(()),
    }
}
