use crate::config::StrategyParams;
use crate::data::NO_FEAR_DATA;
use crate::engine::reasons::EntryReason;
use serde::{Deserialize, Serialize};

pub const REGIME_COUNT: usize = 3;

//market regime selected once per day from the fear index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    Standard,
    FearHigh,
    FearLow,
}

impl Regime {
    pub fn index(self) -> usize {
        match self {
            Regime::Standard => 0,
            Regime::FearHigh => 1,
            Regime::FearLow => 2,
        }
    }
}

//percentage move over a lookback window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub value: f64,
    pub period: usize,
}

impl Trigger {
    pub fn new(value: f64, period: usize) -> Self {
        Trigger { value, period }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeverageProfile {
    pub breakout: f64,
    pub reentry: f64,
    pub sp: f64,
}

impl LeverageProfile {
    pub fn for_entry(&self, reason: EntryReason) -> f64 {
        if reason.is_sp() {
            self.sp
        } else if reason.is_breakout() {
            self.breakout
        } else {
            self.reentry
        }
    }
}

//thresholds and leverage in effect for one day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeProfile {
    pub breakout_entry: Trigger,
    pub breakout_exit: Trigger,
    pub long_breakout_entry: Trigger,
    pub long_breakout_exit: Trigger,
    pub reentry: Trigger,
    pub reentry_2: Trigger,
    pub leverage: LeverageProfile,
}

//the three profiles, resolved once per kernel invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeProfiles {
    standard: RegimeProfile,
    fear_high: RegimeProfile,
    fear_low: RegimeProfile,
}

impl RegimeProfiles {
    pub fn resolve(p: &StrategyParams) -> Self {
        RegimeProfiles {
            standard: RegimeProfile {
                breakout_entry: Trigger::new(p.btc_entry_trigger_value, p.btc_entry_trigger_period),
                breakout_exit: Trigger::new(p.btc_exit_trigger_value, p.btc_exit_trigger_period),
                long_breakout_entry: Trigger::new(
                    p.btc_entry_long_trigger_value,
                    p.btc_entry_long_trigger_period,
                ),
                long_breakout_exit: Trigger::new(
                    p.btc_exit_long_trigger_value,
                    p.btc_exit_long_trigger_period,
                ),
                reentry: Trigger::new(p.reentry_pct_values, p.reentry_window_values),
                reentry_2: Trigger::new(p.reentry_pct_values_2, p.reentry_window_values_2),
                leverage: LeverageProfile {
                    breakout: p.leverage_btc,
                    reentry: p.leverage_reentry,
                    sp: p.leverage_sp,
                },
            },
            fear_high: RegimeProfile {
                breakout_entry: Trigger::new(
                    p.fear_high_btc_entry_trigger_value,
                    p.fear_high_btc_entry_trigger_period,
                ),
                breakout_exit: Trigger::new(
                    p.fear_high_btc_exit_trigger_value,
                    p.fear_high_btc_exit_trigger_period,
                ),
                long_breakout_entry: Trigger::new(
                    p.fear_high_btc_entry_long_trigger_value,
                    p.fear_high_btc_entry_long_trigger_period,
                ),
                long_breakout_exit: Trigger::new(
                    p.fear_high_btc_exit_long_trigger_value,
                    p.fear_high_btc_exit_long_trigger_period,
                ),
                reentry: Trigger::new(
                    p.fear_high_reentry_pct_values,
                    p.fear_high_reentry_window_values,
                ),
                reentry_2: Trigger::new(
                    p.fear_high_reentry_pct_values_2,
                    p.fear_high_reentry_window_values_2,
                ),
                leverage: LeverageProfile {
                    breakout: p.fear_high_leverage_btc,
                    reentry: p.fear_high_leverage_reentry,
                    sp: p.fear_high_leverage_sp,
                },
            },
            fear_low: RegimeProfile {
                breakout_entry: Trigger::new(
                    p.fear_low_btc_entry_trigger_value,
                    p.fear_low_btc_entry_trigger_period,
                ),
                breakout_exit: Trigger::new(
                    p.fear_low_btc_exit_trigger_value,
                    p.fear_low_btc_exit_trigger_period,
                ),
                long_breakout_entry: Trigger::new(
                    p.fear_low_btc_entry_long_trigger_value,
                    p.fear_low_btc_entry_long_trigger_period,
                ),
                long_breakout_exit: Trigger::new(
                    p.fear_low_btc_exit_long_trigger_value,
                    p.fear_low_btc_exit_long_trigger_period,
                ),
                reentry: Trigger::new(
                    p.fear_low_reentry_pct_values,
                    p.fear_low_reentry_window_values,
                ),
                reentry_2: Trigger::new(
                    p.fear_low_reentry_pct_values_2,
                    p.fear_low_reentry_window_values_2,
                ),
                leverage: LeverageProfile {
                    breakout: p.fear_low_leverage_btc,
                    reentry: p.fear_low_leverage_reentry,
                    sp: p.fear_low_leverage_sp,
                },
            },
        }
    }

    pub fn get(&self, regime: Regime) -> &RegimeProfile {
        match regime {
            Regime::Standard => &self.standard,
            Regime::FearHigh => &self.fear_high,
            Regime::FearLow => &self.fear_low,
        }
    }
}

//what a day's fear reading switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClassification {
    pub regime: Regime,
    pub fear_stop: bool,
}

//high fear wins over low fear, a missing reading never selects a fear regime
pub fn classify_day(p: &StrategyParams, fear_index: i32) -> DayClassification {
    let has_reading = fear_index != NO_FEAR_DATA;

    let fear_stop = p.fear_stop && has_reading && fear_index <= p.fear_stop_value;

    let regime = if p.fear_high_override && has_reading && fear_index >= p.fear_high_value {
        Regime::FearHigh
    } else if p.fear_low_override && has_reading && fear_index <= p.fear_low_value {
        Regime::FearLow
    } else {
        Regime::Standard
    };

    DayClassification { regime, fear_stop }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fear_params() -> StrategyParams {
        StrategyParams {
            fear_high_override: true,
            fear_high_value: 70,
            fear_low_override: true,
            fear_low_value: 80,
            fear_stop: true,
            fear_stop_value: 10,
            fear_high_leverage_btc: 4.0,
            fear_low_reentry_window_values: 30,
            ..StrategyParams::default()
        }
    }

    #[test]
    fn high_fear_takes_priority_over_low() {
        let params = fear_params();
        //75 satisfies both thresholds
        assert_eq!(classify_day(&params, 75).regime, Regime::FearHigh);
        assert_eq!(classify_day(&params, 50).regime, Regime::FearLow);
    }

    #[test]
    fn missing_reading_stays_standard() {
        let params = StrategyParams {
            fear_low_value: 5,
            ..fear_params()
        };
        let day = classify_day(&params, NO_FEAR_DATA);
        assert_eq!(day.regime, Regime::Standard);
        assert!(!day.fear_stop);
    }

    #[test]
    fn fear_stop_is_inclusive() {
        let params = fear_params();
        assert!(classify_day(&params, 10).fear_stop);
        assert!(!classify_day(&params, 11).fear_stop);
    }

    #[test]
    fn profiles_carry_regime_specific_values() {
        let profiles = RegimeProfiles::resolve(&fear_params());
        assert_eq!(profiles.get(Regime::FearHigh).leverage.breakout, 4.0);
        assert_eq!(profiles.get(Regime::Standard).leverage.breakout, 1.0);
        assert_eq!(profiles.get(Regime::FearLow).reentry.period, 30);
    }

    #[test]
    fn leverage_follows_entry_family() {
        let leverage = LeverageProfile {
            breakout: 2.0,
            reentry: 3.0,
            sp: 5.0,
        };
        assert_eq!(leverage.for_entry(EntryReason::SpReentry), 5.0);
        assert_eq!(leverage.for_entry(EntryReason::LongBreakout), 2.0);
        assert_eq!(leverage.for_entry(EntryReason::Reentry2), 3.0);
    }
}
