use crate::config::StrategyParams;
use crate::engine::reasons::{EntryReason, ExitReason, ENTRY_CATEGORIES, HIT_SLOTS};
use crate::engine::regime::{Regime, RegimeProfile, REGIME_COUNT};
use crate::engine::take_profit::TakeProfitState;
use crate::engine::trade::TradeRecord;
use crate::portfolio::{Account, OpenPosition};
use serde::{Deserialize, Serialize};

//drawdown circuit breaker that stays armed until price rebounds off its trough
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitBreaker {
    pub active: bool,
    pub trough: f64,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        CircuitBreaker {
            active: false,
            trough: f64::INFINITY,
        }
    }
}

impl CircuitBreaker {
    pub fn arm(&mut self, price: f64) {
        self.active = true;
        self.trough = price;
    }

    //lowers the trough and returns the rebound above it
    pub fn rebound(&mut self, price: f64) -> f64 {
        self.trough = self.trough.min(price);
        if self.trough > 0.0 {
            (price - self.trough) / self.trough
        } else {
            0.0
        }
    }

    pub fn disarm(&mut self) {
        *self = CircuitBreaker::default();
    }
}

//tallies accumulated over one kernel run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counters {
    pub total_trades: u64,
    pub total_wins: u64,
    pub minutes_in_position: u64,
    pub hits: [u64; HIT_SLOTS],
    pub tp_updates: u64,
    pub entry_trades: [u64; ENTRY_CATEGORIES],
    pub entry_wins: [u64; ENTRY_CATEGORIES],
    pub fear_high_days: u64,
    pub fear_low_days: u64,
    pub fear_stop_days: u64,
    pub regime_trades: [u64; REGIME_COUNT],
    pub regime_wins: [u64; REGIME_COUNT],
    pub ra1_activations: u64,
    pub ra1_blocked: u64,
    pub ra2_activations: u64,
    pub ra2_blocked: u64,
}

impl Counters {
    pub fn record_entry(&mut self, reason: EntryReason) {
        self.entry_trades[reason.category()] += 1;
        self.hits[reason.hit_slot()] += 1;
    }

    pub fn record_close(&mut self, position: &OpenPosition, reason: ExitReason, profit: f64) {
        let won = profit > 0.0;
        let regime = position.regime.index();

        self.total_trades += 1;
        self.regime_trades[regime] += 1;
        if won {
            self.total_wins += 1;
            self.entry_wins[position.reason.category()] += 1;
            self.regime_wins[regime] += 1;
        }

        if let Some(slot) = reason.hit_slot() {
            self.hits[slot] += 1;
        }
    }
}

//mutable state threaded through every step of one kernel run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub account: Account,
    pub position: Option<OpenPosition>,

    //bars left before a new entry is allowed
    pub cooldown: u32,

    pub daily_entries: u32,

    //day of year of the last processed bar, none before the first bar
    pub current_day: Option<u32>,

    //regime snapshot taken at the start of the current day
    pub regime: Regime,
    pub profile: RegimeProfile,
    pub fear_stop_today: bool,

    //red alert 1 measures the drop from the last exit price
    pub red_alert_one: CircuitBreaker,
    pub last_exit_price: Option<f64>,

    //red alert 2 measures the drop over a rolling window
    pub red_alert_two: CircuitBreaker,

    pub take_profit: TakeProfitState,
    pub counters: Counters,

    //present only when the caller asked for a trade log
    pub trades: Option<Vec<TradeRecord>>,
}

impl SimulationState {
    pub fn new(params: &StrategyParams, profile: RegimeProfile, log_trades: bool) -> Self {
        SimulationState {
            account: Account::new(params.initial_balance),
            position: None,
            cooldown: 0,
            daily_entries: 0,
            current_day: None,
            regime: Regime::Standard,
            profile,
            fear_stop_today: false,
            red_alert_one: CircuitBreaker::default(),
            last_exit_price: None,
            red_alert_two: CircuitBreaker::default(),
            take_profit: TakeProfitState::default(),
            counters: Counters::default(),
            trades: if log_trades { Some(Vec::new()) } else { None },
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_tracks_trough_and_rebound() {
        let mut breaker = CircuitBreaker::default();
        breaker.arm(90.0);
        assert_eq!(breaker.rebound(85.0), 0.0);
        assert!((breaker.rebound(93.5) - 0.1).abs() < 1e-12);
        assert_eq!(breaker.trough, 85.0);

        breaker.disarm();
        assert!(!breaker.active);
        assert_eq!(breaker.trough, f64::INFINITY);
    }

    #[test]
    fn zero_trough_reports_no_rebound() {
        let mut breaker = CircuitBreaker::default();
        breaker.arm(0.0);
        assert_eq!(breaker.rebound(5.0), 0.0);
    }
}
