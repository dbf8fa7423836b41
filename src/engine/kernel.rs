use crate::config::StrategyParams;
use crate::data::PriceSeries;
use crate::engine::exits::{protective_exit, ExitContext};
use crate::engine::reasons::{EntryReason, ExitReason};
use crate::engine::regime::{classify_day, Regime, RegimeProfiles};
use crate::engine::signals::{pct_change, EntrySignals};
use crate::engine::state::{Counters, SimulationState};
use crate::engine::take_profit::TakeProfitAction;
use crate::engine::trade::TradeRecord;
use crate::portfolio::EntryOrder;

//result of one kernel run
#[derive(Debug, Clone, PartialEq)]
pub struct KernelOutput {
    pub final_balance: f64,
    pub counters: Counters,
    //empty unless trade logging was requested
    pub trades: Vec<TradeRecord>,
}

//runs one parameter combination over the aligned series
//pure: same inputs always give the same output
pub fn simulate(series: &PriceSeries, params: &StrategyParams, log_trades: bool) -> KernelOutput {
    let kernel = Kernel::new(series, params);
    let mut state = kernel.initial_state(log_trades);

    for index in 0..series.len() {
        kernel.step(&mut state, index);
    }
    kernel.finish(&mut state);

    KernelOutput {
        final_balance: state.account.balance,
        counters: state.counters,
        trades: state.trades.unwrap_or_default(),
    }
}

//read-only context of a run, the mutable side lives in SimulationState
pub struct Kernel<'a> {
    series: &'a PriceSeries,
    params: &'a StrategyParams,
    profiles: RegimeProfiles,
}

impl<'a> Kernel<'a> {
    pub fn new(series: &'a PriceSeries, params: &'a StrategyParams) -> Self {
        Kernel {
            series,
            params,
            profiles: RegimeProfiles::resolve(params),
        }
    }

    pub fn initial_state(&self, log_trades: bool) -> SimulationState {
        SimulationState::new(self.params, *self.profiles.get(Regime::Standard), log_trades)
    }

    //advances the state by one bar
    pub fn step(&self, state: &mut SimulationState, index: usize) {
        self.roll_day(state, index);

        if state.cooldown > 0 {
            state.cooldown -= 1;
        }
        if !state.is_flat() {
            state.counters.minutes_in_position += 1;
        }

        if state.is_flat() {
            if self.red_alert_one(state, index) {
                return;
            }
            if self.red_alert_two(state, index) {
                return;
            }
        }

        if !state.is_flat() {
            self.evaluate_exit(state, index);
        }

        //an exit on this bar does not prevent a new entry on the same bar
        if state.is_flat() && state.cooldown == 0 && state.account.can_enter() {
            self.evaluate_entry(state, index);
        }
    }

    //closes any open position on the last bar
    pub fn finish(&self, state: &mut SimulationState) {
        if !state.is_flat() && !self.series.is_empty() {
            self.close_position(state, self.series.len() - 1, ExitReason::SeriesEnd);
        }
    }

    fn roll_day(&self, state: &mut SimulationState, index: usize) {
        let day = self.series.day_of_year()[index];
        if state.current_day == Some(day) {
            return;
        }

        state.current_day = Some(day);
        state.daily_entries = 0;

        let today = classify_day(self.params, self.series.fear_index()[index]);
        state.fear_stop_today = today.fear_stop;
        if today.fear_stop {
            state.counters.fear_stop_days += 1;
        }
        match today.regime {
            Regime::FearHigh => state.counters.fear_high_days += 1,
            Regime::FearLow => state.counters.fear_low_days += 1,
            Regime::Standard => {}
        }

        state.regime = today.regime;
        state.profile = *self.profiles.get(today.regime);
    }

    //drop measured from the last exit price, returns true when it re-entered
    fn red_alert_one(&self, state: &mut SimulationState, index: usize) -> bool {
        let price = self.series.asset_close()[index];
        let last_exit = match state.last_exit_price {
            Some(last_exit) if last_exit > 0.0 => last_exit,
            _ => return false,
        };

        let drop = (last_exit - price) / last_exit;
        if !state.red_alert_one.active && drop >= self.params.red_alert_trigger_pct {
            state.red_alert_one.arm(price);
            state.counters.ra1_activations += 1;
        }

        if !state.red_alert_one.active {
            return false;
        }
        if state.red_alert_one.rebound(price) < self.params.red_alert_reset_pct {
            return false;
        }

        state.red_alert_one.disarm();
        state.last_exit_price = None;

        self.params.red_alert_reset_auto_entry && self.auto_reenter(state, index)
    }

    //drop over a rolling window, returns true when it re-entered
    fn red_alert_two(&self, state: &mut SimulationState, index: usize) -> bool {
        let asset = self.series.asset_close();
        let price = asset[index];

        if !state.red_alert_two.active {
            let window_drop = pct_change(asset, index, self.params.red_alert2_window)
                .map(|change| -change);
            if matches!(window_drop, Some(drop) if drop >= self.params.red_alert2_trigger_pct) {
                state.red_alert_two.arm(price);
                state.counters.ra2_activations += 1;
            }
        }

        if !state.red_alert_two.active {
            return false;
        }
        if state.red_alert_two.rebound(price) < self.params.red_alert2_reset_pct {
            return false;
        }

        state.red_alert_two.disarm();

        self.params.red_alert2_reset_auto_entry
            && !state.red_alert_one.active
            && self.auto_reenter(state, index)
    }

    fn auto_reenter(&self, state: &mut SimulationState, index: usize) -> bool {
        if !state.is_flat()
            || state.cooldown != 0
            || !state.account.can_enter()
            || state.daily_entries >= self.params.max_entries_day
            || state.fear_stop_today
        {
            return false;
        }
        self.open_position(state, index, EntryReason::Reentry)
    }

    fn evaluate_exit(&self, state: &mut SimulationState, index: usize) {
        let price = self.series.asset_close()[index];

        let reason = {
            let position = match state.position.as_mut() {
                Some(position) => position,
                None => return,
            };
            position.update_high_water_mark(price);

            let ctx = ExitContext {
                series: self.series,
                index,
                params: self.params,
                profile: &state.profile,
                position,
                fear_stop_today: state.fear_stop_today,
            };

            match protective_exit(&ctx) {
                Some(reason) => Some(reason),
                None => match state.take_profit.evaluate(self.params, position.entry_price, price) {
                    TakeProfitAction::Exit => Some(ExitReason::TakeProfit),
                    TakeProfitAction::Committed => {
                        if self.params.take_profit_update > 0.0 {
                            state.counters.tp_updates += 1;
                        }
                        None
                    }
                    TakeProfitAction::Armed | TakeProfitAction::Hold => None,
                },
            }
        };

        if let Some(reason) = reason {
            self.close_position(state, index, reason);
        }
    }

    fn evaluate_entry(&self, state: &mut SimulationState, index: usize) {
        let signals = EntrySignals::evaluate(
            self.series,
            index,
            self.params,
            &state.profile,
            state.fear_stop_today,
        );
        let reason = match signals.winner() {
            Some(reason) => reason,
            None => return,
        };

        let is_breakout = signals.is_breakout();
        let mut blocked = false;
        if state.red_alert_one.active && (self.params.red_alert_block_btc_entries || !is_breakout) {
            blocked = true;
            state.counters.ra1_blocked += 1;
        }
        if state.red_alert_two.active && (self.params.red_alert_block_btc_entries || !is_breakout) {
            blocked = true;
            state.counters.ra2_blocked += 1;
        }
        if blocked {
            return;
        }

        //breakout entries skip the daily cap unless max_entries_day_btc is set
        let cap_reached = state.daily_entries >= self.params.max_entries_day;
        if cap_reached && (self.params.max_entries_day_btc || !is_breakout) {
            return;
        }

        self.open_position(state, index, reason);
    }

    fn open_position(&self, state: &mut SimulationState, index: usize, reason: EntryReason) -> bool {
        let order = EntryOrder {
            reason,
            regime: state.regime,
            index,
            time: self.series.timestamps()[index],
            price: self.series.asset_close()[index],
            leverage: state.profile.leverage.for_entry(reason),
            fear_index: self.series.fear_index()[index],
        };

        let position =
            match state
                .account
                .open(order, self.params.entry_fraction(), self.params.fixed_fee)
            {
                Some(position) => position,
                None => return false,
            };

        state.counters.record_entry(reason);
        state.daily_entries += 1;
        state.position = Some(position);
        true
    }

    fn close_position(&self, state: &mut SimulationState, index: usize, reason: ExitReason) {
        let position = match state.position.take() {
            Some(position) => position,
            None => return,
        };
        let price = self.series.asset_close()[index];

        let profit = state.account.settle(&position, price, self.params.fixed_fee);
        state.counters.record_close(&position, reason, profit);

        if let Some(trades) = state.trades.as_mut() {
            trades.push(TradeRecord {
                entry_time: position.entry_time,
                exit_time: self.series.timestamps()[index],
                entry_price: position.entry_price,
                exit_price: price,
                profit,
                entry_reason: position.reason,
                exit_reason: reason,
                fear_index_at_entry: position.fear_index_at_entry,
                quantity: position.quantity,
                leveraged_capital: position.leveraged_capital,
            });
        }

        state.take_profit.reset();

        if reason != ExitReason::SeriesEnd {
            state.cooldown = if reason == ExitReason::TakeProfit {
                self.params.cooldown_tp
            } else {
                self.params.cooldown_sl
            };
            state.last_exit_price = Some(price);
            state.red_alert_one.disarm();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DISABLED_TRIGGER;
    use crate::data::NO_FEAR_DATA;

    fn series(asset: Vec<f64>) -> PriceSeries {
        let n = asset.len();
        PriceSeries::from_timestamps(
            (0..n as i64).map(|i| 1_704_067_200 + i * 60).collect(),
            asset,
            vec![100.0; n],
            vec![NO_FEAR_DATA; n],
        )
        .unwrap()
    }

    fn reentry_params() -> StrategyParams {
        StrategyParams {
            fixed_fee: 0.0,
            reentry_pct_values: 0.0,
            reentry_window_values: 0,
            red_alert2_trigger_pct: DISABLED_TRIGGER,
            ..StrategyParams::default()
        }
    }

    #[test]
    fn empty_series_returns_initial_balance() {
        let out = simulate(&PriceSeries::default(), &StrategyParams::default(), true);
        assert_eq!(out.final_balance, 1000.0);
        assert_eq!(out.counters.total_trades, 0);
        assert!(out.trades.is_empty());
    }

    #[test]
    fn open_position_is_closed_at_series_end() {
        let out = simulate(&series(vec![100.0, 105.0, 110.0]), &reentry_params(), true);

        assert_eq!(out.counters.total_trades, 1);
        assert_eq!(out.counters.total_wins, 1);
        assert_eq!(out.counters.hits[2], 1);
        //the forced close is not a hit
        assert_eq!(out.counters.hits.iter().sum::<u64>(), 1);
        assert!((out.final_balance - 1100.0).abs() < 1e-9);
        assert_eq!(out.trades[0].exit_reason, ExitReason::SeriesEnd);
        assert_eq!(out.counters.minutes_in_position, 2);
    }

    #[test]
    fn exit_and_reentry_on_the_same_bar() {
        let params = StrategyParams {
            stop_loss: 0.05,
            ..reentry_params()
        };
        let out = simulate(&series(vec![100.0, 90.0, 90.0]), &params, true);

        assert_eq!(out.counters.hits[8], 1);
        assert_eq!(out.counters.entry_trades[2], 2);
        assert_eq!(out.trades[0].exit_reason, ExitReason::StopLoss);
        assert_eq!(out.trades[1].entry_time, out.trades[0].exit_time);
    }

    #[test]
    fn cooldown_delays_the_next_entry() {
        let params = StrategyParams {
            stop_loss: 0.05,
            cooldown_sl: 2,
            ..reentry_params()
        };
        let out = simulate(&series(vec![100.0, 90.0, 90.0, 90.0, 90.0]), &params, true);

        assert_eq!(out.trades.len(), 2);
        //exit at bar 1, cooldown ticks down on bars 2 and 3
        assert_eq!(out.trades[1].entry_time, 1_704_067_200 + 3 * 60);
    }

    #[test]
    fn daily_cap_limits_reentries() {
        let params = StrategyParams {
            stop_loss: 0.01,
            max_entries_day: 2,
            ..reentry_params()
        };
        let prices: Vec<f64> = (0..10).map(|i| 100.0 - i as f64 * 5.0).collect();
        let out = simulate(&series(prices), &params, false);

        assert_eq!(out.counters.entry_trades[2], 2);
        assert!(out.trades.is_empty());
    }

    fn bar_time(index: i64) -> i64 {
        1_704_067_200 + index * 60
    }

    #[test]
    fn red_alert_one_arms_from_last_exit_and_reenters_on_rebound() {
        let params = StrategyParams {
            stop_loss: 0.05,
            cooldown_sl: 1,
            red_alert_trigger_pct: 0.05,
            red_alert_reset_pct: 0.03,
            red_alert_reset_auto_entry: true,
            ..reentry_params()
        };
        let out = simulate(&series(vec![100.0, 90.0, 85.0, 80.0, 83.0, 83.0]), &params, true);

        assert_eq!(out.trades.len(), 2);
        assert_eq!(out.trades[0].exit_reason, ExitReason::StopLoss);
        //armed at 85, trough 80, 83 is a 3.75% rebound
        assert_eq!(out.trades[1].entry_reason, EntryReason::Reentry);
        assert_eq!(out.trades[1].entry_time, bar_time(4));
        assert_eq!(out.trades[1].exit_reason, ExitReason::SeriesEnd);
        assert_eq!(out.counters.ra1_activations, 1);
        assert_eq!(out.counters.ra1_blocked, 2);
    }

    #[test]
    fn breakouts_pass_red_alert_unless_configured_to_block() {
        let breakout = |block: bool| StrategyParams {
            fixed_fee: 0.0,
            btc_entry_trigger_value: 0.0,
            btc_entry_trigger_period: 0,
            red_alert2_trigger_pct: DISABLED_TRIGGER,
            stop_loss: 0.05,
            cooldown_sl: 1,
            red_alert_trigger_pct: 0.05,
            red_alert_reset_pct: 0.5,
            red_alert_block_btc_entries: block,
            ..StrategyParams::default()
        };
        let s = series(vec![100.0, 90.0, 85.0, 84.0]);

        let open = simulate(&s, &breakout(false), true);
        assert_eq!(open.trades.len(), 2);
        assert_eq!(open.trades[1].entry_reason, EntryReason::Breakout);
        assert_eq!(open.counters.ra1_activations, 1);
        assert_eq!(open.counters.ra1_blocked, 0);

        let blocked = simulate(&s, &breakout(true), true);
        assert_eq!(blocked.trades.len(), 1);
        assert_eq!(blocked.counters.ra1_blocked, 2);
    }

    #[test]
    fn red_alert_two_blocks_reentries_until_rebound() {
        let params = StrategyParams {
            fixed_fee: 0.0,
            reentry_pct_values: 0.01,
            reentry_window_values: 1,
            red_alert2_trigger_pct: 0.1,
            red_alert2_window: 2,
            red_alert2_reset_pct: 0.05,
            ..StrategyParams::default()
        };
        let out = simulate(
            &series(vec![100.0, 100.0, 85.0, 85.0, 86.0, 90.0]),
            &params,
            true,
        );

        assert_eq!(out.counters.ra2_activations, 1);
        //86 is a reentry signal but only a 1.2% rebound
        assert_eq!(out.counters.ra2_blocked, 1);
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].entry_time, bar_time(5));
    }

    #[test]
    fn red_alert_two_auto_entry_reenters_on_its_own() {
        let params = StrategyParams {
            fixed_fee: 0.0,
            red_alert2_trigger_pct: 0.1,
            red_alert2_window: 2,
            red_alert2_reset_pct: 0.05,
            red_alert2_reset_auto_entry: true,
            ..StrategyParams::default()
        };
        let out = simulate(
            &series(vec![100.0, 100.0, 85.0, 80.0, 84.5, 85.0]),
            &params,
            true,
        );

        assert_eq!(out.counters.ra2_activations, 1);
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].entry_reason, EntryReason::Reentry);
        assert_eq!(out.trades[0].entry_time, bar_time(4));
    }

    #[test]
    fn red_alert_two_auto_entry_waits_for_red_alert_one() {
        let params = StrategyParams {
            fixed_fee: 0.0,
            btc_entry_trigger_value: 0.0,
            btc_entry_trigger_period: 0,
            stop_loss: 0.05,
            cooldown_sl: 1,
            red_alert_trigger_pct: 0.05,
            red_alert_reset_pct: DISABLED_TRIGGER,
            red_alert_block_btc_entries: true,
            red_alert2_trigger_pct: 0.1,
            red_alert2_window: 2,
            red_alert2_reset_pct: 0.05,
            red_alert2_reset_auto_entry: true,
            ..StrategyParams::default()
        };
        let out = simulate(
            &series(vec![100.0, 90.0, 80.0, 80.0, 85.0, 85.0]),
            &params,
            true,
        );

        //ra2 rebounds at 85 but ra1 is still armed
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.counters.ra1_activations, 1);
        assert_eq!(out.counters.ra2_activations, 1);
        assert_eq!(out.counters.ra1_blocked, 4);
        assert_eq!(out.counters.ra2_blocked, 2);
    }

    #[test]
    fn trade_log_is_optional_and_results_are_pure() {
        let s = series(vec![100.0, 95.0, 101.0, 99.0]);
        let params = StrategyParams {
            stop_loss: 0.02,
            ..reentry_params()
        };

        let first = simulate(&s, &params, false);
        let second = simulate(&s, &params, true);
        assert_eq!(first.final_balance, second.final_balance);
        assert_eq!(first.counters, second.counters);
        assert!(first.trades.is_empty());
        assert_eq!(second.trades.len() as u64, second.counters.total_trades);
    }
}
