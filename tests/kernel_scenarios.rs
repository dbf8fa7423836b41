use feargrid::engine::{ENTRY_CATEGORIES, HIT_SLOTS};
use feargrid::prelude::*;

const START: i64 = 1_704_067_200;

fn minute_series(asset: Vec<f64>, reference: Vec<f64>, fear: Vec<i32>) -> PriceSeries {
    let n = asset.len();
    PriceSeries::from_timestamps(
        (0..n as i64).map(|i| START + i * 60).collect(),
        asset,
        reference,
        fear,
    )
    .unwrap()
}

fn flat_reference(asset: Vec<f64>) -> PriceSeries {
    let n = asset.len();
    minute_series(asset, vec![100.0; n], vec![NO_FEAR_DATA; n])
}

//enters on the first bar and keeps re-entering whenever flat
fn always_reenter() -> StrategyParams {
    StrategyParams {
        fixed_fee: 0.0,
        reentry_pct_values: 0.0,
        reentry_window_values: 0,
        red_alert2_trigger_pct: DISABLED_TRIGGER,
        ..StrategyParams::default()
    }
}

//deterministic wiggly prices without pulling in a random number crate
fn pseudo_random_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let mut price = 100.0;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let step = ((state >> 33) % 2001) as f64 / 1000.0 - 1.0;
            price = (price * (1.0 + step * 0.01)).max(1.0);
            price
        })
        .collect()
}

#[test]
fn leveraged_position_is_liquidated_at_half_drop() {
    let asset: Vec<f64> = (0..60).map(|k| 100.0 - k as f64).collect();
    let params = StrategyParams {
        leverage_reentry: 2.0,
        ..always_reenter()
    };

    let out = simulate(&flat_reference(asset), &params, true);

    assert_eq!(out.trades.len(), 1);
    assert_eq!(out.trades[0].exit_reason, ExitReason::Liquidation);
    assert_eq!(out.trades[0].exit_time, START + 50 * 60);
    assert_eq!(out.final_balance, 0.0);
    //nothing left to enter with
    assert_eq!(out.counters.total_trades, 1);
}

#[test]
fn single_unlevered_hold_tracks_the_asset() {
    let asset = pseudo_random_walk(500, 7);
    let first = asset[0];
    let last = asset[asset.len() - 1];

    let out = simulate(&flat_reference(asset), &always_reenter(), true);

    assert_eq!(out.trades.len(), 1);
    assert_eq!(out.trades[0].exit_reason, ExitReason::SeriesEnd);
    assert!((out.final_balance - 1000.0 * last / first).abs() < 1e-6);
}

#[test]
fn dynamic_take_profit_exits_below_committed_floor() {
    let params = StrategyParams {
        take_profit_dynamic: true,
        take_profit_trigger: 0.05,
        take_profit_update: 0.0,
        take_profit_multiplier: 0.02,
        take_profit_confirmation_sl_pct: 0.02,
        take_profit_confirmation_end_pct: 0.01,
        cooldown_tp: 100,
        ..always_reenter()
    };
    //armed at 106, confirmed at 107, level 105 breached at 104
    let series = flat_reference(vec![100.0, 106.0, 107.0, 104.0, 104.0]);

    let out = simulate(&series, &params, true);

    assert_eq!(out.trades.len(), 1);
    assert_eq!(out.trades[0].exit_reason, ExitReason::TakeProfit);
    assert_eq!(out.trades[0].exit_price, 104.0);
    //a zero update step never counts as a floor update
    assert_eq!(out.counters.tp_updates, 0);
    assert!((out.final_balance - 1040.0).abs() < 1e-9);
}

#[test]
fn retrace_through_pending_band_exits_at_prior_floor() {
    let params = StrategyParams {
        take_profit_dynamic: true,
        take_profit_trigger: 0.05,
        take_profit_update: 0.02,
        take_profit_multiplier: 0.02,
        take_profit_confirmation_sl_pct: 0.02,
        take_profit_confirmation_end_pct: 0.01,
        cooldown_tp: 100,
        ..always_reenter()
    };
    //5% floor committed at 106.1, 7% floor pending from 107.5 with its band down to 104.86
    let series = flat_reference(vec![100.0, 105.4, 106.1, 107.5, 104.8, 104.8]);

    let out = simulate(&series, &params, true);

    assert_eq!(out.trades.len(), 1);
    assert_eq!(out.trades[0].exit_reason, ExitReason::TakeProfit);
    assert_eq!(out.trades[0].exit_time, START + 4 * 60);
    //only the first floor was ever committed
    assert_eq!(out.counters.tp_updates, 1);
    assert!((out.final_balance - 1048.0).abs() < 1e-9);
}

#[test]
fn breakouts_can_be_exempt_from_the_daily_cap() {
    let breakout = |capped: bool| StrategyParams {
        fixed_fee: 0.0,
        btc_entry_trigger_value: 0.0,
        btc_entry_trigger_period: 0,
        red_alert2_trigger_pct: DISABLED_TRIGGER,
        stop_loss: 0.05,
        max_entries_day: 1,
        max_entries_day_btc: capped,
        ..StrategyParams::default()
    };
    let prices = vec![100.0, 90.0, 80.0, 80.0];

    let capped = simulate(&flat_reference(prices.clone()), &breakout(true), true);
    assert_eq!(capped.trades.len(), 1);

    let exempt = simulate(&flat_reference(prices.clone()), &breakout(false), true);
    assert_eq!(exempt.trades.len(), 3);
    assert!(exempt
        .trades
        .iter()
        .all(|t| t.entry_reason == EntryReason::Breakout));

    //reentries stay capped either way
    let reentry = StrategyParams {
        stop_loss: 0.05,
        max_entries_day: 1,
        max_entries_day_btc: false,
        ..always_reenter()
    };
    let out = simulate(&flat_reference(prices), &reentry, true);
    assert_eq!(out.trades.len(), 1);
}

#[test]
fn high_fear_wins_when_both_regimes_match() {
    //three days of hourly bars
    let n = 72;
    let series = PriceSeries::from_timestamps(
        (0..n as i64).map(|i| START + i * 3600).collect(),
        vec![100.0; n],
        vec![100.0; n],
        vec![90; n],
    )
    .unwrap();
    let params = StrategyParams {
        fear_high_override: true,
        fear_high_value: 70,
        fear_low_override: true,
        fear_low_value: 95,
        fear_high_reentry_pct_values: 0.0,
        fear_high_reentry_window_values: 0,
        ..always_reenter()
    };

    let out = simulate(&series, &params, false);

    assert_eq!(out.counters.fear_high_days, 3);
    assert_eq!(out.counters.fear_low_days, 0);
    assert_eq!(out.counters.regime_trades[Regime::FearHigh.index()], 1);
    assert_eq!(out.counters.total_trades, 1);
}

#[test]
fn windows_longer_than_the_series_never_fire() {
    let params = StrategyParams {
        fixed_fee: 0.0,
        btc_entry_trigger_value: 0.0,
        btc_entry_trigger_period: 50,
        reentry_pct_values: 0.0,
        reentry_window_values: 50,
        red_alert2_window: 50,
        ..StrategyParams::default()
    };

    for len in 0..5 {
        let out = simulate(&flat_reference(vec![100.0; len]), &params, true);
        assert_eq!(out.counters.total_trades, 0);
        assert_eq!(out.final_balance, 1000.0);
    }
}

#[test]
fn accounting_identities_hold_on_noisy_data() {
    let n = 3_000;
    let asset = pseudo_random_walk(n, 42);
    let reference = pseudo_random_walk(n, 1337);
    let series = minute_series(asset, reference, vec![NO_FEAR_DATA; n]);

    let params = StrategyParams {
        fixed_fee: 0.001,
        stop_loss: 0.01,
        take_profit_trigger: 0.015,
        btc_entry_trigger_value: 0.004,
        btc_entry_trigger_period: 5,
        btc_exit_trigger_value: 0.006,
        btc_exit_trigger_period: 5,
        reentry_pct_values: 0.003,
        reentry_window_values: 3,
        reentry_pct_values_2: 0.008,
        reentry_window_values_2: 20,
        cooldown_sl: 5,
        max_entries_day: 50,
        leverage_btc: 2.0,
        leverage_reentry: 3.0,
        ..StrategyParams::default()
    };

    let out = simulate(&series, &params, true);
    let counters = &out.counters;

    assert!(counters.total_trades > 0);
    assert!(out.final_balance >= 0.0);
    assert_eq!(out.trades.len() as u64, counters.total_trades);

    for trade in &out.trades {
        let expected = trade.quantity * trade.exit_price * (1.0 - 0.001) - trade.leveraged_capital;
        assert!((trade.profit - expected).abs() < 1e-9);
    }

    //the 1% stop fires long before a levered loss could exceed the stake, so nothing is clamped
    let profit: f64 = out.trades.iter().map(|t| t.profit).sum();
    assert!((out.final_balance - (1000.0 + profit)).abs() < 1e-6);
    //the first entry commits the whole initial balance
    let first = &out.trades[0];
    let leverage = if first.entry_reason == EntryReason::Breakout { 2.0 } else { 3.0 };
    assert!((first.leveraged_capital - 1000.0 * leverage).abs() < 1e-9);

    let by_category: u64 = counters.entry_trades[..ENTRY_CATEGORIES].iter().sum();
    assert_eq!(by_category, counters.total_trades);
    let by_regime: u64 = counters.regime_trades.iter().sum();
    assert_eq!(by_regime, counters.total_trades);
    assert!(counters.total_wins <= counters.total_trades);

    let wins = out.trades.iter().filter(|t| t.profit > 0.0).count() as u64;
    assert_eq!(wins, counters.total_wins);

    //every close except the forced final one lands in an exit slot
    let exit_hits: u64 = counters.hits[5..15].iter().sum();
    let forced = out
        .trades
        .iter()
        .filter(|t| t.exit_reason == ExitReason::SeriesEnd)
        .count() as u64;
    assert_eq!(exit_hits + forced, counters.total_trades);
    assert_eq!(counters.hits.len(), HIT_SLOTS);
}

#[test]
fn simulation_is_pure() {
    let n = 1_000;
    let series = minute_series(
        pseudo_random_walk(n, 3),
        pseudo_random_walk(n, 4),
        vec![NO_FEAR_DATA; n],
    );
    let params = StrategyParams {
        stop_loss: 0.01,
        reentry_pct_values: 0.002,
        reentry_window_values: 2,
        ..StrategyParams::default()
    };

    let first = simulate(&series, &params, true);
    let second = simulate(&series, &params, true);
    assert_eq!(first, second);

    let quiet = simulate(&series, &params, false);
    assert_eq!(quiet.final_balance, first.final_balance);
    assert_eq!(quiet.counters, first.counters);
    assert!(quiet.trades.is_empty());
}
