use crate::config::StrategyParams;
use crate::data::PriceSeries;
use crate::engine::{EntryReason, ExitReason, KernelOutput, Regime};
use prettytable::{Cell, Row, Table};
use serde::Serialize;
use std::cmp::Ordering;

//flat report record of one parameter combination
//win rates are fractions, fields ending in _pct are percentages
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub test_id: usize,
    pub final_balance: f64,
    pub final_balance_pct: f64,

    //initial balance held in the asset from the first to the last bar
    pub final_hold_balance: f64,

    pub total_trades: u64,
    pub total_wins: u64,
    pub win_rate: f64,
    pub minutes_in_position: u64,
    pub time_in_pos_pct: f64,

    //entry hits
    pub btc_entry_hits: u64,
    pub btc_entry_long_hits: u64,
    pub reentry_hits: u64,
    pub reentry_2_hits: u64,
    pub sp_be_hits: u64,
    pub sp_r_hits: u64,

    //exit hits
    pub btc_exit_hits: u64,
    pub btc_exit_long_hits: u64,
    pub take_profit_hits: u64,
    pub total_tp_updates: u64,
    pub stop_loss_hits: u64,
    pub stop_loss_hard_hits: u64,
    pub ra_exit_pos_hits: u64,
    pub fear_stop_exit_hits: u64,
    pub liquidation_hits: u64,
    pub btc_exit_panic_hits: u64,
    pub asset_exit_panic_hits: u64,

    pub win_rate_btc_entry: f64,
    pub win_rate_btc_entry_long: f64,
    pub win_rate_reentry: f64,
    pub win_rate_reentry_2: f64,
    pub win_rate_sp_be: f64,
    pub win_rate_sp_r: f64,

    //days spent in each fear state
    pub fear_high_hits: u64,
    pub fear_low_hits: u64,
    pub fear_stop_hits: u64,

    pub win_rate_fear_standard: f64,
    pub win_rate_fear_high: f64,
    pub win_rate_fear_low: f64,

    pub ra1_activation_count: u64,
    pub ra1_blocked_count: u64,
    pub ra2_activation_count: u64,
    pub ra2_blocked_count: u64,

    //parameters that produced this result
    #[serde(flatten)]
    pub params: StrategyParams,
}

impl BacktestReport {
    pub fn from_output(
        index: usize,
        output: &KernelOutput,
        series: &PriceSeries,
        params: &StrategyParams,
    ) -> Self {
        let counters = &output.counters;
        let initial = params.initial_balance;

        let final_balance_pct = if initial > 0.0 {
            (output.final_balance - initial) / initial * 100.0
        } else {
            0.0
        };

        let asset = series.asset_close();
        let final_hold_balance = match (asset.first(), asset.last()) {
            (Some(&first), Some(&last)) if first > 0.0 => initial / first * last,
            _ => initial,
        };

        let time_in_pos_pct = if series.is_empty() {
            0.0
        } else {
            counters.minutes_in_position as f64 / series.len() as f64 * 100.0
        };

        let entry_rate = |reason: EntryReason| {
            ratio(
                counters.entry_wins[reason.category()],
                counters.entry_trades[reason.category()],
            )
        };
        let regime_rate = |regime: Regime| {
            ratio(
                counters.regime_wins[regime.index()],
                counters.regime_trades[regime.index()],
            )
        };
        let entry_hits = |reason: EntryReason| counters.hits[reason.hit_slot()];
        let exit_hits =
            |reason: ExitReason| reason.hit_slot().map_or(0, |slot| counters.hits[slot]);

        BacktestReport {
            test_id: index + 1,
            final_balance: output.final_balance,
            final_balance_pct,
            final_hold_balance,
            total_trades: counters.total_trades,
            total_wins: counters.total_wins,
            win_rate: ratio(counters.total_wins, counters.total_trades),
            minutes_in_position: counters.minutes_in_position,
            time_in_pos_pct,
            btc_entry_hits: entry_hits(EntryReason::Breakout),
            btc_entry_long_hits: entry_hits(EntryReason::LongBreakout),
            reentry_hits: entry_hits(EntryReason::Reentry),
            reentry_2_hits: entry_hits(EntryReason::Reentry2),
            sp_be_hits: entry_hits(EntryReason::SpBreakout),
            sp_r_hits: entry_hits(EntryReason::SpReentry),
            btc_exit_hits: exit_hits(ExitReason::ReferenceDrop),
            btc_exit_long_hits: exit_hits(ExitReason::ReferenceLongDrop),
            take_profit_hits: exit_hits(ExitReason::TakeProfit),
            total_tp_updates: counters.tp_updates,
            stop_loss_hits: exit_hits(ExitReason::StopLoss),
            stop_loss_hard_hits: exit_hits(ExitReason::HardStopLoss),
            ra_exit_pos_hits: exit_hits(ExitReason::RedAlert),
            fear_stop_exit_hits: exit_hits(ExitReason::FearStop),
            liquidation_hits: exit_hits(ExitReason::Liquidation),
            btc_exit_panic_hits: exit_hits(ExitReason::ReferencePanic),
            asset_exit_panic_hits: exit_hits(ExitReason::AssetPanic),
            win_rate_btc_entry: entry_rate(EntryReason::Breakout),
            win_rate_btc_entry_long: entry_rate(EntryReason::LongBreakout),
            win_rate_reentry: entry_rate(EntryReason::Reentry),
            win_rate_reentry_2: entry_rate(EntryReason::Reentry2),
            win_rate_sp_be: entry_rate(EntryReason::SpBreakout),
            win_rate_sp_r: entry_rate(EntryReason::SpReentry),
            fear_high_hits: counters.fear_high_days,
            fear_low_hits: counters.fear_low_days,
            fear_stop_hits: counters.fear_stop_days,
            win_rate_fear_standard: regime_rate(Regime::Standard),
            win_rate_fear_high: regime_rate(Regime::FearHigh),
            win_rate_fear_low: regime_rate(Regime::FearLow),
            ra1_activation_count: counters.ra1_activations,
            ra1_blocked_count: counters.ra1_blocked,
            ra2_activation_count: counters.ra2_activations,
            ra2_blocked_count: counters.ra2_blocked,
            params: params.clone(),
        }
    }
}

fn ratio(wins: u64, trades: u64) -> f64 {
    if trades > 0 {
        wins as f64 / trades as f64
    } else {
        0.0
    }
}

//sorts by final balance, highest first, ties keep grid order
pub fn rank_by_final_balance(reports: &mut [BacktestReport]) {
    reports.sort_by(|a, b| {
        b.final_balance
            .partial_cmp(&a.final_balance)
            .unwrap_or(Ordering::Equal)
            .then(a.test_id.cmp(&b.test_id))
    });
}

//prints the first n reports as a table
pub fn print_top_table(reports: &[BacktestReport], n: usize) {
    let mut table = Table::new();

    table.add_row(Row::new(
        [
            "#", "ID", "Balance", "% Final", "Hold", "Trades", "Winrate", "% Pos", "BE/BEL",
            "R1/R2", "SP BE/R", "BX/BXL/BXP", "TP/Upd", "SL/SLH/AXP", "RA/FS/LIQ", "Fear H/L/S",
            "WR BE/BEL/R1/R2", "WR S/H/L", "RA1 Act/Blk", "RA2 Act/Blk", "Lev S|H|L",
        ]
        .iter()
        .map(|title| Cell::new(title))
        .collect(),
    ));

    for (rank, r) in reports.iter().take(n).enumerate() {
        let p = &r.params;
        table.add_row(Row::new(vec![
            Cell::new(&format!("{}", rank + 1)),
            Cell::new(&format!("{}", r.test_id)),
            Cell::new(&format!("{:.2}", r.final_balance)),
            Cell::new(&format!("{:+.2}%", r.final_balance_pct)),
            Cell::new(&format!("{:.2}", r.final_hold_balance)),
            Cell::new(&format!("{}", r.total_trades)),
            Cell::new(&format!("{:.2}%", r.win_rate * 100.0)),
            Cell::new(&format!("{:.2}%", r.time_in_pos_pct)),
            Cell::new(&format!("{}/{}", r.btc_entry_hits, r.btc_entry_long_hits)),
            Cell::new(&format!("{}/{}", r.reentry_hits, r.reentry_2_hits)),
            Cell::new(&format!("{}/{}", r.sp_be_hits, r.sp_r_hits)),
            Cell::new(&format!(
                "{}/{}/{}",
                r.btc_exit_hits, r.btc_exit_long_hits, r.btc_exit_panic_hits
            )),
            Cell::new(&format!("{}/{}", r.take_profit_hits, r.total_tp_updates)),
            Cell::new(&format!(
                "{}/{}/{}",
                r.stop_loss_hits, r.stop_loss_hard_hits, r.asset_exit_panic_hits
            )),
            Cell::new(&format!(
                "{}/{}/{}",
                r.ra_exit_pos_hits, r.fear_stop_exit_hits, r.liquidation_hits
            )),
            Cell::new(&format!(
                "{}/{}/{}",
                r.fear_high_hits, r.fear_low_hits, r.fear_stop_hits
            )),
            Cell::new(&format!(
                "{:.1}/{:.1}/{:.1}/{:.1}%",
                r.win_rate_btc_entry * 100.0,
                r.win_rate_btc_entry_long * 100.0,
                r.win_rate_reentry * 100.0,
                r.win_rate_reentry_2 * 100.0
            )),
            Cell::new(&format!(
                "{:.1}/{:.1}/{:.1}%",
                r.win_rate_fear_standard * 100.0,
                r.win_rate_fear_high * 100.0,
                r.win_rate_fear_low * 100.0
            )),
            Cell::new(&format!(
                "{}/{}",
                r.ra1_activation_count, r.ra1_blocked_count
            )),
            Cell::new(&format!(
                "{}/{}",
                r.ra2_activation_count, r.ra2_blocked_count
            )),
            Cell::new(&format!(
                "{}/{}/{} | {}/{}/{} | {}/{}/{}",
                p.leverage_btc,
                p.leverage_reentry,
                p.leverage_sp,
                p.fear_high_leverage_btc,
                p.fear_high_leverage_reentry,
                p.fear_high_leverage_sp,
                p.fear_low_leverage_btc,
                p.fear_low_leverage_reentry,
                p.fear_low_leverage_sp
            )),
        ]));
    }

    table.printstd();
}
