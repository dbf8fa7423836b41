use crate::data::PriceSeries;
use crate::engine::TradeRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

//one calendar month of realised results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRow {
    pub year: i32,
    pub month: u32,
    //sum of profits of trades exiting this month
    pub profit: f64,
    //running balance after this month
    pub balance: f64,
    //buy and hold value at the month's last close
    pub hold_value: f64,
}

//aggregate statistics over closed trades
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeStats {
    pub num_trades: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl TradeStats {
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        if trades.is_empty() {
            return TradeStats::default();
        }

        let winning: Vec<f64> = trades
            .iter()
            .map(|t| t.profit)
            .filter(|&profit| profit > 0.0)
            .collect();
        let losing: Vec<f64> = trades
            .iter()
            .map(|t| t.profit)
            .filter(|&profit| profit < 0.0)
            .collect();

        let total_wins: f64 = winning.iter().sum();
        let total_losses: f64 = losing.iter().sum::<f64>().abs();

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        TradeStats {
            num_trades: trades.len(),
            num_winning_trades: winning.len(),
            num_losing_trades: losing.len(),
            avg_win: if winning.is_empty() {
                0.0
            } else {
                total_wins / winning.len() as f64
            },
            avg_loss: if losing.is_empty() {
                0.0
            } else {
                -total_losses / losing.len() as f64
            },
            profit_factor,
            largest_win: winning.iter().fold(0.0f64, |a, &b| a.max(b)),
            largest_loss: losing.iter().fold(0.0f64, |a, &b| a.min(b)),
        }
    }
}

//month by month performance of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPerformance {
    pub initial_balance: f64,
    pub asset_initial_price: Option<f64>,
    pub months: Vec<MonthRow>,
    pub final_balance: f64,
    pub final_hold_value: f64,
    pub mean_monthly_profit: f64,
    pub std_monthly_profit: f64,
    pub trade_stats: TradeStats,
}

impl MonthlyPerformance {
    //months run from the first to the last exit month, empty months included
    pub fn build(trades: &[TradeRecord], series: &PriceSeries, initial_balance: f64) -> Self {
        let mut profit_by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for trade in trades {
            if let Some(key) = month_of(trade.exit_time) {
                *profit_by_month.entry(key).or_insert(0.0) += trade.profit;
            }
        }

        let mut close_by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for (&ts, &close) in series.timestamps().iter().zip(series.asset_close()) {
            if let Some(key) = month_of(ts) {
                close_by_month.insert(key, close);
            }
        }

        let asset_initial_price = series.asset_close().first().copied();
        let hold_quantity = match asset_initial_price {
            Some(price) if price > 0.0 => initial_balance / price,
            _ => 0.0,
        };

        let mut months = Vec::new();
        let mut balance = initial_balance;
        let mut hold_value = initial_balance;

        let first = profit_by_month.keys().next().copied();
        let last = profit_by_month.keys().next_back().copied();
        if let (Some(mut key), Some(last)) = (first, last) {
            loop {
                let profit = profit_by_month.get(&key).copied().unwrap_or(0.0);
                balance += profit;
                if let Some(&close) = close_by_month.get(&key) {
                    hold_value = hold_quantity * close;
                }

                months.push(MonthRow {
                    year: key.0,
                    month: key.1,
                    profit,
                    balance,
                    hold_value,
                });

                if key == last {
                    break;
                }
                key = next_month(key);
            }
        }

        let profits: Vec<f64> = months.iter().map(|m| m.profit).collect();
        let (mean_monthly_profit, std_monthly_profit) = match profits.len() {
            0 => (0.0, 0.0),
            1 => (profits[0], 0.0),
            _ => (profits.iter().mean(), profits.iter().std_dev()),
        };

        MonthlyPerformance {
            initial_balance,
            asset_initial_price,
            months,
            final_balance: balance,
            final_hold_value: hold_value,
            mean_monthly_profit,
            std_monthly_profit,
            trade_stats: TradeStats::from_trades(trades),
        }
    }

    //fixed width text report
    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();

        let _ = writeln!(out, "{}\nMonthly Performance Report\n{}\n", rule, rule);
        let _ = writeln!(out, "Initial Balance: ${:.2}", self.initial_balance);
        if let Some(price) = self.asset_initial_price {
            let _ = writeln!(out, "Asset Initial Price: ${:.4}\n", price);
        }

        let header = format!(
            "{:<10} | {:>16} | {:>16} | {:>16}",
            "Month/Year", "Profit/Loss", "Final Balance", "Hold Value"
        );
        let _ = writeln!(out, "{}\n{}", header, "-".repeat(header.len()));

        for m in &self.months {
            let _ = writeln!(
                out,
                "{:<10} | ${:>15.2} | ${:>15.2} | ${:>15.2}",
                format!("{:04}-{:02}", m.year, m.month),
                m.profit,
                m.balance,
                m.hold_value
            );
        }

        let _ = writeln!(out, "{}\n", "-".repeat(header.len()));
        let _ = writeln!(out, "Total Final Balance: ${:.2}", self.final_balance);
        let _ = writeln!(out, "Final Hold Value: ${:.2}", self.final_hold_value);
        let _ = writeln!(
            out,
            "Monthly Profit Mean/Std: ${:.2} / ${:.2}",
            self.mean_monthly_profit, self.std_monthly_profit
        );

        let stats = &self.trade_stats;
        let _ = writeln!(
            out,
            "Trades: {} (won {}, lost {})",
            stats.num_trades, stats.num_winning_trades, stats.num_losing_trades
        );
        let _ = writeln!(
            out,
            "Avg Win/Loss: ${:.2} / ${:.2}  Largest Win/Loss: ${:.2} / ${:.2}",
            stats.avg_win, stats.avg_loss, stats.largest_win, stats.largest_loss
        );
        let _ = writeln!(out, "Profit Factor: {:.3}", stats.profit_factor);
        let _ = writeln!(out, "{}", rule);

        out
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())
            .context(format!("Failed to write monthly report: {:?}", path))
    }
}

fn month_of(timestamp: i64) -> Option<(i32, u32)> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| (dt.year(), dt.month()))
}

fn next_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
