use crate::engine::reasons::EntryReason;
use crate::engine::regime::Regime;

//a request to open a position at the current bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryOrder {
    pub reason: EntryReason,
    pub regime: Regime,
    pub index: usize,
    pub time: i64,
    pub price: f64,
    pub leverage: f64,
    pub fear_index: i32,
}

//the single open long position
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub reason: EntryReason,

    //regime in force on the entry day
    pub regime: Regime,

    //bar index and unix seconds of the entry
    pub entry_index: usize,
    pub entry_time: i64,

    pub entry_price: f64,

    //units bought after the entry fee
    pub quantity: f64,

    //own capital committed, before leverage
    pub base_capital: f64,

    //base capital times leverage
    pub leveraged_capital: f64,

    pub leverage: f64,

    pub fear_index_at_entry: i32,

    //highest price seen while open, starts at the entry price
    pub high_water_mark: f64,
}

impl OpenPosition {
    //fraction the price has fallen below the entry
    pub fn drawdown(&self, price: f64) -> f64 {
        if self.entry_price > 0.0 {
            (self.entry_price - price) / self.entry_price
        } else {
            0.0
        }
    }

    pub fn profit_pct(&self, price: f64) -> f64 {
        if self.entry_price > 0.0 {
            (price - self.entry_price) / self.entry_price
        } else {
            0.0
        }
    }

    //fraction the price has fallen below the high water mark
    pub fn trailing_drawdown(&self, price: f64) -> f64 {
        if self.high_water_mark > 0.0 {
            (self.high_water_mark - price) / self.high_water_mark
        } else {
            0.0
        }
    }

    //leverage above 1 loses the whole base once the drop reaches 1/leverage
    pub fn is_liquidated(&self, price: f64) -> bool {
        self.leverage > 1.0 && self.drawdown(price) >= 1.0 / self.leverage
    }

    pub fn update_high_water_mark(&mut self, price: f64) {
        self.high_water_mark = self.high_water_mark.max(price);
    }

    pub fn minutes_since_entry(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    //sale value after the exit fee
    pub fn net_proceeds(&self, price: f64, fee: f64) -> f64 {
        self.quantity * price * (1.0 - fee)
    }

    //realised profit relative to the leveraged notional
    pub fn profit(&self, price: f64, fee: f64) -> f64 {
        self.net_proceeds(price, fee) - self.leveraged_capital
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(entry_price: f64, leverage: f64) -> OpenPosition {
        OpenPosition {
            reason: EntryReason::Reentry,
            regime: Regime::Standard,
            entry_index: 10,
            entry_time: 0,
            entry_price,
            quantity: 10.0,
            base_capital: 1000.0,
            leveraged_capital: 1000.0 * leverage,
            leverage,
            fear_index_at_entry: 50,
            high_water_mark: entry_price,
        }
    }

    #[test]
    fn liquidation_needs_leverage_above_one() {
        assert!(position(100.0, 2.0).is_liquidated(50.0));
        assert!(!position(100.0, 2.0).is_liquidated(50.5));
        assert!(!position(100.0, 1.0).is_liquidated(1.0));
    }

    #[test]
    fn zero_entry_price_reports_no_move() {
        let p = position(0.0, 1.0);
        assert_eq!(p.drawdown(10.0), 0.0);
        assert_eq!(p.profit_pct(10.0), 0.0);
    }

    #[test]
    fn trailing_drawdown_uses_highest_price() {
        let mut p = position(100.0, 1.0);
        p.update_high_water_mark(120.0);
        p.update_high_water_mark(110.0);
        assert_eq!(p.high_water_mark, 120.0);
        assert!((p.trailing_drawdown(108.0) - 0.1).abs() < 1e-12);
        assert_eq!(p.minutes_since_entry(25), 15);
    }
}
