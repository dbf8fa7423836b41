use crate::portfolio::position::{EntryOrder, OpenPosition};

//cash side of the simulation, at most one position draws on it
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    //free cash, zero while a position is open
    pub balance: f64,

    //cash set aside when only a fraction of the balance was committed
    pub reserved: f64,
}

impl Account {
    pub fn new(initial_balance: f64) -> Self {
        Account {
            balance: initial_balance,
            reserved: 0.0,
        }
    }

    pub fn can_enter(&self) -> bool {
        self.balance > 0.0
    }

    //commits the balance (or a fraction of it) to a new position
    //returns none for a non-positive price so no trade is opened
    pub fn open(
        &mut self,
        order: EntryOrder,
        fraction: Option<f64>,
        fee: f64,
    ) -> Option<OpenPosition> {
        if order.price <= 0.0 || !self.can_enter() {
            return None;
        }

        let (base_capital, reserved) = match fraction {
            Some(fraction) => {
                let base = self.balance * fraction;
                (base, self.balance - base)
            }
            None => (self.balance, 0.0),
        };

        let leveraged_capital = base_capital * order.leverage;
        let quantity = leveraged_capital * (1.0 - fee) / order.price;

        self.reserved = reserved;
        self.balance = 0.0;

        Some(OpenPosition {
            reason: order.reason,
            regime: order.regime,
            entry_index: order.index,
            entry_time: order.time,
            entry_price: order.price,
            quantity,
            base_capital,
            leveraged_capital,
            leverage: order.leverage,
            fear_index_at_entry: order.fear_index,
            high_water_mark: order.price,
        })
    }

    //closes the position at the given price and returns its profit
    //the balance never goes below zero
    pub fn settle(&mut self, position: &OpenPosition, price: f64, fee: f64) -> f64 {
        let profit = position.profit(price, fee);
        self.balance = (self.reserved + position.base_capital + profit).max(0.0);
        self.reserved = 0.0;
        profit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reasons::EntryReason;
    use crate::engine::regime::Regime;

    fn order(price: f64, leverage: f64) -> EntryOrder {
        EntryOrder {
            reason: EntryReason::Breakout,
            regime: Regime::Standard,
            index: 0,
            time: 0,
            price,
            leverage,
            fear_index: 40,
        }
    }

    #[test]
    fn commits_whole_balance_without_fraction() {
        let mut account = Account::new(1000.0);
        let position = account.open(order(100.0, 2.0), None, 0.001).unwrap();

        assert_eq!(account.balance, 0.0);
        assert_eq!(account.reserved, 0.0);
        assert_eq!(position.leveraged_capital, 2000.0);
        assert!((position.quantity - 19.98).abs() < 1e-9);
    }

    #[test]
    fn fraction_keeps_remainder_in_reserve() {
        let mut account = Account::new(1000.0);
        let position = account.open(order(50.0, 1.0), Some(0.25), 0.0).unwrap();

        assert_eq!(position.base_capital, 250.0);
        assert_eq!(account.reserved, 750.0);

        let profit = account.settle(&position, 60.0, 0.0);
        assert!((profit - 50.0).abs() < 1e-9);
        assert!((account.balance - 1050.0).abs() < 1e-9);
        assert_eq!(account.reserved, 0.0);
    }

    #[test]
    fn settle_clamps_balance_at_zero() {
        let mut account = Account::new(1000.0);
        let position = account.open(order(100.0, 3.0), None, 0.0).unwrap();

        account.settle(&position, 50.0, 0.0);
        assert_eq!(account.balance, 0.0);
    }

    #[test]
    fn refuses_non_positive_price_or_empty_balance() {
        let mut account = Account::new(1000.0);
        assert!(account.open(order(0.0, 1.0), None, 0.0).is_none());
        assert_eq!(account.balance, 1000.0);

        let mut broke = Account::new(0.0);
        assert!(broke.open(order(10.0, 1.0), None, 0.0).is_none());
    }
}
