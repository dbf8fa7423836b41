use crate::config::StrategyParams;

//confirmation stage of the dynamic take profit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TakeProfitPhase {
    Idle,
    PendingConfirmation {
        floor_pct: f64,
        confirm_sl_level: f64,
        confirm_end_level: f64,
    },
}

//what a bar did to the take profit state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeProfitAction {
    Hold,
    //a higher floor is waiting for confirmation
    Armed,
    //a pending floor was confirmed and the level moved up
    Committed,
    Exit,
}

//take profit state of the open position, reset on every close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TakeProfitState {
    //committed floor as a profit fraction over entry
    pub floor_pct: f64,
    //price at or below which the position is closed, zero when unset
    pub level: f64,
    pub phase: TakeProfitPhase,
}

impl Default for TakeProfitState {
    fn default() -> Self {
        TakeProfitState {
            floor_pct: 0.0,
            level: 0.0,
            phase: TakeProfitPhase::Idle,
        }
    }
}

impl TakeProfitState {
    pub fn reset(&mut self) {
        *self = TakeProfitState::default();
    }

    pub fn evaluate(
        &mut self,
        params: &StrategyParams,
        entry_price: f64,
        price: f64,
    ) -> TakeProfitAction {
        let profit_pct = if entry_price > 0.0 {
            (price - entry_price) / entry_price
        } else {
            0.0
        };

        if !params.take_profit_dynamic {
            return if params.take_profit_trigger > 0.0 && profit_pct >= params.take_profit_trigger
            {
                TakeProfitAction::Exit
            } else {
                TakeProfitAction::Hold
            };
        }

        match self.phase {
            TakeProfitPhase::PendingConfirmation {
                floor_pct,
                confirm_sl_level,
                confirm_end_level,
            } => {
                if price <= confirm_sl_level {
                    TakeProfitAction::Exit
                } else if price >= confirm_end_level {
                    self.floor_pct = floor_pct;
                    self.level = entry_price * (1.0 + floor_pct)
                        + entry_price * params.take_profit_update_add_to_sl;
                    self.phase = TakeProfitPhase::Idle;
                    TakeProfitAction::Committed
                } else {
                    TakeProfitAction::Hold
                }
            }
            TakeProfitPhase::Idle => {
                if self.level > 0.0 && price <= self.level {
                    return TakeProfitAction::Exit;
                }

                let target = target_floor(params, profit_pct);
                if target > self.floor_pct {
                    let target_price = entry_price * (1.0 + target);
                    self.phase = TakeProfitPhase::PendingConfirmation {
                        floor_pct: target,
                        confirm_sl_level: target_price
                            * (1.0 - params.take_profit_confirmation_sl_pct),
                        confirm_end_level: target_price
                            * (1.0 + params.take_profit_confirmation_end_pct),
                    };
                    TakeProfitAction::Armed
                } else {
                    TakeProfitAction::Hold
                }
            }
        }
    }
}

//the floor the current profit qualifies for, in whole update steps above the trigger
fn target_floor(params: &StrategyParams, profit_pct: f64) -> f64 {
    let trigger = params.take_profit_trigger;
    if trigger <= 0.0 || profit_pct < trigger {
        return 0.0;
    }

    let steps = if params.take_profit_multiplier > 0.0 {
        ((profit_pct - trigger) / params.take_profit_multiplier).floor()
    } else {
        0.0
    };

    trigger + steps * params.take_profit_update
}
