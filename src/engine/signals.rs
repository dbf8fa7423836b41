use crate::config::StrategyParams;
use crate::data::PriceSeries;
use crate::engine::reasons::EntryReason;
use crate::engine::regime::{RegimeProfile, Trigger};

//relative change over the lookback, none when the window reaches before
//the first bar or the past price is not positive
pub fn pct_change(closes: &[f64], index: usize, lookback: usize) -> Option<f64> {
    let past = *closes.get(index.checked_sub(lookback)?)?;
    if past <= 0.0 {
        return None;
    }
    let current = *closes.get(index)?;
    Some((current - past) / past)
}

pub fn rises_by(closes: &[f64], index: usize, trigger: Trigger) -> bool {
    pct_change(closes, index, trigger.period).map_or(false, |change| change >= trigger.value)
}

pub fn falls_by(closes: &[f64], index: usize, trigger: Trigger) -> bool {
    pct_change(closes, index, trigger.period).map_or(false, |change| change <= -trigger.value)
}

//the six entry conditions on one bar, after filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntrySignals {
    pub breakout: bool,
    pub long_breakout: bool,
    pub reentry: bool,
    pub reentry_2: bool,
    pub sp_breakout: bool,
    pub sp_reentry: bool,
}

impl EntrySignals {
    pub fn evaluate(
        series: &PriceSeries,
        index: usize,
        params: &StrategyParams,
        profile: &RegimeProfile,
        fear_stop_today: bool,
    ) -> Self {
        let reference = series.reference_close();
        let asset = series.asset_close();

        let mut signals = EntrySignals {
            breakout: rises_by(reference, index, profile.breakout_entry),
            long_breakout: rises_by(reference, index, profile.long_breakout_entry),
            reentry: rises_by(asset, index, profile.reentry),
            reentry_2: rises_by(asset, index, profile.reentry_2),
            sp_breakout: rises_by(
                reference,
                index,
                Trigger::new(params.sp_btc_entry_trigger_value, params.sp_btc_entry_trigger_period),
            ),
            sp_reentry: rises_by(
                asset,
                index,
                Trigger::new(params.sp_reentry_pct_values, params.sp_reentry_window_values),
            ),
        };

        //the reference must be moving up before asset entries count
        if params.btc_minimum_enable
            && !rises_by(
                reference,
                index,
                Trigger::new(params.btc_minimum_pct_to_entry, params.btc_minimum_window),
            )
        {
            signals.suppress_reentries();
        }

        //and the asset must be moving up before reference entries count
        if params.asset_minimum_enable
            && !rises_by(
                asset,
                index,
                Trigger::new(params.asset_minimum_pct_to_entry, params.asset_minimum_window),
            )
        {
            signals.suppress_breakouts();
        }

        if fear_stop_today {
            signals.suppress_reentries();
            if params.fear_stop_btc_entry {
                signals.suppress_breakouts();
            }
        }

        signals
    }

    fn suppress_reentries(&mut self) {
        self.reentry = false;
        self.reentry_2 = false;
        self.sp_reentry = false;
    }

    fn suppress_breakouts(&mut self) {
        self.breakout = false;
        self.long_breakout = false;
        self.sp_breakout = false;
    }

    pub fn any(&self) -> bool {
        self.winner().is_some()
    }

    //true when any reference driven entry fired
    pub fn is_breakout(&self) -> bool {
        self.breakout || self.long_breakout || self.sp_breakout
    }

    //highest priority signal: SP_BE, SP_R, BE, BEL, R1, R2
    pub fn winner(&self) -> Option<EntryReason> {
        if self.sp_breakout {
            Some(EntryReason::SpBreakout)
        } else if self.sp_reentry {
            Some(EntryReason::SpReentry)
        } else if self.breakout {
            Some(EntryReason::Breakout)
        } else if self.long_breakout {
            Some(EntryReason::LongBreakout)
        } else if self.reentry {
            Some(EntryReason::Reentry)
        } else if self.reentry_2 {
            Some(EntryReason::Reentry2)
        } else {
            None
        }
    }
}
