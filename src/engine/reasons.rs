use serde::{Deserialize, Serialize};

//width of the hit counter array shared by entry and exit reasons
pub const HIT_SLOTS: usize = 18;

//number of entry categories
pub const ENTRY_CATEGORIES: usize = 6;

//why a position was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryReason {
    //reference series breakout
    #[serde(rename = "BE")]
    Breakout,
    //reference series long period breakout
    #[serde(rename = "BEL")]
    LongBreakout,
    //asset recovery, also used by red alert auto reentry
    #[serde(rename = "R1")]
    Reentry,
    #[serde(rename = "R2")]
    Reentry2,
    #[serde(rename = "SP_BE")]
    SpBreakout,
    #[serde(rename = "SP_R")]
    SpReentry,
}

impl EntryReason {
    pub const ALL: [EntryReason; ENTRY_CATEGORIES] = [
        EntryReason::Breakout,
        EntryReason::LongBreakout,
        EntryReason::Reentry,
        EntryReason::Reentry2,
        EntryReason::SpBreakout,
        EntryReason::SpReentry,
    ];

    //index into the per-category trade and win counters
    pub fn category(self) -> usize {
        match self {
            EntryReason::Breakout => 0,
            EntryReason::LongBreakout => 1,
            EntryReason::Reentry => 2,
            EntryReason::Reentry2 => 3,
            EntryReason::SpBreakout => 4,
            EntryReason::SpReentry => 5,
        }
    }

    //index into the hit counter array
    pub fn hit_slot(self) -> usize {
        match self {
            EntryReason::Breakout => 0,
            EntryReason::LongBreakout => 1,
            EntryReason::Reentry => 2,
            EntryReason::Reentry2 => 3,
            EntryReason::SpBreakout => 15,
            EntryReason::SpReentry => 16,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            EntryReason::Breakout => "BE",
            EntryReason::LongBreakout => "BEL",
            EntryReason::Reentry => "R1",
            EntryReason::Reentry2 => "R2",
            EntryReason::SpBreakout => "SP_BE",
            EntryReason::SpReentry => "SP_R",
        }
    }

    //true for entries driven by the reference series
    pub fn is_breakout(self) -> bool {
        matches!(
            self,
            EntryReason::Breakout | EntryReason::LongBreakout | EntryReason::SpBreakout
        )
    }

    pub fn is_sp(self) -> bool {
        matches!(self, EntryReason::SpBreakout | EntryReason::SpReentry)
    }
}

//why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    #[serde(rename = "BX")]
    ReferenceDrop,
    #[serde(rename = "BXL")]
    ReferenceLongDrop,
    #[serde(rename = "TP")]
    TakeProfit,
    #[serde(rename = "SL")]
    StopLoss,
    #[serde(rename = "SLH")]
    HardStopLoss,
    #[serde(rename = "RA")]
    RedAlert,
    #[serde(rename = "FS")]
    FearStop,
    #[serde(rename = "LIQ")]
    Liquidation,
    #[serde(rename = "BXP")]
    ReferencePanic,
    #[serde(rename = "AXP")]
    AssetPanic,
    //forced close on the last bar
    #[serde(rename = "END")]
    SeriesEnd,
}

impl ExitReason {
    //index into the hit counter array, the forced close is not tallied
    pub fn hit_slot(self) -> Option<usize> {
        match self {
            ExitReason::ReferenceDrop => Some(5),
            ExitReason::ReferenceLongDrop => Some(6),
            ExitReason::TakeProfit => Some(7),
            ExitReason::StopLoss => Some(8),
            ExitReason::HardStopLoss => Some(9),
            ExitReason::RedAlert => Some(10),
            ExitReason::FearStop => Some(11),
            ExitReason::Liquidation => Some(12),
            ExitReason::ReferencePanic => Some(13),
            ExitReason::AssetPanic => Some(14),
            ExitReason::SeriesEnd => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ExitReason::ReferenceDrop => "BX",
            ExitReason::ReferenceLongDrop => "BXL",
            ExitReason::TakeProfit => "TP",
            ExitReason::StopLoss => "SL",
            ExitReason::HardStopLoss => "SLH",
            ExitReason::RedAlert => "RA",
            ExitReason::FearStop => "FS",
            ExitReason::Liquidation => "LIQ",
            ExitReason::ReferencePanic => "BXP",
            ExitReason::AssetPanic => "AXP",
            ExitReason::SeriesEnd => "END",
        }
    }
}
