use crate::engine::reasons::{EntryReason, ExitReason};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

//one closed round trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    //unix seconds
    pub entry_time: i64,
    pub exit_time: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit: f64,
    pub entry_reason: EntryReason,
    pub exit_reason: ExitReason,
    pub fear_index_at_entry: i32,
    pub quantity: f64,
    pub leveraged_capital: f64,
}

impl TradeRecord {
    //formats a unix timestamp as "%Y-%m-%d %H:%M:%S" in utc
    pub fn format_time(timestamp: i64) -> String {
        DateTime::from_timestamp(timestamp, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| timestamp.to_string())
    }

    pub fn entry_time_str(&self) -> String {
        Self::format_time(self.entry_time)
    }

    pub fn exit_time_str(&self) -> String {
        Self::format_time(self.exit_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_utc_seconds() {
        assert_eq!(TradeRecord::format_time(1_704_067_260), "2024-01-01 00:01:00");
    }
}
