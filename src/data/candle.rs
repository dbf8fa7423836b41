use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

//epoch values above this are read as milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

//one close observation of a raw price series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl Candle {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Candle { timestamp, close }
    }
}

//daily sentiment score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FearReading {
    pub date: NaiveDate,
    pub fear_index: i32,
}

impl FearReading {
    pub fn new(date: NaiveDate, fear_index: i32) -> Self {
        FearReading { date, fear_index }
    }
}

//converts an epoch value in seconds or milliseconds
pub fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.abs() >= EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

//parses the timestamp spellings found in exported candle files
//naive values are taken as utc
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(epoch) = text.parse::<i64>() {
        return from_epoch(epoch);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
