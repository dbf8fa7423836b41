use crate::data::candle::{from_epoch, parse_timestamp, Candle, FearReading};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CsvCandleRecord {
    timestamp: String,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct JsonCandleRecord {
    timestamp: Value,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct CsvFearRecord {
    timestamp: String,
    fear_index: i32,
}

#[derive(Debug, Deserialize)]
struct JsonFearRecord {
    timestamp: Value,
    fear_index: i32,
}

//loads candles from a csv or json file (chosen by extension)
pub fn load_candles<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>> {
    let path = path.as_ref();

    let mut candles = if is_json(path) {
        let records: Vec<JsonCandleRecord> = read_json(path)?;
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let timestamp = json_timestamp(&record.timestamp)
                    .with_context(|| format!("Bad timestamp in record {} of {:?}", index, path))?;
                Ok(Candle::new(timestamp, record.close))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .context(format!("Failed to open CSV file: {:?}", path))?;

        let mut candles = Vec::new();
        for (index, result) in reader.deserialize().enumerate() {
            let record: CsvCandleRecord =
                result.context(format!("Failed to parse CSV record at line {}", index + 2))?;
            let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| {
                anyhow!(
                    "Failed to parse timestamp '{}' at line {}",
                    record.timestamp,
                    index + 2
                )
            })?;
            candles.push(Candle::new(timestamp, record.close));
        }
        candles
    };

    //sort by timestamp to ensure chronological order
    candles.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    info!(path = %path.display(), candles = candles.len(), "loaded candles");
    Ok(candles)
}

//loads the daily sentiment series from a csv or json file
pub fn load_fear_index<P: AsRef<Path>>(path: P) -> Result<Vec<FearReading>> {
    let path = path.as_ref();

    let raw: Vec<(DateTime<Utc>, i32)> = if is_json(path) {
        let records: Vec<JsonFearRecord> = read_json(path)?;
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let timestamp = json_timestamp(&record.timestamp)
                    .with_context(|| format!("Bad timestamp in record {} of {:?}", index, path))?;
                Ok((timestamp, record.fear_index))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .context(format!("Failed to open CSV file: {:?}", path))?;

        let mut raw = Vec::new();
        for (index, result) in reader.deserialize().enumerate() {
            let record: CsvFearRecord =
                result.context(format!("Failed to parse CSV record at line {}", index + 2))?;
            let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| {
                anyhow!(
                    "Failed to parse timestamp '{}' at line {}",
                    record.timestamp,
                    index + 2
                )
            })?;
            raw.push((timestamp, record.fear_index));
        }
        raw
    };

    let mut readings: Vec<FearReading> = raw
        .into_iter()
        .map(|(timestamp, fear_index)| FearReading::new(timestamp.date_naive(), fear_index))
        .collect();
    readings.sort_by(|a, b| a.date.cmp(&b.date));

    info!(path = %path.display(), days = readings.len(), "loaded fear index");
    Ok(readings)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to open JSON file: {:?}", path))?;
    serde_json::from_str(&contents).context(format!("Failed to parse JSON file: {:?}", path))
}

fn json_timestamp(value: &Value) -> Result<DateTime<Utc>> {
    let parsed = match value {
        Value::Number(number) => number.as_i64().and_then(from_epoch),
        Value::String(text) => parse_timestamp(text),
        _ => None,
    };
    parsed.ok_or_else(|| anyhow!("Unsupported timestamp value {}", value))
}
