use crate::data::candle::{Candle, FearReading};
use crate::data::series::{PriceSeries, NO_FEAR_DATA};
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use tracing::{info, warn};

const MINUTE: i64 = 60;

//a series resampled onto whole minutes
#[derive(Debug, Clone, PartialEq)]
struct MinuteGrid {
    start: i64,
    closes: Vec<f64>,
}

impl MinuteGrid {
    fn end(&self) -> i64 {
        self.start + (self.closes.len() as i64 - 1) * MINUTE
    }

    fn close_at(&self, timestamp: i64) -> f64 {
        self.closes[((timestamp - self.start) / MINUTE) as usize]
    }
}

//aligns reference and asset candles on a shared one-minute grid
//gaps are forward filled, only minutes present in both survive
//days without a sentiment reading get NO_FEAR_DATA
pub fn align(reference: &[Candle], asset: &[Candle], fear: &[FearReading]) -> PriceSeries {
    let (reference_grid, asset_grid) = match (resample(reference), resample(asset)) {
        (Some(reference_grid), Some(asset_grid)) => (reference_grid, asset_grid),
        _ => {
            warn!("one of the input series is empty, nothing to align");
            return PriceSeries::default();
        }
    };

    let start = reference_grid.start.max(asset_grid.start);
    let end = reference_grid.end().min(asset_grid.end());
    if start > end {
        warn!("reference and asset series do not overlap");
        return PriceSeries::default();
    }

    let fear_by_date: HashMap<NaiveDate, i32> = fear
        .iter()
        .map(|reading| (reading.date, reading.fear_index))
        .collect();

    let rows = ((end - start) / MINUTE + 1) as usize;
    let mut timestamps = Vec::with_capacity(rows);
    let mut asset_close = Vec::with_capacity(rows);
    let mut reference_close = Vec::with_capacity(rows);
    let mut fear_index = Vec::with_capacity(rows);

    for ts in (start..=end).step_by(MINUTE as usize) {
        let fear_today = DateTime::from_timestamp(ts, 0)
            .and_then(|dt| fear_by_date.get(&dt.date_naive()).copied())
            .unwrap_or(NO_FEAR_DATA);

        timestamps.push(ts);
        asset_close.push(asset_grid.close_at(ts));
        reference_close.push(reference_grid.close_at(ts));
        fear_index.push(fear_today);
    }

    info!(rows, start, end, "aligned series");

    //columns are built in lockstep above
    PriceSeries::from_timestamps(timestamps, asset_close, reference_close, fear_index)
        .unwrap_or_default()
}

//resamples to whole minutes, each minute takes the last close at or before it
fn resample(candles: &[Candle]) -> Option<MinuteGrid> {
    let mut points: Vec<(i64, f64)> = candles
        .iter()
        .map(|candle| (candle.timestamp.timestamp(), candle.close))
        .collect();
    //stable, so the later duplicate of a timestamp wins
    points.sort_by_key(|&(ts, _)| ts);

    let first = points.first()?.0;
    let last = points.last()?.0;

    let start = ceil_to_minute(first);
    let end = last.div_euclid(MINUTE) * MINUTE;
    if start > end {
        return None;
    }

    let mut closes = Vec::with_capacity(((end - start) / MINUTE + 1) as usize);
    let mut cursor = 0;
    let mut current = points[0].1;

    for ts in (start..=end).step_by(MINUTE as usize) {
        while cursor < points.len() && points[cursor].0 <= ts {
            current = points[cursor].1;
            cursor += 1;
        }
        closes.push(current);
    }

    Some(MinuteGrid { start, closes })
}

fn ceil_to_minute(ts: i64) -> i64 {
    -((-ts).div_euclid(MINUTE)) * MINUTE
}
