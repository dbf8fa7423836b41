use chrono::{DateTime, Datelike};
use thiserror::Error;

//fear index value for days without a reading
pub const NO_FEAR_DATA: i32 = -1;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Error, Debug, PartialEq)]
pub enum SeriesError {
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

//aligned one-minute series consumed by the simulation kernel
//columns always share one length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    timestamps: Vec<i64>,
    asset_close: Vec<f64>,
    reference_close: Vec<f64>,
    fear_index: Vec<i32>,
    day_of_year: Vec<u32>,
}

impl PriceSeries {
    //creates a series from explicit columns
    pub fn new(
        timestamps: Vec<i64>,
        asset_close: Vec<f64>,
        reference_close: Vec<f64>,
        fear_index: Vec<i32>,
        day_of_year: Vec<u32>,
    ) -> Result<Self, SeriesError> {
        let expected = timestamps.len();
        check_len("asset_close", expected, asset_close.len())?;
        check_len("reference_close", expected, reference_close.len())?;
        check_len("fear_index", expected, fear_index.len())?;
        check_len("day_of_year", expected, day_of_year.len())?;

        Ok(PriceSeries {
            timestamps,
            asset_close,
            reference_close,
            fear_index,
            day_of_year,
        })
    }

    //creates a series deriving the utc day of year from each timestamp
    pub fn from_timestamps(
        timestamps: Vec<i64>,
        asset_close: Vec<f64>,
        reference_close: Vec<f64>,
        fear_index: Vec<i32>,
    ) -> Result<Self, SeriesError> {
        let day_of_year = timestamps
            .iter()
            .map(|&ts| {
                DateTime::from_timestamp(ts, 0)
                    .map(|dt| dt.ordinal())
                    .unwrap_or(0)
            })
            .collect();

        Self::new(timestamps, asset_close, reference_close, fear_index, day_of_year)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn asset_close(&self) -> &[f64] {
        &self.asset_close
    }

    pub fn reference_close(&self) -> &[f64] {
        &self.reference_close
    }

    pub fn fear_index(&self) -> &[i32] {
        &self.fear_index
    }

    pub fn day_of_year(&self) -> &[u32] {
        &self.day_of_year
    }

    //keeps the trailing window of whole days ending at the last timestamp
    pub fn last_days(&self, days: u32) -> PriceSeries {
        let end = match self.timestamps.last() {
            Some(&end) => end,
            None => return self.clone(),
        };

        let start = end - i64::from(days) * SECONDS_PER_DAY;
        let first = self.timestamps.partition_point(|&ts| ts < start);

        PriceSeries {
            timestamps: self.timestamps[first..].to_vec(),
            asset_close: self.asset_close[first..].to_vec(),
            reference_close: self.reference_close[first..].to_vec(),
            fear_index: self.fear_index[first..].to_vec(),
            day_of_year: self.day_of_year[first..].to_vec(),
        }
    }
}

fn check_len(column: &'static str, expected: usize, actual: usize) -> Result<(), SeriesError> {
    if expected != actual {
        return Err(SeriesError::LengthMismatch {
            column,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_columns() {
        let err = PriceSeries::new(
            vec![0, 60],
            vec![1.0, 2.0],
            vec![1.0],
            vec![NO_FEAR_DATA; 2],
            vec![1, 1],
        )
        .unwrap_err();

        assert_eq!(
            err,
            SeriesError::LengthMismatch {
                column: "reference_close",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn derives_day_of_year_in_utc() {
        //2024-02-01 23:59 and 2024-02-02 00:00
        let series = PriceSeries::from_timestamps(
            vec![1_706_831_940, 1_706_832_000],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![NO_FEAR_DATA; 2],
        )
        .unwrap();

        assert_eq!(series.day_of_year(), &[32, 33]);
    }

    #[test]
    fn last_days_keeps_trailing_window() {
        let timestamps: Vec<i64> = (0..5).map(|d| d * SECONDS_PER_DAY).collect();
        let closes: Vec<f64> = (0..5).map(|d| d as f64).collect();
        let series = PriceSeries::from_timestamps(
            timestamps,
            closes.clone(),
            closes,
            vec![NO_FEAR_DATA; 5],
        )
        .unwrap();

        let tail = series.last_days(2);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.asset_close(), &[2.0, 3.0, 4.0]);
        assert!(PriceSeries::default().last_days(3).is_empty());
    }
}
