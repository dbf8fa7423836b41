use crate::config::error::ConfigError;
use crate::sweep::grid::{self, ParameterCombination};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const REFERENCE_CANDLES_KEY: &str = "candles_file_BTC";
pub const ASSET_CANDLES_KEY: &str = "candles_file_asset";
pub const FEAR_INDEX_KEY: &str = "candles_file_fear";

//sweep configuration: data sources plus one value list per parameter
#[derive(Debug, Clone)]
pub struct SweepConfig {
    //reference (market wide) candles
    pub reference_candles: PathBuf,

    //traded asset candles
    pub asset_candles: PathBuf,

    //daily sentiment, missing means every day has no data
    pub fear_index: Option<PathBuf>,

    //parameter axes in file order
    pub axes: IndexMap<String, Vec<Value>>,
}

impl SweepConfig {
    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: IndexMap<String, Value> =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_entries(raw)
    }

    //builds a configuration from already parsed top level entries
    pub fn from_entries(raw: IndexMap<String, Value>) -> Result<Self, ConfigError> {
        let reference_candles = candle_path(&raw, REFERENCE_CANDLES_KEY)?
            .ok_or_else(|| ConfigError::MissingCandleFile(REFERENCE_CANDLES_KEY.to_string()))?;
        let asset_candles = candle_path(&raw, ASSET_CANDLES_KEY)?
            .ok_or_else(|| ConfigError::MissingCandleFile(ASSET_CANDLES_KEY.to_string()))?;
        let fear_index = candle_path(&raw, FEAR_INDEX_KEY)?;

        let mut axes = IndexMap::new();
        for (key, value) in raw {
            //every candles_file_* entry is a data source, never a parameter
            if key.starts_with("candles_file") {
                continue;
            }

            let values = match value {
                Value::Array(values) => values,
                scalar => vec![scalar],
            };

            if values.is_empty() {
                return Err(ConfigError::EmptyAxis(key));
            }

            axes.insert(key, values);
        }

        Ok(SweepConfig {
            reference_candles,
            asset_candles,
            fear_index,
            axes,
        })
    }

    //number of parameter combinations the grid expands to
    pub fn combination_count(&self) -> usize {
        grid::combination_count(&self.axes)
    }

    //expands the axes into every parameter combination
    pub fn combinations(&self) -> Vec<ParameterCombination> {
        grid::expand(&self.axes)
    }
}

fn candle_path(raw: &IndexMap<String, Value>, key: &str) -> Result<Option<PathBuf>, ConfigError> {
    let value = match raw.get(key) {
        Some(value) => value,
        None => return Ok(None),
    };

    let path = match value {
        Value::String(path) => path.as_str(),
        Value::Array(values) => values
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigError::InvalidCandleFile(key.to_string()))?,
        _ => return Err(ConfigError::InvalidCandleFile(key.to_string())),
    };

    Ok(Some(PathBuf::from(path)))
}
