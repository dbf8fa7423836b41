use crate::config::sweep_config::{ASSET_CANDLES_KEY, FEAR_INDEX_KEY, REFERENCE_CANDLES_KEY};
use crate::config::{ConfigError, StrategyParams, SweepConfig};
use anyhow::Context;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::path::Path;

//one point of the parameter grid
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCombination {
    //position in the expanded grid, starting at 0
    pub index: usize,
    pub overrides: IndexMap<String, Value>,
}

impl ParameterCombination {
    //test id shown in reports and trade logs
    pub fn test_id(&self) -> usize {
        self.index + 1
    }

    pub fn resolve(&self) -> Result<StrategyParams, ConfigError> {
        StrategyParams::from_overrides(&self.overrides)
    }
}

pub fn combination_count(axes: &IndexMap<String, Vec<Value>>) -> usize {
    axes.values().map(Vec::len).product()
}

//cartesian product in key order, the last key varies fastest
pub fn expand(axes: &IndexMap<String, Vec<Value>>) -> Vec<ParameterCombination> {
    let total = combination_count(axes);
    let lengths: Vec<usize> = axes.values().map(Vec::len).collect();
    let mut cursor = vec![0usize; lengths.len()];
    let mut combinations = Vec::with_capacity(total);

    for index in 0..total {
        let overrides = axes
            .iter()
            .zip(&cursor)
            .map(|((key, values), &position)| (key.clone(), values[position].clone()))
            .collect();
        combinations.push(ParameterCombination { index, overrides });

        //odometer increment from the last axis
        for axis in (0..cursor.len()).rev() {
            cursor[axis] += 1;
            if cursor[axis] < lengths[axis] {
                break;
            }
            cursor[axis] = 0;
        }
    }

    combinations
}

//writes the expanded grid, one object per combination with every value
//wrapped in a one element list so each entry is itself a valid sweep config
pub fn write_grid_file(path: &Path, config: &SweepConfig) -> anyhow::Result<usize> {
    let mut sources = IndexMap::new();
    sources.insert(
        REFERENCE_CANDLES_KEY.to_string(),
        json!([config.reference_candles]),
    );
    sources.insert(ASSET_CANDLES_KEY.to_string(), json!([config.asset_candles]));
    if let Some(fear_index) = &config.fear_index {
        sources.insert(FEAR_INDEX_KEY.to_string(), json!([fear_index]));
    }

    let entries: Vec<IndexMap<String, Value>> = config
        .combinations()
        .into_iter()
        .map(|combination| {
            let mut entry = sources.clone();
            for (key, value) in combination.overrides {
                entry.insert(key, Value::Array(vec![value]));
            }
            entry
        })
        .collect();

    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json).context(format!("Failed to write grid file: {:?}", path))?;
    Ok(entries.len())
}
