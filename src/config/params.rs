use crate::config::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

//trigger magnitude that no percentage move can reach
pub const DISABLED_TRIGGER: f64 = 999.0;

//keys with no usable default, every combination must carry them
pub const REQUIRED_KEYS: &[&str] = &[
    "btc_entry_trigger_value",
    "btc_entry_trigger_period",
    "btc_exit_trigger_value",
    "btc_exit_trigger_period",
    "btc_entry_long_trigger_value",
    "btc_entry_long_trigger_period",
    "btc_exit_long_trigger_value",
    "btc_exit_long_trigger_period",
    "reentry_pct_values",
    "reentry_window_values",
    "reentry_pct_values_2",
    "reentry_window_values_2",
    "btc_exit_panic_trigger_value",
    "btc_exit_panic_trigger_period",
    "asset_exit_panic_trigger_value",
    "asset_exit_panic_trigger_period",
    "fear_high_override",
    "fear_high_value",
    "fear_high_btc_entry_trigger_value",
    "fear_high_btc_entry_trigger_period",
    "fear_high_btc_exit_trigger_value",
    "fear_high_btc_exit_trigger_period",
    "fear_high_btc_entry_long_trigger_value",
    "fear_high_btc_entry_long_trigger_period",
    "fear_high_btc_exit_long_trigger_value",
    "fear_high_btc_exit_long_trigger_period",
    "fear_high_reentry_pct_values",
    "fear_high_reentry_window_values",
    "fear_high_reentry_pct_values_2",
    "fear_high_reentry_window_values_2",
    "fear_low_override",
    "fear_low_value",
    "fear_low_btc_entry_trigger_value",
    "fear_low_btc_entry_trigger_period",
    "fear_low_btc_exit_trigger_value",
    "fear_low_btc_exit_trigger_period",
    "fear_low_btc_entry_long_trigger_value",
    "fear_low_btc_entry_long_trigger_period",
    "fear_low_btc_exit_long_trigger_value",
    "fear_low_btc_exit_long_trigger_period",
    "fear_low_reentry_pct_values",
    "fear_low_reentry_window_values",
    "fear_low_reentry_pct_values_2",
    "fear_low_reentry_window_values_2",
];

//complete parameter record for one kernel invocation
//field names serialize to the configuration keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyParams {
    //account
    pub initial_balance: f64,
    pub fixed_fee: f64,
    //percent of balance committed per entry, 0 commits everything
    pub entry_percentage: f64,

    //standard leverage
    #[serde(rename = "leverage_BTC")]
    pub leverage_btc: f64,
    #[serde(rename = "leverage_Reentry")]
    pub leverage_reentry: f64,
    #[serde(rename = "leverage_SP")]
    pub leverage_sp: f64,

    //high fear leverage
    #[serde(rename = "fear_high_leverage_BTC")]
    pub fear_high_leverage_btc: f64,
    #[serde(rename = "fear_high_leverage_Reentry")]
    pub fear_high_leverage_reentry: f64,
    #[serde(rename = "fear_high_leverage_SP")]
    pub fear_high_leverage_sp: f64,

    //low fear leverage
    #[serde(rename = "fear_low_leverage_BTC")]
    pub fear_low_leverage_btc: f64,
    #[serde(rename = "fear_low_leverage_Reentry")]
    pub fear_low_leverage_reentry: f64,
    #[serde(rename = "fear_low_leverage_SP")]
    pub fear_low_leverage_sp: f64,

    //red alert 1 (drawdown from last exit)
    pub red_alert_trigger_pct: f64,
    pub red_alert_reset_pct: f64,
    pub red_alert_reset_auto_entry: bool,
    pub red_alert_block_btc_entries: bool,
    pub exit_position_red_alert: bool,

    //red alert 2 (drop over a window)
    pub red_alert2_trigger_pct: f64,
    pub red_alert2_window: usize,
    pub red_alert2_reset_pct: f64,
    pub red_alert2_reset_auto_entry: bool,

    //daily caps
    pub max_entries_day: u32,
    //when false breakout entries ignore the daily cap
    pub max_entries_day_btc: bool,

    //stop losses
    pub disable_stop_loss: bool,
    pub stop_loss: f64,
    pub stop_loss_cooldown: usize,
    pub stop_loss_hard: f64,
    pub cooldown_sl: u32,

    //take profit
    pub take_profit_dynamic: bool,
    pub take_profit_trigger: f64,
    pub take_profit_update: f64,
    pub take_profit_multiplier: f64,
    pub take_profit_confirmation_sl_pct: f64,
    pub take_profit_confirmation_end_pct: f64,
    pub take_profit_update_add_to_sl: f64,
    //accepted for config compatibility, updates are gated by take_profit_update > 0
    pub take_profit_update_enable: bool,
    pub cooldown_tp: u32,

    //standard triggers
    pub btc_entry_trigger_value: f64,
    pub btc_entry_trigger_period: usize,
    pub btc_exit_trigger_value: f64,
    pub btc_exit_trigger_period: usize,
    pub btc_entry_long_trigger_value: f64,
    pub btc_entry_long_trigger_period: usize,
    pub btc_exit_long_trigger_value: f64,
    pub btc_exit_long_trigger_period: usize,
    pub reentry_pct_values: f64,
    pub reentry_window_values: usize,
    pub reentry_pct_values_2: f64,
    pub reentry_window_values_2: usize,

    //panic exits (regime independent)
    pub btc_exit_panic_trigger_value: f64,
    pub btc_exit_panic_trigger_period: usize,
    pub asset_exit_panic_trigger_value: f64,
    pub asset_exit_panic_trigger_period: usize,

    //sp entries (regime independent triggers)
    pub sp_btc_entry_trigger_value: f64,
    pub sp_btc_entry_trigger_period: usize,
    pub sp_reentry_pct_values: f64,
    pub sp_reentry_window_values: usize,

    //high fear regime
    pub fear_high_override: bool,
    pub fear_high_value: i32,
    pub fear_high_btc_entry_trigger_value: f64,
    pub fear_high_btc_entry_trigger_period: usize,
    pub fear_high_btc_exit_trigger_value: f64,
    pub fear_high_btc_exit_trigger_period: usize,
    pub fear_high_btc_entry_long_trigger_value: f64,
    pub fear_high_btc_entry_long_trigger_period: usize,
    pub fear_high_btc_exit_long_trigger_value: f64,
    pub fear_high_btc_exit_long_trigger_period: usize,
    pub fear_high_reentry_pct_values: f64,
    pub fear_high_reentry_window_values: usize,
    pub fear_high_reentry_pct_values_2: f64,
    pub fear_high_reentry_window_values_2: usize,

    //low fear regime
    pub fear_low_override: bool,
    pub fear_low_value: i32,
    pub fear_low_btc_entry_trigger_value: f64,
    pub fear_low_btc_entry_trigger_period: usize,
    pub fear_low_btc_exit_trigger_value: f64,
    pub fear_low_btc_exit_trigger_period: usize,
    pub fear_low_btc_entry_long_trigger_value: f64,
    pub fear_low_btc_entry_long_trigger_period: usize,
    pub fear_low_btc_exit_long_trigger_value: f64,
    pub fear_low_btc_exit_long_trigger_period: usize,
    pub fear_low_reentry_pct_values: f64,
    pub fear_low_reentry_window_values: usize,
    pub fear_low_reentry_pct_values_2: f64,
    pub fear_low_reentry_window_values_2: usize,

    //fear stop
    pub fear_stop: bool,
    pub fear_stop_value: i32,
    pub fear_stop_btc_entry: bool,
    pub fear_stop_exit_position: bool,

    //minimum momentum filters
    pub btc_minimum_enable: bool,
    pub btc_minimum_pct_to_entry: f64,
    pub btc_minimum_window: usize,
    pub asset_minimum_enable: bool,
    pub asset_minimum_pct_to_entry: f64,
    pub asset_minimum_window: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            initial_balance: 1000.0,
            fixed_fee: 0.001,
            entry_percentage: 0.0,

            leverage_btc: 1.0,
            leverage_reentry: 1.0,
            leverage_sp: 1.0,
            fear_high_leverage_btc: 1.0,
            fear_high_leverage_reentry: 1.0,
            fear_high_leverage_sp: 1.0,
            fear_low_leverage_btc: 1.0,
            fear_low_leverage_reentry: 1.0,
            fear_low_leverage_sp: 1.0,

            red_alert_trigger_pct: DISABLED_TRIGGER,
            red_alert_reset_pct: DISABLED_TRIGGER,
            red_alert_reset_auto_entry: false,
            red_alert_block_btc_entries: false,
            exit_position_red_alert: false,

            red_alert2_trigger_pct: 0.085,
            red_alert2_window: 500,
            red_alert2_reset_pct: 0.03,
            red_alert2_reset_auto_entry: false,

            max_entries_day: 999,
            max_entries_day_btc: true,

            disable_stop_loss: false,
            stop_loss: 0.0,
            stop_loss_cooldown: 0,
            stop_loss_hard: 0.0,
            cooldown_sl: 0,

            take_profit_dynamic: false,
            take_profit_trigger: 0.0,
            take_profit_update: 0.0,
            take_profit_multiplier: 0.0,
            take_profit_confirmation_sl_pct: 0.0,
            take_profit_confirmation_end_pct: 0.0,
            take_profit_update_add_to_sl: 0.0,
            take_profit_update_enable: false,
            cooldown_tp: 0,

            btc_entry_trigger_value: DISABLED_TRIGGER,
            btc_entry_trigger_period: 0,
            btc_exit_trigger_value: DISABLED_TRIGGER,
            btc_exit_trigger_period: 0,
            btc_entry_long_trigger_value: DISABLED_TRIGGER,
            btc_entry_long_trigger_period: 0,
            btc_exit_long_trigger_value: DISABLED_TRIGGER,
            btc_exit_long_trigger_period: 0,
            reentry_pct_values: DISABLED_TRIGGER,
            reentry_window_values: 0,
            reentry_pct_values_2: DISABLED_TRIGGER,
            reentry_window_values_2: 0,

            btc_exit_panic_trigger_value: DISABLED_TRIGGER,
            btc_exit_panic_trigger_period: 0,
            asset_exit_panic_trigger_value: DISABLED_TRIGGER,
            asset_exit_panic_trigger_period: 0,

            sp_btc_entry_trigger_value: DISABLED_TRIGGER,
            sp_btc_entry_trigger_period: 0,
            sp_reentry_pct_values: DISABLED_TRIGGER,
            sp_reentry_window_values: 0,

            fear_high_override: false,
            fear_high_value: 100,
            fear_high_btc_entry_trigger_value: DISABLED_TRIGGER,
            fear_high_btc_entry_trigger_period: 0,
            fear_high_btc_exit_trigger_value: DISABLED_TRIGGER,
            fear_high_btc_exit_trigger_period: 0,
            fear_high_btc_entry_long_trigger_value: DISABLED_TRIGGER,
            fear_high_btc_entry_long_trigger_period: 0,
            fear_high_btc_exit_long_trigger_value: DISABLED_TRIGGER,
            fear_high_btc_exit_long_trigger_period: 0,
            fear_high_reentry_pct_values: DISABLED_TRIGGER,
            fear_high_reentry_window_values: 0,
            fear_high_reentry_pct_values_2: DISABLED_TRIGGER,
            fear_high_reentry_window_values_2: 0,

            fear_low_override: false,
            fear_low_value: 0,
            fear_low_btc_entry_trigger_value: DISABLED_TRIGGER,
            fear_low_btc_entry_trigger_period: 0,
            fear_low_btc_exit_trigger_value: DISABLED_TRIGGER,
            fear_low_btc_exit_trigger_period: 0,
            fear_low_btc_entry_long_trigger_value: DISABLED_TRIGGER,
            fear_low_btc_entry_long_trigger_period: 0,
            fear_low_btc_exit_long_trigger_value: DISABLED_TRIGGER,
            fear_low_btc_exit_long_trigger_period: 0,
            fear_low_reentry_pct_values: DISABLED_TRIGGER,
            fear_low_reentry_window_values: 0,
            fear_low_reentry_pct_values_2: DISABLED_TRIGGER,
            fear_low_reentry_window_values_2: 0,

            fear_stop: false,
            fear_stop_value: 0,
            fear_stop_btc_entry: false,
            fear_stop_exit_position: false,

            btc_minimum_enable: false,
            btc_minimum_pct_to_entry: 0.0,
            btc_minimum_window: 1,
            asset_minimum_enable: false,
            asset_minimum_pct_to_entry: 0.0,
            asset_minimum_window: 1,
        }
    }
}

impl StrategyParams {
    //builds a parameter record from one grid combination
    //defaults are filled here so the kernel never sees a partial record
    pub fn from_overrides(overrides: &IndexMap<String, Value>) -> Result<Self, ConfigError> {
        if let Some(missing) = REQUIRED_KEYS
            .iter()
            .find(|key| !overrides.contains_key(**key))
        {
            return Err(ConfigError::MissingParameter(missing.to_string()));
        }

        let object: serde_json::Map<String, Value> = overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        serde_json::from_value(Value::Object(object)).map_err(ConfigError::InvalidParameters)
    }

    //entry fraction as a ratio, none when the whole balance is committed
    pub fn entry_fraction(&self) -> Option<f64> {
        if self.entry_percentage > 0.0 {
            Some(self.entry_percentage / 100.0)
        } else {
            None
        }
    }

    //trailing red alert exit only applies when enabled and the trigger is configured
    pub fn red_alert_exit_enabled(&self) -> bool {
        self.exit_position_red_alert && self.red_alert_trigger_pct < DISABLED_TRIGGER
    }
}
