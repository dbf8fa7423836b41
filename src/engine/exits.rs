use crate::config::StrategyParams;
use crate::data::PriceSeries;
use crate::engine::reasons::ExitReason;
use crate::engine::regime::{RegimeProfile, Trigger};
use crate::engine::signals::falls_by;
use crate::portfolio::OpenPosition;

//everything the exit rules look at on one bar
pub struct ExitContext<'a> {
    pub series: &'a PriceSeries,
    pub index: usize,
    pub params: &'a StrategyParams,
    pub profile: &'a RegimeProfile,
    pub position: &'a OpenPosition,
    pub fear_stop_today: bool,
}

//first matching protective exit, take profit is evaluated after this returns none
//order: LIQ, FS, SLH, BXP, AXP, RA, BXL/BX, SL
pub fn protective_exit(ctx: &ExitContext) -> Option<ExitReason> {
    let params = ctx.params;
    let position = ctx.position;
    let reference = ctx.series.reference_close();
    let asset = ctx.series.asset_close();
    let price = asset[ctx.index];
    let drawdown = position.drawdown(price);
    let stops_enabled = !params.disable_stop_loss;

    if position.is_liquidated(price) {
        return Some(ExitReason::Liquidation);
    }

    if ctx.fear_stop_today && params.fear_stop_exit_position {
        return Some(ExitReason::FearStop);
    }

    if stops_enabled && params.stop_loss_hard > 0.0 && drawdown >= params.stop_loss_hard {
        return Some(ExitReason::HardStopLoss);
    }

    let reference_panic = Trigger::new(
        params.btc_exit_panic_trigger_value,
        params.btc_exit_panic_trigger_period,
    );
    if falls_by(reference, ctx.index, reference_panic) {
        return Some(ExitReason::ReferencePanic);
    }

    let asset_panic = Trigger::new(
        params.asset_exit_panic_trigger_value,
        params.asset_exit_panic_trigger_period,
    );
    if falls_by(asset, ctx.index, asset_panic) {
        return Some(ExitReason::AssetPanic);
    }

    if params.red_alert_exit_enabled()
        && position.high_water_mark > 0.0
        && position.trailing_drawdown(price) >= params.red_alert_trigger_pct
    {
        return Some(ExitReason::RedAlert);
    }

    //long window drop is reported first when both fire
    if falls_by(reference, ctx.index, ctx.profile.long_breakout_exit) {
        return Some(ExitReason::ReferenceLongDrop);
    }
    if falls_by(reference, ctx.index, ctx.profile.breakout_exit) {
        return Some(ExitReason::ReferenceDrop);
    }

    if stops_enabled
        && params.stop_loss > 0.0
        && drawdown >= params.stop_loss
        && position.minutes_since_entry(ctx.index) >= params.stop_loss_cooldown
    {
        return Some(ExitReason::StopLoss);
    }

    None
}
