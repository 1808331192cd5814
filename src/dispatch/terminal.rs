use error_stack::Report;
use futures::future::BoxFuture;

use crate::dispatch::{CycleReport, Dispatcher};
use crate::error::DispatchError;
use crate::summary::ReportValue;

pub struct TerminalDispatcher;

impl Dispatcher for TerminalDispatcher {
    fn dispatch<'a>(
        &'a self,
        cycle: &'a CycleReport,
    ) -> BoxFuture<'a, Result<(), Report<DispatchError>>> {
        Box::pin(async move {
            if cycle.alerts.is_empty() {
                tracing::info!(asset_class = %cycle.asset_class, "no instruments to report");
                return Ok(());
            }

            for alert in &cycle.alerts {
                let price = alert.report.get("price").and_then(ReportValue::as_number);
                let trend = alert
                    .report
                    .get("trend_status")
                    .and_then(ReportValue::as_text)
                    .unwrap_or("N/A");
                let plan = &alert.decision.action_plan;
                tracing::warn!(
                    asset_class = %cycle.asset_class,
                    symbol = %alert.symbol,
                    signal = %alert.decision.signal,
                    price = ?price,
                    trend = trend,
                    entry_zone = %plan.entry_zone,
                    stop_loss = %plan.stop_loss,
                    take_profit = %plan.take_profit,
                    "ALERT: {}",
                    alert.decision.headline,
                );
            }
            Ok(())
        })
    }
}
