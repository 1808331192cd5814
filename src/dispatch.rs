pub mod json;
pub mod terminal;

use chrono::NaiveDate;
use error_stack::Report;
use futures::future::BoxFuture;
use serde::Serialize;

use crate::error::DispatchError;
use crate::ranker::Origin;
use crate::strategist::StrategyDecision;
use crate::summary;

/// One analyzed instrument ready for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub symbol: String,
    pub origin: Origin,
    pub report: summary::Report,
    pub decision: StrategyDecision,
}

/// Everything one asset-class cycle produced, in selection order.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub asset_class: String,
    pub generated_on: NaiveDate,
    pub alerts: Vec<Alert>,
}

/// Sink for a cycle's alerts.
pub trait Dispatcher: Send + Sync {
    fn dispatch<'a>(
        &'a self,
        cycle: &'a CycleReport,
    ) -> BoxFuture<'a, Result<(), Report<DispatchError>>>;
}
