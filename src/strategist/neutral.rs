use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::StrategistError;
use crate::strategist::{StrategyDecision, Strategist};
use crate::summary;

/// Strategist used when none is configured: every instrument gets WAIT.
pub struct NeutralStrategist;

impl Strategist for NeutralStrategist {
    fn generate<'a>(
        &'a self,
        report: &'a summary::Report,
    ) -> BoxFuture<'a, Result<StrategyDecision, Report<StrategistError>>> {
        Box::pin(async move {
            Ok(StrategyDecision::degraded(
                &report.symbol,
                "no strategist configured",
            ))
        })
    }
}
