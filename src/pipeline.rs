//! One analysis cycle for an asset class: fetch, rank, analyze, strategize,
//! dispatch.
//!
//! Failures of individual instruments or collaborators never abort the cycle;
//! they become [`Diagnostic`]s. Only a class with no price data at all is an
//! error.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use derive_more::Display;
use error_stack::{Report, bail};
use futures::stream::{self, StreamExt};

use crate::config::{AssetClassConfig, GeneralConfig};
use crate::dispatch::{Alert, CycleReport, Dispatcher};
use crate::error::PipelineError;
use crate::indicator::{Analysis, EngineProfile, IndicatorSet};
use crate::model::PriceSeries;
use crate::provider::PriceProvider;
use crate::ranker::{CandidateRanker, Origin, Selection};
use crate::strategist::{StrategyDecision, Strategist};
use crate::summary;

/// Limits applied to every collaborator call.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub lookback_bars: usize,
    pub fetch_timeout: Duration,
    pub strategist_timeout: Duration,
    pub max_concurrency: usize,
}

impl From<&GeneralConfig> for PipelineSettings {
    fn from(general: &GeneralConfig) -> Self {
        Self {
            lookback_bars: general.lookback_bars,
            fetch_timeout: Duration::from_secs(general.fetch_timeout_secs),
            strategist_timeout: Duration::from_secs(general.strategist_timeout_secs),
            max_concurrency: general.max_concurrency.max(1),
        }
    }
}

/// What to analyze for one asset class.
#[derive(Debug, Clone)]
pub struct ClassPlan {
    pub name: String,
    pub profile: EngineProfile,
    /// Symbols to fetch, in scan order.
    pub scan_list: Vec<String>,
    pub core: Vec<String>,
    /// Selection size; `None` analyzes every instrument with data.
    pub candidates: Option<usize>,
    pub min_bars: usize,
}

impl From<&AssetClassConfig> for ClassPlan {
    fn from(class: &AssetClassConfig) -> Self {
        Self {
            name: class.name.clone(),
            profile: class.profile(),
            scan_list: class.scan_list(),
            core: class.core.clone(),
            candidates: class.candidates,
            min_bars: class.min_bars,
        }
    }
}

/// A per-instrument or per-cycle problem that did not stop the cycle.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum Diagnostic {
    #[display("{symbol}: no price data")]
    NoData { symbol: String },
    #[display("{symbol}: price fetch failed: {reason}")]
    ProviderFailed { symbol: String, reason: String },
    #[display("{symbol}: price fetch timed out")]
    ProviderTimeout { symbol: String },
    #[display("{symbol}: strategist failed: {reason}")]
    StrategistFailed { symbol: String, reason: String },
    #[display("{symbol}: strategist timed out")]
    StrategistTimeout { symbol: String },
    #[display("dispatch failed: {reason}")]
    DispatchFailed { reason: String },
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub report: CycleReport,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Pipeline {
    provider: Arc<dyn PriceProvider>,
    strategist: Arc<dyn Strategist>,
    dispatcher: Arc<dyn Dispatcher>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        strategist: Arc<dyn Strategist>,
        dispatcher: Arc<dyn Dispatcher>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            provider,
            strategist,
            dispatcher,
            settings,
        }
    }

    /// Run one full cycle for `plan`, stamping the output with `today`.
    pub async fn run_cycle(
        &self,
        plan: &ClassPlan,
        today: NaiveDate,
    ) -> Result<CycleOutcome, Report<PipelineError>> {
        let mut diagnostics = Vec::new();

        tracing::info!(
            asset_class = %plan.name,
            instruments = plan.scan_list.len(),
            "scanning universe"
        );
        let universe = self.fetch_universe(&plan.scan_list, &mut diagnostics).await;
        if universe.is_empty() {
            bail!(PipelineError::NoPriceData {
                asset_class: plan.name.clone(),
            });
        }

        let selection = select(plan, universe);
        tracing::info!(
            asset_class = %plan.name,
            selected = selection.len(),
            symbols = ?selection.iter().map(|s| s.symbol.as_str()).collect::<Vec<_>>(),
            "instruments selected"
        );

        let alerts = self
            .analyze(&plan.profile, selection, &mut diagnostics)
            .await;

        let report = CycleReport {
            asset_class: plan.name.clone(),
            generated_on: today,
            alerts,
        };

        if let Err(e) = self.dispatcher.dispatch(&report).await {
            tracing::warn!(asset_class = %plan.name, error = ?e, "dispatch failed");
            diagnostics.push(Diagnostic::DispatchFailed {
                reason: e.current_context().to_string(),
            });
        }

        for diagnostic in &diagnostics {
            tracing::debug!(asset_class = %plan.name, %diagnostic, "cycle diagnostic");
        }
        tracing::info!(
            asset_class = %plan.name,
            analyzed = report.alerts.len(),
            diagnostics = diagnostics.len(),
            "cycle complete"
        );

        Ok(CycleOutcome {
            report,
            diagnostics,
        })
    }

    /// Fetch every symbol with bounded concurrency, keeping scan order.
    async fn fetch_universe(
        &self,
        symbols: &[String],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<(String, PriceSeries)> {
        let provider = self.provider.as_ref();
        let lookback = self.settings.lookback_bars;
        let limit = self.settings.fetch_timeout;

        let results: Vec<_> = stream::iter(symbols)
            .map(|symbol| async move {
                let result =
                    tokio::time::timeout(limit, provider.fetch_series(symbol, lookback)).await;
                (symbol.clone(), result)
            })
            .buffered(self.settings.max_concurrency)
            .collect()
            .await;

        let mut universe = Vec::with_capacity(results.len());
        for (symbol, result) in results {
            match result {
                Ok(Ok(series)) if series.is_empty() => {
                    tracing::warn!(symbol = %symbol, "no price data");
                    diagnostics.push(Diagnostic::NoData { symbol });
                }
                Ok(Ok(series)) => universe.push((symbol, series)),
                Ok(Err(e)) => {
                    tracing::warn!(symbol = %symbol, error = ?e, "price fetch failed (continuing)");
                    diagnostics.push(Diagnostic::ProviderFailed {
                        symbol,
                        reason: e.current_context().to_string(),
                    });
                }
                Err(_) => {
                    tracing::warn!(symbol = %symbol, timeout = ?limit, "price fetch timed out");
                    diagnostics.push(Diagnostic::ProviderTimeout { symbol });
                }
            }
        }
        universe
    }

    /// Compute, summarize and strategize each selected instrument, in order.
    async fn analyze(
        &self,
        profile: &EngineProfile,
        selection: Vec<Selection>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Alert> {
        let strategist = self.strategist.as_ref();
        let limit = self.settings.strategist_timeout;

        let results: Vec<_> = stream::iter(selection)
            .map(|selected| async move {
                let report = match IndicatorSet::compute(&selected.series, profile) {
                    Analysis::Computed(set) => summary::summarize(&selected.symbol, &set),
                    Analysis::NoData => return (selected.symbol, None),
                };
                let decision = tokio::time::timeout(limit, strategist.generate(&report)).await;
                (selected.symbol, Some((selected.origin, report, decision)))
            })
            .buffered(self.settings.max_concurrency)
            .collect()
            .await;

        let mut alerts = Vec::with_capacity(results.len());
        for (symbol, analyzed) in results {
            let Some((origin, report, decision)) = analyzed else {
                diagnostics.push(Diagnostic::NoData { symbol });
                continue;
            };
            let decision = match decision {
                Ok(Ok(decision)) => decision,
                Ok(Err(e)) => {
                    tracing::warn!(symbol = %symbol, error = ?e, "strategist failed, degrading to WAIT");
                    let reason = e.current_context().to_string();
                    let decision = StrategyDecision::degraded(&symbol, &reason);
                    diagnostics.push(Diagnostic::StrategistFailed {
                        symbol: symbol.clone(),
                        reason,
                    });
                    decision
                }
                Err(_) => {
                    tracing::warn!(symbol = %symbol, timeout = ?limit, "strategist timed out, degrading to WAIT");
                    diagnostics.push(Diagnostic::StrategistTimeout {
                        symbol: symbol.clone(),
                    });
                    StrategyDecision::degraded(&symbol, "strategist timed out")
                }
            };
            alerts.push(Alert {
                symbol,
                origin,
                report,
                decision,
            });
        }
        alerts
    }
}

fn select(plan: &ClassPlan, universe: Vec<(String, PriceSeries)>) -> Vec<Selection> {
    let Some(limit) = plan.candidates else {
        return universe
            .into_iter()
            .map(|(symbol, series)| {
                let origin = if plan.core.contains(&symbol) {
                    Origin::Core
                } else {
                    Origin::Listed
                };
                Selection {
                    symbol,
                    series,
                    origin,
                }
            })
            .collect();
    };

    CandidateRanker::new(plan.core.clone(), plan.min_bars).select(universe, limit)
}
