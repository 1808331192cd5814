pub mod command;
pub mod neutral;

use std::fmt;

use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::StrategistError;
use crate::summary;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSignal {
    Buy,
    Sell,
    Wait,
    #[serde(alias = "CUT LOSS")]
    CutLoss,
}

impl TradeSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Wait => "WAIT",
            Self::CutLoss => "CUT_LOSS",
        }
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.into()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPlan {
    pub entry_zone: String,
    pub stop_loss: String,
    pub take_profit: String,
}

impl Default for ActionPlan {
    fn default() -> Self {
        Self {
            entry_zone: not_available(),
            stop_loss: not_available(),
            take_profit: not_available(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
}

/// Trading plan for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyDecision {
    pub headline: String,
    pub signal: TradeSignal,
    pub action_plan: ActionPlan,
    pub market_phase: String,
    pub psychology: String,
    pub rationale: String,
    pub citations: Vec<Citation>,
}

/// Decision as models emit it; `signal` may sit at the top level or inside
/// `action_plan`.
#[derive(Debug, Deserialize)]
struct ModelDecision {
    #[serde(default = "not_available")]
    headline: String,
    signal: Option<TradeSignal>,
    #[serde(default)]
    action_plan: ModelActionPlan,
    #[serde(default = "not_available")]
    market_phase: String,
    #[serde(default = "not_available")]
    psychology: String,
    #[serde(default, alias = "analysis_summary")]
    rationale: String,
    #[serde(default, alias = "news")]
    citations: Vec<Citation>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelActionPlan {
    signal: Option<TradeSignal>,
    entry_zone: Option<String>,
    stop_loss: Option<String>,
    take_profit: Option<String>,
}

impl From<ModelDecision> for StrategyDecision {
    fn from(raw: ModelDecision) -> Self {
        let plan = raw.action_plan;
        Self {
            headline: raw.headline,
            // Top level wins; a plan without a signal means WAIT.
            signal: raw.signal.or(plan.signal).unwrap_or(TradeSignal::Wait),
            action_plan: ActionPlan {
                entry_zone: plan.entry_zone.unwrap_or_else(not_available),
                stop_loss: plan.stop_loss.unwrap_or_else(not_available),
                take_profit: plan.take_profit.unwrap_or_else(not_available),
            },
            market_phase: raw.market_phase,
            psychology: raw.psychology,
            rationale: raw.rationale,
            citations: raw.citations,
        }
    }
}

impl StrategyDecision {
    /// Placeholder WAIT decision used whenever no real decision is available.
    pub fn degraded(symbol: &str, reason: &str) -> Self {
        Self {
            headline: format!("{symbol}: no strategy available"),
            signal: TradeSignal::Wait,
            action_plan: ActionPlan::default(),
            market_phase: not_available(),
            psychology: not_available(),
            rationale: reason.to_string(),
            citations: Vec::new(),
        }
    }

    /// Decode a decision from raw model output.
    ///
    /// Accepts the JSON object bare, or the first markdown code fence
    /// anywhere in the text.
    pub fn from_model_output(raw: &str) -> Result<Self, Report<StrategistError>> {
        let body = json_body(raw);
        serde_json::from_str::<ModelDecision>(body)
            .map(Self::from)
            .change_context(StrategistError::MalformedOutput)
            .attach_with(|| format!("output: {}", truncate(raw, 200)))
    }
}

fn json_body(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    // Skip the info string (e.g. "json") on the opening fence line.
    let body = match after.split_once('\n') {
        Some((info, rest)) if !info.contains('{') => rest,
        _ => after.trim_start_matches("json"),
    };
    body.find("```").map_or(body, |end| &body[..end]).trim()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Turns an indicator report into a trading plan.
///
/// Uses `BoxFuture` to keep the trait object-safe (`dyn Strategist`).
pub trait Strategist: Send + Sync {
    fn generate<'a>(
        &'a self,
        report: &'a summary::Report,
    ) -> BoxFuture<'a, Result<StrategyDecision, Report<StrategistError>>>;
}
