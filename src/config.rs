use std::collections::HashSet;
use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::indicator::EngineProfile;
use crate::model::{AssetClass, CrossPair};
use crate::ranker::DEFAULT_MIN_BARS;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_data_dir() -> String {
    "./data".into()
}

fn default_lookback_bars() -> usize {
    365
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_strategist_timeout_secs() -> u64 {
    120
}

fn default_phase_cooldown_secs() -> u64 {
    20
}

fn default_max_concurrency() -> usize {
    8
}

fn default_dispatch_kind() -> String {
    "terminal".into()
}

fn default_output_dir() -> String {
    "./reports".into()
}

fn default_min_bars() -> usize {
    DEFAULT_MIN_BARS
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub strategist: Option<StrategistConfig>,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub asset_classes: Vec<AssetClassConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Directory of `<SYMBOL>.csv` price files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_lookback_bars")]
    pub lookback_bars: usize,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_strategist_timeout_secs")]
    pub strategist_timeout_secs: u64,
    /// Pause between asset-class phases.
    #[serde(default = "default_phase_cooldown_secs")]
    pub phase_cooldown_secs: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

#[derive(Debug, Deserialize)]
pub struct StrategistConfig {
    /// Program and arguments, e.g. `["python3", "strategist.py"]`.
    pub command: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DispatchConfig {
    /// Accepted values: `"terminal"` | `"json"`
    #[serde(default = "default_dispatch_kind")]
    pub kind: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            kind: default_dispatch_kind(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssetClassConfig {
    pub name: String,
    pub kind: String,
    pub universe: Vec<String>,
    #[serde(default)]
    pub core: Vec<String>,
    /// Number of instruments to analyze; absent analyzes the whole universe.
    pub candidates: Option<usize>,
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,
    pub annualization: Option<f64>,
    pub cross_pair: Option<String>,
    pub squeeze_threshold_pct: Option<f64>,
    pub levels_short_window: Option<usize>,
    pub levels_long_window: Option<usize>,
}

impl AssetClassConfig {
    /// Engine parameters for this class: the kind's defaults plus overrides.
    ///
    /// Assumes the config passed validation; unknown values fall back to defaults.
    pub fn profile(&self) -> EngineProfile {
        let mut profile = AssetClass::from_str(&self.kind)
            .map(EngineProfile::for_asset_class)
            .unwrap_or_default();
        if let Some(a) = self.annualization {
            profile.annualization = a;
        }
        if let Some(pair) = self.cross_pair.as_deref().and_then(CrossPair::from_str) {
            profile.cross_pair = pair;
        }
        if let Some(t) = self.squeeze_threshold_pct {
            profile.squeeze_threshold_pct = t;
        }
        if let Some(w) = self.levels_short_window {
            profile.levels_short_window = w;
        }
        if let Some(w) = self.levels_long_window {
            profile.levels_long_window = w;
        }
        profile
    }

    /// Universe in scan order followed by core symbols not already in it.
    pub fn scan_list(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.universe
            .iter()
            .chain(&self.core)
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect()
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];
const VALID_DISPATCH_KINDS: &[&str] = &["terminal", "json"];

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_strategist(config)?;
    validate_dispatch(config)?;
    validate_class_names_unique(config)?;
    validate_asset_classes(config)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let general = &config.general;
    if !VALID_LOG_FORMATS.contains(&general.log_format.as_str()) {
        return Err(invalid(format!(
            "general.log_format \"{}\" is not valid",
            general.log_format
        )));
    }
    if general.lookback_bars == 0 {
        return Err(invalid("general.lookback_bars must be positive".into()));
    }
    if general.max_concurrency == 0 {
        return Err(invalid("general.max_concurrency must be positive".into()));
    }
    if general.fetch_timeout_secs == 0 || general.strategist_timeout_secs == 0 {
        return Err(invalid("general timeouts must be positive".into()));
    }
    Ok(())
}

fn validate_strategist(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let Some(strategist) = &config.strategist else {
        return Ok(());
    };
    match strategist.command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(invalid("strategist.command must name a program".into())),
    }
}

fn validate_dispatch(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_DISPATCH_KINDS.contains(&config.dispatch.kind.as_str()) {
        return Err(invalid(format!(
            "dispatch.kind \"{}\" is not valid",
            config.dispatch.kind
        )));
    }
    Ok(())
}

fn validate_class_names_unique(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let mut seen = HashSet::new();
    for class in &config.asset_classes {
        if !seen.insert(class.name.as_str()) {
            return Err(invalid(format!(
                "asset_classes: duplicate name \"{}\"",
                class.name
            )));
        }
    }
    Ok(())
}

fn validate_asset_classes(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    for class in &config.asset_classes {
        if AssetClass::from_str(&class.kind).is_none() {
            return Err(invalid(format!(
                "asset_classes[\"{}\"].kind \"{}\" is not valid",
                class.name, class.kind
            )));
        }
        if class.universe.is_empty() && class.core.is_empty() {
            return Err(invalid(format!(
                "asset_classes[\"{}\"].universe is empty",
                class.name
            )));
        }
        if class.candidates == Some(0) {
            return Err(invalid(format!(
                "asset_classes[\"{}\"].candidates must be positive",
                class.name
            )));
        }
        if let Some(pair) = class.cross_pair.as_ref().filter(|p| CrossPair::from_str(p).is_none()) {
            return Err(invalid(format!(
                "asset_classes[\"{}\"].cross_pair \"{}\" is not valid",
                class.name, pair
            )));
        }
        if class.levels_short_window == Some(0) || class.levels_long_window == Some(0) {
            return Err(invalid(format!(
                "asset_classes[\"{}\"] level windows must be positive",
                class.name
            )));
        }
        if class.annualization.is_some_and(|a| !(a.is_finite() && a > 0.0)) {
            return Err(invalid(format!(
                "asset_classes[\"{}\"].annualization must be positive",
                class.name
            )));
        }
        class.profile().validate().change_context(ConfigError::Validation {
            field: format!("asset_classes[\"{}\"] engine parameters", class.name),
        })?;
    }
    Ok(())
}
