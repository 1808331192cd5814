use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use alpha_swarm::config::{self, AppConfig};
use alpha_swarm::dispatch::Dispatcher;
use alpha_swarm::dispatch::json::JsonDispatcher;
use alpha_swarm::dispatch::terminal::TerminalDispatcher;
use alpha_swarm::pipeline::{ClassPlan, Pipeline, PipelineSettings};
use alpha_swarm::provider::PriceProvider;
use alpha_swarm::provider::csv::CsvDirectoryProvider;
use alpha_swarm::strategist::Strategist;
use alpha_swarm::strategist::command::CommandStrategist;
use alpha_swarm::strategist::neutral::NeutralStrategist;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("unknown asset class filter")]
    UnknownClass,
}

#[derive(Parser)]
#[command(name = "alpha-swarm", about = "Technical screening and ranking across asset classes")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Only run the named asset class (repeatable)
    #[arg(long = "class", value_name = "NAME")]
    classes: Vec<String>,

    /// Skip the pause between asset-class phases
    #[arg(long)]
    no_cooldown: bool,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    let plans = select_plans(&config, &cli.classes)?;
    if plans.is_empty() {
        tracing::warn!("no asset classes configured; nothing to do");
        return Ok(());
    }

    let pipeline = Pipeline::new(
        build_provider(&config),
        build_strategist(&config),
        build_dispatcher(&config),
        PipelineSettings::from(&config.general),
    );
    let cooldown = Duration::from_secs(config.general.phase_cooldown_secs);

    for (index, plan) in plans.iter().enumerate() {
        if index > 0 && !cli.no_cooldown && !cooldown.is_zero() {
            info!(seconds = cooldown.as_secs(), "cooling down before next phase");
            tokio::time::sleep(cooldown).await;
        }

        info!(asset_class = %plan.name, phase = index + 1, of = plans.len(), "phase started");
        let today = chrono::Local::now().date_naive();
        match pipeline.run_cycle(plan, today).await {
            Ok(outcome) => info!(
                asset_class = %plan.name,
                analyzed = outcome.report.alerts.len(),
                diagnostics = outcome.diagnostics.len(),
                "phase finished"
            ),
            Err(e) => tracing::error!(asset_class = %plan.name, error = ?e, "phase failed (continuing)"),
        }
    }

    info!("all phases complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

fn select_plans(config: &AppConfig, filter: &[String]) -> Result<Vec<ClassPlan>, Report<AppError>> {
    if let Some(unknown) = filter
        .iter()
        .find(|name| !config.asset_classes.iter().any(|c| &c.name == *name))
    {
        return Err(Report::new(AppError::UnknownClass).attach(format!("class: {unknown}")));
    }

    Ok(config
        .asset_classes
        .iter()
        .filter(|c| filter.is_empty() || filter.contains(&c.name))
        .map(ClassPlan::from)
        .collect())
}

fn build_provider(config: &AppConfig) -> Arc<dyn PriceProvider> {
    Arc::new(CsvDirectoryProvider::new(&config.general.data_dir))
}

fn build_strategist(config: &AppConfig) -> Arc<dyn Strategist> {
    match config
        .strategist
        .as_ref()
        .and_then(|s| CommandStrategist::from_argv(&s.command))
    {
        Some(strategist) => Arc::new(strategist) as Arc<dyn Strategist>,
        None => {
            info!("no strategist configured, every instrument will get WAIT");
            Arc::new(NeutralStrategist)
        }
    }
}

fn build_dispatcher(config: &AppConfig) -> Arc<dyn Dispatcher> {
    match config.dispatch.kind.as_str() {
        "json" => Arc::new(JsonDispatcher::new(&config.dispatch.output_dir)) as Arc<dyn Dispatcher>,
        _ => Arc::new(TerminalDispatcher),
    }
}
