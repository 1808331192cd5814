use std::process::Stdio;

use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::StrategistError;
use crate::strategist::{StrategyDecision, Strategist};
use crate::summary;

/// Runs an external program per instrument.
///
/// The report JSON is written to the program's stdin and the decision JSON is
/// read from its stdout. The child is killed if the caller drops the future.
pub struct CommandStrategist {
    program: String,
    args: Vec<String>,
}

impl CommandStrategist {
    /// Build from an argv-style list; `None` when the list is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    async fn run(&self, input: &[u8]) -> Result<Vec<u8>, Report<StrategistError>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .change_context(StrategistError::Invocation)
            .attach_with(|| format!("program: {}", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input)
                .await
                .change_context(StrategistError::Invocation)
                .attach("failed to write report to stdin")?;
            // Dropping stdin closes the pipe so the child sees EOF.
        }

        let output = child
            .wait_with_output()
            .await
            .change_context(StrategistError::Invocation)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Report::new(StrategistError::Invocation)
                .attach(format!("exit status: {}", output.status))
                .attach(format!("stderr: {stderr}")));
        }

        Ok(output.stdout)
    }
}

impl Strategist for CommandStrategist {
    fn generate<'a>(
        &'a self,
        report: &'a summary::Report,
    ) -> BoxFuture<'a, Result<StrategyDecision, Report<StrategistError>>> {
        Box::pin(async move {
            let input = report
                .to_json()
                .change_context(StrategistError::Invocation)
                .attach("failed to encode report")?;

            tracing::debug!(symbol = %report.symbol, program = %self.program, "invoking strategist");
            let stdout = self.run(input.as_bytes()).await?;

            let text = String::from_utf8(stdout).change_context(StrategistError::MalformedOutput)?;
            StrategyDecision::from_model_output(&text)
                .attach_with(|| format!("symbol: {}", report.symbol))
        })
    }
}
