use std::path::PathBuf;

use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;

use crate::dispatch::{CycleReport, Dispatcher};
use crate::error::DispatchError;

/// Writes each cycle to `<dir>/<asset_class>-<date>.json`, replacing any
/// earlier file for the same class and day.
pub struct JsonDispatcher {
    dir: PathBuf,
}

impl JsonDispatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, cycle: &CycleReport) -> PathBuf {
        self.dir.join(format!(
            "{}-{}.json",
            cycle.asset_class,
            cycle.generated_on.format("%Y-%m-%d")
        ))
    }
}

impl Dispatcher for JsonDispatcher {
    fn dispatch<'a>(
        &'a self,
        cycle: &'a CycleReport,
    ) -> BoxFuture<'a, Result<(), Report<DispatchError>>> {
        Box::pin(async move {
            let payload =
                serde_json::to_vec_pretty(cycle).change_context(DispatchError::Encode)?;

            tokio::fs::create_dir_all(&self.dir)
                .await
                .change_context(DispatchError::Write)
                .attach_with(|| format!("output_dir: {}", self.dir.display()))?;

            let path = self.path_for(cycle);
            tokio::fs::write(&path, payload)
                .await
                .change_context(DispatchError::Write)
                .attach_with(|| format!("path: {}", path.display()))?;

            tracing::info!(
                asset_class = %cycle.asset_class,
                alerts = cycle.alerts.len(),
                path = %path.display(),
                "cycle report written"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::fixtures::cycle;

    #[tokio::test]
    async fn writes_cycle_file() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = JsonDispatcher::new(dir.path().join("reports"));
        let cycle = cycle(&["BTC-USD", "ETH-USD"]);

        dispatcher.dispatch(&cycle).await.unwrap();

        let path = dir.path().join("reports").join("crypto-2024-03-01.json");
        assert_eq!(dispatcher.path_for(&cycle), path);
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["asset_class"], "crypto");
        assert_eq!(json["alerts"][0]["symbol"], "BTC-USD");
        assert_eq!(json["alerts"][1]["decision"]["signal"], "BUY");
        assert_eq!(json["alerts"][0]["origin"]["kind"], "ranked");
        assert_eq!(json["alerts"][0]["report"]["fields"]["rsi"], "N/A");
    }

    #[tokio::test]
    async fn unwritable_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let dispatcher = JsonDispatcher::new(blocker.join("reports"));

        let err = dispatcher.dispatch(&cycle(&["BTC-USD"])).await.unwrap_err();
        assert!(matches!(err.current_context(), DispatchError::Write));
    }
}
