use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;

use crate::error::ProviderError;
use crate::model::{PriceBar, PriceSeries};
use crate::provider::PriceProvider;

/// Reads `<dir>/<SYMBOL>.csv` files with a
/// `timestamp,open,high,low,close,volume` header.
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl PriceProvider for CsvDirectoryProvider {
    fn fetch_series(
        &self,
        symbol: &str,
        lookback: usize,
    ) -> BoxFuture<'_, Result<PriceSeries, Report<ProviderError>>> {
        let symbol = symbol.to_string();
        Box::pin(async move {
            let path = self.csv_path(&symbol);
            let content = match tokio::fs::read(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(Report::new(ProviderError::NotFound { symbol })
                        .attach(format!("path: {}", path.display())));
                }
                Err(e) => {
                    return Err(Report::new(e)
                        .change_context(ProviderError::Read { symbol })
                        .attach(format!("path: {}", path.display())));
                }
            };

            let mut bars = parse_bars(&content, &path, &symbol)?;
            bars.sort_by_key(|b| b.timestamp);

            let series = PriceSeries::new(bars)
                .change_context(ProviderError::Parse {
                    symbol: symbol.clone(),
                })
                .attach_with(|| format!("path: {}", path.display()))?;

            tracing::debug!(symbol = %symbol, bars = series.len(), "loaded price history");
            Ok(series.tail(lookback))
        })
    }
}

fn parse_bars(
    content: &[u8],
    path: &Path,
    symbol: &str,
) -> Result<Vec<PriceBar>, Report<ProviderError>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_reader(content);

    reader
        .deserialize::<PriceBar>()
        .enumerate()
        .map(|(row, record)| {
            record
                .change_context(ProviderError::Parse {
                    symbol: symbol.to_string(),
                })
                .attach_with(|| format!("path: {}, row: {}", path.display(), row + 1))
        })
        .collect()
}
