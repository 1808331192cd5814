pub mod csv;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::ProviderError;
use crate::model::PriceSeries;

/// Source of daily price history.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn PriceProvider`).
pub trait PriceProvider: Send + Sync {
    /// Fetch at most the last `lookback` daily bars for `symbol`.
    ///
    /// An empty series means the source has no data for the symbol.
    fn fetch_series(
        &self,
        symbol: &str,
        lookback: usize,
    ) -> BoxFuture<'_, Result<PriceSeries, Report<ProviderError>>>;
}
