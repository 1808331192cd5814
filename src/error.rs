use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum SeriesError {
    #[display("bar {index} is not after the previous bar")]
    OutOfOrder { index: usize },
    #[display("bar {index} has invalid prices or volume")]
    InvalidBar { index: usize },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum ProviderError {
    #[display("no price source for {symbol}")]
    NotFound { symbol: String },
    #[display("failed to read price data for {symbol}")]
    Read { symbol: String },
    #[display("failed to parse price data for {symbol}")]
    Parse { symbol: String },
}

#[derive(Debug, Display, Error)]
pub enum StrategistError {
    #[display("strategist invocation failed")]
    Invocation,
    #[display("malformed strategist output")]
    MalformedOutput,
}

#[derive(Debug, Display, Error)]
pub enum DispatchError {
    #[display("failed to encode alert payload")]
    Encode,
    #[display("failed to write alert payload")]
    Write,
}

#[derive(Debug, Display, Error)]
pub enum PipelineError {
    #[display("no price data for any instrument in {asset_class}")]
    NoPriceData { asset_class: String },
}
