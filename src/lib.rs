pub mod config;
pub mod dispatch;
pub mod error;
pub mod indicator;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod ranker;
pub mod stats;
pub mod strategist;
pub mod summary;
