pub mod analyzers;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod output;
pub mod parser;
pub mod records;
pub mod report;

pub use error::{AnalyticsError, Result};
