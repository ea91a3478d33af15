pub mod analysis;
pub mod config;
pub mod distribution;
pub mod error;
pub mod feature_stats;
pub mod hardy_weinberg;
pub mod report;
pub mod results_parser;
pub mod statistics;
pub mod threshold;
pub mod types;

#[cfg(feature = "plotting")]
pub mod plotting;
