//! Pipeline orchestration for skillscout.
//!
//! Ties the crawler, enricher, and categorizer together into sequential
//! stage runs over the flat-JSON data directory (e.g., [`pipeline::run_all`]).

pub mod pipeline;

pub use pipeline::{
    CategorizeRunResult, CrawlRunResult, PipelineRunResult, ProgressReporter, SilentProgress,
    StatusReport,
};
