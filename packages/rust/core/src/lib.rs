//! Pipeline orchestration for jobwatch.
//!
//! This crate ties together page fetching, table extraction, the novelty
//! store, and the notifier into one run ([`pipeline::run_once`]).

pub mod pipeline;

#[cfg(test)]
mod testing;

pub use pipeline::{
    PipelineDeps, ProcessedRecord, RecordOutcome, RunOptions, RunSummary, run_once,
};
