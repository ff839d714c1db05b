//! solace-import
//!
//! The patient data-import wizard: upload a CSV export, get suggested
//! column mappings, confirm them against a preview, finish.

pub mod analyzer;
pub mod error;
pub mod heuristic;
pub mod sample;
pub mod wizard;
