//! solace-bedrock
//!
//! AI-assisted import column mapping through the Bedrock Converse API.

pub mod converse;
pub mod error;
pub mod mapping;
pub mod prompt;
