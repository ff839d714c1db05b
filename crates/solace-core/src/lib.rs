//! solace-core
//!
//! Pure domain types, the channel capability table, request validation
//! schemas, and object key conventions. No AWS SDK dependency; this is the
//! shared vocabulary of the Solace backend.

pub mod channel;
pub mod error;
pub mod keys;
pub mod models;
pub mod validate;
