//! solace-storage
//!
//! Object storage behind a small async trait. [`s3::S3Store`] is a thin
//! wrapper around the AWS S3 SDK; [`memory::MemoryStore`] backs local
//! development, demo mode and tests.

pub mod error;
pub mod json;
pub mod memory;
pub mod s3;
pub mod store;

pub use store::{GetObjectOutput, ObjectStore, SharedStore};
