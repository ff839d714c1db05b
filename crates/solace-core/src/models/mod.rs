pub mod conversation;
pub mod import;
pub mod message;
pub mod patient;
pub mod task;
