//! solace-practice
//!
//! Practice services over the object store: the patient directory, the
//! messaging service (conversations, threads, compose/send), and substrate
//! tasks with their change feed.

pub mod demo;
pub mod dispatch;
pub mod error;
pub mod messaging;
pub mod patients;
pub mod tasks;
