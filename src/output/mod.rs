// src/output/mod.rs
//! Output handling with separate planning and execution.
//!
//! A plan is plain data built from the resolved configuration; only
//! [`deliver`] touches the filesystem or stdout.

mod types;
mod writer;

pub use types::{CompletedOperation, DeliveryTarget, FailedOperation, OutputPlan, OutputReport};
pub use writer::deliver;
