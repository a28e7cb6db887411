//! Batch driver built on top of the scheduler.
//!
//! The driver is the collaborator that turns a list of items into work units,
//! submits them all, waits for every submission to settle, and performs a final
//! action with the aggregated results. What a unit does with its item (open a
//! page, call an API, parse a response) is up to the [`UnitExecutor`]; what
//! happens to the aggregate (write a file, insert rows) is up to the
//! [`ResultSink`]. Resources the executor needs, such as a browser or a
//! connection pool, stay with the executor and never reach the scheduler.

pub mod batch;
pub mod executor;
pub mod sink;

pub use batch::{flatten, Driver};
pub use executor::UnitExecutor;
pub use sink::{MemorySink, ResultSink};
