//! # Prometheus Work Queue
//!
//! A bounded-concurrency scheduler for asynchronous work units.
//!
//! Callers submit an unbounded stream of independent async operations. The
//! scheduler runs at most *N* of them at once, admits them strictly in
//! submission order, hands every submitter its own outcome, and tells an
//! observer each time all submitted work has drained.
//!
//! ## Core Problem Solved
//!
//! Fan-out workloads (crawl 100 pages, call an API for 10k records, run a
//! batch of inference requests) need a concurrency cap that does not lose work:
//!
//! - **Bounded in-flight work**: never more than `limit` units running
//! - **FIFO admission**: earlier submissions always start before later ones
//! - **Exactly-once settlement**: every submission resolves once, success or failure
//! - **Failure isolation**: a failing or panicking unit frees its slot like any other
//! - **Drain detection**: observers and `wait_idle` learn when everything settled
//!
//! ## Scheduler
//!
//! ```rust,ignore
//! use prometheus_work_queue::builders::SchedulerBuilder;
//! use prometheus_work_queue::runtime::TokioSpawner;
//!
//! let scheduler = SchedulerBuilder::with_limit(5)
//!     .name("quotes")
//!     .with_drain_observer(|| tracing::info!("all pages fetched"))
//!     .build::<Vec<Quote>, anyhow::Error, _>(TokioSpawner::current())?;
//!
//! let handles: Vec<_> = (1..=100)
//!     .map(|page| scheduler.submit(move || async move { fetch_quotes(page).await }))
//!     .collect();
//!
//! let pages = futures::future::try_join_all(handles).await?;
//! ```
//!
//! ## Driver
//!
//! For the common submit-all / aggregate / persist shape, implement
//! [`driver::UnitExecutor`] and [`driver::ResultSink`] and use [`driver::Driver`].
//!
//! For complete examples, see:
//! - `tests/scheduler_test.rs` - Admission, settlement, and drain behavior
//! - `tests/driver_test.rs` - Batch driver aggregation

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and admission accounting.
pub mod core;
/// Configuration models for schedulers.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Batch driver: submit many units, aggregate, persist.
pub mod driver;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
