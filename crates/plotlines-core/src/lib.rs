//! Core types and trait definitions for Plotlines.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain rows, the [`store::PlotStore`] seam, and the three stages that
//! turn rows into an interactive graph:
//!
//! 1. [`aggregator::Aggregator`] keeps the local snapshot in step with a store.
//! 2. [`projection::project`] turns a snapshot and an episode into elements.
//! 3. [`bridge::Bridge`] hands elements to a renderer and tracks selection.

// We intentionally use native `async fn` in trait impls (stabilised in Rust
// 1.75). Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregator;
pub mod bridge;
pub mod error;
pub mod person;
pub mod projection;
pub mod relation;
pub mod snapshot;
pub mod store;
pub mod style;

pub use error::{Error, Result, ValidationError};
pub use person::{Episode, PersonId};
