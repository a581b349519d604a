//! Coordinator Module
//!
//! The coordinator owns the end-to-end job pipeline. It has no compute
//! capability of its own: every score task is delegated to a worker node
//! picked uniformly at random, and the final ranking runs on the designated
//! sort node.
//!
//! ## Overview
//! A job moves through dispatch, barrier, and aggregation:
//! 1. **Dispatch**: each document is offered to random workers until one
//!    accepts, with capped exponential backoff between attempts.
//! 2. **Barrier**: workers report each finished task back over HTTP; the
//!    report that completes the job resolves the completion future the
//!    dispatcher is awaiting. Jobs are tracked per `JobId`, so overlapping
//!    jobs cannot corrupt each other's counts.
//! 3. **Aggregation**: the collected intermediate locations are handed to
//!    the sort node, and the job's total wall-clock time is appended to the
//!    ranked output it produces.
//!
//! ## Submodules
//! - **`job`**: Per-job completion state and the race-free barrier.
//! - **`service`**: Dispatch loop, result intake, and aggregation trigger.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`protocol`**: HTTP API contracts exposed by the coordinator.

pub mod handlers;
pub mod job;
pub mod protocol;
pub mod service;

#[cfg(test)]
mod tests;
