//! Distributed Sentiment Scoring Cluster Library
//!
//! This library crate defines the core modules of the master-worker scoring
//! engine. It serves as the foundation for the binary executable
//! (`main.rs`), which hosts the coordinator, worker, and client roles.
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`coordinator`**: The dispatch-and-barrier engine. Splits a job into
//!   per-document score tasks, places each on a randomly chosen worker,
//!   blocks on a race-free completion barrier, and triggers the final
//!   ranking stage.
//! - **`worker`**: The compute node. Applies admission control to incoming
//!   tasks, executes accepted tasks in the background, persists intermediate
//!   results, reports them back, and runs aggregation when designated.
//! - **`admission`**: The accept/reject policy a worker evaluates for every
//!   incoming task (`Random` or probabilistic `LoadBalancing`).
//! - **`scoring`**: The pure sentiment computation: vocabulary sets plus the
//!   normalized positive/negative match formula.
//! - **`config`**: The static settings surface (addresses, pool layout,
//!   policies, storage paths) shared by every role.

pub mod admission;
pub mod config;
pub mod coordinator;
pub mod scoring;
pub mod worker;
