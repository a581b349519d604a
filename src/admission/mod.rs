//! Admission Control Module
//!
//! Decides whether a worker node accepts or rejects an incoming score task.
//!
//! ## Overview
//! Every task submission passes through a configured `SchedulerPolicy` before
//! any work is scheduled:
//! - **`Random`**: the node accepts everything; load spreading relies purely on
//!   the coordinator's random worker selection.
//! - **`LoadBalancing`**: the node sheds load probabilistically, rejecting each
//!   submission with its configured load probability. Rejected tasks bounce
//!   back to the coordinator, which retries them against another node.
//!
//! Decisions are ephemeral and side-effect free beyond consuming entropy, so
//! the policy can be evaluated concurrently from any number of in-flight
//! submissions.

pub mod policy;
