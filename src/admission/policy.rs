use serde::{Deserialize, Serialize};

/// Scheduling policy configured per worker node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPolicy {
    /// Accept every submission unconditionally.
    Random,
    /// Reject each submission with the node's configured load probability.
    LoadBalancing,
}

/// Outcome of evaluating the admission policy for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Accept,
    Reject,
}

impl AdmissionDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, AdmissionDecision::Accept)
    }
}

/// Evaluates the admission policy for a single incoming task.
///
/// Under `LoadBalancing` a uniform draw in [0, 1) is compared against
/// `load_probability`; the draw comes from the thread-local RNG, so there is
/// no shared state between concurrent evaluations.
pub fn decide(policy: SchedulerPolicy, load_probability: f32) -> AdmissionDecision {
    match policy {
        SchedulerPolicy::Random => AdmissionDecision::Accept,
        SchedulerPolicy::LoadBalancing => {
            if rand::random::<f32>() < load_probability {
                AdmissionDecision::Reject
            } else {
                AdmissionDecision::Accept
            }
        }
    }
}
