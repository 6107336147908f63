//! Per-artifact ingestion state machine
//!
//! DISCOVERED → MATCHED → VERIFIED → RESOLVED → UPLOADED → TAGGED → ROUTED
//!
//! Any stage failure jumps straight to ROUTED with an error outcome. ROUTED is
//! the only terminal state and is entered exactly once per artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ingestion state of one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtifactState {
    /// Enumerated from the input area
    Discovered,
    /// Paired with a metadata sheet by stem
    Matched,
    /// Content hash agrees with the metadata record
    Verified,
    /// Target folder resolved or created
    Resolved,
    /// Content node created in the target folder
    Uploaded,
    /// Aspect and properties written
    Tagged,
    /// Logged and relocated to SUCCESS or ERROR
    Routed,
}

impl ArtifactState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(self, next: ArtifactState) -> bool {
        use ArtifactState::*;
        matches!(
            (self, next),
            (Discovered, Matched)
                | (Matched, Verified)
                | (Verified, Resolved)
                | (Resolved, Uploaded)
                | (Uploaded, Tagged)
                | (Discovered | Matched | Verified | Resolved | Uploaded | Tagged, Routed)
        )
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub old_state: ArtifactState,
    pub new_state: ArtifactState,
    pub transitioned_at: DateTime<Utc>,
}

/// Progress of one artifact through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactProgress {
    pub artifact: String,
    pub state: ArtifactState,
    pub transitions: Vec<StateTransition>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ArtifactProgress {
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            state: ArtifactState::Discovered,
            transitions: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to `new_state`
    ///
    /// Illegal transitions are refused and leave the state untouched.
    pub fn transition_to(&mut self, new_state: ArtifactState) -> Option<StateTransition> {
        if !self.state.can_transition_to(new_state) {
            tracing::warn!(
                artifact = %self.artifact,
                from = ?self.state,
                to = ?new_state,
                "Refusing illegal state transition"
            );
            return None;
        }

        let transition = StateTransition {
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        if new_state == ArtifactState::Routed {
            self.ended_at = Some(transition.transitioned_at);
        }

        tracing::debug!(artifact = %self.artifact, state = ?new_state, "Artifact state transition");
        self.transitions.push(transition.clone());
        Some(transition)
    }

    pub fn is_terminal(&self) -> bool {
        self.state == ArtifactState::Routed
    }
}
