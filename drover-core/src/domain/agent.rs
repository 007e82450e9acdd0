//! Agent lifecycle state

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Lifecycle state of a single agent
///
/// `Provisioning -> Running -> Retiring -> Terminated`. Retirement may also
/// start straight from `Provisioning` when a task dies before it ever ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentState {
    /// Task identity not yet confirmed
    #[default]
    Provisioning,
    /// Backing task is live and the agent serves work
    Running,
    /// Agent was judged unsurvivable or retired externally
    Retiring,
    /// Teardown was attempted; the agent is gone from the fleet
    Terminated,
}

impl AgentState {
    /// Returns true once teardown has been attempted
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: AgentState) -> bool {
        use AgentState::*;
        matches!(
            (self, next),
            (Provisioning, Running)
                | (Provisioning, Retiring)
                | (Running, Retiring)
                | (Retiring, Terminated)
        )
    }

    /// Performs a validated transition
    pub fn transition_to(&mut self, next: AgentState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(CoreError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentState::Provisioning => write!(f, "Provisioning"),
            AgentState::Running => write!(f, "Running"),
            AgentState::Retiring => write!(f, "Retiring"),
            AgentState::Terminated => write!(f, "Terminated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = AgentState::default();
        state.transition_to(AgentState::Running).unwrap();
        state.transition_to(AgentState::Retiring).unwrap();
        state.transition_to(AgentState::Terminated).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_provisioning_can_retire_directly() {
        let mut state = AgentState::Provisioning;
        assert!(state.transition_to(AgentState::Retiring).is_ok());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let mut state = AgentState::Running;
        let err = state.transition_to(AgentState::Terminated).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidStateTransition {
                from: "Running".to_string(),
                to: "Terminated".to_string(),
            }
        );
        assert_eq!(state, AgentState::Running);

        assert!(!AgentState::Terminated.can_transition_to(AgentState::Running));
        assert!(!AgentState::Retiring.can_transition_to(AgentState::Running));
    }
}
