//! Survivability evaluation
//!
//! Decides from a fresh snapshot whether a task can keep hosting an agent.
//! Both status fields are checked on their own: during a transition the
//! service may already report one as `STOPPED` while the other still says
//! `RUNNING`.

use crate::domain::task::TaskSnapshot;

/// Returns true when the agent backed by this task should be kept
///
/// A task that could not be found is never survivable. A found task is
/// survivable unless its last or desired status is terminal.
pub fn evaluate(snapshot: Option<&TaskSnapshot>) -> bool {
    match snapshot {
        None => false,
        Some(task) => !task.last_status.is_terminal() && !task.desired_status.is_terminal(),
    }
}
