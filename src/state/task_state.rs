/// Task state definitions for the lease protocol
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents where a crawl task is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task was submitted and waits for a worker to lease it
    Pending,

    /// Task is leased by exactly one worker and being crawled
    Running,

    /// Crawl finished and its pages were persisted
    Completed,
}

impl TaskState {
    /// Returns true if `next` is the single legal successor of this state
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running) | (Self::Running, Self::Completed)
        )
    }

    /// Converts the task state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }

    /// Parses a task state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns all possible task states in lifecycle order
    pub fn all_states() -> [Self; 3] {
        [Self::Pending, Self::Running, Self::Completed]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}

impl std::str::FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_string(&s.to_lowercase())
            .ok_or_else(|| format!("unknown task state '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(TaskState::Pending.can_transition_to(TaskState::Running));
        assert!(TaskState::Running.can_transition_to(TaskState::Completed));
    }

    #[test]
    fn test_other_transitions_rejected() {
        assert!(!TaskState::Pending.can_transition_to(TaskState::Completed));
        assert!(!TaskState::Running.can_transition_to(TaskState::Pending));
        assert!(!TaskState::Completed.can_transition_to(TaskState::Running));
        assert!(!TaskState::Completed.can_transition_to(TaskState::Pending));

        for state in TaskState::all_states() {
            assert!(!state.can_transition_to(state));
        }
    }

    #[test]
    fn test_unknown_db_string() {
        assert_eq!(TaskState::from_db_string("cancelled"), None);
        assert_eq!(TaskState::from_db_string(""), None);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Running".parse::<TaskState>(), Ok(TaskState::Running));
        assert!("queued".parse::<TaskState>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&TaskState::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
