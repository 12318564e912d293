//! Task lifecycle state
//!
//! A task moves strictly forward through `Pending -> Running -> Completed`.
//! The storage layer is the only place that mutates persisted state. It checks
//! [`TaskState::can_transition_to`] before completing a task, and a database
//! trigger rejects any other transition.

mod task_state;

pub use task_state::TaskState;
