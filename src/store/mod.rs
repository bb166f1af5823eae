//! Parameterized statements over the five tables, one module per table.
//! Every function is a single best-effort attempt; callers report failures.

pub mod attendance;
pub mod classes;
pub mod notifications;
pub mod students;
pub mod users;
