pub mod action_log;
pub mod approval;
pub mod delete;
pub mod r#move;
pub mod runner;

pub use action_log::{read_entries, ActionLogWriter};
pub use approval::{ApprovalGate, AutoApprove, HoldAll};
pub use runner::{ExecutionReport, Executor};
