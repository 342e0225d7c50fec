//! Small utilities shared by the crates in this workspace.

pub mod debug_log;
pub mod json_file;
pub mod stop_signals;
