//! Server layer tests: workspace concurrency, notifications and RPC.

pub mod tests_file_access;
pub mod tests_rpc;
pub mod tests_workspace;
