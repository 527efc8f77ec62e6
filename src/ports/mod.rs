//! Port traits implemented by the adapters.

pub mod config_port;
pub mod document_port;
pub mod report_port;
