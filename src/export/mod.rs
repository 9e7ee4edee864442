//! Output sinks for assembled bounce reports.

pub mod bounce_log;
