//! Core data model types: the delivery report and recipient addresses.

pub mod address;
pub mod report;
