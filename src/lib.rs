//! `bouncelog`: turn bounce (non-delivery) emails into delivery-status records.
//!
//! This crate provides the core library for parsing a raw bounce message,
//! assembling a [`model::report::DeliveryReport`] from its MIME parts, and
//! appending it to an hourly log for later batch analysis.

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod process;
