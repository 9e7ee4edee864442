//! Bounce parsing: header blocks, MIME body parts, and delivery-report assembly.

pub mod header;
pub mod message;
pub mod mime;
pub mod report;
