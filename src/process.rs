//! One invocation: read a bounce, assemble its report, hand it to the sink.
//!
//! Only reading the input and writing the bounce log can fail. A message
//! without delivery information is a normal outcome.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::config::Config;
use crate::error::{BounceError, Result};
use crate::export::bounce_log::BounceLog;
use crate::parser::message::{analyze_message, RawMessage};

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No known part was found; nothing was written.
    NoReport,
    /// The record line, for the caller to print instead of logging.
    Printed(String),
    /// The record was appended to this log file.
    Logged(PathBuf),
}

/// Where the record goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Append to the hourly bounce log from `[sink]`.
    Log,
    /// Return the record line to the caller.
    Print,
}

/// Process the message read from `reader`.
///
/// `source` names the input in I/O errors (`<stdin>` for standard input).
/// `received` stamps messages without a `Date` header and picks the hour
/// bucket.
pub fn process_message<R: BufRead>(
    reader: &mut R,
    source: &Path,
    config: &Config,
    destination: Destination,
    received: DateTime<Local>,
) -> Result<Outcome> {
    let raw = RawMessage::read(reader).map_err(|e| BounceError::io(source, e))?;

    let Some(report) = analyze_message(&raw, &config.parts, received) else {
        info!(source = %source.display(), "No delivery report found, nothing logged");
        return Ok(Outcome::NoReport);
    };

    match destination {
        Destination::Print => Ok(Outcome::Printed(report.to_log_line()?)),
        Destination::Log => {
            let path = BounceLog::from_config(&config.sink).append(&report, &received)?;
            Ok(Outcome::Logged(path))
        }
    }
}
