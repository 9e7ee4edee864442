//! Delivery-report assembly from the two well-known bounce sub-parts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::address::extract_email;
use crate::model::report::DeliveryReport;
use crate::parser::header::{header_value, parse_header_lines, split_header};
use crate::parser::mime::BodyParts;

/// `Content-Description` labels of the parts a report is built from.
///
/// Matched case-sensitively. Defaults are the labels Postfix writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartLabels {
    /// Label of the `message/delivery-status` part.
    pub delivery_status: String,
    /// Label of the part carrying the original message headers.
    pub original_headers: String,
}

impl Default for PartLabels {
    fn default() -> Self {
        Self {
            delivery_status: "Delivery report".to_string(),
            original_headers: "Undelivered Message Headers".to_string(),
        }
    }
}

/// Build a [`DeliveryReport`] from labelled body parts.
///
/// Fields belonging to a missing part stay `None`; with neither part present
/// the report is empty.
pub fn get_message_report(parts: &BodyParts, labels: &PartLabels) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    if let Some(text) = parts.get(&labels.delivery_status) {
        let fields = parse_header_lines(&split_header(text));
        report.status = Some(header_value(&fields, "status", ""));
        report.diagnostic = Some(header_value(&fields, "diagnostic-code", ""));
        debug!(status = ?report.status, "Read delivery-status part");
    }

    if let Some(text) = parts.get(&labels.original_headers) {
        let fields = parse_header_lines(&split_header(text));
        report.email = Some(extract_email(&header_value(&fields, "to", "")));
        report.mail_id = Some(header_value(&fields, "x-mail-id", ""));
        debug!(email = ?report.email, "Read original message headers");
    }

    report
}
