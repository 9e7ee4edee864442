//! The delivery-status record produced for one bounce message.

use serde::{Deserialize, Serialize};

/// Structured outcome of a bounce.
///
/// A field is `None` when the part carrying it was absent, and `Some("")` when
/// the part was present but the header was not. Only set fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// `Status` of the delivery-status part (e.g. `5.1.1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// `Diagnostic-Code` of the delivery-status part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,

    /// Recipient address taken from the original message's `To` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// `X-Mail-Id` of the original message.
    #[serde(rename = "mail-id", default, skip_serializing_if = "Option::is_none")]
    pub mail_id: Option<String>,

    /// When the bounce was received, stamped by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl DeliveryReport {
    /// `true` when no field is set. Empty reports are never logged.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.diagnostic.is_none()
            && self.email.is_none()
            && self.mail_id.is_none()
            && self.date.is_none()
    }

    /// Return this report stamped with a reception date.
    pub fn with_date(self, date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..self
        }
    }

    /// Serialize as a single JSON line (no trailing newline).
    pub fn to_log_line(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(DeliveryReport::default().is_empty());
    }

    #[test]
    fn test_blank_field_is_not_empty() {
        let report = DeliveryReport {
            status: Some(String::new()),
            ..Default::default()
        };
        assert!(!report.is_empty());
    }

    #[test]
    fn test_log_line_omits_unset_fields() {
        let report = DeliveryReport {
            email: Some("bob@example.com".to_string()),
            mail_id: Some("42".to_string()),
            ..Default::default()
        }
        .with_date("2024-01-04 10:00:00");

        assert_eq!(
            report.to_log_line().unwrap(),
            r#"{"email":"bob@example.com","mail-id":"42","date":"2024-01-04 10:00:00"}"#
        );
    }

    #[test]
    fn test_log_line_is_single_line() {
        let report = DeliveryReport {
            diagnostic: Some("smtp; 550\nuser unknown".to_string()),
            ..Default::default()
        };
        let line = report.to_log_line().unwrap();
        assert!(!line.contains('\n'));
        let parsed: DeliveryReport = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, report);
    }
}
