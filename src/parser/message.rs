//! Reading a raw message from a stream and running the full parse over it.

use std::io::{BufRead, Read};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::model::report::DeliveryReport;
use crate::parser::header::{
    decode_bytes, decode_segment, header_value, parse_header_lines, HeaderMap,
};
use crate::parser::mime::fetch_body_parts;
use crate::parser::report::{get_message_report, PartLabels};

/// Format of the `date` field when the message carries no `Date` header.
pub const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A message as read from its stream: header lines, then everything after.
#[derive(Debug, Clone, Default)]
pub struct RawMessage {
    /// Right-trimmed header lines, without the terminating blank line.
    pub header_lines: Vec<String>,
    /// Everything after the blank line, untouched.
    pub body: String,
}

impl RawMessage {
    /// Read the header block, then the rest of the stream as the body.
    pub fn read<R: BufRead>(reader: &mut R) -> std::io::Result<Self> {
        let header_lines = read_header_block(reader)?;
        let body = read_body(reader)?;
        Ok(Self { header_lines, body })
    }

    /// Parse [`Self::header_lines`].
    pub fn headers(&self) -> HeaderMap {
        parse_header_lines(&self.header_lines)
    }
}

/// Read lines until the first blank line or end of stream.
///
/// Each line is right-trimmed; a line that trims to nothing ends the block and
/// is consumed without being returned.
pub fn read_header_block<R: BufRead>(reader: &mut R) -> std::io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = decode_bytes(&buf);
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        lines.push(line.to_string());
    }

    Ok(lines)
}

/// Read the remainder of the stream as text.
///
/// Each line is decoded on its own, so a stray non-UTF-8 byte only changes the
/// decoding of the line it sits on. Line terminators are preserved.
pub fn read_body<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf
        .split_inclusive(|&b| b == b'\n')
        .map(decode_segment)
        .collect())
}

/// Run the whole pipeline over one message.
///
/// Returns `None` when no known part was found. Otherwise the report is
/// stamped with the message's `Date` header, or `received` when it has none.
pub fn analyze_message(
    raw: &RawMessage,
    labels: &PartLabels,
    received: DateTime<Local>,
) -> Option<DeliveryReport> {
    let headers = raw.headers();
    debug!(
        headers = headers.len(),
        body_bytes = raw.body.len(),
        "Parsed top-level headers"
    );

    let parts = fetch_body_parts(&raw.body, &headers);
    let report = get_message_report(&parts, labels);
    if report.is_empty() {
        debug!(parts = parts.len(), "No delivery information found");
        return None;
    }

    let fallback = received.format(FALLBACK_DATE_FORMAT).to_string();
    Some(report.with_date(header_value(&headers, "date", &fallback)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;

    fn received() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 4, 10, 30, 0).unwrap()
    }

    fn labels() -> PartLabels {
        PartLabels {
            delivery_status: "delivery-report".to_string(),
            original_headers: "orig".to_string(),
        }
    }

    #[test]
    fn test_read_header_block_stops_at_blank_line() {
        let mut input = Cursor::new("From: a@b.com\r\nSubject: Hi  \r\n  there\r\n\r\nBody\r\n");
        let lines = read_header_block(&mut input).unwrap();
        assert_eq!(lines, vec!["From: a@b.com", "Subject: Hi", "  there"]);
        assert_eq!(read_body(&mut input).unwrap(), "Body\r\n");
    }

    #[test]
    fn test_read_header_block_whitespace_line_ends_block() {
        let mut input = Cursor::new("A: 1\n \t\nB: 2\n");
        let lines = read_header_block(&mut input).unwrap();
        assert_eq!(lines, vec!["A: 1"]);
        assert_eq!(read_body(&mut input).unwrap(), "B: 2\n");
    }

    #[test]
    fn test_read_header_block_without_body() {
        let mut input = Cursor::new("A: 1\nB: 2");
        let raw = RawMessage::read(&mut input).unwrap();
        assert_eq!(raw.header_lines, vec!["A: 1", "B: 2"]);
        assert_eq!(raw.body, "");
    }

    #[test]
    fn test_read_body_decodes_each_line_alone() {
        let mut input = Cursor::new(
            b"Diagnostic-Code: smtp; 550 Empf\xC3\xA4nger unbekannt\r\nJ\xFCrgen\n\xFC".to_vec(),
        );
        assert_eq!(
            read_body(&mut input).unwrap(),
            "Diagnostic-Code: smtp; 550 Empfänger unbekannt\r\nJürgen\nü"
        );
    }

    #[test]
    fn test_analyze_plain_message_is_none() {
        let mut input = Cursor::new("Subject: hello\nContent-Type: text/plain\n\nhi\n");
        let raw = RawMessage::read(&mut input).unwrap();
        assert!(analyze_message(&raw, &labels(), received()).is_none());
    }

    #[test]
    fn test_analyze_uses_date_header() {
        let mut input = Cursor::new(
            "Date: Thu, 04 Jan 2024 09:00:00 +0000\n\
Content-Type: multipart/report; boundary=\"B\"\n\
\n\
--B\n\
Content-Description: delivery-report\n\
\n\
Status: 5.1.1\n\
--B--\n",
        );
        let raw = RawMessage::read(&mut input).unwrap();
        let report = analyze_message(&raw, &labels(), received()).unwrap();
        assert_eq!(report.status.as_deref(), Some("5.1.1"));
        assert_eq!(
            report.date.as_deref(),
            Some("Thu, 04 Jan 2024 09:00:00 +0000")
        );
    }

    #[test]
    fn test_analyze_falls_back_to_received_time() {
        let mut input = Cursor::new(
            "Content-Type: multipart/report; boundary=\"B\"\n\
\n\
--B\n\
Content-Description: orig\n\
\n\
To: Bob <bob@example.com>\n\
X-Mail-Id: 7\n\
--B--\n",
        );
        let raw = RawMessage::read(&mut input).unwrap();
        let report = analyze_message(&raw, &labels(), received()).unwrap();
        assert_eq!(report.email.as_deref(), Some("bob@example.com"));
        assert_eq!(report.mail_id.as_deref(), Some("7"));
        assert_eq!(report.date.as_deref(), Some("2024-01-04 10:30:00"));
    }
}
