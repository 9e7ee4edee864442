//! MIME body segmentation: one boundary level, parts keyed by `Content-Description`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::parser::header::{header_value, parse_header_lines, split_header, HeaderMap};

/// Part label (`Content-Description` value, or `""`) → raw part content.
pub type BodyParts = BTreeMap<String, String>;

static BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"boundary="(?P<boundary>.*?)""#).expect("valid boundary regex"));

/// Extract the quoted `boundary="…"` token from a `Content-Type` value.
pub fn extract_boundary(content_type: &str) -> Option<&str> {
    BOUNDARY_RE
        .captures(content_type)
        .and_then(|caps| caps.name("boundary"))
        .map(|m| m.as_str())
}

/// Split a message body into its MIME parts.
///
/// Returns an empty map when the headers carry no `content-type` or it declares
/// no quoted boundary. Each part runs from just after a `--boundary` line (and
/// its line breaks) up to the next `--boundary`; the closing delimiter only
/// terminates the last part. A delimiter directly followed by anything other
/// than a line break (such as the closing `--boundary--`) never opens a part.
///
/// Parts are labelled by their `Content-Description` header; a later part with
/// the same label replaces the earlier one, and a part whose header block
/// yields no description is stored under `""`.
pub fn fetch_body_parts(body: &str, headers: &HeaderMap) -> BodyParts {
    let mut parts = BodyParts::new();

    let content_type = header_value(headers, "content-type", "");
    let Some(boundary) = extract_boundary(&content_type) else {
        debug!("No multipart boundary declared");
        return parts;
    };

    for text in segment_body(body, boundary) {
        let (part_header, content) = split_part(text);
        let part_headers = parse_header_lines(&split_header(part_header));
        let label = header_value(&part_headers, "content-description", "");

        debug!(label = %label, bytes = content.len(), "Found body part");
        parts.insert(label, content.to_string());
    }

    parts
}

/// Return the raw text of every part delimited by `--boundary`.
fn segment_body<'a>(body: &'a str, boundary: &str) -> Vec<&'a str> {
    let delimiter = format!("--{boundary}");
    let opener = match Regex::new(&format!(r"{}(?:\r\n|\r|\n)+", regex::escape(&delimiter))) {
        Ok(re) => re,
        Err(e) => {
            debug!(error = %e, "Boundary pattern rejected");
            return Vec::new();
        }
    };

    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(open) = opener.find_at(body, pos) {
        match body[open.end()..].find(&delimiter) {
            Some(len) => {
                segments.push(&body[open.end()..open.end() + len]);
                pos = open.end() + len;
            }
            None => break,
        }
    }

    segments
}

/// Split part text at its first blank line into `(header block, content)`.
///
/// Without a blank line the whole text is the header block and the content is
/// empty.
fn split_part(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    for i in 0..bytes.len() {
        let first = line_break_len(bytes, i);
        if first == 0 {
            continue;
        }
        let second = line_break_len(bytes, i + first);
        if second > 0 {
            return (&text[..i], &text[i + first + second..]);
        }
    }
    (text, "")
}

/// Length of the line break starting at `i`: 2 for `\r\n`, 1 for `\r` or `\n`.
fn line_break_len(bytes: &[u8], i: usize) -> usize {
    match bytes.get(i) {
        Some(b'\r') if bytes.get(i + 1) == Some(&b'\n') => 2,
        Some(b'\r') | Some(b'\n') => 1,
        _ => 0,
    }
}
