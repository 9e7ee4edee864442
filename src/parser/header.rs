//! Header block parsing: folded lines, key lowercasing, and raw byte decoding.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Lowercase header name → value. A later `key:` line overwrites an earlier one.
pub type HeaderMap = BTreeMap<String, String>;

/// A folded continuation: leading ASCII whitespace, then the data to append.
static CONTINUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?-u:\s)+(?P<data>.*)$").expect("valid continuation regex"));

/// A `key: value` pair. The key is the shortest prefix up to the first colon.
static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<key>.*?):(?-u:\s)*(?P<value>.*)$").expect("valid field regex")
});

/// Runs of line breaks (`\r\n`, `\r` or `\n`).
static LINE_BREAKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\r\n|\r|\n)+").expect("valid line break regex"));

/// Parse one header block into a [`HeaderMap`].
///
/// Lines must already be split and carry no line terminators. A single forward
/// pass tracks the key of the last well-formed `key: value` line:
///
/// - a line starting with whitespace is appended (single space + trimmed data)
///   to that key's value, or dropped when there is no current key;
/// - a `key: value` line sets `headers[lowercase(key)] = value`;
/// - anything else clears the current key, so the continuations that follow it
///   are dropped until the next well-formed pair.
pub fn parse_header_lines<S: AsRef<str>>(lines: &[S]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let mut current: Option<String> = None;

    for line in lines {
        let line = line.as_ref();

        if let Some(caps) = CONTINUATION_RE.captures(line) {
            if let Some(value) = current.as_ref().and_then(|key| headers.get_mut(key)) {
                value.push(' ');
                value.push_str(caps["data"].trim_ascii());
            }
            continue;
        }

        if let Some(caps) = FIELD_RE.captures(line) {
            let key = caps["key"].to_lowercase();
            headers.insert(key.clone(), caps["value"].to_string());
            current = Some(key);
            continue;
        }

        current = None;
    }

    headers
}

/// Split free text (a sub-part header block) into lines on runs of line breaks.
///
/// Blank lines disappear; a leading or trailing break yields an empty line,
/// which the header parser treats as malformed.
pub fn split_header(text: &str) -> Vec<&str> {
    LINE_BREAKS_RE.split(text).collect()
}

/// Look up a lowercase header name, falling back to `default`.
pub fn header_value(headers: &HeaderMap, key: &str, default: &str) -> String {
    headers
        .get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Decode raw message bytes to text.
///
/// Strips a leading BOM, then decodes as in [`decode_segment`].
pub fn decode_bytes(bytes: &[u8]) -> String {
    decode_segment(bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes))
}

/// Decode one segment (typically a line) of raw text.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
/// Callers decode line by line so one stray byte only affects its own line.
pub fn decode_segment(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}
