//! Recipient address extraction from free-form header values.

use once_cell::sync::Lazy;
use regex::Regex;

/// A full addr-spec: dot-atom or quoted local part, then a dotted hostname or
/// an address literal.
static ADDR_SPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r##"^(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[^"\\\r\n]|\\.)*")@(?:(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?|\[(?:(?:[0-9]{1,3}\.){3}[0-9]{1,3}|IPv6:[0-9A-Fa-f:.]+)\])$"##,
    )
    .expect("valid addr-spec regex")
});

static ANGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?P<email>.*?)>").expect("valid angle bracket regex"));

/// Whether `text` as a whole is a syntactically valid email address.
pub fn is_valid_email(text: &str) -> bool {
    let Some((local, domain)) = text.rsplit_once('@') else {
        return false;
    };
    local.len() <= 64 && domain.len() <= 253 && ADDR_SPEC_RE.is_match(text)
}

/// Pull a bare address out of a header value such as a `To:` line.
///
/// # Examples
/// - `"bob@example.com"` → `"bob@example.com"`
/// - `"Bob <bob@example.com>"` → `"bob@example.com"`
/// - `"no address here"` → `""`
///
/// The trimmed value is returned when it is itself a valid address; otherwise
/// the first `<…>` group is returned verbatim, unvalidated. An empty string
/// means no address was found.
pub fn extract_email(text: &str) -> String {
    let trimmed = text.trim();
    if is_valid_email(trimmed) {
        return trimmed.to_string();
    }

    ANGLE_RE
        .captures(text)
        .and_then(|caps| caps.name("email"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_address() {
        assert_eq!(extract_email("bob@example.com"), "bob@example.com");
        assert_eq!(extract_email("  bob@example.com \t"), "bob@example.com");
    }

    #[test]
    fn test_extract_name_and_address() {
        assert_eq!(extract_email("Bob <bob@example.com>"), "bob@example.com");
        assert_eq!(extract_email("<bob@example.com>"), "bob@example.com");
    }

    #[test]
    fn test_extract_no_address() {
        assert_eq!(extract_email("no address here"), "");
        assert_eq!(extract_email(""), "");
    }

    #[test]
    fn test_angle_content_is_not_validated() {
        assert_eq!(extract_email("undisclosed <recipients>"), "recipients");
        assert_eq!(extract_email("a <> b"), "");
    }

    #[test]
    fn test_first_angle_group_wins() {
        assert_eq!(
            extract_email("<first@example.com>, <second@example.com>"),
            "first@example.com"
        );
    }

    #[test]
    fn test_valid_email_forms() {
        assert!(is_valid_email("bob@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
        assert!(is_valid_email("\"john doe\"@example.com"));
        assert!(is_valid_email("root@[192.168.0.1]"));
    }

    #[test]
    fn test_invalid_email_forms() {
        assert!(!is_valid_email("Bob <bob@example.com>"));
        assert!(!is_valid_email("bob@localhost"));
        assert!(!is_valid_email("bob..smith@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("bob@-example.com"));
        assert!(!is_valid_email(&format!("{}@example.com", "a".repeat(65))));
    }
}
