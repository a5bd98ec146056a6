// ABOUTME: Input decoding for raw page bytes handed over by an external fetcher.
// ABOUTME: Picks the charset from the Content-Type value, a <meta> declaration or detection.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Only the head of a page is searched for a `<meta>` charset declaration.
const META_SCAN_LIMIT: usize = 4096;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([A-Za-z0-9_:.\-]+)"#).unwrap()
});

/// Decode page bytes to a String.
///
/// The charset is taken from the Content-Type value when it names a known
/// encoding, then from a `<meta charset>` or `http-equiv` declaration near
/// the top of the page, and finally guessed with chardetng. A byte order
/// mark always wins.
pub fn decode_html(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(body))
        .unwrap_or_else(|| detect(body));

    let (decoded, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(encoding = used.name(), "input contained malformed sequences");
    }
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            // Remove quotes if present
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SCAN_LIMIT)];
    let label = META_CHARSET_RE.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

fn detect(body: &[u8]) -> &'static Encoding {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    detector.guess(Some(b"hu"), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "Árvíztűrő tükörfúrógép";

    fn encode(text: &str, encoding: &'static Encoding) -> Vec<u8> {
        let (bytes, _, _) = encoding.encode(text);
        bytes.into_owned()
    }

    #[test]
    fn extract_charset_handles_quotes_and_case() {
        assert_eq!(
            extract_charset("text/html; Charset=\"ISO-8859-2\""),
            Some("iso-8859-2".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn content_type_charset_wins() {
        let body = encode(SAMPLE, encoding_rs::ISO_8859_2);
        assert_eq!(
            decode_html(&body, Some("text/html; charset=iso-8859-2")),
            SAMPLE
        );
    }

    #[test]
    fn meta_charset_is_used_without_header() {
        let mut body = b"<html><head><meta charset=\"windows-1250\"></head><body><p>".to_vec();
        body.extend(encode(SAMPLE, encoding_rs::WINDOWS_1250));
        body.extend_from_slice(b"</p></body></html>");
        let html = decode_html(&body, None);
        assert!(html.contains(SAMPLE), "got: {html}");
    }

    #[test]
    fn http_equiv_declaration_is_recognised() {
        let body = br#"<meta http-equiv="Content-Type" content="text/html; charset=iso-8859-2">"#;
        assert_eq!(meta_charset(body), Some(encoding_rs::ISO_8859_2));
    }

    #[test]
    fn unknown_header_label_falls_through() {
        let body = format!("<p>{}</p>", SAMPLE);
        assert_eq!(
            decode_html(body.as_bytes(), Some("text/html; charset=nonsense")),
            body
        );
    }

    #[test]
    fn utf8_is_detected() {
        let body = format!("<p>{}</p>", SAMPLE);
        assert_eq!(decode_html(body.as_bytes(), None), body);
    }
}
