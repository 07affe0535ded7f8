//! ICY metadata text parsing
//!
//! Pure parsing and sanitization for ICY (Icecast/Shoutcast) metadata frames
//! and response headers.

/// Decoded fields of one metadata frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFrame {
    pub title: Option<String>,
    pub url: Option<String>,
}

/// "Now playing" notification emitted when the stream title changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub url: Option<String>,
}

/// Parse one metadata frame's text: zero or more `Key='Value';` tokens.
///
/// Extracts exactly `StreamTitle` and `StreamUrl`. The value runs from the
/// opening quote to the next quote; there is no escape sequence, so a value
/// containing `'` truncates at that character. This matches what ICY servers
/// actually emit and is a documented limitation, not something to fix.
///
/// Returns `None` when neither key is present or the input is empty.
pub fn parse_metadata(text: &str) -> Option<MetadataFrame> {
    if text.is_empty() {
        return None;
    }

    let title = extract_quoted_value(text, "StreamTitle='");
    let url = extract_quoted_value(text, "StreamUrl='");

    if title.is_none() && url.is_none() {
        return None;
    }

    Some(MetadataFrame { title, url })
}

/// Find `key` and return the text up to the next `'`.
/// A missing closing quote yields nothing.
fn extract_quoted_value(text: &str, key: &str) -> Option<String> {
    let start = text.find(key)? + key.len();
    let end = text[start..].find('\'')?;
    Some(text[start..start + end].to_string())
}

/// Decode a raw metadata frame body to text.
///
/// Frames are null-padded to a multiple of 16 bytes and occasionally carry
/// stray control bytes. Lossy UTF-8 decode, then strip NULs and control
/// characters, then trim. Never fails: undecodable input degrades to an
/// empty string.
pub fn decode_metadata_block(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let cleaned: String = text.chars().filter(|c| !c.is_control()).collect();
    cleaned.trim().to_string()
}

/// Sanitize an ICY response header value: strip control characters, trim,
/// collapse internal whitespace runs to a single space.
///
/// Returns `None` when nothing printable remains.
pub fn sanitize_header_value(raw: &str) -> Option<String> {
    let stripped: String = raw.chars().filter(|c| !c.is_control()).collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
