/*!
 * Decoding of raw scene documents into clean XLIFF markup.
 *
 * Scene documents arrive as bytes of unknown encoding (UTF-8 with or without a
 * byte-order mark, or UTF-16 of either endianness) and are sometimes wrapped in
 * a JSON envelope whose markup may be HTML-entity-escaped. This module turns
 * them into a markup string that starts at the first `<`.
 */

use std::collections::VecDeque;

use log::debug;
use serde_json::Value;

/// Token whose presence identifies XLIFF markup
pub const MARKUP_START_TOKEN: &str = "<xliff";

/// Envelope keys inspected before the rest of the JSON tree
const PRIORITY_KEYS: [&str; 3] = ["content", "data", "xliff"];

/// Maximum nesting depth explored inside a JSON envelope
const MAX_ENVELOPE_DEPTH: usize = 32;

const BOM: char = '\u{feff}';

/// Supported input encodings, in the order they are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with an optional byte-order mark
    Utf8Sig,
    /// UTF-16 with the endianness taken from the byte-order mark (little-endian without one)
    Utf16,
    /// UTF-16 little-endian
    Utf16Le,
    /// UTF-16 big-endian
    Utf16Be,
}

impl TextEncoding {
    /// Attempt order used by [`decode`]
    pub const PRIORITY: [TextEncoding; 4] = [
        TextEncoding::Utf8Sig,
        TextEncoding::Utf16,
        TextEncoding::Utf16Le,
        TextEncoding::Utf16Be,
    ];

    /// Strictly decode `raw`, returning `None` when the bytes are not valid in this encoding
    pub fn decode(self, raw: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8Sig => {
                let body = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(raw);
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            TextEncoding::Utf16 => match raw {
                [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
                [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
                _ => decode_utf16(raw, u16::from_le_bytes),
            },
            TextEncoding::Utf16Le => decode_utf16(raw, u16::from_le_bytes),
            TextEncoding::Utf16Be => decode_utf16(raw, u16::from_be_bytes),
        }
    }
}

fn decode_utf16(raw: &[u8], to_unit: fn([u8; 2]) -> u16) -> Option<String> {
    if raw.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

fn looks_like_document(text: &str) -> bool {
    text.contains(MARKUP_START_TOKEN)
        || text.contains("<?xml")
        || text.trim_start_matches(BOM).trim_start().starts_with('{')
}

/// Decode raw document bytes into text.
///
/// The first encoding in [`TextEncoding::PRIORITY`] that decodes cleanly and
/// yields something resembling markup or a JSON envelope wins. When none does,
/// the bytes are decoded as UTF-8 with replacement characters.
pub fn decode(raw: &[u8]) -> String {
    for encoding in TextEncoding::PRIORITY {
        if let Some(text) = encoding.decode(raw) {
            if looks_like_document(&text) {
                debug!("Decoded scene document as {:?}", encoding);
                return text;
            }
        }
    }

    debug!("No encoding produced recognizable markup, decoding as lossy UTF-8");
    let body = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(raw);
    String::from_utf8_lossy(body).into_owned()
}

/// Unwrap an optional JSON envelope and trim transport artifacts before the markup.
pub fn sanitize(text: &str) -> String {
    let mut text = text;
    let unwrapped;

    if text.trim_start_matches(BOM).trim_start().starts_with('{') {
        match serde_json::from_str::<Value>(text.trim_start_matches(BOM).trim()) {
            Ok(envelope) => {
                if let Some(markup) = find_markup_in_envelope(&envelope) {
                    unwrapped = markup;
                    text = &unwrapped;
                } else {
                    debug!("JSON envelope contained no XLIFF markup");
                }
            }
            Err(e) => debug!("Document looks like JSON but failed to parse: {}", e),
        }
    }

    let text = text.trim_start_matches(BOM).trim_start();
    match text.find('<') {
        Some(idx) => text[idx..].to_string(),
        None => text.to_string(),
    }
}

/// Decode and sanitize in one step.
pub fn decode_document(raw: &[u8]) -> String {
    sanitize(&decode(raw))
}

/// Breadth-first search of a JSON value for a string holding XLIFF markup.
///
/// At every object the priority keys are examined before any other member is
/// queued, so a conventional envelope is resolved without walking the whole tree.
pub fn find_markup_in_envelope(root: &Value) -> Option<String> {
    let mut queue: VecDeque<(&Value, usize)> = VecDeque::new();
    queue.push_back((root, 0));

    while let Some((value, depth)) = queue.pop_front() {
        match value {
            Value::String(s) => {
                if let Some(markup) = markup_from_string(s) {
                    return Some(markup);
                }
            }
            Value::Object(map) => {
                for key in PRIORITY_KEYS {
                    if let Some(Value::String(s)) = map.get(key) {
                        if let Some(markup) = markup_from_string(s) {
                            return Some(markup);
                        }
                    }
                }
                if depth < MAX_ENVELOPE_DEPTH {
                    queue.extend(
                        map.iter()
                            .filter(|(key, child)| {
                                !(PRIORITY_KEYS.contains(&key.as_str()) && child.is_string())
                            })
                            .map(|(_, child)| (child, depth + 1)),
                    );
                }
            }
            Value::Array(items) => {
                if depth < MAX_ENVELOPE_DEPTH {
                    queue.extend(items.iter().map(|child| (child, depth + 1)));
                }
            }
            _ => {}
        }
    }

    None
}

fn markup_from_string(s: &str) -> Option<String> {
    if s.contains(MARKUP_START_TOKEN) {
        return Some(s.to_string());
    }
    if s.contains('&') {
        let unescaped = unescape_html(s);
        if unescaped.contains(MARKUP_START_TOKEN) {
            return Some(unescaped);
        }
    }
    None
}

/// Replace HTML character references with the characters they stand for.
///
/// Covers numeric references and the full HTML5 named-entity set. Unknown or
/// malformed references are left untouched.
pub fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
