/*!
 * Tests for scene document decoding and sanitizing
 */

use scriptsync::document_decoder::{decode, decode_document, sanitize, TextEncoding};
use scriptsync::scene_extractor::extract_scenes;
use crate::common;

/// UTF-16 documents with a byte-order mark decode to the original markup
#[test]
fn test_decode_withUtf16Bom_shouldRecoverJapaneseText() {
    let xliff = common::single_scene_xliff("scene_utf16", "日本語のテキストです。", "utf-16");
    let raw = common::utf16_with_bom(&xliff);

    let decoded = decode(&raw);

    assert_eq!(decoded, xliff);
}

/// Plain UTF-8 takes priority over UTF-16 interpretations
#[test]
fn test_decode_withPlainUtf8_shouldUseFirstEncoding() {
    let xliff = common::single_scene_xliff("s", "Hello", "utf-8");
    assert_eq!(TextEncoding::Utf8Sig.decode(xliff.as_bytes()).as_deref(), Some(xliff.as_str()));
    assert_eq!(decode(xliff.as_bytes()), xliff);
}

/// Odd-length input cannot be UTF-16
#[test]
fn test_encoding_decode_withOddLength_shouldRejectUtf16() {
    let raw = [0x3C, 0x00, 0x78];
    assert_eq!(TextEncoding::Utf16Le.decode(&raw), None);
    assert_eq!(TextEncoding::Utf16Be.decode(&raw), None);
    assert_eq!(TextEncoding::Utf16.decode(&raw), None);
}

/// A JSON envelope with the markup under "xliff" is unwrapped
#[test]
fn test_decode_document_withJsonEnvelope_shouldReturnMarkup() {
    let xliff = common::single_scene_xliff("scene__th", "สวัสดีค่ะ", "utf-8");
    let payload = serde_json::json!({ "xliff": xliff }).to_string();

    let markup = decode_document(payload.as_bytes());

    assert!(markup.starts_with("<?xml"));
    assert!(markup.contains("สวัสดีค่ะ"));
}

/// Envelope keys named "content" are used even when escaped
#[test]
fn test_sanitize_withEscapedContentKey_shouldUnescapeMarkup() {
    let escaped = "&lt;xliff version=&quot;1.2&quot;&gt;&lt;/xliff&gt;";
    let payload = serde_json::json!({ "status": "ok", "content": escaped }).to_string();

    assert_eq!(sanitize(&payload), r#"<xliff version="1.2"></xliff>"#);
}

/// Escaped envelopes may use any HTML5 named entity in the narration
#[test]
fn test_decode_document_withNamedEntitiesInEscapedContent_shouldParseScenes() {
    let escaped = concat!(
        "&lt;xliff version=&quot;1.2&quot;&gt;&lt;file&gt;&lt;body&gt;",
        "&lt;group id=&quot;cafe&quot;&gt;&lt;trans-unit id=&quot;script__scene__1&quot;&gt;",
        "&lt;source&gt;Caf&eacute; &hellip; d&eacute;j&agrave; vu&lt;/source&gt;",
        "&lt;/trans-unit&gt;&lt;/group&gt;&lt;/body&gt;&lt;/file&gt;&lt;/xliff&gt;"
    );
    let payload = serde_json::json!({ "content": escaped }).to_string();

    let markup = decode_document(payload.as_bytes());
    let scenes = extract_scenes(&markup).expect("named entities are resolved before parsing");

    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].text_runs(), ["Café … déjà vu".to_string()]);
}

/// A JSON envelope without markup leaves the text as it was
#[test]
fn test_sanitize_withEnvelopeWithoutMarkup_shouldKeepText() {
    let payload = r#"{"status": "pending"}"#;
    assert_eq!(sanitize(payload), payload);
}
