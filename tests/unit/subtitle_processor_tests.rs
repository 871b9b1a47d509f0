/*!
 * Tests for subtitle cue parsing
 */

use scriptsync::subtitle_processor::{parse_alternate, parse_cues, parse_primary, Cue, CUE_SEPARATOR};
use crate::common;

/// Standard SRT content parses into ordered cues
#[test]
fn test_parse_cues_withValidSrt_shouldParseCorrectly() {
    let cues = parse_cues(common::TIMELINE_SRT);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].content, "Hello world");
    common::assert_time(cues[0].start, 0.0);
    common::assert_time(cues[0].end, 1.0);
    assert_eq!(cues[1].content, "Bye now");
    common::assert_time(cues[1].start, 1.2);
    common::assert_time(cues[1].end, 2.0);
}

/// Cues keep stream order even when their timestamps are not sorted
#[test]
fn test_parse_cues_withUnsortedTimestamps_shouldKeepStreamOrder() {
    let srt = "1\n00:00:05,000 --> 00:00:06,000\nLater\n\n2\n00:00:01,000 --> 00:00:02,000\nEarlier\n";

    let cues = parse_cues(srt);

    let contents: Vec<&str> = cues.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, ["Later", "Earlier"]);
}

/// Multi-line cue content is joined with newlines
#[test]
fn test_parse_cues_withMultiLineContent_shouldJoinLines() {
    let srt = "7\n01:00:00,001 --> 01:00:02,999\nFirst line\nSecond line\n\n";

    let cues = parse_cues(srt);

    assert_eq!(cues, vec![Cue::new(3600.001, 3602.999, "First line\nSecond line")]);
}

/// Dotted timestamps are only understood by the alternate grammar
#[test]
fn test_parse_cues_withDottedTimestamps_shouldFallBackToAlternate() {
    let vtt = "WEBVTT\n\n1\n00:00:00.000 --> 00:00:01.500\nこんにちは\n";

    assert!(parse_primary(vtt).is_empty());
    assert!(vtt.contains(CUE_SEPARATOR));
    assert_eq!(parse_alternate(vtt), vec![Cue::new(0.0, 1.5, "こんにちは")]);
    assert_eq!(parse_cues(vtt), parse_alternate(vtt));
}

/// Non-conforming input yields no cues and no error
#[test]
fn test_parse_cues_withInvalidContent_shouldReturnEmpty() {
    assert!(parse_cues("not an srt").is_empty());
    assert!(parse_cues("1\n00:00:01 --> 00:00:02\nno millis").is_empty());
    assert!(parse_cues("\n\n\n").is_empty());
}

/// Blocks whose content is blank are dropped
#[test]
fn test_parse_cues_withEmptyContent_shouldDropBlock() {
    let srt = "1\n00:00:00,000 --> 00:00:01,000\n\n2\n00:00:01,000 --> 00:00:02,000\nKept\n";

    let cues = parse_cues(srt);

    assert_eq!(cues, vec![Cue::new(1.0, 2.0, "Kept")]);
}

/// Normalized cue text folds width, case and punctuation
#[test]
fn test_cue_normalized_withMixedText_shouldFold() {
    let cue = Cue::new(0.0, 1.0, "ＨＥＬＬＯ, World!");
    assert_eq!(cue.normalized(), "helloworld");
    common::assert_time(cue.duration(), 1.0);
}
