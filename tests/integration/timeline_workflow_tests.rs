/*!
 * End-to-end tests from scene document and subtitles to a JSON timeline
 */

use anyhow::Result;
use serde_json::Value;
use scriptsync::app_config::Config;
use scriptsync::app_controller::{Controller, FolderSummary};
use scriptsync::errors::AppError;
use scriptsync::timeline_aligner::VISUAL_SCENE_PLACEHOLDER;
use crate::common;

const EMPTY_XLIFF: &str = r#"<xliff version="1.2"><file><body></body></file></xliff>"#;

fn controller() -> Controller {
    Controller::with_config(Config::default()).expect("default config is valid")
}

/// Narrated scenes take cue timings and the visual scene fills the gap
#[test]
fn test_build_timeline_withVisualScene_shouldProduceOrderedTimeline() -> Result<()> {
    let timeline = controller().build_timeline(common::TIMELINE_XLIFF.as_bytes(), common::TIMELINE_SRT)?;

    let ids: Vec<&str> = timeline.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["s1", "v1", "s2"]);
    assert_eq!(timeline[0].script.as_str(), "Hello world");
    assert_eq!(timeline[1].script.as_str(), VISUAL_SCENE_PLACEHOLDER);
    common::assert_time(timeline[1].start_time, 1.0);
    common::assert_time(timeline[1].end_time, 1.2);
    common::assert_time(timeline[2].start_time, 1.2);
    common::assert_time(timeline[2].end_time, 2.0);
    Ok(())
}

/// UTF-16 documents with Thai narration align against UTF-8 subtitles
#[test]
fn test_build_timeline_withUtf16ThaiDocument_shouldMatchCue() -> Result<()> {
    let document = common::utf16_with_bom(&common::single_scene_xliff("th1", "สวัสดีค่ะ", "utf-16"));
    let subtitles = "1\n00:00:00,000 --> 00:00:01,000\nสวัสดีค่ะ\n";

    let timeline = controller().build_timeline(&document, subtitles)?;

    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].id, "th1");
    assert_eq!(timeline[0].script.as_str(), "สวัสดีค่ะ");
    common::assert_time(timeline[0].start_time, 0.0);
    common::assert_time(timeline[0].end_time, 1.0);
    Ok(())
}

/// Unparsable subtitles still yield a fully synthesized timeline
#[test]
fn test_build_timeline_withGarbageSubtitles_shouldSynthesizeTimings() -> Result<()> {
    let timeline = controller().build_timeline(common::TIMELINE_XLIFF.as_bytes(), "no cues here")?;

    common::assert_time(timeline[0].start_time, 0.0);
    common::assert_time(timeline[0].end_time, 2.0);
    common::assert_time(timeline[1].start_time, 2.0);
    common::assert_time(timeline[1].end_time, 2.0);
    common::assert_time(timeline[2].start_time, 2.0);
    common::assert_time(timeline[2].end_time, 4.0);
    Ok(())
}

/// Documents without scene groups are rejected unless configured otherwise
#[test]
fn test_load_scenes_withNoGroups_shouldHonorRequireScenes() -> Result<()> {
    let result = controller().load_scenes(EMPTY_XLIFF.as_bytes());
    assert!(matches!(result, Err(AppError::NoScenes)));

    let mut config = Config::default();
    config.output.require_scenes = false;
    let lenient = Controller::with_config(config)?;
    assert!(lenient.build_timeline(EMPTY_XLIFF.as_bytes(), common::TIMELINE_SRT)?.is_empty());
    Ok(())
}

/// Invalid configurations are refused at construction
#[test]
fn test_controller_with_config_withInvalidAlignment_shouldFail() {
    let mut config = Config::default();
    config.alignment.fallback_duration_secs = -2.0;
    assert!(matches!(Controller::with_config(config), Err(AppError::Config(_))));
}

/// Script export lists narrated scenes only, with their lines
#[test]
fn test_run_script_withDocument_shouldExportNarratedScenes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let document = common::create_test_file(temp_dir.path(), "video.xliff", common::TIMELINE_XLIFF)?;

    let json: Value = serde_json::from_str(&controller().run_script(&document)?)?;

    let scenes = json.as_array().expect("array output");
    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0]["scene_id"], "s1");
    assert_eq!(scenes[0]["script"], serde_json::json!(["Hello world"]));
    assert_eq!(scenes[1]["scene_id"], "s2");
    assert!(scenes[1].get("scene_title").is_none());
    Ok(())
}

/// Timeline JSON from files carries every field, compact when configured
#[test]
fn test_run_timeline_withCompactOutput_shouldEmitSingleLine() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let document = common::create_test_file(temp_dir.path(), "video.xliff", common::TIMELINE_XLIFF)?;
    let subtitles = common::create_test_file(temp_dir.path(), "video.srt", common::TIMELINE_SRT)?;

    let mut config = Config::default();
    config.output.pretty = false;
    let output = Controller::with_config(config)?.run_timeline(&document, &subtitles)?;

    assert!(!output.contains('\n'));
    let json: Value = serde_json::from_str(&output)?;
    assert_eq!(json[1]["id"], "v1");
    assert_eq!(json[1]["title"], "Scene 2");
    assert_eq!(json[1]["script"], VISUAL_SCENE_PLACEHOLDER);
    assert!(json[1]["screenshot_time"].is_number());
    Ok(())
}

/// Existing output files are only replaced with force
#[test]
fn test_write_output_withExistingFile_shouldRequireForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "out.json", "old")?;
    let controller = controller();

    assert!(controller.write_output("[]", Some(&path), false).is_err());
    assert_eq!(std::fs::read_to_string(&path)?, "old");

    controller.write_output("[]", Some(&path), true)?;
    assert_eq!(std::fs::read_to_string(&path)?, "[]");
    Ok(())
}

/// Folder mode pairs documents with subtitles and reports what it did
#[test]
fn test_run_folder_withMixedDocuments_shouldSummarize() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "video.xliff", common::TIMELINE_XLIFF)?;
    common::create_test_file(dir, "video.srt", common::TIMELINE_SRT)?;
    common::create_test_file(dir, "lonely.xliff", common::TIMELINE_XLIFF)?;
    common::create_test_file(dir, "broken.xlf", EMPTY_XLIFF)?;
    common::create_test_file(dir, "broken.srt", common::TIMELINE_SRT)?;
    let controller = controller();

    let summary = controller.run_folder(dir, false)?;

    assert_eq!(summary, FolderSummary { processed: 1, skipped: 1, failed: 1 });
    let written: Value = serde_json::from_str(&std::fs::read_to_string(dir.join("video.timeline.json"))?)?;
    assert_eq!(written.as_array().map(Vec::len), Some(3));

    // Second run leaves the existing timeline alone unless forced
    let summary = controller.run_folder(dir, false)?;
    assert_eq!(summary, FolderSummary { processed: 0, skipped: 2, failed: 1 });
    let summary = controller.run_folder(dir, true)?;
    assert_eq!(summary.processed, 1);
    Ok(())
}

/// Folder mode needs an existing directory
#[test]
fn test_run_folder_withMissingDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(controller().run_folder(&temp_dir.path().join("missing"), false).is_err());
    Ok(())
}
