/*!
 * Timeline alignment of scene narration against subtitle cues.
 *
 * Alignment runs in three passes:
 * 1. Greedy matching: cues are accumulated into a normalized buffer until the
 *    buffer matches the narration of the next script scene.
 * 2. Fallback: script scenes left unmatched when the cues run out get
 *    synthesized, chained timings.
 * 3. Reconstruction: scenes without narration are slotted into the gaps
 *    between their neighbours, and every entry is titled by position.
 */

use log::{debug, warn};
use serde::{Serialize, Serializer};

use crate::app_config::AlignmentConfig;
use crate::scene_extractor::SceneRecord;
use crate::subtitle_processor::Cue;
use crate::text_normalizer::normalize;

/// Script text given to scenes without narration
pub const VISUAL_SCENE_PLACEHOLDER: &str = "[Visual Scene]";

/// Script of a timed scene
#[derive(Debug, Clone, PartialEq)]
pub enum SceneScript {
    /// Narration lines joined with single spaces
    Narration(String),
    /// Scene without narration
    Visual,
}

impl SceneScript {
    pub fn as_str(&self) -> &str {
        match self {
            SceneScript::Narration(text) => text,
            SceneScript::Visual => VISUAL_SCENE_PLACEHOLDER,
        }
    }

    pub fn is_visual(&self) -> bool {
        matches!(self, SceneScript::Visual)
    }
}

impl Serialize for SceneScript {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One entry of the final timeline, all times in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedScene {
    pub id: String,
    pub title: String,
    pub script: SceneScript,
    pub start_time: f64,
    pub end_time: f64,
    pub screenshot_time: f64,
}

/// Which rule accepted a scene during greedy matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Scene narration found verbatim inside the buffer
    Direct,
    /// Buffer is a long enough part of the narration
    Progress,
    /// Buffer grew well past the narration length
    Overflow,
}

/// How a script scene got its timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingSource {
    Matched(MatchRule),
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timing {
    start: f64,
    end: f64,
    source: TimingSource,
}

/// Aligns extracted scenes with parsed cues
#[derive(Debug, Clone, Default)]
pub struct TimelineAligner {
    config: AlignmentConfig,
}

impl TimelineAligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Decide whether the buffered cue text completes `target`.
    ///
    /// Both arguments must already be normalized; lengths are counted in characters.
    pub fn match_rule(&self, buffer: &str, target: &str) -> Option<MatchRule> {
        let buffer_len = buffer.chars().count() as f64;
        let target_len = target.chars().count() as f64;

        if buffer.contains(target) {
            return Some(MatchRule::Direct);
        }
        if target.contains(buffer) && buffer_len >= self.config.min_progress_ratio * target_len {
            return Some(MatchRule::Progress);
        }
        let overflow_len = (self.config.overflow_min_chars as f64).max(self.config.overflow_ratio * target_len);
        if buffer_len >= overflow_len {
            return Some(MatchRule::Overflow);
        }
        None
    }

    /// Produce the ordered, fully timed scene list.
    pub fn align(&self, scenes: &[SceneRecord], cues: &[Cue]) -> Vec<TimedScene> {
        let mut ordered: Vec<&SceneRecord> = scenes.iter().collect();
        ordered.sort_by_key(|scene| scene.original_order());

        let script_scenes: Vec<&SceneRecord> = ordered
            .iter()
            .copied()
            .filter(|scene| scene.is_script_scene())
            .collect();

        if cues.is_empty() && !script_scenes.is_empty() {
            warn!("No subtitle cues available, all {} script scene(s) get fallback timing", script_scenes.len());
        }

        let (mut timings, pending_start) = self.match_scenes(&script_scenes, cues);
        let matched = timings.len();
        self.fill_fallback(&mut timings, script_scenes.len(), pending_start, cues);

        debug!(
            "Aligned {} script scene(s): {} matched, {} fallback",
            script_scenes.len(),
            matched,
            script_scenes.len() - matched
        );

        self.reconstruct(&ordered, &timings)
    }

    // Pass 1: returns timings for the matched prefix of script scenes and the
    // start of a still-open buffer, if any.
    fn match_scenes(&self, script_scenes: &[&SceneRecord], cues: &[Cue]) -> (Vec<Timing>, Option<f64>) {
        let mut timings: Vec<Timing> = Vec::with_capacity(script_scenes.len());
        let mut buffer = String::new();
        let mut pending_start: Option<f64> = None;
        let mut cached_target: Option<String> = None;

        for cue in cues {
            let Some(scene) = script_scenes.get(timings.len()) else {
                break;
            };

            if buffer.is_empty() {
                pending_start = Some(cue.start);
            }
            buffer.push_str(cue.normalized());

            let target = cached_target.get_or_insert_with(|| normalize(&scene.matchable_text()));
            if target.is_empty() {
                continue;
            }

            if let Some(rule) = self.match_rule(&buffer, target) {
                let start = pending_start.unwrap_or(cue.start);
                debug!("Scene '{}' matched by {:?} rule at {:.3}s", scene.id(), rule, cue.end);
                timings.push(Timing {
                    start,
                    end: cue.end.max(start),
                    source: TimingSource::Matched(rule),
                });
                buffer.clear();
                pending_start = None;
                cached_target = None;
            }
        }

        (timings, pending_start)
    }

    // Pass 2: chain synthesized timings after the last cue
    fn fill_fallback(&self, timings: &mut Vec<Timing>, total: usize, mut pending_start: Option<f64>, cues: &[Cue]) {
        let mut anchor = cues.last().map_or(0.0, |cue| cue.end);

        while timings.len() < total {
            let start = pending_start.take().unwrap_or(anchor);
            let end = start + self.config.fallback_duration_secs;
            timings.push(Timing {
                start,
                end,
                source: TimingSource::Fallback,
            });
            anchor = end;
        }
    }

    // Pass 3: interleave visual scenes and title everything by position
    fn reconstruct(&self, ordered: &[&SceneRecord], script_timings: &[Timing]) -> Vec<TimedScene> {
        let mut script_timings = script_timings.iter();
        let per_scene: Vec<Option<Timing>> = ordered
            .iter()
            .map(|scene| {
                if scene.is_script_scene() {
                    script_timings.next().copied()
                } else {
                    None
                }
            })
            .collect();

        // Start of the nearest timed script scene after each position
        let mut next_start: Vec<Option<f64>> = vec![None; ordered.len()];
        let mut upcoming: Option<f64> = None;
        for idx in (0..ordered.len()).rev() {
            next_start[idx] = upcoming;
            if let Some(timing) = per_scene[idx] {
                upcoming = Some(timing.start);
            }
        }

        let mut timeline = Vec::with_capacity(ordered.len());
        let mut last_end_time = 0.0_f64;

        for (idx, scene) in ordered.iter().enumerate() {
            let title = format!("Scene {}", idx + 1);

            let entry = match per_scene[idx] {
                Some(timing) => {
                    if timing.source == TimingSource::Fallback {
                        debug!("Scene '{}' has no matching cues, using synthesized timing", scene.id());
                    }
                    TimedScene {
                        id: scene.id().to_string(),
                        title,
                        script: SceneScript::Narration(scene.matchable_text()),
                        start_time: timing.start,
                        end_time: timing.end,
                        screenshot_time: (timing.end - self.config.screenshot_offset_secs).max(0.0),
                    }
                }
                None => {
                    let start = last_end_time;
                    let end = next_start[idx]
                        .unwrap_or(start + self.config.fallback_duration_secs)
                        .max(start);
                    TimedScene {
                        id: scene.id().to_string(),
                        title,
                        script: SceneScript::Visual,
                        start_time: start,
                        end_time: end,
                        screenshot_time: (start + end) / 2.0,
                    }
                }
            };

            last_end_time = entry.end_time;
            timeline.push(entry);
        }

        timeline
    }
}

/// Align with the default matching parameters.
pub fn align(scenes: &[SceneRecord], cues: &[Cue]) -> Vec<TimedScene> {
    TimelineAligner::default().align(scenes, cues)
}
