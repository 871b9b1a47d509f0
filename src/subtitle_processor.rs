use std::fmt;

use log::{debug, warn};
use once_cell::sync::{Lazy, OnceCell};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::text_normalizer::normalize;

// @module: Subtitle cue parsing

// @const: Token separating start and end of a cue timing line
pub const CUE_SEPARATOR: &str = "-->";

// @const: SRT timing line (HH:MM:SS,mmm --> HH:MM:SS,mmm)
static SRT_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2}),(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @const: Dotted timing line (HH:MM:SS.mmm --> HH:MM:SS.mmm)
static DOTTED_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})\.(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})\.(\d{3})").unwrap()
});

// @struct: Single timed subtitle cue
#[derive(Debug, Clone, Serialize)]
pub struct Cue {
    // @field: Start in seconds
    pub start: f64,

    // @field: End in seconds
    pub end: f64,

    // @field: Cue text as it appears in the stream
    pub content: String,

    #[serde(skip)]
    normalized: OnceCell<String>,
}

impl Cue {
    /// Creates a new cue
    pub fn new(start: f64, end: f64, content: impl Into<String>) -> Self {
        Cue {
            start,
            end,
            content: content.into(),
            normalized: OnceCell::new(),
        }
    }

    /// Normalized content, computed on first access
    pub fn normalized(&self) -> &str {
        self.normalized.get_or_init(|| normalize(&self.content))
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl PartialEq for Cue {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && self.content == other.content
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", format_timestamp(self.start), format_timestamp(self.end))?;
        writeln!(f, "{}", self.content)
    }
}

/// Cue block grammars understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueGrammar {
    /// `HH:MM:SS,mmm` timings, optional numeric index line
    Srt,
    /// `HH:MM:SS.mmm` timings, optional identifier line
    Dotted,
}

impl CueGrammar {
    fn timing_regex(self) -> &'static Regex {
        match self {
            CueGrammar::Srt => &SRT_TIMING_REGEX,
            CueGrammar::Dotted => &DOTTED_TIMING_REGEX,
        }
    }

    /// Whether `line` may precede the timing line of a block
    fn accepts_header(self, line: &str) -> bool {
        match self {
            CueGrammar::Srt => line.chars().all(|c| c.is_ascii_digit()),
            CueGrammar::Dotted => true,
        }
    }
}

/// Parse a subtitle stream, trying the SRT grammar first and the dotted grammar second.
///
/// Never fails: unparsable input yields an empty list. Cues keep their stream order.
pub fn parse_cues(text: &str) -> Vec<Cue> {
    let cues = parse_primary(text);
    if cues.is_empty() && text.contains(CUE_SEPARATOR) {
        debug!("No SRT cues found, retrying with dotted timestamps");
        return parse_alternate(text);
    }
    cues
}

/// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm` blocks
pub fn parse_primary(text: &str) -> Vec<Cue> {
    parse_with_grammar(text, CueGrammar::Srt)
}

/// Parse `HH:MM:SS.mmm --> HH:MM:SS.mmm` blocks
pub fn parse_alternate(text: &str) -> Vec<Cue> {
    parse_with_grammar(text, CueGrammar::Dotted)
}

fn parse_with_grammar(text: &str, grammar: CueGrammar) -> Vec<Cue> {
    let text = text.trim_start_matches('\u{feff}');
    let mut cues = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if let Some(cue) = parse_block(&block, grammar) {
                cues.push(cue);
            }
            block.clear();
        } else {
            block.push(trimmed);
        }
    }

    // Last block may end at end of input without a blank line
    if let Some(cue) = parse_block(&block, grammar) {
        cues.push(cue);
    }

    cues
}

// @parses: One blank-line delimited block into a cue
fn parse_block(lines: &[&str], grammar: CueGrammar) -> Option<Cue> {
    let regex = grammar.timing_regex();

    let (timing_idx, caps) = match lines {
        [first, ..] if regex.is_match(first) => (0, regex.captures(first)?),
        [header, second, ..] if grammar.accepts_header(header) && regex.is_match(second) => {
            (1, regex.captures(second)?)
        }
        _ => return None,
    };

    let content = lines[timing_idx + 1..].join("\n");
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    let start = timestamp_from_captures(&caps, 1);
    let end = timestamp_from_captures(&caps, 5);
    if end < start {
        warn!("Skipping cue with end {} before start {}", end, start);
        return None;
    }

    Some(Cue::new(start, end, content))
}

// @converts: Four consecutive capture groups (h, m, s, ms) to seconds
fn timestamp_from_captures(caps: &Captures, start_idx: usize) -> f64 {
    let part = |offset: usize| -> u64 {
        caps.get(start_idx + offset)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    to_seconds(part(0), part(1), part(2), part(3))
}

/// Convert timestamp components to seconds; only the final division is fractional
pub fn to_seconds(hours: u64, minutes: u64, seconds: u64, millis: u64) -> f64 {
    let total_ms = (hours * 3600 + minutes * 60 + seconds) * 1000 + millis;
    total_ms as f64 / 1000.0
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
pub fn format_timestamp(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
