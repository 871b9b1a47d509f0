/*!
 * Scene extraction from XLIFF 1.2 scene documents.
 *
 * Every `<group>` is one video scene. Its `<trans-unit>` children are classified
 * by id prefix:
 * - `script__scene__*` units carry narration
 * - `element__title__scene__*` units carry the scene title (first one wins)
 * - anything else is layout text and ignored
 *
 * Narration is taken from inline spans marked `tag="voice"` or
 * `ctype="x-syn-voice"`; a unit without such spans contributes its whole text.
 */

use log::debug;
use roxmltree::{Document, Node, ParsingOptions};
use serde::Serialize;

use crate::document_decoder::decode_document;
use crate::errors::DocumentError;

/// XLIFF 1.2 namespace URI
pub const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// Id prefix of narration units
pub const SCRIPT_UNIT_PREFIX: &str = "script__scene__";

/// Id prefix of title units
pub const TITLE_UNIT_PREFIX: &str = "element__title__scene__";

/// Scene id used when a group has neither `id` nor `resname`
pub const UNKNOWN_SCENE_ID: &str = "unknown_scene";

const VOICE_TAG: &str = "voice";
const VOICE_CTYPE: &str = "x-syn-voice";

/// One scene group of the source document.
///
/// Built once by [`extract_scenes`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneRecord {
    #[serde(rename = "scene_id")]
    id: String,

    #[serde(rename = "scene_title", skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    #[serde(rename = "script")]
    text_runs: Vec<String>,

    #[serde(skip)]
    is_script_scene: bool,

    #[serde(skip)]
    original_order: usize,
}

impl SceneRecord {
    /// Create a record; the script flag is derived from the narration lines.
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        text_runs: Vec<String>,
        original_order: usize,
    ) -> Self {
        let is_script_scene = text_runs.iter().any(|run| !run.trim().is_empty());
        Self {
            id: id.into(),
            title,
            text_runs,
            is_script_scene,
            original_order,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn text_runs(&self) -> &[String] {
        &self.text_runs
    }

    /// True iff the scene has at least one non-empty narration line
    pub fn is_script_scene(&self) -> bool {
        self.is_script_scene
    }

    /// Position among all scene groups of the document
    pub fn original_order(&self) -> usize {
        self.original_order
    }

    /// Narration lines joined with single spaces
    pub fn matchable_text(&self) -> String {
        self.text_runs.join(" ")
    }
}

/// How element names are matched, decided once per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceMode {
    /// Elements must live in the XLIFF 1.2 namespace
    Xliff,
    /// Elements must carry no namespace
    Bare,
}

impl NamespaceMode {
    /// Pick the namespaced lookup if it finds any scene group, else fall back to bare names.
    pub fn detect(doc: &Document) -> Self {
        let namespaced = doc
            .descendants()
            .any(|node| NamespaceMode::Xliff.is_element(node, "group"));
        if namespaced {
            NamespaceMode::Xliff
        } else {
            NamespaceMode::Bare
        }
    }

    fn is_element(self, node: Node, local_name: &str) -> bool {
        if !node.is_element() || node.tag_name().name() != local_name {
            return false;
        }
        match self {
            NamespaceMode::Xliff => node.tag_name().namespace() == Some(XLIFF_NAMESPACE),
            NamespaceMode::Bare => node.tag_name().namespace().is_none(),
        }
    }
}

/// Kind of a trans-unit, from its id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    Script,
    Title,
    Ignored,
}

impl UnitKind {
    fn from_id(id: &str) -> Self {
        if id.starts_with(SCRIPT_UNIT_PREFIX) {
            UnitKind::Script
        } else if id.starts_with(TITLE_UNIT_PREFIX) {
            UnitKind::Title
        } else {
            UnitKind::Ignored
        }
    }
}

/// Extract every scene group of an XLIFF document, in document order.
///
/// An empty result is not an error; only markup the XML parser rejects is.
pub fn extract_scenes(markup: &str) -> Result<Vec<SceneRecord>, DocumentError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(markup, options)
        .map_err(|e| DocumentError::InvalidDocument(e.to_string()))?;

    let mode = NamespaceMode::detect(&doc);
    debug!("Resolving XLIFF elements with {:?} namespace mode", mode);

    let scenes: Vec<SceneRecord> = doc
        .descendants()
        .filter(|node| mode.is_element(*node, "group"))
        .enumerate()
        .map(|(order, group)| extract_scene(group, mode, order))
        .collect();

    debug!(
        "Extracted {} scene(s), {} with narration",
        scenes.len(),
        scenes.iter().filter(|s| s.is_script_scene()).count()
    );

    Ok(scenes)
}

/// Decode raw document bytes and extract every scene group.
pub fn extract_scenes_from_bytes(raw: &[u8]) -> Result<Vec<SceneRecord>, DocumentError> {
    extract_scenes(&decode_document(raw))
}

/// Decode raw document bytes and keep only scenes that carry narration.
pub fn parse_script_scenes(raw: &[u8]) -> Result<Vec<SceneRecord>, DocumentError> {
    let scenes = extract_scenes_from_bytes(raw)?;
    Ok(scenes.into_iter().filter(SceneRecord::is_script_scene).collect())
}

fn extract_scene(group: Node, mode: NamespaceMode, original_order: usize) -> SceneRecord {
    let id = group
        .attribute("id")
        .or_else(|| group.attribute("resname"))
        .unwrap_or(UNKNOWN_SCENE_ID);

    let mut title: Option<String> = None;
    let mut lines: Vec<String> = Vec::new();

    for unit in group.descendants().filter(|n| mode.is_element(*n, "trans-unit")) {
        let kind = UnitKind::from_id(unit.attribute("id").unwrap_or_default());
        if kind == UnitKind::Ignored {
            continue;
        }

        let Some(source) = unit.children().find(|n| mode.is_element(*n, "source")) else {
            continue;
        };

        match kind {
            UnitKind::Title => {
                if title.is_none() {
                    let text = flatten_text(source);
                    if !text.is_empty() {
                        title = Some(text);
                    }
                }
            }
            UnitKind::Script => lines.extend(narration_lines(source)),
            UnitKind::Ignored => {}
        }
    }

    SceneRecord::new(id, title, lines, original_order)
}

/// Narration of one `<source>`: voice spans if any, else the whole text.
fn narration_lines(source: Node) -> Vec<String> {
    let spans: Vec<Node> = source
        .descendants()
        .skip(1)
        .filter(|n| is_voice_span(*n))
        .collect();

    if spans.is_empty() {
        let text = flatten_text(source);
        return if text.is_empty() { Vec::new() } else { vec![text] };
    }

    spans
        .into_iter()
        .map(flatten_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn is_voice_span(node: Node) -> bool {
    node.is_element()
        && (node.attribute("tag") == Some(VOICE_TAG) || node.attribute("ctype") == Some(VOICE_CTYPE))
}

// All descendant text in document order, trimmed
fn flatten_text(node: Node) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}
