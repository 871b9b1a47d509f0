use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::app_config::Config;
use crate::document_decoder::decode_document;
use crate::errors::AppError;
use crate::file_utils::{FileManager, DOCUMENT_EXTENSIONS};
use crate::scene_extractor::{extract_scenes, SceneRecord};
use crate::subtitle_processor::parse_cues;
use crate::timeline_aligner::{TimedScene, TimelineAligner};

// @module: Application controller for scene timeline extraction

/// Suffix of timeline files written in folder mode
pub const TIMELINE_SUFFIX: &str = "timeline.json";

/// Outcome of a folder run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    /// Documents for which a timeline was written
    pub processed: usize,
    /// Documents skipped (no subtitle file, or output already present)
    pub skipped: usize,
    /// Documents that failed
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Aligner built from the alignment config
    aligner: TimelineAligner,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        let aligner = TimelineAligner::new(config.alignment.clone());
        Ok(Self { config, aligner })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode a scene document and extract all of its scene groups
    pub fn load_scenes(&self, document: &[u8]) -> Result<Vec<SceneRecord>, AppError> {
        let markup = decode_document(document);
        let scenes = extract_scenes(&markup)?;

        if scenes.is_empty() && self.config.output.require_scenes {
            return Err(AppError::NoScenes);
        }
        Ok(scenes)
    }

    /// Build the timed scene list from a scene document and a subtitle stream
    pub fn build_timeline(&self, document: &[u8], subtitles: &str) -> Result<Vec<TimedScene>, AppError> {
        let scenes = self.load_scenes(document)?;

        let cues = parse_cues(subtitles);
        if cues.is_empty() {
            warn!("No subtitle cues could be parsed, scene timings will be synthesized");
        } else {
            debug!("Parsed {} subtitle cue(s)", cues.len());
        }

        Ok(self.aligner.align(&scenes, &cues))
    }

    /// Scenes carrying narration, in document order
    pub fn export_script(&self, document: &[u8]) -> Result<Vec<SceneRecord>, AppError> {
        let scenes = self.load_scenes(document)?;
        Ok(scenes.into_iter().filter(SceneRecord::is_script_scene).collect())
    }

    /// Serialize according to the output config
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.config.output.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.context("Failed to serialize output to JSON")
    }

    /// Timeline for a document file and a subtitle file, as JSON
    pub fn run_timeline(&self, document_path: &Path, subtitle_path: &Path) -> Result<String> {
        let document = FileManager::read_bytes(document_path)?;
        let subtitles = FileManager::read_text_lossy(subtitle_path)?;

        let timeline = self
            .build_timeline(&document, &subtitles)
            .with_context(|| format!("Failed to build timeline for {:?}", document_path))?;
        info!("Built timeline with {} scene(s) for {:?}", timeline.len(), document_path);

        self.to_json(&timeline)
    }

    /// Narrated scenes of a document file, as JSON
    pub fn run_script(&self, document_path: &Path) -> Result<String> {
        let document = FileManager::read_bytes(document_path)?;
        let scenes = self
            .export_script(&document)
            .with_context(|| format!("Failed to extract scenes from {:?}", document_path))?;
        info!("Extracted {} narrated scene(s) from {:?}", scenes.len(), document_path);

        self.to_json(&scenes)
    }

    /// Write JSON to `output`, or to stdout when no output path is given
    pub fn write_output(&self, json: &str, output: Option<&Path>, force_overwrite: bool) -> Result<()> {
        match output {
            Some(path) => {
                if path.exists() && !force_overwrite {
                    return Err(anyhow!("Output file already exists: {:?}. Use -f to force overwrite.", path));
                }
                FileManager::write_to_file(path, json)?;
                info!("Success: {:?}", path);
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
            }
        }
        Ok(())
    }

    /// Process every scene document under `input_dir` that has a sibling subtitle file
    pub fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<FolderSummary> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        info!("Starting timeline extraction for directory: {:?}", input_dir);
        let mut summary = FolderSummary::default();

        for document_path in FileManager::find_files(input_dir, &DOCUMENT_EXTENSIONS)? {
            let Some(subtitle_path) = FileManager::find_subtitle_for(&document_path) else {
                warn!("No subtitle file found for {:?}, skipping", document_path);
                summary.skipped += 1;
                continue;
            };

            let output_path = FileManager::generate_output_path(&document_path, TIMELINE_SUFFIX);
            if output_path.exists() && !force_overwrite {
                warn!("Skipping {:?}, timeline already exists (use -f to force overwrite)", document_path);
                summary.skipped += 1;
                continue;
            }

            match self.process_pair(&document_path, &subtitle_path, &output_path) {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing {:?}: {:#}", document_path, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Finished processing {} file(s), {} skipped, {} failed",
            summary.processed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    fn process_pair(&self, document_path: &Path, subtitle_path: &Path, output_path: &Path) -> Result<()> {
        let json = self.run_timeline(document_path, subtitle_path)?;
        self.write_output(&json, Some(output_path), true)
    }
}
