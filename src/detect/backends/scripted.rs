use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::detect::backend::SubjectDetector;
use crate::detect::result::DetectedSubject;
use crate::ingest::Frame;

/// One line of a detection script.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptedFrame {
    Subjects(Vec<DetectedSubject>),
    /// `{"unavailable": "reason"}` makes detection fail for that frame.
    Unavailable { unavailable: String },
}

/// Replays recorded detections, one JSON line per frame.
///
/// Frame `n` (1-based) gets line `n`. Frames past the end of the script see nobody.
/// Blank lines and lines starting with `#` are skipped.
pub struct ScriptedDetector {
    frames: Vec<ScriptedFrame>,
}

impl ScriptedDetector {
    pub fn new(frames: Vec<ScriptedFrame>) -> Self {
        Self { frames }
    }

    pub fn parse(script: &str) -> Result<Self> {
        let mut frames = Vec::new();
        for (lineno, line) in script.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let frame = serde_json::from_str(line)
                .map_err(|e| anyhow!("invalid detection script line {}: {}", lineno + 1, e))?;
            frames.push(frame);
        }
        Ok(Self::new(frames))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading detection script {}", path.display()))?;
        Self::parse(&raw)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl SubjectDetector for ScriptedDetector {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedSubject>> {
        let slot = usize::try_from(frame.index.saturating_sub(1)).unwrap_or(usize::MAX);
        match self.frames.get(slot) {
            Some(ScriptedFrame::Subjects(subjects)) => Ok(subjects.clone()),
            Some(ScriptedFrame::Unavailable { unavailable }) => {
                Err(anyhow!("detector unavailable: {}", unavailable))
            }
            None => Ok(Vec::new()),
        }
    }
}
