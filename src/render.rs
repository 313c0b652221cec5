//! Draw instructions handed to the rendering collaborator.
//!
//! The engine never touches pixels. It describes what to draw (zone fills, subject boxes,
//! banners) and a `RenderSink` turns that into an on-screen window, a stream, or a log.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::access::Verdict;
use crate::geometry::{BoundingBox, Polygon};
use crate::ingest::Frame;
use crate::zone::ZoneType;

/// BGR triple, matching the channel order of the capture pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Bgr(pub u8, pub u8, pub u8);

impl Bgr {
    pub const YELLOW: Bgr = Bgr(0, 255, 255);
    pub const RED: Bgr = Bgr(0, 0, 255);
    pub const GREEN: Bgr = Bgr(0, 255, 0);
    pub const PURPLE: Bgr = Bgr(255, 0, 255);
    pub const BLACK: Bgr = Bgr(0, 0, 0);
}

pub fn zone_fill(zone_type: ZoneType) -> Bgr {
    match zone_type {
        ZoneType::General => Bgr::YELLOW,
        ZoneType::Restricted => Bgr::RED,
        ZoneType::Veil => Bgr::BLACK,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Green,
    Purple,
    Red,
}

impl ColorClass {
    pub fn for_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::AllowedGeneral => ColorClass::Green,
            Verdict::AllowedAdmin => ColorClass::Purple,
            Verdict::RestrictedViolation => ColorClass::Red,
        }
    }

    pub fn bgr(&self) -> Bgr {
        match self {
            ColorClass::Green => Bgr::GREEN,
            ColorClass::Purple => Bgr::PURPLE,
            ColorClass::Red => Bgr::RED,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ZoneDraw {
    pub zone_type: ZoneType,
    pub polygon: Polygon,
    pub fill: Bgr,
    /// Zone belongs to the type being edited while edit mode is on.
    pub edit_highlighted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubjectDraw {
    pub bbox: BoundingBox,
    pub label: String,
    pub status: &'static str,
    pub color: ColorClass,
}

/// Raised whenever a non-admin subject is centered in a restricted zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlertEvent {
    pub identity: String,
    pub frame_index: u64,
}

impl AlertEvent {
    pub fn message(&self) -> String {
        format!("VIOLATION: {} in restricted zone", self.identity)
    }
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Scene {
    pub zones: Vec<ZoneDraw>,
    pub subjects: Vec<SubjectDraw>,
    pub alerts: Vec<AlertEvent>,
    pub edit_mode: bool,
    pub active_zone_type: Option<ZoneType>,
    pub show_help: bool,
    /// Detection failed for this frame; zones are drawn but no subjects.
    pub detection_skipped: bool,
}

/// Rendering collaborator.
pub trait RenderSink: Send {
    fn present(&mut self, frame: &Frame, scene: &Scene) -> Result<()>;
}

/// Sink that writes a one-line summary per frame to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn present(&mut self, frame: &Frame, scene: &Scene) -> Result<()> {
        log::debug!(
            "frame {}: zones={} subjects={} alerts={} edit_mode={}{}",
            frame.index,
            scene.zones.len(),
            scene.subjects.len(),
            scene.alerts.len(),
            scene.edit_mode,
            if scene.detection_skipped {
                " (detection skipped)"
            } else {
                ""
            }
        );
        Ok(())
    }
}

/// Sink that keeps every scene it was given. Clones share one recording, so a caller
/// can hand one clone to the monitor and read scenes back through another.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    scenes: Arc<Mutex<Vec<Scene>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenes(&self) -> Result<Vec<Scene>> {
        let scenes = self
            .scenes
            .lock()
            .map_err(|_| anyhow!("recording sink lock poisoned"))?;
        Ok(scenes.clone())
    }
}

impl RenderSink for RecordingSink {
    fn present(&mut self, _frame: &Frame, scene: &Scene) -> Result<()> {
        self.scenes
            .lock()
            .map_err(|_| anyhow!("recording sink lock poisoned"))?
            .push(scene.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_colors() {
        assert_eq!(ColorClass::for_verdict(Verdict::AllowedGeneral), ColorClass::Green);
        assert_eq!(ColorClass::for_verdict(Verdict::AllowedAdmin), ColorClass::Purple);
        assert_eq!(ColorClass::for_verdict(Verdict::RestrictedViolation).bgr(), Bgr::RED);
    }

    #[test]
    fn alert_message_names_identity() {
        let alert = AlertEvent {
            identity: "sovit".to_string(),
            frame_index: 3,
        };
        assert_eq!(alert.message(), "VIOLATION: sovit in restricted zone");
    }
}
