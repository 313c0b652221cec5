//! Monitoring loop and the editing actor.
//!
//! Two threads share one `ZoneStore`:
//! 1. The editor thread applies pointer/keyboard commands as they arrive.
//! 2. The frame loop captures, detects, evaluates and renders, once per frame.
//!
//! Neither holds the store lock across its own iteration; each store call stands alone.
//! The loop stops on `Quit` or when the frame source fails.

use anyhow::{anyhow, Result};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::alerts::{open_alert_store, AlertStore};
use crate::config::MonitorConfig;
use crate::detect::{Subject, SubjectDetector};
use crate::editor::{Command, EditSession, EditingStateMachine, EditorStatus, Transition};
use crate::evaluate::FrameEvaluator;
use crate::ingest::{open_source, Frame, FrameSource};
use crate::render::{RenderSink, Scene};
use crate::store::ZoneStore;

const EDITOR_POLL: Duration = Duration::from_millis(50);

pub struct EditorHandle {
    status: Arc<EditorStatus>,
    join: Option<JoinHandle<EditSession>>,
}

impl EditorHandle {
    pub fn status(&self) -> Arc<EditorStatus> {
        self.status.clone()
    }

    /// Stop the editor thread and return its final session.
    pub fn stop(mut self) -> Result<EditSession> {
        self.status.request_quit();
        let join = self
            .join
            .take()
            .ok_or_else(|| anyhow!("editor thread already joined"))?;
        join.join().map_err(|_| anyhow!("editor thread panicked"))
    }
}

/// Run the editor on its own thread, fed by `commands`.
///
/// The thread exits on `Quit`, when every sender is dropped, or when someone else
/// requests quit through the shared status.
pub fn spawn_editor(
    mut editor: EditingStateMachine,
    commands: Receiver<Command>,
) -> Result<EditorHandle> {
    let status = Arc::new(EditorStatus::new(&editor.session()));
    let thread_status = status.clone();
    let join = std::thread::Builder::new()
        .name("zone-editor".to_string())
        .spawn(move || {
            while !thread_status.quit_requested() {
                match commands.recv_timeout(EDITOR_POLL) {
                    Ok(cmd) => {
                        let outcome = editor.apply(cmd);
                        thread_status.publish(&editor.session());
                        if outcome == Transition::Quit {
                            log::info!("quit requested");
                            thread_status.request_quit();
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        log::debug!("command channel closed");
                        break;
                    }
                }
            }
            editor.session()
        })?;
    Ok(EditorHandle {
        status,
        join: Some(join),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    /// Frame source failed or ran dry.
    CaptureFailure(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_processed: u64,
    /// Frames where detection was unavailable.
    pub frames_skipped: u64,
    pub subjects_annotated: u64,
    pub subjects_veiled: u64,
    pub alerts_raised: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: RunStats,
    pub stop_reason: StopReason,
}

pub struct Monitor {
    source: Box<dyn FrameSource>,
    detector: Box<dyn SubjectDetector>,
    evaluator: FrameEvaluator,
    alerts: Box<dyn AlertStore>,
    sink: Box<dyn RenderSink>,
    frame_interval: Option<Duration>,
    evaluate_while_editing: bool,
    stats: RunStats,
}

impl Monitor {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn SubjectDetector>,
        evaluator: FrameEvaluator,
        alerts: Box<dyn AlertStore>,
        sink: Box<dyn RenderSink>,
    ) -> Self {
        Self {
            source,
            detector,
            evaluator,
            alerts,
            sink,
            frame_interval: None,
            evaluate_while_editing: true,
            stats: RunStats::default(),
        }
    }

    /// Pace the loop to a target frame rate. Without it frames are pulled back to back.
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.frame_interval = (fps > 0).then(|| Duration::from_millis(1000 / u64::from(fps)));
        self
    }

    pub fn with_evaluate_while_editing(mut self, enabled: bool) -> Self {
        self.evaluate_while_editing = enabled;
        self
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn alerts_mut(&mut self) -> &mut dyn AlertStore {
        self.alerts.as_mut()
    }

    /// Run until quit or capture failure.
    pub fn run(&mut self, status: &EditorStatus) -> Result<RunSummary> {
        if let Err(e) = self.detector.warm_up() {
            log::warn!("detector {} warm-up failed: {}", self.detector.name(), e);
        }
        if let Err(e) = self.source.connect() {
            log::error!("capture failed: {}", e);
            return Ok(self.summary(StopReason::CaptureFailure(e.to_string())));
        }
        log::info!(
            "monitoring {} with detector {}",
            self.source.describe(),
            self.detector.name()
        );

        let stop_reason = loop {
            if status.quit_requested() {
                break StopReason::Quit;
            }
            let frame = match self.source.next_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    log::error!("capture failed: {}", e);
                    break StopReason::CaptureFailure(e.to_string());
                }
            };
            self.process_frame(&frame, status)?;
            if let Some(interval) = self.frame_interval {
                std::thread::sleep(interval);
            }
        };
        Ok(self.summary(stop_reason))
    }

    fn summary(&self, stop_reason: StopReason) -> RunSummary {
        RunSummary {
            stats: self.stats.clone(),
            stop_reason,
        }
    }

    /// Detect, evaluate and render one frame.
    pub fn process_frame(&mut self, frame: &Frame, status: &EditorStatus) -> Result<Scene> {
        let edit_mode = status.edit_mode();
        let active = status.active_zone_type();
        let mut scene = Scene {
            zones: self.evaluator.zone_draws(edit_mode, active),
            edit_mode,
            active_zone_type: Some(active),
            show_help: status.show_help(),
            ..Scene::default()
        };
        self.stats.frames_processed += 1;

        if !edit_mode || self.evaluate_while_editing {
            match self.detector.detect(frame) {
                Ok(detected) => {
                    let subjects: Vec<Subject> =
                        detected.into_iter().map(Subject::from).collect();
                    let report = self.evaluator.evaluate(frame.index, &subjects);
                    self.stats.subjects_annotated += report.subjects.len() as u64;
                    self.stats.subjects_veiled += report.veiled as u64;
                    for alert in &report.alerts {
                        log::warn!("alert: {}", alert.message());
                        self.stats.alerts_raised += 1;
                        if let Err(e) = self.alerts.append(alert, frame.captured_at_s) {
                            log::error!("alert journal write failed: {}", e);
                        }
                    }
                    scene.subjects = report.subjects;
                    scene.alerts = report.alerts;
                }
                Err(e) => {
                    log::warn!("detection unavailable for frame {}: {}", frame.index, e);
                    self.stats.frames_skipped += 1;
                    scene.detection_skipped = true;
                }
            }
        }

        self.sink.present(frame, &scene)?;
        Ok(scene)
    }
}

/// Wire a full monitor from configuration and run it to completion.
///
/// The store starts with the default half-frame zones. The editor consumes `commands`
/// on its own thread; the frame loop runs on the calling thread.
pub fn run_monitor(
    config: &MonitorConfig,
    detector: Box<dyn SubjectDetector>,
    sink: Box<dyn RenderSink>,
    commands: Receiver<Command>,
) -> Result<RunSummary> {
    let store = ZoneStore::with_default_zones(config.source.width, config.source.height);
    let editor = EditingStateMachine::new(store.clone(), config.editor.clone())?;
    let evaluator = FrameEvaluator::new(store, config.access_policy()?);
    let source = open_source(config.source.clone())?;
    let alerts = open_alert_store(config.alert_db_path.as_deref())?;

    let handle = spawn_editor(editor, commands)?;
    let status = handle.status();
    let mut monitor = Monitor::new(source, detector, evaluator, alerts, sink)
        .with_target_fps(config.source.target_fps)
        .with_evaluate_while_editing(config.evaluate_while_editing);
    let result = monitor.run(&status);
    let session = handle.stop()?;
    log::debug!("editor stopped: {:?}", session);
    result
}
