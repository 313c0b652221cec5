//! Zone-based access control engine.
//!
//! This crate implements the zone logic of a warehouse surveillance system: where people
//! may stand, who may stand there, and how an operator reshapes the zones while the
//! camera keeps running.
//!
//! # Architecture
//!
//! - `geometry`: containment, box centers and corner hit-testing (pure functions)
//! - `zone` / `store`: zone collections per type behind one lock (`ZoneStore`)
//! - `access`: identity permissions and the per-subject verdict
//! - `editor`: the pointer/keyboard editing state machine
//! - `evaluate`: per-frame verdicts, annotations and alerts
//! - `pipeline`: the frame loop and the editor thread sharing one store
//!
//! Detection, capture and rendering are collaborators reached through the
//! `SubjectDetector`, `FrameSource` and `RenderSink` traits.
//!
//! # Zone semantics
//!
//! 1. **Veil** zones suppress everything: a subject centered in one is not evaluated,
//!    drawn or alerted on.
//! 2. **Restricted** zones admit admins only; anyone else raises an alert.
//! 3. **General** zones admit everyone.
//!
//! Containment is boundary-inclusive, and zone state is never persisted: every start
//! begins from the two default half-frame zones.

pub mod access;
pub mod alerts;
pub mod config;
pub mod detect;
pub mod editor;
pub mod evaluate;
pub mod geometry;
pub mod ingest;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod zone;

pub use access::{AccessPolicy, PermissionLevel, Verdict, UNKNOWN_IDENTITY};
pub use alerts::{AlertRecord, AlertStore, InMemoryAlertStore, SqliteAlertStore};
pub use config::{DeviceRegistry, MonitorConfig};
pub use detect::{DetectedSubject, ScriptedDetector, Subject, SubjectDetector, WandererDetector};
pub use editor::{
    Command, DragState, EditSession, EditingStateMachine, EditorSettings, EditorStatus,
    Transition,
};
pub use evaluate::{Evaluation, FrameEvaluator, FrameReport};
pub use geometry::{center_of, contains, nearest_corner, BoundingBox, Point, Polygon};
pub use ingest::{Frame, FrameSource, SourceConfig, SyntheticSource};
pub use pipeline::{run_monitor, spawn_editor, Monitor, RunStats, RunSummary, StopReason};
pub use render::{AlertEvent, ColorClass, LogSink, RecordingSink, RenderSink, Scene};
pub use store::ZoneStore;
pub use zone::{ZoneCollection, ZoneType};
