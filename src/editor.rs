//! Interactive zone editing.
//!
//! The editor is a state machine driven by pointer and keyboard commands:
//!
//! - Idle (`edit_mode == false`): only mode/type switches, help and quit have any effect.
//! - Editing, not dragging: a pointer-down near a corner of the active zone type starts a drag.
//! - Editing, dragging: pointer moves rewrite that corner until pointer-up.
//!
//! Every zone mutation goes through `ZoneStore`, so the frame loop sees edits on its next
//! store call. Commands that make no sense in the current state are dropped silently.

use anyhow::{anyhow, Result};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::geometry::{nearest_corner, regular_polygon, Point, Polygon};
use crate::store::ZoneStore;
use crate::zone::ZoneType;

pub const DEFAULT_PICK_RADIUS: f64 = 20.0;
pub const DEFAULT_NEW_ZONE_CENTER: Point = Point::new(400, 300);
pub const DEFAULT_NEW_ZONE_RADIUS: u32 = 100;
pub const DEFAULT_NEW_ZONE_SIDES: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleEditMode,
    /// Leave edit mode if it is on (ESC).
    ExitEditMode,
    SwitchZoneType(ZoneType),
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    AddZone,
    DeleteTop,
    ClearAll,
    ToggleHelp,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    /// Parses the keyboard shortcuts (`e`, `g`, `r`, `v`, `n`, `c`, `h`, `q`, `esc`, `del`)
    /// and pointer lines such as `down 400 300`, `move 410 305`, `up`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(anyhow!("empty command"));
        };
        let head = head.to_lowercase();
        let cmd = match head.as_str() {
            "e" | "edit" => Command::ToggleEditMode,
            "esc" | "escape" => Command::ExitEditMode,
            "g" | "r" | "v" => Command::SwitchZoneType(head.parse()?),
            "type" => {
                let name = parts
                    .next()
                    .ok_or_else(|| anyhow!("type needs a zone type name"))?;
                Command::SwitchZoneType(name.parse()?)
            }
            "n" | "new" | "add" => Command::AddZone,
            "del" | "delete" | "backspace" => Command::DeleteTop,
            "c" | "clear" => Command::ClearAll,
            "h" | "help" => Command::ToggleHelp,
            "q" | "quit" => Command::Quit,
            "up" => Command::PointerUp,
            "down" => Command::PointerDown(parse_point(&mut parts)?),
            "move" => Command::PointerMove(parse_point(&mut parts)?),
            other => return Err(anyhow!("unknown command '{}'", other)),
        };
        if parts.next().is_some() {
            return Err(anyhow!("trailing input after command '{}'", head));
        }
        Ok(cmd)
    }
}

fn parse_point<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<Point> {
    let mut coord = |axis: &str| -> Result<i32> {
        parts
            .next()
            .ok_or_else(|| anyhow!("missing {} coordinate", axis))?
            .parse()
            .map_err(|_| anyhow!("{} coordinate must be an integer", axis))
    };
    let x = coord("x")?;
    let y = coord("y")?;
    Ok(Point::new(x, y))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    NotDragging,
    /// Corner picked by pointer-down, addressed within the zone type it was picked from.
    Dragging {
        zone_type: ZoneType,
        zone_index: usize,
        corner_index: usize,
    },
}

/// Editing state threaded through every command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditSession {
    pub edit_mode: bool,
    pub active_zone_type: ZoneType,
    pub drag: DragState,
    /// Corner picked by the most recent successful pointer-down.
    ///
    /// Kept after release and after misses; only `drag` is ever used to address a corner.
    pub last_selection: Option<(usize, usize)>,
    pub show_help: bool,
}

impl Default for EditSession {
    fn default() -> Self {
        Self {
            edit_mode: false,
            active_zone_type: ZoneType::General,
            drag: DragState::NotDragging,
            last_selection: None,
            show_help: true,
        }
    }
}

impl EditSession {
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditorSettings {
    pub pick_radius: f64,
    pub new_zone_center: Point,
    pub new_zone_radius: u32,
    pub new_zone_sides: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            pick_radius: DEFAULT_PICK_RADIUS,
            new_zone_center: DEFAULT_NEW_ZONE_CENTER,
            new_zone_radius: DEFAULT_NEW_ZONE_RADIUS,
            new_zone_sides: DEFAULT_NEW_ZONE_SIDES,
        }
    }
}

/// Outcome of one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Command had no effect in the current state.
    Ignored,
    Applied,
    Quit,
}

/// Session flags published for the frame loop, which runs on another thread.
#[derive(Debug)]
pub struct EditorStatus {
    edit_mode: AtomicBool,
    show_help: AtomicBool,
    active_zone_type: AtomicU8,
    quit: AtomicBool,
}

impl EditorStatus {
    pub fn new(session: &EditSession) -> Self {
        let status = Self {
            edit_mode: AtomicBool::new(false),
            show_help: AtomicBool::new(false),
            active_zone_type: AtomicU8::new(0),
            quit: AtomicBool::new(false),
        };
        status.publish(session);
        status
    }

    pub fn publish(&self, session: &EditSession) {
        self.edit_mode.store(session.edit_mode, Ordering::SeqCst);
        self.show_help.store(session.show_help, Ordering::SeqCst);
        let code = match session.active_zone_type {
            ZoneType::General => 0,
            ZoneType::Restricted => 1,
            ZoneType::Veil => 2,
        };
        self.active_zone_type.store(code, Ordering::SeqCst);
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode.load(Ordering::SeqCst)
    }

    pub fn show_help(&self) -> bool {
        self.show_help.load(Ordering::SeqCst)
    }

    pub fn active_zone_type(&self) -> ZoneType {
        match self.active_zone_type.load(Ordering::SeqCst) {
            1 => ZoneType::Restricted,
            2 => ZoneType::Veil,
            _ => ZoneType::General,
        }
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }
}

pub struct EditingStateMachine {
    store: ZoneStore,
    settings: EditorSettings,
    new_zone: Polygon,
    session: EditSession,
}

impl EditingStateMachine {
    pub fn new(store: ZoneStore, settings: EditorSettings) -> Result<Self> {
        if settings.pick_radius <= 0.0 {
            return Err(anyhow!("pick radius must be greater than zero"));
        }
        let new_zone = regular_polygon(
            settings.new_zone_center,
            settings.new_zone_radius,
            settings.new_zone_sides,
        )?;
        Ok(Self {
            store,
            settings,
            new_zone,
            session: EditSession::default(),
        })
    }

    pub fn session(&self) -> EditSession {
        self.session
    }

    pub fn apply(&mut self, cmd: Command) -> Transition {
        let outcome = self.step(cmd);
        if outcome == Transition::Ignored {
            log::debug!("editor: ignored {:?} (edit_mode={})", cmd, self.session.edit_mode);
        }
        outcome
    }

    /// Drop any drag in progress. Returns whether one was active.
    ///
    /// Called before anything that reorders or replaces the zone lists, so a drag never
    /// lands on a zone other than the one picked.
    fn end_drag(&mut self) -> bool {
        let was_dragging = self.session.is_dragging();
        if was_dragging {
            log::debug!("editor: drag ended");
        }
        self.session.drag = DragState::NotDragging;
        was_dragging
    }

    fn step(&mut self, cmd: Command) -> Transition {
        let active = self.session.active_zone_type;
        match cmd {
            Command::Quit => Transition::Quit,
            Command::ToggleEditMode => {
                self.session.edit_mode = !self.session.edit_mode;
                log::info!(
                    "edit mode {}",
                    if self.session.edit_mode {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
                Transition::Applied
            }
            Command::ExitEditMode => {
                if !self.session.edit_mode {
                    return Transition::Ignored;
                }
                self.session.edit_mode = false;
                log::info!("edit mode disabled");
                Transition::Applied
            }
            Command::SwitchZoneType(zone_type) => {
                self.end_drag();
                self.session.active_zone_type = zone_type;
                log::info!("switched to {} zone editing", zone_type);
                Transition::Applied
            }
            Command::ToggleHelp => {
                self.session.show_help = !self.session.show_help;
                Transition::Applied
            }
            _ if !self.session.edit_mode => Transition::Ignored,
            Command::PointerDown(pt) => {
                let zones = self.store.list(active);
                match nearest_corner(pt, &zones, self.settings.pick_radius) {
                    Some((zone_index, corner_index)) => {
                        self.session.drag = DragState::Dragging {
                            zone_type: active,
                            zone_index,
                            corner_index,
                        };
                        self.session.last_selection = Some((zone_index, corner_index));
                        Transition::Applied
                    }
                    None => {
                        if self.end_drag() {
                            Transition::Applied
                        } else {
                            Transition::Ignored
                        }
                    }
                }
            }
            Command::PointerMove(pt) => match self.session.drag {
                DragState::Dragging {
                    zone_type,
                    zone_index,
                    corner_index,
                } => {
                    if self.store.set_corner(zone_type, zone_index, corner_index, pt) {
                        Transition::Applied
                    } else {
                        Transition::Ignored
                    }
                }
                DragState::NotDragging => Transition::Ignored,
            },
            Command::PointerUp => {
                if !self.session.is_dragging() {
                    return Transition::Ignored;
                }
                self.session.drag = DragState::NotDragging;
                Transition::Applied
            }
            Command::AddZone => {
                self.end_drag();
                self.store.add(active, self.new_zone.clone());
                log::info!("added new {} zone on top", active);
                Transition::Applied
            }
            Command::DeleteTop => {
                self.end_drag();
                if self.store.remove_top(active) {
                    log::info!("removed top {} zone", active);
                    Transition::Applied
                } else {
                    Transition::Ignored
                }
            }
            Command::ClearAll => {
                self.end_drag();
                let removed = self.store.clear(active);
                log::info!("cleared {} {} zones", removed, active);
                Transition::Applied
            }
        }
    }
}
