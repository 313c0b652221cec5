//! Zone types and the per-type zone collection.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geometry::{Point, Polygon};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    /// Open to every identity.
    General,
    /// Admin identities only; anyone else raises an alert.
    Restricted,
    /// Subjects centered here are not evaluated or drawn at all.
    Veil,
}

impl ZoneType {
    pub const ALL: [ZoneType; 3] = [ZoneType::General, ZoneType::Restricted, ZoneType::Veil];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneType::General => "general",
            ZoneType::Restricted => "restricted",
            ZoneType::Veil => "veil",
        }
    }

    fn slot(self) -> usize {
        match self {
            ZoneType::General => 0,
            ZoneType::Restricted => 1,
            ZoneType::Veil => 2,
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "general" | "g" => Ok(ZoneType::General),
            "restricted" | "r" => Ok(ZoneType::Restricted),
            "veil" | "v" => Ok(ZoneType::Veil),
            other => Err(anyhow!("unknown zone type '{}'", other)),
        }
    }
}

/// Zones of every type. Within a type, index 0 is the topmost (most recently added) zone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneCollection {
    zones: [Vec<Polygon>; 3],
}

impl ZoneCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup layout: General covers the left half of the frame, Restricted the right half.
    pub fn with_default_zones(width: u32, height: u32) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        let mid = w / 2;
        let mut zones = Self::new();
        zones
            .get_mut(ZoneType::General)
            .push(Polygon::rect(Point::new(0, 0), Point::new(mid, h)));
        zones
            .get_mut(ZoneType::Restricted)
            .push(Polygon::rect(Point::new(mid, 0), Point::new(w, h)));
        zones
    }

    pub fn get(&self, zone_type: ZoneType) -> &[Polygon] {
        &self.zones[zone_type.slot()]
    }

    pub fn get_mut(&mut self, zone_type: ZoneType) -> &mut Vec<Polygon> {
        &mut self.zones[zone_type.slot()]
    }

    pub fn total(&self) -> usize {
        self.zones.iter().map(Vec::len).sum()
    }
}
