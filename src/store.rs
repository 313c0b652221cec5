use std::sync::{Arc, Mutex, MutexGuard};

use crate::geometry::{contains, Point, Polygon};
use crate::zone::{ZoneCollection, ZoneType};

/// Shared zone geometry.
///
/// One coarse lock covers every zone type. Each method takes the lock once, does in-memory
/// work only, and releases it before returning; no method holds it across calls.
/// Clones share the same underlying collection, which is how the frame loop and the
/// editor both see one set of zones.
#[derive(Clone, Debug, Default)]
pub struct ZoneStore {
    inner: Arc<Mutex<ZoneCollection>>,
}

impl ZoneStore {
    pub fn new(zones: ZoneCollection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(zones)),
        }
    }

    /// Store seeded with the two half-frame startup zones.
    pub fn with_default_zones(width: u32, height: u32) -> Self {
        Self::new(ZoneCollection::with_default_zones(width, height))
    }

    // A panic elsewhere cannot leave a half-written polygon list behind, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, ZoneCollection> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert on top (index 0).
    pub fn add(&self, zone_type: ZoneType, polygon: Polygon) {
        self.lock().get_mut(zone_type).insert(0, polygon);
    }

    /// Remove the topmost zone. Returns false when there was nothing to remove.
    pub fn remove_top(&self, zone_type: ZoneType) -> bool {
        let mut zones = self.lock();
        let list = zones.get_mut(zone_type);
        if list.is_empty() {
            return false;
        }
        list.remove(0);
        true
    }

    /// Drop every zone of a type. Returns how many were removed.
    pub fn clear(&self, zone_type: ZoneType) -> usize {
        let mut zones = self.lock();
        let list = zones.get_mut(zone_type);
        let removed = list.len();
        list.clear();
        removed
    }

    /// Owned copy of one type's zones, in z-order.
    pub fn list(&self, zone_type: ZoneType) -> Vec<Polygon> {
        self.lock().get(zone_type).to_vec()
    }

    /// Owned copy of every zone.
    pub fn snapshot(&self) -> ZoneCollection {
        self.lock().clone()
    }

    pub fn len(&self, zone_type: ZoneType) -> usize {
        self.lock().get(zone_type).len()
    }

    pub fn is_empty(&self, zone_type: ZoneType) -> bool {
        self.len(zone_type) == 0
    }

    /// Move one corner. Out-of-range indices are ignored and reported as `false`.
    pub fn set_corner(
        &self,
        zone_type: ZoneType,
        zone_index: usize,
        corner_index: usize,
        point: Point,
    ) -> bool {
        let mut zones = self.lock();
        match zones.get_mut(zone_type).get_mut(zone_index) {
            Some(polygon) => polygon.set_point(corner_index, point),
            None => false,
        }
    }

    /// True if any zone of `zone_type` contains `point`. Stops at the first hit.
    pub fn any_contains(&self, zone_type: ZoneType, point: Point) -> bool {
        self.lock()
            .get(zone_type)
            .iter()
            .any(|polygon| contains(point, polygon))
    }
}
