//! Zone geometry.
//!
//! Pure functions over integer pixel coordinates:
//! - `contains`: boundary-inclusive point-in-polygon test
//! - `center_of`: integer midpoint of a bounding box
//! - `nearest_corner`: pointer hit test against zone corners
//!
//! Nothing here locks or allocates beyond the returned values; callers decide
//! whether they work on a snapshot or under the store lock.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Minimum vertex count for a zone polygon at construction time.
pub const MIN_POLYGON_POINTS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box as reported by the detector: (x1, y1) top-left, (x2, y2) bottom-right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn center(&self) -> Point {
        center_of(self)
    }
}

/// Closed polygon with at least three vertices.
///
/// Vertex order defines the rendering winding only; containment does not depend on it.
/// Corners may later be dragged onto each other or onto a line; see [`contains`] for how
/// such degenerate shapes behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < MIN_POLYGON_POINTS {
            return Err(anyhow!(
                "polygon needs at least {} points, got {}",
                MIN_POLYGON_POINTS,
                points.len()
            ));
        }
        Ok(Self { points })
    }

    /// Axis-aligned rectangle spanning two opposite corners, listed clockwise from `min`.
    pub fn rect(min: Point, max: Point) -> Self {
        Self {
            points: vec![
                min,
                Point::new(max.x, min.y),
                max,
                Point::new(min.x, max.y),
            ],
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Overwrite one vertex. Returns false when `index` is out of range.
    pub fn set_point(&mut self, index: usize, point: Point) -> bool {
        match self.points.get_mut(index) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    /// True when the polygon encloses no area (all vertices collinear or coincident).
    pub fn is_degenerate(&self) -> bool {
        twice_signed_area(&self.points) == 0
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = anyhow::Error;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Polygon::new(points)
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(polygon: Polygon) -> Self {
        polygon.points
    }
}

/// Boundary-inclusive point-in-polygon test.
///
/// Points lying on any edge or vertex are inside. Everything else is decided by the
/// crossing-number rule with a half-open vertical test, so each vertex is counted once.
///
/// A degenerate polygon (zero area) has no interior: it contains exactly the points on
/// its edges.
pub fn contains(point: Point, polygon: &Polygon) -> bool {
    if polygon.edges().any(|(a, b)| on_segment(point, a, b)) {
        return true;
    }

    let px = i128::from(point.x);
    let py = i128::from(point.y);
    let mut inside = false;
    for (a, b) in polygon.edges() {
        let (ax, ay) = (i128::from(a.x), i128::from(a.y));
        let (bx, by) = (i128::from(b.x), i128::from(b.y));
        if (ay > py) != (by > py) {
            // Crossing is to the right of the point when
            // px < ax + (py - ay) * (bx - ax) / (by - ay); compare without dividing.
            let lhs = (px - ax) * (by - ay);
            let rhs = (py - ay) * (bx - ax);
            let crosses = if by > ay { lhs < rhs } else { lhs > rhs };
            if crosses {
                inside = !inside;
            }
        }
    }
    inside
}

/// Integer midpoint of a bounding box (floor division).
pub fn center_of(bbox: &BoundingBox) -> Point {
    let cx = (i64::from(bbox.x1) + i64::from(bbox.x2)).div_euclid(2);
    let cy = (i64::from(bbox.y1) + i64::from(bbox.y2)).div_euclid(2);
    Point::new(cx as i32, cy as i32)
}

/// Finds the corner closest to `point` within `radius`.
///
/// Zones are scanned in list order and corners in polygon order. The running best is
/// replaced only by a strictly smaller distance, so the first corner reached at the
/// minimal distance wins ties. Corners exactly `radius` away never match.
pub fn nearest_corner(point: Point, zones: &[Polygon], radius: f64) -> Option<(usize, usize)> {
    let mut best = None;
    let mut min_dist = radius;
    for (zone_index, zone) in zones.iter().enumerate() {
        for (corner_index, corner) in zone.points().iter().enumerate() {
            let dist = point.distance_to(*corner);
            if dist < min_dist {
                min_dist = dist;
                best = Some((zone_index, corner_index));
            }
        }
    }
    best
}

/// Regular polygon with vertex `i` at angle `2*pi*i/sides`, coordinates truncated toward zero.
pub fn regular_polygon(center: Point, radius: u32, sides: usize) -> Result<Polygon> {
    if sides < MIN_POLYGON_POINTS {
        return Err(anyhow!("regular polygon needs at least 3 sides"));
    }
    let r = f64::from(radius);
    let points = (0..sides)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / sides as f64;
            let x = f64::from(center.x) + r * angle.cos();
            let y = f64::from(center.y) + r * angle.sin();
            Point::new(x as i32, y as i32)
        })
        .collect();
    Polygon::new(points)
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    let (px, py) = (i128::from(p.x), i128::from(p.y));
    let (ax, ay) = (i128::from(a.x), i128::from(a.y));
    let (bx, by) = (i128::from(b.x), i128::from(b.y));
    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    cross == 0 && px >= ax.min(bx) && px <= ax.max(bx) && py >= ay.min(by) && py <= ay.max(by)
}

fn twice_signed_area(points: &[Point]) -> i128 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::rect(Point::new(0, 0), Point::new(100, 100))
    }

    fn pts(raw: &[(i32, i32)]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn polygon_requires_three_points() {
        assert!(Polygon::new(pts(&[(0, 0), (1, 1)])).is_err());
        assert!(Polygon::new(pts(&[(0, 0), (1, 1), (2, 0)])).is_ok());
    }

    #[test]
    fn polygon_deserialize_rejects_short_lists() {
        let err = serde_json::from_str::<Polygon>(r#"[{"x":0,"y":0},{"x":5,"y":5}]"#);
        assert!(err.is_err());
    }

    #[test]
    fn interior_points_are_contained() {
        let sq = square();
        for p in [(1, 1), (50, 50), (99, 99), (10, 90), (75, 3)] {
            assert!(contains(p.into(), &sq), "{:?} should be inside", p);
        }
    }

    #[test]
    fn far_points_are_not_contained() {
        let sq = square();
        for p in [(-1, 50), (101, 50), (50, -500), (50, 1000), (-20, -20), (500, 500)] {
            assert!(!contains(p.into(), &sq), "{:?} should be outside", p);
        }
    }

    #[test]
    fn boundary_points_are_contained() {
        let sq = square();
        for p in [(0, 0), (100, 0), (100, 100), (0, 100), (50, 0), (100, 37), (0, 64), (12, 100)] {
            assert!(contains(p.into(), &sq), "{:?} on boundary should be inside", p);
        }
    }

    #[test]
    fn concave_polygon_notch_is_outside() {
        // U shape opening upwards
        let u = Polygon::new(pts(&[
            (0, 0),
            (30, 0),
            (30, 70),
            (70, 70),
            (70, 0),
            (100, 0),
            (100, 100),
            (0, 100),
        ]))
        .unwrap();
        assert!(!contains(Point::new(50, 30), &u));
        assert!(contains(Point::new(15, 30), &u));
        assert!(contains(Point::new(50, 85), &u));
        assert!(contains(Point::new(50, 70), &u));
    }

    #[test]
    fn winding_does_not_change_containment() {
        let cw = square();
        let mut rev = cw.points().to_vec();
        rev.reverse();
        let ccw = Polygon::new(rev).unwrap();
        for p in [(50, 50), (0, 0), (150, 50), (100, 50)] {
            assert_eq!(contains(p.into(), &cw), contains(p.into(), &ccw));
        }
    }

    #[test]
    fn diagonal_edge_boundary_is_inclusive() {
        let tri = Polygon::new(pts(&[(0, 0), (10, 10), (10, 0)])).unwrap();
        assert!(contains(Point::new(5, 5), &tri));
        assert!(!contains(Point::new(4, 6), &tri));
        assert!(contains(Point::new(7, 3), &tri));
    }

    #[test]
    fn collinear_polygon_contains_only_its_edges() {
        let line = Polygon::new(pts(&[(0, 0), (10, 10), (20, 20)])).unwrap();
        assert!(line.is_degenerate());
        assert!(contains(Point::new(5, 5), &line));
        assert!(contains(Point::new(20, 20), &line));
        assert!(!contains(Point::new(0, 5), &line));
        assert!(!contains(Point::new(6, 5), &line));
    }

    #[test]
    fn collapsed_polygon_contains_only_its_vertex() {
        let dot = Polygon::new(pts(&[(7, 7), (7, 7), (7, 7)])).unwrap();
        assert!(dot.is_degenerate());
        assert!(contains(Point::new(7, 7), &dot));
        assert!(!contains(Point::new(7, 8), &dot));
    }

    #[test]
    fn square_is_not_degenerate() {
        assert!(!square().is_degenerate());
    }

    #[test]
    fn center_uses_floor_division() {
        assert_eq!(center_of(&BoundingBox::new(0, 0, 10, 20)), Point::new(5, 10));
        assert_eq!(center_of(&BoundingBox::new(1, 1, 4, 4)), Point::new(2, 2));
        assert_eq!(center_of(&BoundingBox::new(-3, -3, 0, 0)), Point::new(-2, -2));
    }

    #[test]
    fn nearest_corner_respects_radius() {
        let zones = vec![square()];
        assert_eq!(nearest_corner(Point::new(5, 5), &zones, 20.0), Some((0, 0)));
        assert_eq!(nearest_corner(Point::new(50, 50), &zones, 20.0), None);
        // exactly at radius is a miss
        assert_eq!(nearest_corner(Point::new(20, 0), &zones, 20.0), None);
    }

    #[test]
    fn nearest_corner_prefers_smaller_distance() {
        let a = Polygon::new(pts(&[(0, 0), (200, 0), (108, 100)])).unwrap();
        let b = Polygon::new(pts(&[(100, 105), (300, 300), (0, 300)])).unwrap();
        // distance 8 to (108,100) in zone 0, distance 5 to (100,105) in zone 1
        assert_eq!(
            nearest_corner(Point::new(100, 100), &[a, b], 20.0),
            Some((1, 0))
        );
    }

    #[test]
    fn nearest_corner_first_match_wins_ties() {
        let a = Polygon::new(pts(&[(0, 0), (50, 10), (60, 60)])).unwrap();
        let b = Polygon::new(pts(&[(50, -10), (90, 0), (90, 90)])).unwrap();
        // (50,10) and (50,-10) are both 10 away from (50,0)
        assert_eq!(nearest_corner(Point::new(50, 0), &[a.clone(), b.clone()], 20.0), Some((0, 1)));
        assert_eq!(nearest_corner(Point::new(50, 0), &[b, a], 20.0), Some((0, 0)));
    }

    #[test]
    fn hexagon_matches_reference_vertices() {
        let hex = regular_polygon(Point::new(400, 300), 100, 6).unwrap();
        assert_eq!(hex.len(), 6);
        assert_eq!(hex.points()[0], Point::new(500, 300));
        assert_eq!(hex.points()[3].y, 300);
        assert!(contains(Point::new(400, 300), &hex));
        assert!(!contains(Point::new(400, 100), &hex));
    }

    #[test]
    fn containment_holds_at_coordinate_extremes() {
        let sliver = Polygon::new(vec![
            Point::new(i32::MIN, i32::MIN),
            Point::new(i32::MIN, i32::MAX),
            Point::new(i32::MIN + 1, 0),
        ])
        .unwrap();
        assert!(!contains(Point::new(i32::MAX, 0), &sliver));
        assert!(contains(Point::new(i32::MIN, 0), &sliver));
        assert!(contains(Point::new(i32::MIN + 1, 0), &sliver));
        assert!(!sliver.is_degenerate());

        let everything = Polygon::rect(Point::new(i32::MIN, i32::MIN), Point::new(i32::MAX, i32::MAX));
        assert!(contains(Point::new(0, 0), &everything));
        assert!(contains(Point::new(i32::MAX, i32::MAX), &everything));
        assert!(contains(Point::new(i32::MAX, 17), &everything));
    }

    #[test]
    fn regular_polygon_rejects_too_few_sides() {
        assert!(regular_polygon(Point::new(0, 0), 10, 2).is_err());
    }
}
