//! Planar polygons and the predicates the world model needs from them.
//!
//! A polygon is a set of rings, each stored open with the closing vertex implied. Inside and
//! outside follow the even-odd rule over all rings, so a polygon may carry holes or consist of
//! several disjoint parts. A polygon with fewer than three vertices or without area is
//! degenerate; erosion that collapses a polygon yields the empty polygon. Neither contains,
//! intersects nor lies within anything.

use super::Position;

const EPSILON: f64 = 1e-9;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Position>,
    /// Exclusive end of each ring in `vertices`.
    ring_ends: Vec<usize>,
}

impl Polygon {
    /// Builds a single-ring polygon. A repeated closing vertex is dropped.
    pub fn new(coords: impl IntoIterator<Item = Position>) -> Self {
        let vertices = open_ring(coords.into_iter().collect());
        let ring_ends = if vertices.is_empty() {
            Vec::new()
        } else {
            vec![vertices.len()]
        };
        Self {
            vertices,
            ring_ends,
        }
    }

    /// Builds a polygon from several rings. Rings with fewer than three vertices are skipped.
    pub fn from_rings(rings: impl IntoIterator<Item = Vec<Position>>) -> Self {
        let mut polygon = Self::default();
        for ring in rings.into_iter().map(open_ring).filter(|r| r.len() >= 3) {
            polygon.vertices.extend(ring);
            polygon.ring_ends.push(polygon.vertices.len());
        }
        polygon
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Vertices of all rings, ring after ring.
    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    pub fn rings(&self) -> impl Iterator<Item = &[Position]> + '_ {
        std::iter::once(0)
            .chain(self.ring_ends.iter().copied())
            .zip(self.ring_ends.iter().copied())
            .map(|(start, end)| &self.vertices[start..end])
    }

    /// Every ring closed, first vertex repeated at its end.
    pub fn coords(&self) -> Vec<Position> {
        self.rings()
            .flat_map(|ring| ring.iter().chain(ring.first()).copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    pub fn signed_area(&self) -> f64 {
        self.rings().map(ring_signed_area).sum()
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_degenerate(&self) -> bool {
        self.area() <= EPSILON
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_positions(&self.vertices)
    }

    pub fn centroid(&self) -> Position {
        let area = self.signed_area();
        if area.abs() <= EPSILON {
            // Degenerate rings fall back to the vertex average.
            let n = self.vertices.len().max(1) as f64;
            return self
                .vertices
                .iter()
                .fold(Position::default(), |acc, &v| acc + v)
                .scale(1.0 / n);
        }
        let (cx, cy) = self.edges().fold((0.0, 0.0), |(cx, cy), (a, b)| {
            let cross = a.cross(b);
            (cx + (a.x() + b.x()) * cross, cy + (a.y() + b.y()) * cross)
        });
        Position::new(cx / (6.0 * area), cy / (6.0 * area))
    }

    /// Iterates over the edges of every ring, closing edges included.
    pub fn edges(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.rings().flat_map(|ring| {
            let n = ring.len();
            (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
        })
    }

    /// The same polygon with positive signed area.
    pub fn counter_clockwise(&self) -> Self {
        if self.signed_area() >= 0.0 {
            return self.clone();
        }
        Self::from_rings(self.rings().map(|ring| ring.iter().rev().copied().collect()))
    }

    /// Rings oriented so the interior lies to their left: outer rings counter-clockwise, holes
    /// clockwise.
    pub(crate) fn oriented_rings(&self) -> Vec<Vec<Position>> {
        let rings = self.rings().collect::<Vec<_>>();
        rings
            .iter()
            .enumerate()
            .map(|(i, ring)| {
                let depth = rings
                    .iter()
                    .enumerate()
                    .filter(|&(j, other)| j != i && ring_winds_around(other, ring[0]))
                    .count();
                let mut ring = ring.to_vec();
                if (ring_signed_area(&ring) >= 0.0) != (depth % 2 == 0) {
                    ring.reverse();
                }
                ring
            })
            .collect()
    }

    pub fn map(&self, f: impl Fn(Position) -> Position) -> Self {
        Self {
            vertices: self.vertices.iter().map(|&v| f(v)).collect(),
            ring_ends: self.ring_ends.clone(),
        }
    }

    pub fn on_boundary(&self, position: Position) -> bool {
        self.edges()
            .any(|(a, b)| distance_to_segment(position, a, b) <= EPSILON)
    }

    /// True if `position` lies strictly inside the polygon.
    pub fn contains(&self, position: Position) -> bool {
        if self.is_empty() || self.is_degenerate() || self.on_boundary(position) {
            return false;
        }
        self.winds_around(position)
    }

    /// True if `position` lies inside the polygon or on its boundary.
    pub fn covers(&self, position: Position) -> bool {
        if self.is_empty() {
            return false;
        }
        self.on_boundary(position) || (!self.is_degenerate() && self.winds_around(position))
    }

    /// True if the polygons share at least one point, touching included.
    pub fn intersects(&self, other: &Polygon) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        match (self.bounds(), other.bounds()) {
            (Some(a), Some(b)) if a.overlaps(&b) => {}
            _ => return false,
        }
        if self
            .edges()
            .any(|(a, b)| other.edges().any(|(c, d)| segments_intersect(a, b, c, d)))
        {
            return true;
        }
        // Without crossing edges every ring lies wholly inside or outside the other polygon.
        self.rings().any(|ring| other.covers(ring[0]))
            || other.rings().any(|ring| self.covers(ring[0]))
    }

    /// True if no point of `self` lies outside `other`. Boundary contact is allowed.
    pub fn within(&self, other: &Polygon) -> bool {
        if self.is_empty() || other.is_empty() || self.is_degenerate() {
            return false;
        }
        let vertices_covered = self.vertices.iter().all(|&v| other.covers(v));
        let midpoints_covered = self
            .edges()
            .all(|(a, b)| other.covers((a + b).scale(0.5)));
        let no_crossing = !self.edges().any(|(a, b)| {
            other
                .edges()
                .any(|(c, d)| segments_cross_properly(a, b, c, d))
        });
        let no_enclosed_boundary = !other.vertices.iter().any(|&v| self.contains(v));
        vertices_covered && midpoints_covered && no_crossing && no_enclosed_boundary
    }

    fn winds_around(&self, position: Position) -> bool {
        self.rings()
            .fold(false, |inside, ring| inside != ring_winds_around(ring, position))
    }
}

fn open_ring(mut ring: Vec<Position>) -> Vec<Position> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn ring_signed_area(ring: &[Position]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    (0..n).map(|i| ring[i].cross(ring[(i + 1) % n])).sum::<f64>() / 2.0
}

/// Even-odd crossing test against a single ring.
fn ring_winds_around(ring: &[Position], position: Position) -> bool {
    let n = ring.len();
    let mut inside = false;
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        if (a.y() > position.y()) != (b.y() > position.y()) {
            let x = a.x() + (position.y() - a.y()) / (b.y() - a.y()) * (b.x() - a.x());
            if position.x() < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Axis-aligned bounding box `[x_min, x_max] × [y_min, y_max]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn from_positions(positions: &[Position]) -> Option<Self> {
        let first = positions.first()?;
        Some(positions.iter().fold(
            Self::new(first.x(), first.x(), first.y(), first.y()),
            |b, p| {
                Self::new(
                    b.x_min.min(p.x()),
                    b.x_max.max(p.x()),
                    b.y_min.min(p.y()),
                    b.y_max.max(p.y()),
                )
            },
        ))
    }

    pub fn union(&self, other: &Bounds) -> Self {
        Self::new(
            self.x_min.min(other.x_min),
            self.x_max.max(other.x_max),
            self.y_min.min(other.y_min),
            self.y_max.max(other.y_max),
        )
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x_min <= other.x_max + EPSILON
            && other.x_min <= self.x_max + EPSILON
            && self.y_min <= other.y_max + EPSILON
            && other.y_min <= self.y_max + EPSILON
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

pub(crate) fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
    let ab = b - a;
    let length_squared = ab.dot(ab);
    if length_squared <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    p.distance(a + ab.scale(t))
}

fn orientation(a: Position, b: Position, c: Position) -> f64 {
    (b - a).cross(c - a)
}

fn sign(value: f64) -> i8 {
    if value > EPSILON {
        1
    } else if value < -EPSILON {
        -1
    } else {
        0
    }
}

/// Closed segment intersection, touching and collinear overlap included.
pub(crate) fn segments_intersect(a: Position, b: Position, c: Position, d: Position) -> bool {
    let o1 = sign(orientation(a, b, c));
    let o2 = sign(orientation(a, b, d));
    let o3 = sign(orientation(c, d, a));
    let o4 = sign(orientation(c, d, b));

    if o1 != o2 && o3 != o4 {
        return true;
    }
    (o1 == 0 && distance_to_segment(c, a, b) <= EPSILON)
        || (o2 == 0 && distance_to_segment(d, a, b) <= EPSILON)
        || (o3 == 0 && distance_to_segment(a, c, d) <= EPSILON)
        || (o4 == 0 && distance_to_segment(b, c, d) <= EPSILON)
}

/// Intersection at a single point interior to both segments.
fn segments_cross_properly(a: Position, b: Position, c: Position, d: Position) -> bool {
    let o1 = sign(orientation(a, b, c));
    let o2 = sign(orientation(a, b, d));
    let o3 = sign(orientation(c, d, a));
    let o4 = sign(orientation(c, d, b));
    o1 * o2 < 0 && o3 * o4 < 0
}
