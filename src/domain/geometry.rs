//! Geometry pipeline turning footprints, poses and offsets into world-frame polygons.
//!
//! Every function here is pure. Randomized helpers take the generator as an argument.

use std::f64::consts::PI;

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use rand::Rng;
use thiserror::Error;
use tracing::warn;

use super::{Footprint, FootprintShape, Polygon, Pose, Position};

/// Tries used by [`sample_in_polygon`] when the caller has no better bound.
pub const DEFAULT_POLYGON_SAMPLE_TRIES: usize = 100;

/// Vertices of a circle footprint, 16 per quarter turn.
const CIRCLE_SEGMENTS: usize = 64;

const EPSILON: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("unrecognized footprint type")]
    InvalidFootprint,
    #[error("footprint of type parent requires a parent polygon")]
    MissingParentPolygon,
    #[error("footprint offset must have 2 or 3 values, got {0}")]
    InvalidOffset(usize),
    #[error("navigation poses must have 2 or 3 values each")]
    InvalidNavPose,
    #[error("no mesh loader available for {0}")]
    MeshLoaderUnavailable(String),
    #[error("failed to load mesh {path}: {reason}")]
    MeshLoad { path: String, reason: String },
    #[error("mesh has too few distinct vertices for a footprint")]
    DegenerateMesh,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingError {
    #[error("exceeded {tries} sampling tries")]
    Exhausted { tries: usize },
}

/// 2D footprint of a mesh with its vertical extent.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshFootprint {
    pub polygon: Polygon,
    pub height: f64,
}

/// Loads a mesh and reduces it to a [`MeshFootprint`], applying the mesh's declared unit scale.
///
/// Implementors typically read the vertices and hand them to [`mesh_footprint_from_vertices`].
pub trait MeshLoader {
    fn load(&self, model_path: &str, mesh_path: &str) -> Result<MeshFootprint, GeometryError>;
}

pub fn offset_polygon(coords: &[Position], dx: f64, dy: f64) -> Vec<Position> {
    let offset = Position::new(dx, dy);
    coords.iter().map(|&c| c + offset).collect()
}

/// Rectangle of `width × height` centered on `(origin_x, origin_y)`, rotated by `angle` about
/// its center.
pub fn box_polygon(width: f64, height: f64, origin_x: f64, origin_y: f64, angle: f64) -> Polygon {
    let angle = super::Angle::new(angle);
    let (w, h) = (0.5 * width, 0.5 * height);
    let mut coords = [
        Position::new(-w, -h),
        Position::new(w, -h),
        Position::new(w, h),
        Position::new(-w, h),
    ]
    .iter()
    .map(|c| c.rotate_vector(angle))
    .collect::<Vec<_>>();
    coords.push(coords[0]);
    Polygon::new(offset_polygon(&coords, origin_x, origin_y))
}

pub fn circle_polygon(radius: f64) -> Polygon {
    Polygon::new((0..CIRCLE_SEGMENTS).map(|i| {
        let angle = 2.0 * PI * i as f64 / CIRCLE_SEGMENTS as f64;
        Position::new(radius * angle.cos(), radius * angle.sin())
    }))
}

pub fn centroid(polygon: &Polygon) -> Position {
    polygon.centroid()
}

/// Offsets the polygon by `radius` with mitred joins.
///
/// A negative radius erodes. Erosion may split the polygon into several parts, or remove it
/// entirely. Overlapping offsets are merged, so the result never self-intersects.
pub fn inflate(polygon: &Polygon, radius: f64) -> Polygon {
    if polygon.is_empty() || polygon.is_degenerate() {
        return Polygon::empty();
    }
    if radius == 0.0 {
        return polygon.clone();
    }

    let rings = polygon
        .oriented_rings()
        .into_iter()
        .map(dedup_ring)
        .filter(|r| r.len() >= 3)
        .collect::<Vec<_>>();
    let side = radius.signum();
    let distance = radius.abs();

    let mut bands = Vec::new();
    for ring in &rings {
        let n = ring.len();
        let normals = (0..n)
            .map(|i| right_normal(ring[i], ring[(i + 1) % n]).scale(side))
            .collect::<Vec<_>>();
        for i in 0..n {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            bands.extend(counter_clockwise_ring(vec![
                a,
                b,
                b + normals[i].scale(distance),
                a + normals[i].scale(distance),
            ]));

            let (incoming, outgoing) = (normals[(i + n - 1) % n], normals[i]);
            let turn = (ring[i] - ring[(i + n - 1) % n]).cross(b - a);
            if turn * side > EPSILON {
                bands.extend(
                    mitre_wedge(a, incoming, outgoing, distance).and_then(counter_clockwise_ring),
                );
            }
        }
    }

    let rule = if radius > 0.0 {
        OverlayRule::Union
    } else {
        OverlayRule::Difference
    };
    overlay(&rings, &bands, rule)
}

/// Part of `polygon` outside every polygon in `holes`.
pub fn difference<'a>(polygon: &Polygon, holes: impl IntoIterator<Item = &'a Polygon>) -> Polygon {
    let clip = holes
        .into_iter()
        .flat_map(Polygon::oriented_rings)
        .collect::<Vec<_>>();
    if polygon.is_empty() || clip.is_empty() {
        return polygon.clone();
    }
    overlay(&polygon.oriented_rings(), &clip, OverlayRule::Difference)
}

/// Boolean operation under the non-zero rule. Rings must be oriented with their interior to
/// the left, so overlapping pieces add up instead of cancelling.
fn overlay(subject: &[Vec<Position>], clip: &[Vec<Position>], rule: OverlayRule) -> Polygon {
    let to_contours = |rings: &[Vec<Position>]| {
        rings
            .iter()
            .map(|ring| ring.iter().map(|&p| [p.x(), p.y()]).collect::<Vec<_>>())
            .collect::<Vec<_>>()
    };
    let (subject, clip) = (to_contours(subject), to_contours(clip));

    let shapes = subject.overlay(&clip, rule, FillRule::NonZero);
    Polygon::from_rings(
        shapes
            .into_iter()
            .flatten()
            .map(|contour| contour.into_iter().map(Position::from).collect()),
    )
}

/// Fills the gap that offsetting opens at a corner with the mitre quad.
fn mitre_wedge(
    corner: Position,
    incoming: Position,
    outgoing: Position,
    distance: f64,
) -> Option<Vec<Position>> {
    let denominator = 1.0 + incoming.dot(outgoing);
    if denominator <= EPSILON {
        return None;
    }
    let mitre = corner + (incoming + outgoing).scale(distance / denominator);
    Some(vec![
        corner,
        corner + incoming.scale(distance),
        mitre,
        corner + outgoing.scale(distance),
    ])
}

fn counter_clockwise_ring(ring: Vec<Position>) -> Option<Vec<Position>> {
    let polygon = Polygon::new(ring);
    (!polygon.is_degenerate()).then(|| polygon.counter_clockwise().vertices().to_vec())
}

/// Unit normal to the right of travel from `a` to `b`.
fn right_normal(a: Position, b: Position) -> Position {
    let direction = (b - a).scale(1.0 / a.distance(b));
    Position::new(direction.y(), -direction.x())
}

fn dedup_ring(mut ring: Vec<Position>) -> Vec<Position> {
    ring.dedup_by(|a, b| a.distance(*b) <= EPSILON);
    while ring.len() > 1 && ring[0].distance(ring[ring.len() - 1]) <= EPSILON {
        ring.pop();
    }
    ring
}

/// Translates by the pose position, then rotates by the pose yaw about that translated position.
pub fn transform(polygon: &Polygon, pose: &Pose) -> Polygon {
    polygon.map(|v| pose.transform_position(v))
}

/// Buffers an open polyline by `half_width` with flat caps and mitred joins.
pub fn buffer_polyline(points: &[Position], half_width: f64) -> Polygon {
    let mut points = points.to_vec();
    points.dedup_by(|a, b| a.distance(*b) <= EPSILON);
    if points.len() < 2 || half_width <= 0.0 {
        return Polygon::empty();
    }

    let segments = points
        .windows(2)
        .map(|w| {
            let normal = right_normal(w[0], w[1]).scale(half_width);
            vec![w[0] + normal, w[1] + normal, w[1] - normal, w[0] - normal]
        })
        .filter_map(counter_clockwise_ring)
        .collect::<Vec<_>>();
    let joints = points
        .windows(3)
        .filter_map(|w| {
            let turn = (w[1] - w[0]).cross(w[2] - w[1]);
            if turn.abs() <= EPSILON {
                return None;
            }
            // The gap opens on the outside of the turn.
            let side = if turn > 0.0 { 1.0 } else { -1.0 };
            mitre_wedge(
                w[1],
                right_normal(w[0], w[1]).scale(side),
                right_normal(w[1], w[2]).scale(side),
                half_width,
            )
            .and_then(counter_clockwise_ring)
        })
        .collect::<Vec<_>>();

    overlay(&segments, &joints, OverlayRule::Union).counter_clockwise()
}

/// Convex hull by monotone chain, counter-clockwise.
pub fn convex_hull(points: &[Position]) -> Polygon {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x().total_cmp(&b.x()).then(a.y().total_cmp(&b.y())));
    sorted.dedup_by(|a, b| a.distance(*b) <= EPSILON);
    if sorted.len() < 3 {
        return Polygon::new(sorted);
    }

    let mut hull = half_hull(sorted.iter());
    hull.extend(half_hull(sorted.iter().rev()));
    Polygon::new(hull)
}

fn half_hull<'a>(points: impl Iterator<Item = &'a Position>) -> Vec<Position> {
    let mut chain: Vec<Position> = Vec::new();
    for &p in points {
        while let [.., a, b] = chain[..] {
            if (b - a).cross(p - a) > 0.0 {
                break;
            }
            chain.pop();
        }
        chain.push(p);
    }
    chain.pop();
    chain
}

/// Reduces mesh vertices (in mesh units) to the convex hull of their XY projection and the
/// maximum Z, both scaled to meters by `unit_scale`.
pub fn mesh_footprint_from_vertices(
    vertices: &[[f64; 3]],
    unit_scale: f64,
) -> Result<MeshFootprint, GeometryError> {
    let points = vertices
        .iter()
        .map(|v| Position::new(v[0] * unit_scale, v[1] * unit_scale))
        .collect::<Vec<_>>();
    let polygon = convex_hull(&points);
    if polygon.is_empty() || polygon.is_degenerate() {
        return Err(GeometryError::DegenerateMesh);
    }
    let height = vertices
        .iter()
        .map(|v| v[2] * unit_scale)
        .max_by(|a, b| a.total_cmp(b))
        .unwrap_or_default();
    Ok(MeshFootprint { polygon, height })
}

/// Resolves a footprint to a polygon and an optional height.
///
/// The shape is built first, then moved by the footprint offset, then by `pose`. `parent`
/// footprints are already expressed in the parent's frame and ignore `pose`. An explicit
/// footprint height overrides the mesh height.
pub fn footprint_to_polygon(
    footprint: &Footprint,
    pose: Option<&Pose>,
    parent_polygon: Option<&Polygon>,
    mesh_loader: Option<&dyn MeshLoader>,
) -> Result<(Polygon, Option<f64>), GeometryError> {
    let mut height = None;
    let mut polygon = match &footprint.shape {
        FootprintShape::Box { dims } => box_polygon(dims[0], dims[1], 0.0, 0.0, 0.0),
        FootprintShape::Circle { radius } => circle_polygon(*radius),
        FootprintShape::Polygon { coords } => {
            Polygon::new(coords.iter().map(|&c| Position::from(c)))
        }
        FootprintShape::Mesh {
            model_path,
            mesh_path,
        } => {
            let loader = mesh_loader
                .ok_or_else(|| GeometryError::MeshLoaderUnavailable(mesh_path.clone()))?;
            let mesh = loader.load(model_path, mesh_path)?;
            height = Some(mesh.height);
            mesh.polygon
        }
        FootprintShape::Parent { padding } => {
            let parent = parent_polygon.ok_or(GeometryError::MissingParentPolygon)?;
            inflate(parent, -padding)
        }
        FootprintShape::Unknown => {
            warn!("Invalid footprint type in {footprint:?}");
            return Err(GeometryError::InvalidFootprint);
        }
    };

    if let Some(offset) = &footprint.offset {
        let offset = Pose::from_slice(offset).ok_or(GeometryError::InvalidOffset(offset.len()))?;
        polygon = transform(&polygon, &offset);
    }

    if let Some(pose) = pose {
        if !footprint.is_parent() {
            polygon = transform(&polygon, pose);
        }
    }

    if footprint.height.is_some() {
        height = footprint.height;
    }
    Ok((polygon, height))
}

/// Rejection-samples a position inside the polygon from its bounding box.
pub fn sample_in_polygon<R: Rng + ?Sized>(
    polygon: &Polygon,
    max_tries: usize,
    rng: &mut R,
) -> Result<Position, SamplingError> {
    let exhausted = SamplingError::Exhausted { tries: max_tries };
    let Some(bounds) = polygon.bounds() else {
        return Err(exhausted);
    };
    for _ in 0..max_tries {
        let sample = Position::new(
            bounds.x_min + bounds.width() * rng.random::<f64>(),
            bounds.y_min + bounds.height() * rng.random::<f64>(),
        );
        if polygon.contains(sample) {
            return Ok(sample);
        }
    }
    Err(exhausted)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    use super::super::Bounds;
    use super::*;
    use crate::tests::assert_polygon_abs_diff_eq;

    fn unit_square() -> Polygon {
        box_polygon(2.0, 2.0, 0.0, 0.0, 0.0)
    }

    struct FixedMesh;

    impl MeshLoader for FixedMesh {
        fn load(&self, _model_path: &str, _mesh_path: &str) -> Result<MeshFootprint, GeometryError> {
            mesh_footprint_from_vertices(
                &[
                    [0.0, 0.0, 0.0],
                    [2.0, 0.0, 0.0],
                    [2.0, 1.0, 1.6],
                    [0.0, 1.0, 1.6],
                    [1.0, 0.5, 0.8],
                ],
                0.5,
            )
        }
    }

    #[test]
    fn test_offset_polygon() {
        let coords = offset_polygon(&[Position::new(0.0, 0.0), Position::new(1.0, 2.0)], 1.0, -1.0);
        assert_eq!(coords, vec![Position::new(1.0, -1.0), Position::new(2.0, 1.0)]);
    }

    #[test]
    fn test_box_polygon_is_closed_and_centered() {
        let polygon = box_polygon(2.0, 1.0, 3.0, 4.0, 0.0);
        let coords = polygon.coords();
        assert_eq!(coords.len(), 5);
        assert_eq!(coords.first(), coords.last());
        assert_abs_diff_eq!(polygon.centroid(), Position::new(3.0, 4.0));
        assert_eq!(polygon.bounds(), Some(Bounds::new(2.0, 4.0, 3.5, 4.5)));
    }

    #[test]
    fn test_box_polygon_rotated_about_own_center() {
        let polygon = box_polygon(2.0, 1.0, 1.0, 1.0, 0.5 * PI);
        let bounds = polygon.bounds().unwrap();
        assert_abs_diff_eq!(bounds.width(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bounds.height(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(polygon.centroid(), Position::new(1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_inflate_zero_is_identity() {
        let polygon = unit_square();
        assert_eq!(inflate(&polygon, 0.0), polygon);
    }

    #[rstest]
    #[case::grow(0.5, Some(Bounds::new(-1.5, 1.5, -1.5, 1.5)))]
    #[case::shrink(-0.5, Some(Bounds::new(-0.5, 0.5, -0.5, 0.5)))]
    #[case::collapse(-1.5, None)]
    fn test_inflate_square(#[case] radius: f64, #[case] expected: Option<Bounds>) {
        let inflated = inflate(&unit_square(), radius);
        match expected {
            Some(bounds) => {
                let actual = inflated.bounds().unwrap();
                assert_abs_diff_eq!(actual.x_min, bounds.x_min, epsilon = 1e-6);
                assert_abs_diff_eq!(actual.x_max, bounds.x_max, epsilon = 1e-6);
                assert_abs_diff_eq!(actual.y_min, bounds.y_min, epsilon = 1e-6);
                assert_abs_diff_eq!(actual.y_max, bounds.y_max, epsilon = 1e-6);
                assert_abs_diff_eq!(inflated.area(), bounds.width() * bounds.height(), epsilon = 1e-5);
                assert_eq!(inflated.rings().count(), 1);
            }
            None => assert!(inflated.is_empty()),
        }
    }

    #[test]
    fn test_inflate_thin_rectangle_collapses() {
        assert!(inflate(&box_polygon(2.0, 1.0, 0.0, 0.0, 0.0), -0.6).is_empty());
        let eroded = inflate(&box_polygon(2.0, 1.0, 0.0, 0.0, 0.0), -0.4);
        assert_abs_diff_eq!(eroded.area(), 1.2 * 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_inflate_non_convex_keeps_notch() {
        let l_shape = Polygon::new([
            Position::new(0.0, 0.0),
            Position::new(2.0, 0.0),
            Position::new(2.0, 1.0),
            Position::new(1.0, 1.0),
            Position::new(1.0, 2.0),
            Position::new(0.0, 2.0),
        ]);
        let inflated = inflate(&l_shape, 0.1);
        assert!(inflated.covers(Position::new(1.05, 1.05)));
        assert!(!inflated.covers(Position::new(1.15, 1.15)));
        assert!(inflated.covers(Position::new(2.05, 1.05)));
        assert!(l_shape.within(&inflated));
        assert_abs_diff_eq!(inflated.area(), 3.0 + 0.1 * 8.0 + 0.01 * 4.0, epsilon = 1e-5);
    }

    /// `[0, 3]²` with a slot of width 1 cut down from the top to `y = 1`.
    fn slotted_square() -> Polygon {
        Polygon::new([
            Position::new(0.0, 0.0),
            Position::new(3.0, 0.0),
            Position::new(3.0, 3.0),
            Position::new(2.0, 3.0),
            Position::new(2.0, 1.0),
            Position::new(1.0, 1.0),
            Position::new(1.0, 3.0),
            Position::new(0.0, 3.0),
        ])
    }

    #[test]
    fn test_inflate_fills_narrow_slot() {
        let inflated = inflate(&slotted_square(), 0.6);
        assert_eq!(inflated.rings().count(), 1);
        for position in [Position::new(1.5, 2.5), Position::new(1.5, 3.3), Position::new(1.5, 1.2)] {
            assert!(inflated.contains(position), "{position:?} not covered");
        }
        assert!(!inflated.covers(Position::new(1.5, 3.7)));
        assert_abs_diff_eq!(inflated.area(), 4.2 * 4.2, epsilon = 1e-5);
    }

    /// Two `2 × 2` squares joined by a `1 × 0.4` neck along `y = 1`.
    fn dumbbell() -> Polygon {
        Polygon::new([
            Position::new(0.0, 0.0),
            Position::new(2.0, 0.0),
            Position::new(2.0, 0.8),
            Position::new(3.0, 0.8),
            Position::new(3.0, 0.0),
            Position::new(5.0, 0.0),
            Position::new(5.0, 2.0),
            Position::new(3.0, 2.0),
            Position::new(3.0, 1.2),
            Position::new(2.0, 1.2),
            Position::new(2.0, 2.0),
            Position::new(0.0, 2.0),
        ])
    }

    #[test]
    fn test_erosion_splits_at_narrow_neck() {
        let eroded = inflate(&dumbbell(), -0.3);
        assert_eq!(eroded.rings().count(), 2);
        assert!(!eroded.contains(Position::new(2.5, 1.0)));
        assert!(eroded.contains(Position::new(1.0, 1.0)));
        assert!(eroded.contains(Position::new(4.0, 1.0)));
        assert!(!eroded.contains(Position::new(1.8, 1.0)));
        assert_abs_diff_eq!(eroded.area(), 2.0 * 1.4 * 1.4, epsilon = 1e-5);

        let kept_neck = inflate(&dumbbell(), -0.1);
        assert_eq!(kept_neck.rings().count(), 1);
        assert!(kept_neck.contains(Position::new(2.5, 1.0)));
    }

    #[test]
    fn test_inflate_orientation_independent() {
        let clockwise = Polygon::new(unit_square().vertices().iter().rev().copied());
        assert_abs_diff_eq!(inflate(&clockwise, 0.5).area(), 9.0, epsilon = 1e-5);
    }

    #[test]
    fn test_difference_removes_holes() {
        let cut = difference(&unit_square(), [&box_polygon(1.0, 4.0, 0.0, 0.0, 0.0)]);
        assert_eq!(cut.rings().count(), 2);
        assert_abs_diff_eq!(cut.area(), 2.0, epsilon = 1e-5);
        assert!(!cut.contains(Position::default()));
        assert_eq!(difference(&unit_square(), []), unit_square());
    }

    #[test]
    fn test_transform_identity() {
        let polygon = unit_square();
        assert_polygon_abs_diff_eq(&transform(&polygon, &Pose::default()), &polygon, 1e-12);
    }

    #[test]
    fn test_transform_translates_then_rotates_about_new_position() {
        let polygon = Polygon::new([
            Position::new(1.0, 0.0),
            Position::new(2.0, 0.0),
            Position::new(2.0, 1.0),
        ]);
        let transformed = transform(&polygon, &Pose::new(1.0, 1.0, 0.5 * PI));
        assert_polygon_abs_diff_eq(
            &transformed,
            &Polygon::new([
                Position::new(1.0, 2.0),
                Position::new(1.0, 3.0),
                Position::new(0.0, 3.0),
            ]),
            1e-12,
        );
    }

    #[rstest]
    #[case(Pose::new(1.0, -2.0, 0.3))]
    #[case(Pose::new(-4.0, 0.5, -2.5))]
    #[case(Pose::new(0.0, 0.0, PI))]
    fn test_transform_round_trip(#[case] pose: Pose) {
        let polygon = box_polygon(1.0, 3.0, 0.5, 0.2, 0.1);
        let round_trip = transform(&transform(&polygon, &pose), &pose.inverse());
        assert_polygon_abs_diff_eq(&round_trip, &polygon, 1e-9);
    }

    #[test]
    fn test_footprint_box_bounds() {
        let (polygon, height) =
            footprint_to_polygon(&Footprint::boxed(2.0, 2.0), None, None, None).unwrap();
        assert_eq!(polygon.bounds(), Some(Bounds::new(-1.0, 1.0, -1.0, 1.0)));
        assert_eq!(height, None);
    }

    #[test]
    fn test_footprint_offset_then_pose() {
        let footprint = Footprint::boxed(1.0, 1.0).with_offset(&[1.0, 0.0]);
        let (polygon, _) = footprint_to_polygon(
            &footprint,
            Some(&Pose::new(0.0, 0.0, 0.5 * PI)),
            None,
            None,
        )
        .unwrap();
        assert_abs_diff_eq!(polygon.centroid(), Position::new(0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_footprint_parent_ignores_pose() {
        let parent = box_polygon(2.0, 2.0, 5.0, 5.0, 0.0);
        let (polygon, _) = footprint_to_polygon(
            &Footprint::parent(0.25),
            Some(&Pose::new(10.0, 10.0, 1.0)),
            Some(&parent),
            None,
        )
        .unwrap();
        assert_abs_diff_eq!(polygon.bounds().unwrap().width(), 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(polygon.centroid(), Position::new(5.0, 5.0), epsilon = 1e-6);
    }

    #[test]
    fn test_footprint_parent_requires_parent_polygon() {
        assert_eq!(
            footprint_to_polygon(&Footprint::parent(0.1), None, None, None),
            Err(GeometryError::MissingParentPolygon)
        );
    }

    #[test]
    fn test_footprint_circle() {
        let (polygon, _) = footprint_to_polygon(&Footprint::circle(0.5), None, None, None).unwrap();
        assert_eq!(polygon.vertices().len(), 64);
        assert_abs_diff_eq!(polygon.area(), PI * 0.25, epsilon = 1e-2);
    }

    #[test]
    fn test_footprint_mesh_height_and_override() {
        let footprint = Footprint::new(FootprintShape::Mesh {
            model_path: "models/table".to_string(),
            mesh_path: "table.dae".to_string(),
        });
        let (polygon, height) = footprint_to_polygon(&footprint, None, None, Some(&FixedMesh)).unwrap();
        assert_eq!(polygon.bounds(), Some(Bounds::new(0.0, 1.0, 0.0, 0.5)));
        assert_eq!(height, Some(0.8));

        let (_, height) =
            footprint_to_polygon(&footprint.clone().with_height(1.2), None, None, Some(&FixedMesh))
                .unwrap();
        assert_eq!(height, Some(1.2));

        assert_eq!(
            footprint_to_polygon(&footprint, None, None, None),
            Err(GeometryError::MeshLoaderUnavailable("table.dae".to_string()))
        );
    }

    #[test]
    fn test_footprint_unknown_type() {
        let error = footprint_to_polygon(&Footprint::new(FootprintShape::Unknown), None, None, None)
            .unwrap_err();
        assert_snapshot!(error.to_string(), @"unrecognized footprint type");
    }

    #[test]
    fn test_footprint_invalid_offset() {
        let footprint = Footprint::boxed(1.0, 1.0).with_offset(&[1.0]);
        assert_eq!(
            footprint_to_polygon(&footprint, None, None, None),
            Err(GeometryError::InvalidOffset(1))
        );
    }

    #[test]
    fn test_convex_hull_drops_interior_points() {
        let hull = convex_hull(&[
            Position::new(0.0, 0.0),
            Position::new(1.0, 1.0),
            Position::new(2.0, 0.0),
            Position::new(2.0, 2.0),
            Position::new(0.0, 2.0),
        ]);
        assert_eq!(hull.vertices().len(), 4);
        assert_abs_diff_eq!(hull.signed_area(), 4.0);
    }

    #[test]
    fn test_buffer_polyline_straight() {
        let polygon = buffer_polyline(&[Position::new(0.0, 0.0), Position::new(4.0, 0.0)], 0.5);
        let bounds = polygon.bounds().unwrap();
        assert_abs_diff_eq!(bounds.x_max, 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bounds.y_min, -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(polygon.area(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_buffer_polyline_mitred_corner() {
        let polygon = buffer_polyline(
            &[
                Position::new(0.0, 0.0),
                Position::new(2.0, 0.0),
                Position::new(2.0, 2.0),
            ],
            0.5,
        );
        assert_eq!(polygon.rings().count(), 1);
        assert!(polygon.covers(Position::new(2.45, -0.45)));
        assert!(!polygon.covers(Position::new(1.4, 0.6)));
        assert_abs_diff_eq!(polygon.area(), 4.0, epsilon = 1e-5);
        assert!(polygon.contains(Position::new(1.0, 0.0)));
        assert!(polygon.contains(Position::new(2.0, 1.0)));
    }

    #[test]
    fn test_sample_in_polygon() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let polygon = box_polygon(1.0, 1.0, 2.0, 2.0, 0.3);
        for _ in 0..20 {
            let sample = sample_in_polygon(&polygon, DEFAULT_POLYGON_SAMPLE_TRIES, &mut rng).unwrap();
            assert!(polygon.contains(sample));
        }
    }

    #[test]
    fn test_sample_in_degenerate_polygon_is_exhausted() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let degenerate = Polygon::new([
            Position::new(0.0, 0.0),
            Position::new(1.0, 1.0),
            Position::new(2.0, 2.0),
        ]);
        assert_eq!(
            sample_in_polygon(&degenerate, DEFAULT_POLYGON_SAMPLE_TRIES, &mut rng),
            Err(SamplingError::Exhausted { tries: 100 })
        );
        assert_eq!(
            sample_in_polygon(&Polygon::empty(), 10, &mut rng),
            Err(SamplingError::Exhausted { tries: 10 })
        );
    }
}
