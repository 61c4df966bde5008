//! Hallways connecting two rooms along a buffered centerline.

use super::geometry::{buffer_polyline, inflate};
use super::{Angle, FreeSpace, HallwayId, HasCollision, Node, Polygon, Pose, Position, RoomId, Target};

const EPSILON: f64 = 1e-9;

/// How a hallway's centerline runs between the centroids of its rooms.
#[derive(Clone, Debug, PartialEq)]
pub enum Connection {
    /// Straight from the start centroid to the end centroid.
    Auto,
    /// From the start centroid along the angle, ending abreast of the end centroid.
    Angle(Angle),
    /// Explicit polyline.
    Points(Vec<Position>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HallwaySpec {
    pub room_start: Target,
    pub room_end: Target,
    pub width: f64,
    pub connection: Connection,
    /// Perpendicular shift of the centerline, positive to the left of travel.
    pub offset: f64,
    pub wall_width: f64,
}

impl HallwaySpec {
    pub fn new(room_start: impl Into<Target>, room_end: impl Into<Target>, width: f64) -> Self {
        Self {
            room_start: room_start.into(),
            room_end: room_end.into(),
            width,
            connection: Connection::Auto,
            offset: 0.0,
            wall_width: super::room::DEFAULT_WALL_WIDTH,
        }
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connection = connection;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_wall_width(mut self, wall_width: f64) -> Self {
        self.wall_width = wall_width;
        self
    }
}

/// Centerline of a hallway, or `None` if the connection yields no usable line.
pub fn centerline(
    start: Position,
    end: Position,
    connection: &Connection,
    offset: f64,
) -> Option<Vec<Position>> {
    let points = match connection {
        Connection::Auto => vec![start, end],
        Connection::Angle(angle) => {
            let direction = Position::new(1.0, 0.0).rotate_vector(*angle);
            let length = (end - start).dot(direction);
            if length <= EPSILON {
                return None;
            }
            vec![start, start + direction.scale(length)]
        }
        Connection::Points(points) => points.clone(),
    };

    let (first, second) = match points.as_slice() {
        [first, second, ..] => (*first, *second),
        _ => return None,
    };
    let length = first.distance(second);
    if length <= EPSILON {
        return None;
    }
    let direction = (second - first).scale(1.0 / length);
    let shift = Position::new(-direction.y(), direction.x()).scale(offset);
    Some(points.into_iter().map(|p| p + shift).collect())
}

#[derive(Clone, Debug)]
pub struct Hallway {
    id: HallwayId,
    name: String,
    room_start: RoomId,
    room_end: RoomId,
    width: f64,
    wall_width: f64,
    centerline: Vec<Position>,
    polygon: Polygon,
    external_collision_polygon: Polygon,
    internal_collision_polygon: FreeSpace,
    pub(crate) graph_nodes: Vec<Node>,
}

impl Hallway {
    pub(crate) fn new(
        id: HallwayId,
        name: String,
        (room_start, room_end): (RoomId, RoomId),
        centerline: Vec<Position>,
        width: f64,
        wall_width: f64,
    ) -> Self {
        let polygon = buffer_polyline(&centerline, 0.5 * width);
        let mut hallway = Self {
            id,
            name,
            room_start,
            room_end,
            width,
            wall_width,
            centerline,
            polygon,
            external_collision_polygon: Polygon::empty(),
            internal_collision_polygon: FreeSpace::default(),
            graph_nodes: Vec::new(),
        };
        hallway.update_collision_polygons(0.0, Vec::new());
        hallway
    }

    pub fn id(&self) -> HallwayId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room_start(&self) -> RoomId {
        self.room_start
    }

    pub fn room_end(&self) -> RoomId {
        self.room_end
    }

    pub fn connects(&self, room: RoomId) -> bool {
        self.room_start == room || self.room_end == room
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn wall_width(&self) -> f64 {
        self.wall_width
    }

    pub fn centerline(&self) -> &[Position] {
        &self.centerline
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn graph_nodes(&self) -> &[Node] {
        &self.graph_nodes
    }

    /// Interior centerline vertices, or the centerline midpoint for a straight hallway.
    pub fn nav_poses(&self) -> Vec<Pose> {
        match self.centerline.as_slice() {
            [a, b] => vec![Pose::from_position((*a + *b).scale(0.5), Angle::default())],
            [_, interior @ .., _] => interior
                .iter()
                .map(|p| Pose::from_position(*p, Angle::default()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Recomputes both collision regions; `obstacles` are the collision polygons of the
    /// locations in the connected rooms, which the hallway may reach into.
    pub(crate) fn update_collision_polygons(&mut self, inflation_radius: f64, obstacles: Vec<Polygon>) {
        self.external_collision_polygon = inflate(&self.polygon, inflation_radius);
        self.internal_collision_polygon =
            FreeSpace::new(inflate(&self.polygon, -inflation_radius), obstacles);
    }
}

impl HasCollision for Hallway {
    fn external_collision_polygon(&self) -> &Polygon {
        &self.external_collision_polygon
    }

    fn internal_collision_polygon(&self) -> &FreeSpace {
        &self.internal_collision_polygon
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn hallway(centerline: Vec<Position>) -> Hallway {
        Hallway::new(
            HallwayId(0),
            "hall_a_b".to_string(),
            (RoomId(0), RoomId(1)),
            centerline,
            1.0,
            0.2,
        )
    }

    #[test]
    fn test_centerline_auto_with_offset() {
        let line = centerline(
            Position::new(0.0, 0.0),
            Position::new(4.0, 0.0),
            &Connection::Auto,
            0.5,
        )
        .unwrap();
        assert_eq!(line, vec![Position::new(0.0, 0.5), Position::new(4.0, 0.5)]);
    }

    #[test]
    fn test_centerline_angle_projects_end() {
        let line = centerline(
            Position::new(0.0, 0.0),
            Position::new(1.0, 5.0),
            &Connection::Angle(Angle::new(FRAC_PI_2)),
            0.0,
        )
        .unwrap();
        assert_abs_diff_eq!(line[1].x(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(line[1].y(), 5.0, epsilon = 1e-6);
    }

    #[rstest]
    #[case::angle_pointing_away(Connection::Angle(Angle::new(std::f64::consts::PI)))]
    #[case::single_point(Connection::Points(vec![Position::new(0.0, 0.0)]))]
    #[case::coincident_points(Connection::Points(vec![Position::new(1.0, 1.0), Position::new(1.0, 1.0)]))]
    fn test_centerline_invalid(#[case] connection: Connection) {
        assert_eq!(
            centerline(Position::new(0.0, 0.0), Position::new(4.0, 0.0), &connection, 0.0),
            None
        );
    }

    #[test]
    fn test_polygon_covers_centerline_width() {
        let hallway = hallway(vec![Position::new(0.0, 0.0), Position::new(4.0, 0.0)]);
        let bounds = hallway.polygon().bounds().unwrap();
        assert_abs_diff_eq!(bounds.x_min, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bounds.x_max, 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bounds.y_min, -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(bounds.y_max, 0.5, epsilon = 1e-6);
        assert!(hallway.connects(RoomId(1)));
        assert!(!hallway.connects(RoomId(2)));
    }

    #[test]
    fn test_nav_poses() {
        let straight = hallway(vec![Position::new(0.0, 0.0), Position::new(4.0, 0.0)]);
        assert_eq!(straight.nav_poses(), vec![Pose::new(2.0, 0.0, 0.0)]);

        let bent = hallway(vec![
            Position::new(0.0, 0.0),
            Position::new(4.0, 0.0),
            Position::new(4.0, 3.0),
        ]);
        assert_eq!(bent.nav_poses(), vec![Pose::new(4.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_narrow_hallway_has_no_free_space_for_wide_robot() {
        let mut hallway = hallway(vec![Position::new(0.0, 0.0), Position::new(4.0, 0.0)]);
        hallway.update_collision_polygons(0.6, Vec::new());
        assert!(hallway.internal_collision_polygon().is_empty());
        assert!(!hallway.is_collision_free(Position::new(2.0, 0.0)));
        let external = hallway.external_collision_polygon().bounds().unwrap();
        assert_abs_diff_eq!(external.x_min, -0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(external.y_max, 1.1, epsilon = 1e-6);
    }
}
