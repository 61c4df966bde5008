//! Rooms: the polygonal spaces of a world, with their walls and navigable interior.

use super::geometry::inflate;
use super::{
    FreeSpace, Footprint, HallwayId, HasCollision, LocationId, Node, Polygon, Pose, RoomId,
};

pub const DEFAULT_WALL_WIDTH: f64 = 0.2;

/// Everything needed to add a room to a world.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomSpec {
    pub name: Option<String>,
    pub footprint: Footprint,
    /// Navigation poses in the world frame. Empty means the polygon centroid.
    pub nav_poses: Vec<Pose>,
    pub wall_width: f64,
}

impl RoomSpec {
    pub fn new(footprint: Footprint) -> Self {
        Self {
            name: None,
            footprint,
            nav_poses: Vec::new(),
            wall_width: DEFAULT_WALL_WIDTH,
        }
    }

    pub fn from_coords(coords: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::new(Footprint::polygon(coords))
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_nav_poses(mut self, nav_poses: Vec<Pose>) -> Self {
        self.nav_poses = nav_poses;
        self
    }

    pub fn with_wall_width(mut self, wall_width: f64) -> Self {
        self.wall_width = wall_width;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Room {
    id: RoomId,
    name: String,
    polygon: Polygon,
    nav_poses: Vec<Pose>,
    wall_width: f64,
    external_collision_polygon: Polygon,
    internal_collision_polygon: FreeSpace,
    wall_polygon: Polygon,
    openings: Vec<Polygon>,
    pub(crate) hallways: Vec<HallwayId>,
    pub(crate) locations: Vec<LocationId>,
    pub(crate) graph_nodes: Vec<Node>,
}

impl Room {
    pub(crate) fn new(
        id: RoomId,
        name: String,
        polygon: Polygon,
        nav_poses: Vec<Pose>,
        wall_width: f64,
    ) -> Self {
        let nav_poses = if nav_poses.is_empty() {
            vec![Pose::from_position(polygon.centroid(), Default::default())]
        } else {
            nav_poses
        };
        let mut room = Self {
            id,
            name,
            polygon,
            nav_poses,
            wall_width,
            external_collision_polygon: Polygon::empty(),
            internal_collision_polygon: FreeSpace::default(),
            wall_polygon: Polygon::empty(),
            openings: Vec::new(),
            hallways: Vec::new(),
            locations: Vec::new(),
            graph_nodes: Vec::new(),
        };
        room.update_collision_polygons(0.0, Vec::new());
        room.update_visualization_polygon(Vec::new());
        room
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn nav_poses(&self) -> &[Pose] {
        &self.nav_poses
    }

    pub fn wall_width(&self) -> f64 {
        self.wall_width
    }

    pub fn wall_polygon(&self) -> &Polygon {
        &self.wall_polygon
    }

    /// Hallway polygons cut into the wall outline.
    pub fn openings(&self) -> &[Polygon] {
        &self.openings
    }

    pub fn hallways(&self) -> &[HallwayId] {
        &self.hallways
    }

    pub fn locations(&self) -> &[LocationId] {
        &self.locations
    }

    pub fn graph_nodes(&self) -> &[Node] {
        &self.graph_nodes
    }

    /// Recomputes both collision regions; `obstacles` are the collision polygons of the
    /// locations in this room.
    pub(crate) fn update_collision_polygons(&mut self, inflation_radius: f64, obstacles: Vec<Polygon>) {
        self.external_collision_polygon = inflate(&self.polygon, inflation_radius);
        self.internal_collision_polygon =
            FreeSpace::new(inflate(&self.polygon, -inflation_radius), obstacles);
    }

    pub(crate) fn update_visualization_polygon(&mut self, openings: Vec<Polygon>) {
        self.wall_polygon = inflate(&self.polygon, self.wall_width);
        self.openings = openings;
    }
}

impl HasCollision for Room {
    fn external_collision_polygon(&self) -> &Polygon {
        &self.external_collision_polygon
    }

    fn internal_collision_polygon(&self) -> &FreeSpace {
        &self.internal_collision_polygon
    }
}
