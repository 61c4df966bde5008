//! Locations (furniture and other fixed fixtures) and the object spawns they carry.

use std::f64::consts::PI;

use super::geometry::{footprint_to_polygon, inflate, transform, GeometryError, MeshLoader};
use super::{LocationId, LocationMetadata, Node, ObjectId, Polygon, Pose, RoomId, SpawnId};

/// Gap between a location's collision polygon and its default spawn navigation pose.
pub const NAV_POSE_CLEARANCE: f64 = 0.1;

#[derive(Clone, Debug)]
pub struct Location {
    id: LocationId,
    name: String,
    category: String,
    room: RoomId,
    pose: Pose,
    polygon: Polygon,
    height: Option<f64>,
    collision_polygon: Polygon,
    pub(crate) spawns: Vec<ObjectSpawn>,
}

/// A region of a location on which objects can be placed.
#[derive(Clone, Debug)]
pub struct ObjectSpawn {
    id: SpawnId,
    name: String,
    location: LocationId,
    polygon: Polygon,
    explicit_nav_poses: Vec<Pose>,
    /// Edge of the location in front of this spawn, facing the location.
    front: Pose,
    pub(crate) objects: Vec<ObjectId>,
    pub(crate) graph_nodes: Vec<Node>,
}

impl Location {
    /// Builds a location and its spawns. `spawn_ids` needs one id per spawn in `metadata`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: LocationId,
        name: String,
        category: String,
        room: RoomId,
        pose: Pose,
        metadata: &LocationMetadata,
        spawn_ids: &[SpawnId],
        mesh_loader: Option<&dyn MeshLoader>,
    ) -> Result<Self, GeometryError> {
        let (local_polygon, height) =
            footprint_to_polygon(&metadata.footprint, None, None, mesh_loader)?;
        let front_x = local_polygon.bounds().map_or(0.0, |b| b.x_max);

        let spawns = metadata
            .spawns()
            .iter()
            .zip(spawn_ids)
            .enumerate()
            .map(|(idx, (spawn, &spawn_id))| {
                let spawn_name = match &spawn.name {
                    Some(spawn_name) => format!("{name}_{spawn_name}"),
                    None => format!("{name}_spawn{idx}"),
                };
                let (local_spawn, _) = footprint_to_polygon(
                    &spawn.footprint,
                    None,
                    Some(&local_polygon),
                    mesh_loader,
                )?;
                let explicit_nav_poses = spawn
                    .local_nav_poses()
                    .ok_or(GeometryError::InvalidNavPose)?
                    .iter()
                    .map(|p| pose.compose(p))
                    .collect();
                let front = pose.compose(&Pose::new(front_x, local_spawn.centroid().y(), PI));
                Ok(ObjectSpawn {
                    id: spawn_id,
                    name: spawn_name,
                    location: id,
                    polygon: transform(&local_spawn, &pose),
                    explicit_nav_poses,
                    front,
                    objects: Vec::new(),
                    graph_nodes: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, GeometryError>>()?;

        let polygon = transform(&local_polygon, &pose);
        Ok(Self {
            id,
            name,
            category,
            room,
            pose,
            collision_polygon: polygon.clone(),
            polygon,
            height,
            spawns,
        })
    }

    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn collision_polygon(&self) -> &Polygon {
        &self.collision_polygon
    }

    pub fn spawns(&self) -> &[ObjectSpawn] {
        &self.spawns
    }

    pub fn spawn(&self, id: SpawnId) -> Option<&ObjectSpawn> {
        self.spawns.iter().find(|s| s.id == id)
    }

    pub(crate) fn spawn_mut(&mut self, id: SpawnId) -> Option<&mut ObjectSpawn> {
        self.spawns.iter_mut().find(|s| s.id == id)
    }

    pub(crate) fn update_collision_polygon(&mut self, inflation_radius: f64) {
        self.collision_polygon = inflate(&self.polygon, inflation_radius);
    }
}

impl ObjectSpawn {
    pub fn id(&self) -> SpawnId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn graph_nodes(&self) -> &[Node] {
        &self.graph_nodes
    }

    /// Navigation poses from metadata, or one pose in front of the location that stays clear
    /// of its collision polygon at the given inflation radius.
    pub fn nav_poses(&self, inflation_radius: f64) -> Vec<Pose> {
        if !self.explicit_nav_poses.is_empty() {
            return self.explicit_nav_poses.clone();
        }
        let clearance = inflation_radius.max(0.0) + NAV_POSE_CLEARANCE;
        vec![self.front.compose(&Pose::new(-clearance, 0.0, 0.0))]
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    use super::super::{Footprint, SpawnMetadata};
    use super::*;

    fn desk() -> LocationMetadata {
        LocationMetadata::new(Footprint::boxed(1.0, 2.0))
            .with_spawn(
                SpawnMetadata::new(Footprint::boxed(0.8, 0.8).with_offset(&[0.0, 0.5]))
                    .with_name("left"),
            )
            .with_spawn(SpawnMetadata::new(
                Footprint::boxed(0.8, 0.8).with_offset(&[0.0, -0.5]),
            ))
    }

    fn location(metadata: &LocationMetadata, pose: Pose) -> Location {
        let ids = [SpawnId(10), SpawnId(11)];
        Location::new(
            LocationId(1),
            "desk0".to_string(),
            "desk".to_string(),
            RoomId(0),
            pose,
            metadata,
            &ids,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_spawn_names() {
        let desk = location(&desk(), Pose::default());
        let names = desk.spawns().iter().map(|s| s.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["desk0_left", "desk0_spawn1"]);
        assert_eq!(desk.spawn(SpawnId(11)).map(|s| s.location()), Some(LocationId(1)));
    }

    #[test]
    fn test_default_spawn_covers_location() {
        let table = location(
            &LocationMetadata::new(Footprint::boxed(1.0, 1.0)),
            Pose::new(2.0, 3.0, 0.0),
        );
        assert_eq!(table.spawns().len(), 1);
        assert_eq!(table.spawns()[0].name(), "desk0_spawn0");
        assert_eq!(table.spawns()[0].polygon(), table.polygon());
    }

    #[test]
    fn test_spawn_follows_location_pose() {
        let desk = location(&desk(), Pose::new(5.0, 0.0, FRAC_PI_2));
        let left = desk.spawns()[0].polygon().centroid();
        assert_abs_diff_eq!(left.x(), 4.5, epsilon = 1e-6);
        assert_abs_diff_eq!(left.y(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_default_nav_pose_faces_location() {
        let desk = location(&desk(), Pose::new(2.0, 0.0, 0.0));
        let pose = desk.spawns()[0].nav_poses(0.2)[0];
        assert_abs_diff_eq!(pose.x(), 2.0 + 0.5 + 0.2 + NAV_POSE_CLEARANCE, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.y(), 0.5, epsilon = 1e-6);
        assert!(pose.is_close(&Pose::new(pose.x(), pose.y(), PI), 1e-9));
    }

    #[test]
    fn test_explicit_nav_poses_in_location_frame() {
        let metadata = LocationMetadata::new(Footprint::boxed(1.0, 1.0))
            .with_spawn(SpawnMetadata::new(Footprint::parent(0.1)).with_nav_pose(&[1.0, 0.0, PI]));
        let table = location(&metadata, Pose::new(0.0, 0.0, FRAC_PI_2));
        let pose = table.spawns()[0].nav_poses(0.5)[0];
        assert!(pose.is_close(&Pose::new(0.0, 1.0, -FRAC_PI_2), 1e-9));
    }

    #[test]
    fn test_invalid_nav_pose() {
        let metadata = LocationMetadata::new(Footprint::boxed(1.0, 1.0))
            .with_spawn(SpawnMetadata::new(Footprint::parent(0.0)).with_nav_pose(&[1.0]));
        let result = Location::new(
            LocationId(1),
            "table0".to_string(),
            "table".to_string(),
            RoomId(0),
            Pose::default(),
            &metadata,
            &[SpawnId(2)],
            None,
        );
        assert_eq!(result.err(), Some(GeometryError::InvalidNavPose));
    }

    #[test]
    fn test_collision_polygon_follows_inflation() {
        let mut table = location(&LocationMetadata::new(Footprint::boxed(1.0, 1.0)), Pose::default());
        assert_eq!(table.collision_polygon(), table.polygon());

        table.update_collision_polygon(0.25);
        let bounds = table.collision_polygon().bounds().unwrap();
        assert_abs_diff_eq!(bounds.width(), 1.5, epsilon = 1e-6);
    }
}
