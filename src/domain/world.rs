//! The world: owner of every entity, keeper of their geometric consistency.
//!
//! Every mutation validates its candidate geometry against the entities already present before
//! committing anything. A rejected mutation logs a warning and returns a [`WorldError`], leaving
//! the world exactly as it was.

use std::collections::HashMap;
use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::geometry::{
    difference, footprint_to_polygon, inflate, sample_in_polygon, transform, GeometryError, MeshLoader,
    SamplingError,
};
use super::hallway::centerline;
use super::{
    Bounds, Entity, EntityKind, Hallway, HallwayId, HallwaySpec, HasCollision, Location,
    LocationId, Metadata, Object, ObjectId, ObjectParent, ObjectSpawn, OccupancyMap,
    OccupancyView, Polygon, Pose, Position, Robot, Room, RoomId, RoomSpec, SearchGraph,
    SelectionPolicy, SpawnId, Target,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("{kind} {name} in collision, cannot add to world")]
    Collision { kind: EntityKind, name: String },
    #[error("{kind} {name} does not fit in {parent}")]
    NotWithinParent {
        kind: EntityKind,
        name: String,
        parent: String,
    },
    #[error("no {kind} found for {query}")]
    NotFound { kind: EntityKind, query: String },
    #[error("unknown {kind} category {category}")]
    UnknownCategory { kind: EntityKind, category: String },
    #[error("{target} is not a valid {expected}")]
    InvalidEntity {
        target: String,
        expected: &'static str,
    },
    #[error("could not sample a valid pose for {name} after {tries} tries")]
    SamplingExhausted { name: String, tries: usize },
    #[error("cannot build hallway {name}")]
    InvalidHallway { name: String },
    #[error("pose ({x:.3}, {y:.3}) is occupied")]
    Occupied { x: f64, y: f64 },
    #[error("no robot in the world")]
    NoRobot,
    #[error("world already has robot {0}")]
    RobotAlreadyPresent(String),
    #[error("robot is already holding {0}")]
    AlreadyHolding(String),
    #[error("robot is not holding an object")]
    NotHolding,
    #[error("no search graph defined for this world")]
    NoSearchGraph,
    #[error("invalid start specified: {0}")]
    InvalidStart(String),
    #[error("invalid goal specified: {0}")]
    InvalidGoal(String),
    #[error("no path found to {0}")]
    NoPath(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

impl WorldError {
    pub(crate) fn not_found(kind: EntityKind, query: impl ToString) -> Self {
        WorldError::NotFound {
            kind,
            query: query.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub inflation_radius: f64,
    /// Clearance added around objects when they are placed.
    pub object_radius: f64,
    pub max_object_sample_tries: usize,
    pub max_polygon_sample_tries: usize,
    /// Seed of the world's random generator; entropy when absent.
    pub seed: Option<u64>,
    pub selection: SelectionPolicy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            inflation_radius: 0.0,
            object_radius: 0.05,
            max_object_sample_tries: 1000,
            max_polygon_sample_tries: super::geometry::DEFAULT_POLYGON_SAMPLE_TRIES,
            seed: None,
            selection: SelectionPolicy::default(),
        }
    }
}

pub struct World {
    config: WorldConfig,
    metadata: Metadata,
    mesh_loader: Option<Box<dyn MeshLoader>>,
    pub(crate) rooms: Vec<Room>,
    pub(crate) hallways: Vec<Hallway>,
    pub(crate) locations: Vec<Location>,
    pub(crate) objects: Vec<Object>,
    pub(crate) robot: Option<Robot>,
    location_instance_counts: HashMap<String, usize>,
    object_instance_counts: HashMap<String, usize>,
    bounds: Bounds,
    inflation_radius: f64,
    pub(crate) search_graph: Option<Box<dyn SearchGraph>>,
    pub(crate) current_path: Option<Vec<Pose>>,
    pub(crate) current_path_goal: Option<Entity>,
    pub(crate) rng: ChaCha8Rng,
    next_id: u32,
    pub(crate) next_node_id: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        let mut world = Self {
            inflation_radius: config.inflation_radius,
            config,
            metadata: Metadata::default(),
            mesh_loader: None,
            rooms: Vec::new(),
            hallways: Vec::new(),
            locations: Vec::new(),
            objects: Vec::new(),
            robot: None,
            location_instance_counts: HashMap::new(),
            object_instance_counts: HashMap::new(),
            bounds: Bounds::default(),
            search_graph: None,
            current_path: None,
            current_path_goal: None,
            rng,
            next_id: 0,
            next_node_id: 0,
        };
        world.set_inflation_radius(world.inflation_radius);
        world
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_mesh_loader(&mut self, mesh_loader: Box<dyn MeshLoader>) {
        self.mesh_loader = Some(mesh_loader);
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn set_selection_policy(&mut self, selection: SelectionPolicy) {
        self.config.selection = selection;
    }

    pub fn inflation_radius(&self) -> f64 {
        self.inflation_radius
    }

    pub fn object_radius(&self) -> f64 {
        self.config.object_radius
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn hallways(&self) -> &[Hallway] {
        &self.hallways
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn robot(&self) -> Option<&Robot> {
        self.robot.as_ref()
    }

    pub fn num_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn num_hallways(&self) -> usize {
        self.hallways.len()
    }

    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn location_instance_count(&self, category: &str) -> usize {
        self.location_instance_counts
            .get(category)
            .copied()
            .unwrap_or(0)
    }

    pub fn object_instance_count(&self, category: &str) -> usize {
        self.object_instance_counts
            .get(category)
            .copied()
            .unwrap_or(0)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id() == id)
    }

    pub fn hallway(&self, id: HallwayId) -> Option<&Hallway> {
        self.hallways.iter().find(|h| h.id() == id)
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id() == id)
    }

    pub fn spawn(&self, id: SpawnId) -> Option<&ObjectSpawn> {
        self.locations.iter().find_map(|l| l.spawn(id))
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub(crate) fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id() == id)
    }

    pub(crate) fn spawn_mut(&mut self, id: SpawnId) -> Option<&mut ObjectSpawn> {
        self.locations.iter_mut().find_map(|l| l.spawn_mut(id))
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn entity_name(&self, entity: Entity) -> Option<&str> {
        match entity {
            Entity::Room(id) => self.room(id).map(Room::name),
            Entity::Hallway(id) => self.hallway(id).map(Hallway::name),
            Entity::Location(id) => self.location(id).map(Location::name),
            Entity::ObjectSpawn(id) => self.spawn(id).map(ObjectSpawn::name),
            Entity::Object(id) => self.object(id).map(Object::name),
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_name(entity).is_some()
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Ids the next `count` allocations will hand out. Nothing is consumed until
    /// [`Self::commit_ids`], so a rejected mutation leaves the counter untouched.
    fn pending_ids(&self, count: u32) -> std::ops::Range<u32> {
        self.next_id..self.next_id + count
    }

    fn commit_ids(&mut self, count: u32) {
        self.next_id += count;
    }

    /// Recomputes every collision polygon for a new inflation radius.
    pub fn set_inflation_radius(&mut self, inflation_radius: f64) {
        self.inflation_radius = inflation_radius;
        for location in &mut self.locations {
            location.update_collision_polygon(inflation_radius);
        }
        let room_ids = self.rooms.iter().map(Room::id).collect::<Vec<_>>();
        for id in room_ids {
            self.update_room_collision_polygons(id);
        }
    }

    fn location_obstacles(&self, rooms: &[RoomId]) -> Vec<Polygon> {
        self.locations
            .iter()
            .filter(|l| rooms.contains(&l.room()))
            .map(|l| l.collision_polygon().clone())
            .collect()
    }

    /// Refreshes the room and the hallways attached to it.
    fn update_room_collision_polygons(&mut self, id: RoomId) {
        let obstacles = self.location_obstacles(&[id]);
        if let Some(room) = self.rooms.iter_mut().find(|r| r.id() == id) {
            room.update_collision_polygons(self.inflation_radius, obstacles);
        }
        let hallways = self
            .hallways
            .iter()
            .filter(|h| h.connects(id))
            .map(|h| (h.id(), h.room_start(), h.room_end()))
            .collect::<Vec<_>>();
        for (hallway_id, start, end) in hallways {
            self.update_hallway_collision_polygons(hallway_id, start, end);
        }
    }

    fn update_hallway_collision_polygons(&mut self, id: HallwayId, start: RoomId, end: RoomId) {
        let obstacles = self.location_obstacles(&[start, end]);
        if let Some(hallway) = self.hallways.iter_mut().find(|h| h.id() == id) {
            hallway.update_collision_polygons(self.inflation_radius, obstacles);
        }
    }

    fn update_room_visualization_polygon(&mut self, id: RoomId) {
        let Some(room) = self.rooms.iter_mut().find(|r| r.id() == id) else {
            return;
        };
        let openings = self
            .hallways
            .iter()
            .filter(|h| h.connects(id))
            .map(|h| h.polygon().clone())
            .collect();
        room.update_visualization_polygon(openings);
    }

    /// Checks `candidate` against every room outside `except` and against every hallway. Overlap
    /// with a hallway that lies inside a room of `except` the hallway also connects is ignored.
    fn collides_with_structure(&self, candidate: &dyn HasCollision, except: &[RoomId]) -> bool {
        if self
            .rooms
            .iter()
            .filter(|r| !except.contains(&r.id()))
            .any(|r| candidate.has_collision(r))
        {
            return true;
        }
        self.hallways.iter().any(|other| {
            let shared = self
                .rooms
                .iter()
                .filter(|r| except.contains(&r.id()) && other.connects(r.id()))
                .map(Room::polygon)
                .collect::<Vec<_>>();
            if shared.is_empty() {
                candidate.has_collision(other)
            } else {
                difference(candidate.external_collision_polygon(), shared)
                    .intersects(other.external_collision_polygon())
            }
        })
    }

    pub fn add_room(&mut self, spec: RoomSpec) -> Result<RoomId, WorldError> {
        let name = spec
            .name
            .clone()
            .unwrap_or_else(|| format!("room_{}", self.rooms.len()));
        let (polygon, _) =
            footprint_to_polygon(&spec.footprint, None, None, self.mesh_loader.as_deref())?;
        let id = RoomId(self.next_id);
        let mut room = Room::new(id, name, polygon, spec.nav_poses, spec.wall_width);
        room.update_collision_polygons(self.inflation_radius, Vec::new());

        if self.collides_with_structure(&room, &[]) {
            warn!("Room {} in collision. Cannot add to world.", room.name());
            return Err(WorldError::Collision {
                kind: EntityKind::Room,
                name: room.name().to_string(),
            });
        }

        debug!("Added room {}", room.name());
        self.commit_ids(1);
        self.rooms.push(room);
        self.update_bounds();
        self.add_room_graph_nodes(id);
        Ok(id)
    }

    /// Removes a room with its hallways, locations and their objects.
    pub fn remove_room(&mut self, name: &str) -> Result<(), WorldError> {
        let Some(id) = self.get_room_by_name(name).map(Room::id) else {
            warn!("No room {name} found for removal");
            return Err(WorldError::not_found(EntityKind::Room, name));
        };
        let (hallways, locations) = self
            .room(id)
            .map(|r| (r.hallways().to_vec(), r.locations().to_vec()))
            .unwrap_or_default();
        for hallway in hallways {
            self.remove_hallway(hallway)?;
        }
        for location in locations {
            self.remove_location(location)?;
        }

        if let Some(idx) = self.rooms.iter().position(|r| r.id() == id) {
            let room = self.rooms.remove(idx);
            self.remove_graph_nodes(room.graph_nodes());
        }
        self.clear_robot_location(Entity::Room(id));
        self.update_bounds();
        debug!("Removed room {name}");
        Ok(())
    }

    pub fn add_hallway(&mut self, spec: HallwaySpec) -> Result<HallwayId, WorldError> {
        let start = self
            .resolve_room(&spec.room_start)
            .ok_or_else(|| WorldError::not_found(EntityKind::Room, &spec.room_start))?;
        let end = self
            .resolve_room(&spec.room_end)
            .ok_or_else(|| WorldError::not_found(EntityKind::Room, &spec.room_end))?;
        let (start_room, end_room) = match (self.room(start), self.room(end)) {
            (Some(start_room), Some(end_room)) => (start_room, end_room),
            _ => return Err(WorldError::not_found(EntityKind::Room, &spec.room_start)),
        };
        let name = format!("hall_{}_{}", start_room.name(), end_room.name());

        let line = centerline(
            start_room.polygon().centroid(),
            end_room.polygon().centroid(),
            &spec.connection,
            spec.offset,
        );
        let Some(line) = line.filter(|_| start != end && spec.width > 0.0) else {
            warn!("Cannot build hallway {name} from {:?}", spec.connection);
            return Err(WorldError::InvalidHallway { name });
        };

        let id = HallwayId(self.next_id);
        let mut hallway = Hallway::new(id, name, (start, end), line, spec.width, spec.wall_width);
        hallway.update_collision_polygons(self.inflation_radius, self.location_obstacles(&[start, end]));

        if self.collides_with_structure(&hallway, &[start, end]) {
            warn!("Hallway {} in collision. Cannot add to world.", hallway.name());
            return Err(WorldError::Collision {
                kind: EntityKind::Hallway,
                name: hallway.name().to_string(),
            });
        }

        debug!("Added hallway {}", hallway.name());
        self.commit_ids(1);
        self.hallways.push(hallway);
        for room_id in [start, end] {
            if let Some(room) = self.room_mut(room_id) {
                room.hallways.push(id);
            }
            self.update_room_visualization_polygon(room_id);
        }
        self.add_hallway_graph_nodes(id);
        Ok(id)
    }

    pub fn remove_hallway(&mut self, hallway: impl Into<Target>) -> Result<(), WorldError> {
        let target = hallway.into();
        let Some(idx) = self
            .resolve_hallway(&target)
            .and_then(|id| self.hallways.iter().position(|h| h.id() == id))
        else {
            warn!("No hallway {target} found for removal");
            return Err(WorldError::not_found(EntityKind::Hallway, target));
        };

        let hallway = self.hallways.remove(idx);
        for room_id in [hallway.room_start(), hallway.room_end()] {
            if let Some(room) = self.room_mut(room_id) {
                room.hallways.retain(|&h| h != hallway.id());
            }
            self.update_room_visualization_polygon(room_id);
        }
        self.remove_graph_nodes(hallway.graph_nodes());
        self.clear_robot_location(Entity::Hallway(hallway.id()));
        debug!("Removed hallway {}", hallway.name());
        Ok(())
    }

    pub fn add_location(
        &mut self,
        category: &str,
        room: impl Into<Target>,
        pose: Pose,
        name: Option<&str>,
    ) -> Result<LocationId, WorldError> {
        let room = room.into();
        let room_id = self
            .resolve_room(&room)
            .ok_or_else(|| WorldError::not_found(EntityKind::Room, &room))?;
        let Some(metadata) = self.metadata.location(category).cloned() else {
            warn!("No metadata for location category {category}");
            return Err(WorldError::UnknownCategory {
                kind: EntityKind::Location,
                category: category.to_string(),
            });
        };
        let name = name.map_or_else(
            || format!("{category}{}", self.location_instance_count(category)),
            str::to_string,
        );

        let mut ids = self.pending_ids(metadata.spawns().len() as u32 + 1);
        let spawn_ids = ids.by_ref().take(metadata.spawns().len()).map(SpawnId).collect::<Vec<_>>();
        let id = LocationId(ids.start);
        let id_count = spawn_ids.len() as u32 + 1;
        let mut location = Location::new(
            id,
            name,
            category.to_string(),
            room_id,
            pose,
            &metadata,
            &spawn_ids,
            self.mesh_loader.as_deref(),
        )?;

        if let Some(room) = self.room(room_id) {
            if !location.polygon().within(room.polygon()) {
                warn!("Location {} not within room {}. Cannot add to world.", location.name(), room.name());
                return Err(WorldError::NotWithinParent {
                    kind: EntityKind::Location,
                    name: location.name().to_string(),
                    parent: room.name().to_string(),
                });
            }
        }
        if self
            .locations
            .iter()
            .filter(|l| l.room() == room_id)
            .any(|l| l.polygon().intersects(location.polygon()))
        {
            warn!("Location {} in collision. Cannot add to world.", location.name());
            return Err(WorldError::Collision {
                kind: EntityKind::Location,
                name: location.name().to_string(),
            });
        }

        debug!("Added location {}", location.name());
        self.commit_ids(id_count);
        location.update_collision_polygon(self.inflation_radius);
        self.locations.push(location);
        if let Some(room) = self.room_mut(room_id) {
            room.locations.push(id);
        }
        *self
            .location_instance_counts
            .entry(category.to_string())
            .or_default() += 1;
        self.update_room_collision_polygons(room_id);
        self.add_location_graph_nodes(id);
        Ok(id)
    }

    /// Removes a location together with the objects resting on it.
    pub fn remove_location(&mut self, location: impl Into<Target>) -> Result<(), WorldError> {
        let target = location.into();
        let Some(id) = self.resolve_location(&target) else {
            warn!("No location {target} found for removal");
            return Err(WorldError::not_found(EntityKind::Location, target));
        };
        let objects = self
            .objects
            .iter()
            .filter(|o| {
                o.spawn()
                    .and_then(|s| self.spawn(s))
                    .is_some_and(|s| s.location() == id)
            })
            .map(Object::id)
            .collect::<Vec<_>>();
        for object in objects {
            self.remove_object(object)?;
        }

        let Some(idx) = self.locations.iter().position(|l| l.id() == id) else {
            return Err(WorldError::not_found(EntityKind::Location, target));
        };
        let location = self.locations.remove(idx);
        for spawn in location.spawns() {
            self.remove_graph_nodes(spawn.graph_nodes());
        }
        if let Some(room) = self.room_mut(location.room()) {
            room.locations.retain(|&l| l != id);
        }
        if let Some(count) = self.location_instance_counts.get_mut(location.category()) {
            *count = count.saturating_sub(1);
        }
        self.update_room_collision_polygons(location.room());
        debug!("Removed location {}", location.name());
        Ok(())
    }

    /// Adds an object on a location or object spawn. Without a pose, one is sampled.
    pub fn add_object(
        &mut self,
        category: &str,
        location: impl Into<Target>,
        pose: Option<Pose>,
        name: Option<&str>,
    ) -> Result<ObjectId, WorldError> {
        let Some(metadata) = self.metadata.object(category).cloned() else {
            warn!("No metadata for object category {category}");
            return Err(WorldError::UnknownCategory {
                kind: EntityKind::Object,
                category: category.to_string(),
            });
        };
        let location = location.into();
        let candidates = self.spawn_candidates(&location)?;
        if candidates.is_empty() {
            return Err(WorldError::not_found(EntityKind::ObjectSpawn, location));
        }
        let name = name.map_or_else(
            || format!("{category}{}", self.object_instance_count(category)),
            str::to_string,
        );
        let (raw_polygon, height) =
            footprint_to_polygon(&metadata.footprint, None, None, self.mesh_loader.as_deref())?;

        let (spawn, pose) = match pose {
            None => self.sample_object_placement(&raw_polygon, &candidates, &name)?,
            Some(pose) => {
                let spawn = candidates[self.rng.random_range(0..candidates.len())];
                let candidate = inflate(&transform(&raw_polygon, &pose), self.config.object_radius);
                if !self.is_valid_placement(spawn, &candidate) {
                    warn!("Object {name} in collision or not in its location. Cannot add to world.");
                    return Err(WorldError::Collision {
                        kind: EntityKind::Object,
                        name,
                    });
                }
                (spawn, pose)
            }
        };

        let id = ObjectId(self.allocate_id());
        debug!("Added object {name}");
        let object = Object::new(
            id,
            name,
            category.to_string(),
            ObjectParent::Spawn(spawn),
            pose,
            raw_polygon,
            height,
        );
        if let Some(spawn) = self.spawn_mut(spawn) {
            spawn.objects.push(id);
        }
        self.objects.push(object);
        *self
            .object_instance_counts
            .entry(category.to_string())
            .or_default() += 1;
        Ok(id)
    }

    pub fn remove_object(&mut self, object: impl Into<Target>) -> Result<(), WorldError> {
        let target = object.into();
        let Some(idx) = self
            .resolve_object(&target)
            .and_then(|id| self.objects.iter().position(|o| o.id() == id))
        else {
            warn!("No object {target} found for removal");
            return Err(WorldError::not_found(EntityKind::Object, target));
        };
        let object = self.objects.remove(idx);
        match object.parent() {
            ObjectParent::Spawn(spawn) => {
                if let Some(spawn) = self.spawn_mut(spawn) {
                    spawn.objects.retain(|&o| o != object.id());
                }
            }
            ObjectParent::Robot => {
                if let Some(robot) = &mut self.robot {
                    robot.set_manipulated_object(None);
                }
            }
        }
        debug!("Removed object {}", object.name());
        Ok(())
    }

    pub fn remove_all_objects(&mut self, restart_numbering: bool) {
        for spawn in self.locations.iter_mut().flat_map(|l| l.spawns.iter_mut()) {
            spawn.objects.clear();
        }
        if let Some(robot) = &mut self.robot {
            robot.set_manipulated_object(None);
        }
        self.objects.clear();
        if restart_numbering {
            self.object_instance_counts.clear();
        }
    }

    /// Recomputes the bounds as the union of room bounding boxes, zero without rooms.
    pub fn update_bounds(&mut self) {
        self.bounds = self
            .rooms
            .iter()
            .filter_map(|r| r.polygon().bounds())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
    }

    /// A position is free only inside the navigable interior of some room or hallway.
    pub fn check_occupancy(&self, position: Position) -> bool {
        OccupancyView::new(&self.rooms, &self.hallways).is_occupied(position)
    }

    pub fn sample_free_robot_pose_uniform(&mut self) -> Result<Pose, SamplingError> {
        let tries = self.config.max_object_sample_tries;
        let r = self.inflation_radius;
        let bounds = self.bounds;
        for _ in 0..tries {
            let x = (bounds.width() - 2.0 * r) * self.rng.random::<f64>() + bounds.x_min + r;
            let y = (bounds.height() - 2.0 * r) * self.rng.random::<f64>() + bounds.y_min + r;
            let yaw = 2.0 * PI * self.rng.random::<f64>();
            if !self.check_occupancy(Position::new(x, y)) {
                return Ok(Pose::new(x, y, yaw));
            }
        }
        warn!("Could not sample a free robot pose after {tries} tries");
        Err(SamplingError::Exhausted { tries })
    }

    /// Spawn and pose for an object whose footprint is `raw_polygon`, re-picking the spawn among
    /// `candidates` on every try.
    pub(crate) fn sample_object_placement(
        &mut self,
        raw_polygon: &Polygon,
        candidates: &[SpawnId],
        name: &str,
    ) -> Result<(SpawnId, Pose), WorldError> {
        let tries = self.config.max_object_sample_tries;
        let inflated = inflate(raw_polygon, self.config.object_radius);
        if !candidates.is_empty() {
            for _ in 0..tries {
                let spawn = candidates[self.rng.random_range(0..candidates.len())];
                let Some(spawn_polygon) = self.spawn(spawn).map(|s| s.polygon().clone()) else {
                    continue;
                };
                let Ok(position) = sample_in_polygon(
                    &spawn_polygon,
                    self.config.max_polygon_sample_tries,
                    &mut self.rng,
                ) else {
                    continue;
                };
                let yaw = self.rng.random_range(-PI..=PI);
                let pose = Pose::from_position(position, super::Angle::new(yaw));
                if self.is_valid_placement(spawn, &transform(&inflated, &pose)) {
                    return Ok((spawn, pose));
                }
            }
        }
        warn!("Could not sample valid pose to add object {name}");
        Err(WorldError::SamplingExhausted {
            name: name.to_string(),
            tries,
        })
    }

    /// `polygon` must lie within the spawn and clear every object already on it.
    pub(crate) fn is_valid_placement(&self, spawn: SpawnId, polygon: &Polygon) -> bool {
        let Some(spawn) = self.spawn(spawn) else {
            return false;
        };
        polygon.within(spawn.polygon())
            && !spawn
                .objects()
                .iter()
                .filter_map(|&id| self.object(id))
                .any(|o| polygon.intersects(o.polygon()))
    }

    /// Object spawns an object may be added to: every spawn of a location, or one spawn.
    fn spawn_candidates(&self, target: &Target) -> Result<Vec<SpawnId>, WorldError> {
        match self.resolve_entity(target) {
            Some(Entity::Location(id)) => Ok(self
                .location(id)
                .map(|l| l.spawns().iter().map(ObjectSpawn::id).collect())
                .unwrap_or_default()),
            Some(Entity::ObjectSpawn(id)) => Ok(vec![id]),
            Some(_) => Err(WorldError::InvalidEntity {
                target: target.to_string(),
                expected: "location or object spawn",
            }),
            None => {
                warn!("No location or object spawn found for {target}");
                Err(WorldError::not_found(EntityKind::Location, target))
            }
        }
    }

    pub(crate) fn clear_robot_location(&mut self, entity: Entity) {
        if let Some(robot) = &mut self.robot {
            if robot.location() == Some(entity) {
                robot.set_location(None);
            }
        }
    }

    /// Picks one candidate with the world's selection policy, relative to the robot.
    pub(crate) fn select<T: Copy>(&mut self, candidates: &[(T, Position)]) -> Option<T> {
        let reference = self.robot.as_ref().map(|r| r.pose().position());
        self.config
            .selection
            .select(candidates, |(_, p)| *p, reference, &mut self.rng)
            .map(|(candidate, _)| candidate)
    }

    pub fn room_names(&self) -> Vec<&str> {
        self.rooms.iter().map(Room::name).collect()
    }

    pub fn hallway_names(&self) -> Vec<&str> {
        self.hallways.iter().map(Hallway::name).collect()
    }

    pub fn location_names(&self) -> Vec<&str> {
        self.locations.iter().map(Location::name).collect()
    }

    pub fn object_names(&self) -> Vec<&str> {
        self.objects.iter().map(Object::name).collect()
    }

    /// First room with that name. Names are not required to be unique.
    pub fn get_room_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name() == name)
    }

    pub fn get_hallway_by_name(&self, name: &str) -> Option<&Hallway> {
        self.hallways.iter().find(|h| h.name() == name)
    }

    pub fn get_location_by_name(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name() == name)
    }

    pub fn get_spawn_by_name(&self, name: &str) -> Option<&ObjectSpawn> {
        self.locations
            .iter()
            .flat_map(|l| l.spawns())
            .find(|s| s.name() == name)
    }

    pub fn get_object_by_name(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name() == name)
    }

    /// Searches rooms, hallways, locations and their spawns, then objects.
    pub fn get_entity_by_name(&self, name: &str) -> Option<Entity> {
        self.get_room_by_name(name)
            .map(|r| Entity::Room(r.id()))
            .or_else(|| self.get_hallway_by_name(name).map(|h| Entity::Hallway(h.id())))
            .or_else(|| {
                self.locations.iter().find_map(|l| {
                    if l.name() == name {
                        Some(Entity::Location(l.id()))
                    } else {
                        l.spawns()
                            .iter()
                            .find(|s| s.name() == name)
                            .map(|s| Entity::ObjectSpawn(s.id()))
                    }
                })
            })
            .or_else(|| self.get_object_by_name(name).map(|o| Entity::Object(o.id())))
    }

    /// Room or hallway whose footprint covers the position, rooms first.
    pub fn get_location_from_pose(&self, position: Position) -> Option<Entity> {
        self.rooms
            .iter()
            .find(|r| r.polygon().covers(position))
            .map(|r| Entity::Room(r.id()))
            .or_else(|| {
                self.hallways
                    .iter()
                    .find(|h| h.polygon().covers(position))
                    .map(|h| Entity::Hallway(h.id()))
            })
    }

    pub(crate) fn resolve_entity(&self, target: &Target) -> Option<Entity> {
        match target {
            Target::Name(name) => self.get_entity_by_name(name),
            Target::Entity(entity) => Some(*entity).filter(|e| self.contains(*e)),
            Target::Node(_) | Target::Pose(_) => None,
        }
    }

    fn resolve_room(&self, target: &Target) -> Option<RoomId> {
        match target {
            Target::Name(name) => self.get_room_by_name(name).map(Room::id),
            _ => match self.resolve_entity(target)? {
                Entity::Room(id) => Some(id),
                _ => None,
            },
        }
    }

    fn resolve_hallway(&self, target: &Target) -> Option<HallwayId> {
        match target {
            Target::Name(name) => self.get_hallway_by_name(name).map(Hallway::id),
            _ => match self.resolve_entity(target)? {
                Entity::Hallway(id) => Some(id),
                _ => None,
            },
        }
    }

    fn resolve_location(&self, target: &Target) -> Option<LocationId> {
        match target {
            Target::Name(name) => self.get_location_by_name(name).map(Location::id),
            _ => match self.resolve_entity(target)? {
                Entity::Location(id) => Some(id),
                _ => None,
            },
        }
    }

    pub(crate) fn resolve_object(&self, target: &Target) -> Option<ObjectId> {
        match target {
            Target::Name(name) => self.get_object_by_name(name).map(Object::id),
            _ => match self.resolve_entity(target)? {
                Entity::Object(id) => Some(id),
                _ => None,
            },
        }
    }

    /// Drills a target down to one object spawn: a room to one of its locations, a location to
    /// one of its spawns. A name that matches no entity may name a location category.
    ///
    /// Takes `&mut self` because a random selection policy draws from the world generator.
    pub fn resolve_to_object_spawn(&mut self, target: impl Into<Target>) -> Option<SpawnId> {
        let target = target.into();
        let entity = match &target {
            Target::Name(name) => self.get_entity_by_name(name).or_else(|| {
                self.metadata.location(name)?;
                self.locations
                    .iter()
                    .find(|l| l.category() == name)
                    .map(|l| Entity::Location(l.id()))
            }),
            _ => self.resolve_entity(&target),
        };

        let entity = match entity {
            Some(Entity::Room(id)) => {
                let candidates = self
                    .locations
                    .iter()
                    .filter(|l| l.room() == id)
                    .map(|l| (l.id(), l.pose().position()))
                    .collect::<Vec<_>>();
                self.select(&candidates).map(Entity::Location)
            }
            other => other,
        };

        let spawn = match entity {
            Some(Entity::Location(id)) => {
                let candidates = self
                    .location(id)
                    .map(|l| {
                        l.spawns()
                            .iter()
                            .map(|s| (s.id(), s.polygon().centroid()))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                self.select(&candidates)
            }
            Some(Entity::ObjectSpawn(id)) => Some(id),
            _ => None,
        };
        if spawn.is_none() {
            warn!("Could not resolve {target} to an object spawn");
        }
        spawn
    }
}
