//! Keeps the world's search graph in step with its entities and answers path queries.
//!
//! Rooms, hallways and object spawns each own the graph nodes built from their navigation
//! poses. Nodes are inserted when the entity is added and removed with it; with no graph set,
//! entities carry no nodes at all.

use tracing::{debug, warn};

use super::{
    fill_path_yaws, Entity, HallwayId, LocationId, NavGraph, NavGraphConfig, Node, NodeId,
    OccupancyView, Pose, RoomId, SearchGraph, Target, World, WorldError,
};

impl World {
    /// Replaces the search graph with a [`NavGraph`] over every current entity.
    pub fn create_search_graph(&mut self, max_edge_distance: f64, collision_check_distance: f64) {
        self.set_search_graph(Box::new(NavGraph::new(NavGraphConfig {
            max_edge_distance,
            collision_check_distance,
        })));
    }

    /// Installs `graph` and fills it with the nodes of every room, hallway and object spawn.
    pub fn set_search_graph(&mut self, graph: Box<dyn SearchGraph>) {
        self.search_graph = Some(graph);
        self.current_path = None;
        self.current_path_goal = None;

        let rooms = self.rooms.iter().map(|r| r.id()).collect::<Vec<_>>();
        let hallways = self.hallways.iter().map(|h| h.id()).collect::<Vec<_>>();
        let locations = self.locations.iter().map(|l| l.id()).collect::<Vec<_>>();
        for id in rooms {
            self.add_room_graph_nodes(id);
        }
        for id in hallways {
            self.add_hallway_graph_nodes(id);
        }
        for id in locations {
            self.add_location_graph_nodes(id);
        }
        debug!(
            "Created search graph with {} nodes",
            self.search_graph.as_ref().map_or(0, |g| g.node_count())
        );
    }

    pub fn search_graph(&self) -> Option<&dyn SearchGraph> {
        self.search_graph.as_deref()
    }

    /// Path of the last successful [`World::find_path`] call.
    pub fn current_path(&self) -> Option<&[Pose]> {
        self.current_path.as_deref()
    }

    /// Entity the last path query was heading to.
    pub fn current_path_goal(&self) -> Option<Entity> {
        self.current_path_goal
    }

    pub(crate) fn add_room_graph_nodes(&mut self, id: RoomId) {
        if self.search_graph.is_none() {
            return;
        }
        let Some(poses) = self.room(id).map(|r| r.nav_poses().to_vec()) else {
            return;
        };
        let nodes = self.allocate_nodes(&poses, Some(Entity::Room(id)));
        self.insert_graph_nodes(&nodes);
        if let Some(room) = self.room_mut(id) {
            room.graph_nodes = nodes;
        }
    }

    pub(crate) fn add_hallway_graph_nodes(&mut self, id: HallwayId) {
        if self.search_graph.is_none() {
            return;
        }
        let Some(poses) = self.hallway(id).map(|h| h.nav_poses()) else {
            return;
        };
        let nodes = self.allocate_nodes(&poses, Some(Entity::Hallway(id)));
        self.insert_graph_nodes(&nodes);
        if let Some(hallway) = self.hallways.iter_mut().find(|h| h.id() == id) {
            hallway.graph_nodes = nodes;
        }
    }

    /// One set of nodes per object spawn of the location.
    pub(crate) fn add_location_graph_nodes(&mut self, id: LocationId) {
        if self.search_graph.is_none() {
            return;
        }
        let inflation_radius = self.inflation_radius();
        let Some(spawns) = self.location(id).map(|l| {
            l.spawns()
                .iter()
                .map(|s| (s.id(), s.nav_poses(inflation_radius)))
                .collect::<Vec<_>>()
        }) else {
            return;
        };
        for (spawn_id, poses) in spawns {
            let nodes = self.allocate_nodes(&poses, Some(Entity::ObjectSpawn(spawn_id)));
            self.insert_graph_nodes(&nodes);
            if let Some(spawn) = self.spawn_mut(spawn_id) {
                spawn.graph_nodes = nodes;
            }
        }
    }

    pub(crate) fn remove_graph_nodes(&mut self, nodes: &[Node]) {
        if let Some(graph) = self.search_graph.as_mut() {
            graph.remove(&nodes.iter().map(|n| n.id).collect::<Vec<_>>());
        }
    }

    fn allocate_nodes(&mut self, poses: &[Pose], parent: Option<Entity>) -> Vec<Node> {
        poses
            .iter()
            .map(|pose| {
                let id = NodeId(self.next_node_id);
                self.next_node_id += 1;
                Node::new(id, *pose, parent)
            })
            .collect()
    }

    fn insert_graph_nodes(&mut self, nodes: &[Node]) {
        let occupancy = OccupancyView::new(&self.rooms, &self.hallways);
        if let Some(graph) = self.search_graph.as_mut() {
            graph.add(nodes, true, &occupancy);
        }
    }

    /// Shortest path from `start` (the robot pose when `None`) to `goal`.
    ///
    /// Poses are inserted as temporary nodes, which are removed again before returning whatever
    /// the outcome.
    pub fn find_path(
        &mut self,
        goal: impl Into<Target>,
        start: Option<Target>,
    ) -> Result<Vec<Pose>, WorldError> {
        if self.search_graph.is_none() {
            warn!("No search graph defined for this world");
            return Err(WorldError::NoSearchGraph);
        }
        let goal = goal.into();
        let start = match (start, &self.robot) {
            (Some(start), _) => start,
            (None, Some(robot)) => Target::Pose(robot.pose()),
            (None, None) => {
                warn!("No start given and no robot in the world");
                return Err(WorldError::NoRobot);
            }
        };

        let mut transient = Vec::new();
        let result = self.search_path(&start, &goal, &mut transient);
        self.remove_graph_nodes(&transient);
        result
    }

    fn search_path(
        &mut self,
        start: &Target,
        goal: &Target,
        transient: &mut Vec<Node>,
    ) -> Result<Vec<Pose>, WorldError> {
        let start_parent = match start {
            Target::Pose(pose) => self
                .robot
                .as_ref()
                .and_then(|r| r.location())
                .or_else(|| self.get_location_from_pose(pose.position())),
            _ => None,
        };
        let Some(start_node) = self.path_endpoint(start, start_parent, transient) else {
            warn!("Invalid start specified: {start}");
            return Err(WorldError::InvalidStart(start.to_string()));
        };
        let goal_parent = match goal {
            Target::Pose(pose) => self.get_location_from_pose(pose.position()),
            _ => None,
        };
        let Some(goal_node) = self.path_endpoint(goal, goal_parent, transient) else {
            warn!("Invalid goal specified: {goal}");
            return Err(WorldError::InvalidGoal(goal.to_string()));
        };

        self.current_path_goal = goal_node.parent;
        let path = self
            .search_graph
            .as_ref()
            .and_then(|g| g.find_path(start_node.id, goal_node.id));
        let Some(path) = path else {
            warn!("No path found from {start} to {goal}");
            self.current_path = None;
            return Err(WorldError::NoPath(goal.to_string()));
        };

        let path = fill_path_yaws(&path);
        debug!("Found path to {goal} with {} waypoints", path.len());
        self.current_path = Some(path.clone());
        Ok(path)
    }

    /// Graph node for one end of a path query, inserting a temporary node for a pose.
    fn path_endpoint(
        &mut self,
        target: &Target,
        parent: Option<Entity>,
        transient: &mut Vec<Node>,
    ) -> Option<Node> {
        match target {
            Target::Pose(pose) => {
                let nodes = self.allocate_nodes(&[*pose], parent);
                self.insert_graph_nodes(&nodes);
                transient.extend_from_slice(&nodes);
                nodes.first().copied()
            }
            _ => self.graph_node_from_entity(target.clone()),
        }
    }

    /// Graph node standing for an entity. Where several qualify, the world's selection policy
    /// decides: a location first picks one of its spawns, an object uses its spawn's nodes.
    pub fn graph_node_from_entity(&mut self, target: impl Into<Target>) -> Option<Node> {
        let target = target.into();
        if let Target::Node(id) = target {
            return self.search_graph.as_ref()?.node(id).copied();
        }

        let nodes = match self.resolve_entity(&target) {
            Some(Entity::Room(id)) => self.room(id).map(|r| r.graph_nodes().to_vec()),
            Some(Entity::Hallway(id)) => self.hallway(id).map(|h| h.graph_nodes().to_vec()),
            Some(Entity::ObjectSpawn(id)) => self.spawn(id).map(|s| s.graph_nodes().to_vec()),
            Some(Entity::Object(id)) => self
                .object(id)
                .and_then(|o| o.spawn())
                .and_then(|s| self.spawn(s))
                .map(|s| s.graph_nodes().to_vec()),
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
                    .and_then(|s| self.spawn(s))
                    .map(|s| s.graph_nodes().to_vec())
            }
            None => None,
        };

        let candidates = nodes
            .unwrap_or_default()
            .into_iter()
            .map(|n| (n, n.pose.position()))
            .collect::<Vec<_>>();
        let node = self.select(&candidates);
        if node.is_none() {
            warn!("Cannot get graph node from {target}");
        }
        node
    }
}
