//! Navigation graph over room, hallway and object spawn poses.
//!
//! The world only talks to the graph through [`SearchGraph`]; [`NavGraph`] is the default
//! implementation, connecting nodes within range whose straight edge stays in free space.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use serde::Deserialize;
use tracing::warn;

use super::{Entity, OccupancyMap, Pose};

/// Smallest spacing of occupancy checks along an edge.
pub const MIN_COLLISION_CHECK_DISTANCE: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub pose: Pose,
    /// Entity the node belongs to, if any.
    pub parent: Option<Entity>,
}

impl Node {
    pub fn new(id: NodeId, pose: Pose, parent: Option<Entity>) -> Self {
        Self { id, pose, parent }
    }
}

pub trait SearchGraph {
    /// Inserts nodes, connecting each to the graph when `autoconnect` is set.
    fn add(&mut self, nodes: &[Node], autoconnect: bool, occupancy: &dyn OccupancyMap);

    fn remove(&mut self, nodes: &[NodeId]);

    /// Poses along the shortest path, endpoints included.
    fn find_path(&self, start: NodeId, goal: NodeId) -> Option<Vec<Pose>>;

    fn node(&self, id: NodeId) -> Option<&Node>;

    fn node_count(&self) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavGraphConfig {
    /// Longest edge created by auto-connection.
    pub max_edge_distance: f64,
    /// Spacing of occupancy checks along a candidate edge.
    pub collision_check_distance: f64,
}

impl Default for NavGraphConfig {
    fn default() -> Self {
        Self {
            max_edge_distance: f64::INFINITY,
            collision_check_distance: 0.1,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NavGraph {
    config: NavGraphConfig,
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,
}

impl NavGraph {
    /// Creates an empty graph. A collision check distance below
    /// [`MIN_COLLISION_CHECK_DISTANCE`] is raised to it.
    pub fn new(mut config: NavGraphConfig) -> Self {
        if config.collision_check_distance.is_nan()
            || config.collision_check_distance < MIN_COLLISION_CHECK_DISTANCE
        {
            warn!(
                "Collision check distance {} too small, using {MIN_COLLISION_CHECK_DISTANCE}",
                config.collision_check_distance
            );
            config.collision_check_distance = MIN_COLLISION_CHECK_DISTANCE;
        }
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &NavGraphConfig {
        &self.config
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|e| e.len()).sum::<usize>() / 2
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.get(&id).into_iter().flat_map(|e| e.keys().copied())
    }

    fn connect(&mut self, a: NodeId, b: NodeId, cost: f64) {
        self.edges.entry(a).or_default().insert(b, cost);
        self.edges.entry(b).or_default().insert(a, cost);
    }

    fn is_edge_free(&self, a: &Pose, b: &Pose, occupancy: &dyn OccupancyMap) -> bool {
        let (start, end) = (a.position(), b.position());
        let steps = (start.distance(end) / self.config.collision_check_distance)
            .ceil()
            .max(1.0) as usize;
        (0..=steps).all(|i| {
            let t = i as f64 / steps as f64;
            !occupancy.is_occupied(start + (end - start).scale(t))
        })
    }
}

impl SearchGraph for NavGraph {
    fn add(&mut self, nodes: &[Node], autoconnect: bool, occupancy: &dyn OccupancyMap) {
        for node in nodes {
            if autoconnect {
                let neighbors = self
                    .nodes
                    .values()
                    .filter(|other| other.id != node.id)
                    .filter_map(|other| {
                        let distance = other.pose.position().distance(node.pose.position());
                        (distance <= self.config.max_edge_distance
                            && self.is_edge_free(&node.pose, &other.pose, occupancy))
                        .then_some((other.id, distance))
                    })
                    .collect::<Vec<_>>();
                for (other, distance) in neighbors {
                    self.connect(node.id, other, distance);
                }
            }
            self.nodes.insert(node.id, *node);
        }
    }

    fn remove(&mut self, nodes: &[NodeId]) {
        for id in nodes {
            self.nodes.remove(id);
            if let Some(neighbors) = self.edges.remove(id) {
                for neighbor in neighbors.keys() {
                    if let Some(edges) = self.edges.get_mut(neighbor) {
                        edges.remove(id);
                    }
                }
            }
        }
    }

    /// A* with the straight-line distance as heuristic.
    fn find_path(&self, start: NodeId, goal: NodeId) -> Option<Vec<Pose>> {
        let goal_position = self.nodes.get(&goal)?.pose.position();
        let start_node = self.nodes.get(&start)?;
        let heuristic = |id: NodeId| {
            self.nodes
                .get(&id)
                .map_or(0.0, |n| n.pose.position().distance(goal_position))
        };

        let mut costs = BTreeMap::from([(start, 0.0)]);
        let mut came_from = BTreeMap::new();
        let mut frontier = BinaryHeap::from([Frontier {
            estimate: heuristic(start_node.id),
            node: start,
        }]);

        while let Some(Frontier { node, .. }) = frontier.pop() {
            if node == goal {
                let mut path = vec![node];
                let mut current = node;
                while let Some(&previous) = came_from.get(&current) {
                    path.push(previous);
                    current = previous;
                }
                return path
                    .iter()
                    .rev()
                    .map(|id| self.nodes.get(id).map(|n| n.pose))
                    .collect();
            }
            let cost = costs.get(&node).copied().unwrap_or(f64::INFINITY);
            for (&neighbor, &edge_cost) in self.edges.get(&node).into_iter().flatten() {
                let candidate = cost + edge_cost;
                if candidate < costs.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                    costs.insert(neighbor, candidate);
                    came_from.insert(neighbor, node);
                    frontier.push(Frontier {
                        estimate: candidate + heuristic(neighbor),
                        node: neighbor,
                    });
                }
            }
        }
        None
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Min-heap entry ordered by estimated total cost.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Frontier {
    estimate: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
