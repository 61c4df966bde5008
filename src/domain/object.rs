//! Movable objects resting on an object spawn or carried by the robot.

use super::geometry::transform;
use super::{ObjectId, Polygon, Pose, SpawnId};

/// Where an object currently rests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectParent {
    Spawn(SpawnId),
    Robot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    id: ObjectId,
    name: String,
    category: String,
    parent: ObjectParent,
    pose: Pose,
    raw_polygon: Polygon,
    polygon: Polygon,
    height: Option<f64>,
}

impl Object {
    pub(crate) fn new(
        id: ObjectId,
        name: String,
        category: String,
        parent: ObjectParent,
        pose: Pose,
        raw_polygon: Polygon,
        height: Option<f64>,
    ) -> Self {
        let polygon = transform(&raw_polygon, &pose);
        Self {
            id,
            name,
            category,
            parent,
            pose,
            raw_polygon,
            polygon,
            height,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn parent(&self) -> ObjectParent {
        self.parent
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Footprint in the object's own frame.
    pub fn raw_polygon(&self) -> &Polygon {
        &self.raw_polygon
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn spawn(&self) -> Option<SpawnId> {
        match self.parent {
            ObjectParent::Spawn(spawn) => Some(spawn),
            ObjectParent::Robot => None,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: ObjectParent) {
        self.parent = parent;
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.polygon = transform(&self.raw_polygon, &pose);
    }
}
