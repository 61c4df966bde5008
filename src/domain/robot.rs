//! The single mobile robot of a world: a disc with a pose and an optional carried object.

use super::geometry::{circle_polygon, transform};
use super::{Entity, ObjectId, Polygon, Pose, Target};

#[derive(Clone, Debug, PartialEq)]
pub struct Robot {
    name: String,
    radius: f64,
    pose: Pose,
    location: Option<Entity>,
    manipulated_object: Option<ObjectId>,
}

impl Default for Robot {
    fn default() -> Self {
        Self::new("robot", 0.0)
    }
}

impl Robot {
    pub fn new(name: &str, radius: f64) -> Self {
        Self {
            name: name.to_string(),
            radius,
            pose: Pose::default(),
            location: None,
            manipulated_object: None,
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Room or hallway the robot was last placed in.
    pub fn location(&self) -> Option<Entity> {
        self.location
    }

    pub fn manipulated_object(&self) -> Option<ObjectId> {
        self.manipulated_object
    }

    pub fn is_holding(&self) -> bool {
        self.manipulated_object.is_some()
    }

    pub fn footprint(&self) -> Polygon {
        transform(&circle_polygon(self.radius), &self.pose)
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub(crate) fn set_location(&mut self, location: Option<Entity>) {
        self.location = location;
    }

    pub(crate) fn set_manipulated_object(&mut self, object: Option<ObjectId>) {
        self.manipulated_object = object;
    }
}

/// Where [`super::World::add_robot`] puts the robot.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RobotPlacement {
    /// Uniformly sampled free pose anywhere in the world.
    #[default]
    Anywhere,
    AtPose(Pose),
    /// Sampled free pose inside a room or hallway.
    InEntity(Target),
    InEntityAtPose(Target, Pose),
    /// The pose the robot already carries.
    UseRobotPose,
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_robot() {
        let robot = Robot::default();
        assert_eq!(robot.name(), "robot");
        assert_eq!(robot.radius(), 0.0);
        assert_eq!(robot.location(), None);
        assert!(!robot.is_holding());
    }

    #[test]
    fn test_footprint_follows_pose() {
        let robot = Robot::new("rover", 0.5).with_pose(Pose::new(2.0, -1.0, 0.3));
        let bounds = robot.footprint().bounds().unwrap();
        assert_abs_diff_eq!(bounds.x_min, 1.5, epsilon = 1e-2);
        assert_abs_diff_eq!(bounds.x_max, 2.5, epsilon = 1e-2);
        assert_abs_diff_eq!(bounds.y_min, -1.5, epsilon = 1e-2);
        assert_abs_diff_eq!(bounds.y_max, -0.5, epsilon = 1e-2);
    }
}
