//! The robot and the objects it carries.
//!
//! An object rests on exactly one object spawn until the robot picks it up; it then rides with
//! the robot until placed on a spawn again. The robot holds at most one object.

use std::f64::consts::PI;

use rand::Rng;
use tracing::{debug, warn};

use super::geometry::{inflate, sample_in_polygon, transform};
use super::{
    Angle, Entity, EntityKind, HasCollision, ObjectId, ObjectParent, Pose, Robot,
    RobotPlacement, SpawnId, Target, World, WorldError,
};

impl World {
    /// Adds the robot (the default robot when `None`) and places it.
    ///
    /// The world inflation radius becomes the robot radius, and is restored if no valid pose
    /// is found.
    pub fn add_robot(
        &mut self,
        robot: Option<Robot>,
        placement: RobotPlacement,
    ) -> Result<(), WorldError> {
        if let Some(existing) = &self.robot {
            warn!("World already has robot {}", existing.name());
            return Err(WorldError::RobotAlreadyPresent(existing.name().to_string()));
        }
        let mut robot = robot.unwrap_or_default();
        let previous_radius = self.inflation_radius();
        self.set_inflation_radius(robot.radius());

        match self.robot_placement(&robot, placement) {
            Ok((pose, location)) => {
                robot.set_pose(pose);
                robot.set_location(location);
                debug!("Added robot {} at {:?}", robot.name(), pose);
                self.robot = Some(robot);
                Ok(())
            }
            Err(err) => {
                warn!("Could not add robot {}: {err}", robot.name());
                self.set_inflation_radius(previous_radius);
                Err(err)
            }
        }
    }

    /// Pose for the robot and the room or hallway it ends up in.
    fn robot_placement(
        &mut self,
        robot: &Robot,
        placement: RobotPlacement,
    ) -> Result<(Pose, Option<Entity>), WorldError> {
        let pose = match placement {
            RobotPlacement::Anywhere => self.sample_free_robot_pose_uniform()?,
            RobotPlacement::AtPose(pose) => self.free_pose(pose)?,
            RobotPlacement::UseRobotPose => self.free_pose(robot.pose())?,
            RobotPlacement::InEntity(target) => {
                let entity = self.resolve_robot_region(&target)?;
                let pose = self.sample_pose_in_region(entity)?;
                return Ok((pose, Some(entity)));
            }
            RobotPlacement::InEntityAtPose(target, pose) => {
                let entity = self.resolve_robot_region(&target)?;
                let free = self
                    .robot_region(entity)
                    .is_some_and(|r| r.is_collision_free(pose.position()));
                if !free {
                    return Err(WorldError::Occupied {
                        x: pose.x(),
                        y: pose.y(),
                    });
                }
                return Ok((pose, Some(entity)));
            }
        };
        Ok((pose, self.get_location_from_pose(pose.position())))
    }

    fn free_pose(&self, pose: Pose) -> Result<Pose, WorldError> {
        if self.check_occupancy(pose.position()) {
            return Err(WorldError::Occupied {
                x: pose.x(),
                y: pose.y(),
            });
        }
        Ok(pose)
    }

    /// The robot may only be placed in rooms and hallways.
    fn resolve_robot_region(&self, target: &Target) -> Result<Entity, WorldError> {
        match self.resolve_entity(target) {
            Some(entity @ (Entity::Room(_) | Entity::Hallway(_))) => Ok(entity),
            Some(_) => Err(WorldError::InvalidEntity {
                target: target.to_string(),
                expected: "room or hallway",
            }),
            None => Err(WorldError::NotFound {
                kind: EntityKind::Room,
                query: target.to_string(),
            }),
        }
    }

    fn robot_region(&self, entity: Entity) -> Option<&dyn HasCollision> {
        match entity {
            Entity::Room(id) => self.room(id).map(|r| r as &dyn HasCollision),
            Entity::Hallway(id) => self.hallway(id).map(|h| h as &dyn HasCollision),
            _ => None,
        }
    }

    fn sample_pose_in_region(&mut self, entity: Entity) -> Result<Pose, WorldError> {
        let tries = self.config().max_object_sample_tries;
        let name = self.entity_name(entity).unwrap_or_default().to_string();
        let Some(free) = self
            .robot_region(entity)
            .map(|r| r.internal_collision_polygon().clone())
        else {
            return Err(WorldError::not_found(EntityKind::Room, entity.kind()));
        };

        for _ in 0..tries {
            let Ok(position) = sample_in_polygon(free.boundary(), 1, &mut self.rng) else {
                continue;
            };
            if free.is_collision_free(position) {
                let yaw = self.rng.random_range(-PI..=PI);
                return Ok(Pose::from_position(position, Angle::new(yaw)));
            }
        }
        warn!("Could not sample pose in {name}");
        Err(WorldError::SamplingExhausted { name, tries })
    }

    /// Removes the robot, together with any object it carries.
    pub fn remove_robot(&mut self) -> Result<Robot, WorldError> {
        let Some(robot) = self.robot.take() else {
            warn!("No robot to remove");
            return Err(WorldError::NoRobot);
        };
        if let Some(object) = robot.manipulated_object() {
            self.remove_object(object)?;
        }
        debug!("Removed robot {}", robot.name());
        Ok(robot)
    }

    /// Lifts an object off its spawn into the robot's hold.
    pub fn pick_object(&mut self, object: impl Into<Target>) -> Result<ObjectId, WorldError> {
        let robot_pose = match &self.robot {
            None => {
                warn!("No robot in the world");
                return Err(WorldError::NoRobot);
            }
            Some(robot) => {
                if let Some(held) = robot.manipulated_object() {
                    let name = self
                        .object(held)
                        .map_or_else(|| held.to_string(), |o| o.name().to_string());
                    warn!("Robot is already holding {name}");
                    return Err(WorldError::AlreadyHolding(name));
                }
                robot.pose()
            }
        };
        let target = object.into();
        let Some(id) = self.resolve_object(&target) else {
            warn!("Invalid object {target}");
            return Err(WorldError::not_found(EntityKind::Object, target));
        };

        if let Some(spawn) = self.object(id).and_then(|o| o.spawn()) {
            if let Some(spawn) = self.spawn_mut(spawn) {
                spawn.objects.retain(|&o| o != id);
            }
        }
        if let Some(object) = self.object_mut(id) {
            object.set_parent(ObjectParent::Robot);
            object.set_pose(robot_pose);
            debug!("Picked object {}", object.name());
        }
        if let Some(robot) = &mut self.robot {
            robot.set_manipulated_object(Some(id));
        }
        Ok(id)
    }

    /// Sets the held object down on the spawn `location` resolves to, at `pose` or a sampled
    /// pose. On failure the robot keeps the object.
    pub fn place_object(
        &mut self,
        location: impl Into<Target>,
        pose: Option<Pose>,
    ) -> Result<SpawnId, WorldError> {
        let held = match &self.robot {
            None => {
                warn!("No robot in the world");
                return Err(WorldError::NoRobot);
            }
            Some(robot) => robot.manipulated_object(),
        };
        let Some(held) = held else {
            warn!("No manipulated object");
            return Err(WorldError::NotHolding);
        };
        let Some((name, raw_polygon)) = self
            .object(held)
            .map(|o| (o.name().to_string(), o.raw_polygon().clone()))
        else {
            return Err(WorldError::not_found(EntityKind::Object, held));
        };

        let target = location.into();
        let Some(spawn) = self.resolve_to_object_spawn(target.clone()) else {
            return Err(match self.resolve_entity(&target) {
                Some(_) => WorldError::InvalidEntity {
                    target: target.to_string(),
                    expected: "object spawn",
                },
                None => WorldError::not_found(EntityKind::ObjectSpawn, target),
            });
        };

        let (spawn, pose) = match pose {
            None => self.sample_object_placement(&raw_polygon, &[spawn], &name)?,
            Some(pose) => {
                let candidate =
                    inflate(&transform(&raw_polygon, &pose), self.object_radius());
                if !self.is_valid_placement(spawn, &candidate) {
                    warn!("Pose in collision or not in location for {name}");
                    return Err(WorldError::Collision {
                        kind: EntityKind::Object,
                        name,
                    });
                }
                (spawn, pose)
            }
        };

        if let Some(object) = self.object_mut(held) {
            object.set_parent(ObjectParent::Spawn(spawn));
            object.set_pose(pose);
        }
        if let Some(spawn) = self.spawn_mut(spawn) {
            spawn.objects.push(held);
            debug!("Placed object {name} on {}", spawn.name());
        }
        if let Some(robot) = &mut self.robot {
            robot.set_manipulated_object(None);
        }
        Ok(spawn)
    }
}
