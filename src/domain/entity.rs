//! Handles to world entities and the ways callers can refer to them.

use std::fmt;

use rand::Rng;
use serde::Deserialize;

use super::{NodeId, Pose, Position};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(RoomId);
entity_id!(HallwayId);
entity_id!(LocationId);
entity_id!(
    /// Handle to an object spawn. Spawns are owned by their location.
    SpawnId
);
entity_id!(ObjectId);

/// Any entity stored in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Room(RoomId),
    Hallway(HallwayId),
    Location(LocationId),
    ObjectSpawn(SpawnId),
    Object(ObjectId),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Room(_) => EntityKind::Room,
            Entity::Hallway(_) => EntityKind::Hallway,
            Entity::Location(_) => EntityKind::Location,
            Entity::ObjectSpawn(_) => EntityKind::ObjectSpawn,
            Entity::Object(_) => EntityKind::Object,
        }
    }
}

impl From<RoomId> for Entity {
    fn from(value: RoomId) -> Self {
        Entity::Room(value)
    }
}

impl From<HallwayId> for Entity {
    fn from(value: HallwayId) -> Self {
        Entity::Hallway(value)
    }
}

impl From<LocationId> for Entity {
    fn from(value: LocationId) -> Self {
        Entity::Location(value)
    }
}

impl From<SpawnId> for Entity {
    fn from(value: SpawnId) -> Self {
        Entity::ObjectSpawn(value)
    }
}

impl From<ObjectId> for Entity {
    fn from(value: ObjectId) -> Self {
        Entity::Object(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Room,
    Hallway,
    Location,
    ObjectSpawn,
    Object,
    Robot,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Room => "room",
            EntityKind::Hallway => "hallway",
            EntityKind::Location => "location",
            EntityKind::ObjectSpawn => "object spawn",
            EntityKind::Object => "object",
            EntityKind::Robot => "robot",
        })
    }
}

/// What a query or mutation refers to: a name, an entity handle, a graph node or a free pose.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Name(String),
    Entity(Entity),
    Node(NodeId),
    Pose(Pose),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Name(name) => f.write_str(name),
            Target::Entity(entity) => write!(f, "{entity:?}"),
            Target::Node(node) => write!(f, "{node:?}"),
            Target::Pose(pose) => write!(f, "({:.3}, {:.3})", pose.x(), pose.y()),
        }
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Target::Name(value.to_string())
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Target::Name(value)
    }
}

impl From<&String> for Target {
    fn from(value: &String) -> Self {
        Target::Name(value.clone())
    }
}

impl From<Pose> for Target {
    fn from(value: Pose) -> Self {
        Target::Pose(value)
    }
}

impl From<NodeId> for Target {
    fn from(value: NodeId) -> Self {
        Target::Node(value)
    }
}

impl From<Entity> for Target {
    fn from(value: Entity) -> Self {
        Target::Entity(value)
    }
}

macro_rules! target_from_id {
    ($($id:ident),*) => {
        $(
            impl From<$id> for Target {
                fn from(value: $id) -> Self {
                    Target::Entity(value.into())
                }
            }
        )*
    };
}

target_from_id!(RoomId, HallwayId, LocationId, SpawnId, ObjectId);

/// How to pick one candidate when an entity offers several (spawns, locations, graph nodes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    #[default]
    First,
    Random,
    /// Closest to a reference position, usually the robot. Falls back to the first candidate.
    Nearest,
}

impl SelectionPolicy {
    pub fn select<T: Copy, R: Rng + ?Sized>(
        &self,
        candidates: &[T],
        position_of: impl Fn(&T) -> Position,
        reference: Option<Position>,
        rng: &mut R,
    ) -> Option<T> {
        if candidates.is_empty() {
            return None;
        }
        match (self, reference) {
            (SelectionPolicy::Random, _) => Some(candidates[rng.random_range(0..candidates.len())]),
            (SelectionPolicy::Nearest, Some(reference)) => candidates
                .iter()
                .min_by(|a, b| {
                    position_of(a)
                        .distance(reference)
                        .total_cmp(&position_of(b).distance(reference))
                })
                .copied(),
            _ => candidates.first().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::first(SelectionPolicy::First, Some(Position::new(9.0, 0.0)), 0.0)]
    #[case::nearest(SelectionPolicy::Nearest, Some(Position::new(9.0, 0.0)), 10.0)]
    #[case::nearest_without_reference(SelectionPolicy::Nearest, None, 0.0)]
    fn test_selection_policy(
        #[case] policy: SelectionPolicy,
        #[case] reference: Option<Position>,
        #[case] expected: f64,
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let selected = policy.select(
            &[0.0, 5.0, 10.0],
            |x| Position::new(*x, 0.0),
            reference,
            &mut rng,
        );
        assert_eq!(selected, Some(expected));
    }

    #[test]
    fn test_random_selection_stays_in_candidates() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let selected = SelectionPolicy::Random
                .select(&[1, 2, 3], |_| Position::default(), None, &mut rng)
                .unwrap();
            assert!([1, 2, 3].contains(&selected));
        }
        assert_eq!(
            SelectionPolicy::Random.select::<i32, _>(&[], |_| Position::default(), None, &mut rng),
            None
        );
    }

    #[test]
    fn test_target_from() {
        assert_eq!(Target::from("kitchen"), Target::Name("kitchen".to_string()));
        assert_eq!(
            Target::from(RoomId(3)),
            Target::Entity(Entity::Room(RoomId(3)))
        );
    }
}
