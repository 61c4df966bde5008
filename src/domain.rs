//! The domain module holds the spatial world model: rooms joined by hallways, furniture
//! locations with object spawns, the objects resting on them, and the single robot moving
//! through it all.
//!
//! [`World`] owns every entity and guards their geometric consistency. Polygon operations live in
//! [`geometry`]; path search is delegated to a [`SearchGraph`] collaborator.

mod basis;
mod collision;
mod entity;
mod footprint;
pub mod geometry;
mod hallway;
mod location;
mod manipulation;
mod metadata;
mod navigation;
mod object;
mod polygon;
mod robot;
mod room;
mod search_graph;
mod trajectory;
mod world;

pub use basis::{Angle, Pose, Position};
pub use collision::{FreeSpace, HasCollision, OccupancyMap, OccupancyView};
pub use entity::{
    Entity, EntityKind, HallwayId, LocationId, ObjectId, RoomId, SelectionPolicy, SpawnId, Target,
};
pub use footprint::{Footprint, FootprintShape};
pub use geometry::{GeometryError, MeshFootprint, MeshLoader, SamplingError};
pub use hallway::{centerline, Connection, Hallway, HallwaySpec};
pub use location::{Location, ObjectSpawn, NAV_POSE_CLEARANCE};
pub use metadata::{LocationMetadata, Metadata, ObjectMetadata, SpawnMetadata};
pub use object::{Object, ObjectParent};
pub use polygon::{Bounds, Polygon};
pub use robot::{Robot, RobotPlacement};
pub use room::{Room, RoomSpec, DEFAULT_WALL_WIDTH};
pub use search_graph::{
    NavGraph, NavGraphConfig, Node, NodeId, SearchGraph, MIN_COLLISION_CHECK_DISTANCE,
};
pub use trajectory::fill_path_yaws;
pub use world::{World, WorldConfig, WorldError};
