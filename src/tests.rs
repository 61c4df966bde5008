//! Test utils.

use approx::assert_abs_diff_eq;

use crate::domain::{
    Bounds, Footprint, HallwaySpec, LocationMetadata, Metadata, Polygon, Pose, RoomSpec,
    SpawnMetadata, World, WorldConfig,
};

/// Compares vertex rings, which must start at the same vertex.
pub fn assert_polygon_abs_diff_eq(actual: &Polygon, expected: &Polygon, epsilon: f64) {
    assert_eq!(
        actual.vertices().len(),
        expected.vertices().len(),
        "{actual:?} != {expected:?}"
    );
    for (a, e) in actual.vertices().iter().zip(expected.vertices()) {
        assert_abs_diff_eq!(a.x(), e.x(), epsilon = epsilon);
        assert_abs_diff_eq!(a.y(), e.y(), epsilon = epsilon);
    }
}

pub fn assert_bounds_abs_diff_eq(polygon: &Polygon, expected: Bounds, epsilon: f64) {
    let actual = polygon.bounds().expect("polygon has no bounds");
    assert_abs_diff_eq!(actual.x_min, expected.x_min, epsilon = epsilon);
    assert_abs_diff_eq!(actual.x_max, expected.x_max, epsilon = epsilon);
    assert_abs_diff_eq!(actual.y_min, expected.y_min, epsilon = epsilon);
    assert_abs_diff_eq!(actual.y_max, expected.y_max, epsilon = epsilon);
}

pub fn test_metadata() -> Metadata {
    Metadata::default()
        .with_location(
            "table",
            LocationMetadata::new(Footprint::boxed(1.2, 0.8)).with_spawn(
                SpawnMetadata::new(Footprint::parent(0.05)).with_name("tabletop"),
            ),
        )
        .with_location("big_table", LocationMetadata::new(Footprint::boxed(4.0, 4.0)))
        .with_location("tiny_box", LocationMetadata::new(Footprint::boxed(0.1, 0.1)))
        .with_location(
            "desk",
            LocationMetadata::new(Footprint::boxed(1.0, 2.0))
                .with_spawn(
                    SpawnMetadata::new(Footprint::boxed(0.8, 0.8).with_offset(&[0.0, 0.5]))
                        .with_name("left"),
                )
                .with_spawn(
                    SpawnMetadata::new(Footprint::boxed(0.8, 0.8).with_offset(&[0.0, -0.5]))
                        .with_name("right"),
                ),
        )
        .with_object("apple", Footprint::circle(0.2))
        .with_object("ball", Footprint::circle(0.5))
}

/// Kitchen `[-5, 5]²` and bedroom `[12, 18] × [-3, 3]`, no hallway.
pub fn world_with_rooms() -> World {
    seeded_world_with_rooms(0)
}

fn seeded_world_with_rooms(seed: u64) -> World {
    let mut world = World::new(WorldConfig {
        seed: Some(seed),
        ..Default::default()
    })
    .with_metadata(test_metadata());
    world
        .add_room(RoomSpec::new(Footprint::boxed(10.0, 10.0)).with_name("kitchen"))
        .unwrap();
    world
        .add_room(
            RoomSpec::new(Footprint::boxed(6.0, 6.0).with_offset(&[15.0, 0.0])).with_name("bedroom"),
        )
        .unwrap();
    world
}

/// Rooms joined by a hallway along `y = 0`, with a big table and a tiny box in the kitchen and
/// a desk facing the hallway in the bedroom.
pub fn test_world(seed: u64) -> World {
    let mut world = seeded_world_with_rooms(seed);
    world
        .add_hallway(HallwaySpec::new("kitchen", "bedroom", 1.0))
        .unwrap();
    world
        .add_location("big_table", "kitchen", Pose::new(-2.5, -2.5, 0.0), None)
        .unwrap();
    world
        .add_location("tiny_box", "kitchen", Pose::new(2.0, -3.0, 0.0), None)
        .unwrap();
    world
        .add_location("desk", "bedroom", Pose::new(16.0, 0.0, std::f64::consts::PI), None)
        .unwrap();
    world
}
