//! Collision detection between world entities and occupancy of their navigable interior.

use super::{Hallway, Polygon, Position, Room};

/// Entities that take up space in the world and must not overlap each other.
pub trait HasCollision {
    fn has_collision(&self, other: &dyn HasCollision) -> bool {
        self.external_collision_polygon()
            .intersects(other.external_collision_polygon())
    }

    /// Footprint inflated outward, used between entities.
    fn external_collision_polygon(&self) -> &Polygon;

    /// Footprint inflated inward, used for robot occupancy.
    fn internal_collision_polygon(&self) -> &FreeSpace;

    fn is_collision_free(&self, position: Position) -> bool {
        self.internal_collision_polygon().is_collision_free(position)
    }
}

/// Navigable interior of a room or hallway: an eroded boundary with obstacle holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FreeSpace {
    boundary: Polygon,
    obstacles: Vec<Polygon>,
}

impl FreeSpace {
    pub fn new(boundary: Polygon, obstacles: Vec<Polygon>) -> Self {
        Self {
            boundary,
            obstacles,
        }
    }

    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    pub fn obstacles(&self) -> &[Polygon] {
        &self.obstacles
    }

    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty()
    }

    pub fn is_collision_free(&self, position: Position) -> bool {
        self.boundary.contains(position) && !self.obstacles.iter().any(|o| o.covers(position))
    }
}

/// Occupancy queries used by the navigation graph to check its edges.
pub trait OccupancyMap {
    fn is_occupied(&self, position: Position) -> bool;
}

/// Occupancy over a set of rooms and hallways: a position is free if any of them says so.
#[derive(Clone, Copy)]
pub struct OccupancyView<'a> {
    rooms: &'a [Room],
    hallways: &'a [Hallway],
}

impl<'a> OccupancyView<'a> {
    pub fn new(rooms: &'a [Room], hallways: &'a [Hallway]) -> Self {
        Self { rooms, hallways }
    }
}

impl OccupancyMap for OccupancyView<'_> {
    fn is_occupied(&self, position: Position) -> bool {
        !self
            .rooms
            .iter()
            .map(|r| r as &dyn HasCollision)
            .chain(self.hallways.iter().map(|h| h as &dyn HasCollision))
            .any(|e| e.is_collision_free(position))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::super::geometry::box_polygon;
    use super::*;

    #[rstest]
    #[case::open_floor(Position::new(1.0, 0.0), true)]
    #[case::obstacle(Position::new(-1.0, 0.0), false)]
    #[case::obstacle_edge(Position::new(-0.5, 0.0), false)]
    #[case::eroded_margin(Position::new(1.9, 0.0), false)]
    fn test_free_space(#[case] position: Position, #[case] expected: bool) {
        let free_space = FreeSpace::new(
            box_polygon(3.6, 3.6, 0.0, 0.0, 0.0),
            vec![box_polygon(1.0, 1.0, -1.0, 0.0, 0.0)],
        );
        assert_eq!(free_space.is_collision_free(position), expected);
    }

    #[test]
    fn test_empty_free_space() {
        let free_space = FreeSpace::default();
        assert!(free_space.is_empty());
        assert!(!free_space.is_collision_free(Position::default()));
    }
}
