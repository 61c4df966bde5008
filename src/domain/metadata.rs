//! Category metadata: footprints and spawn layouts keyed by location and object category.

use std::collections::HashMap;

use serde::Deserialize;

use super::{Footprint, Pose};

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub locations: HashMap<String, LocationMetadata>,
    #[serde(default)]
    pub objects: HashMap<String, ObjectMetadata>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LocationMetadata {
    pub footprint: Footprint,
    #[serde(default)]
    pub object_spawns: Vec<SpawnMetadata>,
}

/// A region of a location where objects may rest. Footprint and navigation poses are expressed
/// in the location frame.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpawnMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "parent_footprint")]
    pub footprint: Footprint,
    /// Each entry is `[x, y]` or `[x, y, yaw]`.
    #[serde(default)]
    pub nav_poses: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ObjectMetadata {
    pub footprint: Footprint,
}

fn parent_footprint() -> Footprint {
    Footprint::parent(0.0)
}

impl Metadata {
    pub fn location(&self, category: &str) -> Option<&LocationMetadata> {
        self.locations.get(category)
    }

    pub fn object(&self, category: &str) -> Option<&ObjectMetadata> {
        self.objects.get(category)
    }

    pub fn with_location(mut self, category: &str, metadata: LocationMetadata) -> Self {
        self.locations.insert(category.to_string(), metadata);
        self
    }

    pub fn with_object(mut self, category: &str, footprint: Footprint) -> Self {
        self.objects
            .insert(category.to_string(), ObjectMetadata { footprint });
        self
    }
}

impl LocationMetadata {
    pub fn new(footprint: Footprint) -> Self {
        Self {
            footprint,
            object_spawns: Vec::new(),
        }
    }

    pub fn with_spawn(mut self, spawn: SpawnMetadata) -> Self {
        self.object_spawns.push(spawn);
        self
    }

    /// Declared spawns, or a single spawn covering the whole location.
    pub fn spawns(&self) -> Vec<SpawnMetadata> {
        if self.object_spawns.is_empty() {
            vec![SpawnMetadata::new(parent_footprint())]
        } else {
            self.object_spawns.clone()
        }
    }
}

impl SpawnMetadata {
    pub fn new(footprint: Footprint) -> Self {
        Self {
            name: None,
            footprint,
            nav_poses: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_nav_pose(mut self, pose: &[f64]) -> Self {
        self.nav_poses.push(pose.to_vec());
        self
    }

    /// Navigation poses in the location frame. `None` if an entry has the wrong arity.
    pub fn local_nav_poses(&self) -> Option<Vec<Pose>> {
        self.nav_poses.iter().map(|p| Pose::from_slice(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_deserialize_metadata() {
        let metadata: Metadata = serde_json::from_str(
            r#"{
                "locations": {
                    "table": {
                        "footprint": {"type": "box", "dims": [1.2, 0.8], "height": 0.5},
                        "object_spawns": [
                            {"name": "tabletop", "footprint": {"type": "parent", "padding": 0.05},
                             "nav_poses": [[0.75, 0.0, 3.14]]}
                        ]
                    },
                    "trash_can": {
                        "footprint": {"type": "circle", "radius": 0.3}
                    }
                },
                "objects": {
                    "apple": {"footprint": {"type": "circle", "radius": 0.06}}
                }
            }"#,
        )
        .unwrap();

        let expected = Metadata::default()
            .with_location(
                "table",
                LocationMetadata::new(Footprint::boxed(1.2, 0.8).with_height(0.5)).with_spawn(
                    SpawnMetadata::new(Footprint::parent(0.05))
                        .with_name("tabletop")
                        .with_nav_pose(&[0.75, 0.0, 3.14]),
                ),
            )
            .with_location("trash_can", LocationMetadata::new(Footprint::circle(0.3)))
            .with_object("apple", Footprint::circle(0.06));
        assert_eq!(metadata, expected);
    }

    #[test]
    fn test_default_spawn_is_parent() {
        let spawns = LocationMetadata::new(Footprint::circle(0.3)).spawns();
        assert_eq!(spawns, vec![SpawnMetadata::new(Footprint::parent(0.0))]);
    }

    #[test]
    fn test_spawn_default_footprint() {
        let spawn: SpawnMetadata = serde_json::from_str(r#"{"name": "top"}"#).unwrap();
        assert!(spawn.footprint.is_parent());
    }

    #[test]
    fn test_local_nav_poses_rejects_bad_arity() {
        let spawn = SpawnMetadata::new(Footprint::parent(0.0)).with_nav_pose(&[1.0]);
        assert_eq!(spawn.local_nav_poses(), None);

        let spawn = SpawnMetadata::new(Footprint::parent(0.0)).with_nav_pose(&[1.0, 2.0]);
        assert_eq!(spawn.local_nav_poses(), Some(vec![Pose::new(1.0, 2.0, 0.0)]));
    }
}
