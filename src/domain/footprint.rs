//! Declarative footprint descriptions as found in world and category metadata.

use serde::Deserialize;

/// A footprint shape plus its optional offset and height override.
///
/// ```json
/// {"type": "box", "dims": [0.6, 1.2], "offset": [0.1, 0.0, 1.57], "height": 0.5}
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Footprint {
    #[serde(flatten)]
    pub shape: FootprintShape,
    /// `[x, y]` or `[x, y, yaw]`.
    #[serde(default)]
    pub offset: Option<Vec<f64>>,
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FootprintShape {
    Box {
        dims: [f64; 2],
    },
    Circle {
        radius: f64,
    },
    Polygon {
        coords: Vec<[f64; 2]>,
    },
    Mesh {
        model_path: String,
        mesh_path: String,
    },
    /// The parent polygon, eroded by `padding`.
    Parent {
        #[serde(default)]
        padding: f64,
    },
    #[serde(other)]
    Unknown,
}

impl Footprint {
    pub fn new(shape: FootprintShape) -> Self {
        Self {
            shape,
            offset: None,
            height: None,
        }
    }

    pub fn boxed(width: f64, height: f64) -> Self {
        Self::new(FootprintShape::Box {
            dims: [width, height],
        })
    }

    pub fn circle(radius: f64) -> Self {
        Self::new(FootprintShape::Circle { radius })
    }

    pub fn polygon(coords: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::new(FootprintShape::Polygon {
            coords: coords.into_iter().map(|(x, y)| [x, y]).collect(),
        })
    }

    pub fn parent(padding: f64) -> Self {
        Self::new(FootprintShape::Parent { padding })
    }

    pub fn with_offset(mut self, offset: &[f64]) -> Self {
        self.offset = Some(offset.to_vec());
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn is_parent(&self) -> bool {
        matches!(self.shape, FootprintShape::Parent { .. })
    }
}
