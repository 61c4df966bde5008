//! Basic building blocks.

use std::{
    f64::consts::PI,
    ops::{Add, Neg, Sub},
};

use nalgebra::{Isometry2, Point2, Vector2};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn distance(&self, position: Self) -> f64 {
        ((self.x - position.x).powi(2) + (self.y - position.y).powi(2)).sqrt()
    }

    pub fn rotate_vector(&self, angle: Angle) -> Position {
        Position::new(
            self.x * angle.0.cos() - self.y * angle.0.sin(),
            self.x * angle.0.sin() + self.y * angle.0.cos(),
        )
    }

    pub fn scale(&self, factor: f64) -> Position {
        Position::new(self.x * factor, self.y * factor)
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn heading_to(&self, other: Self) -> Angle {
        Angle::new((other.y - self.y).atan2(other.x - self.x))
    }
}

impl From<[f64; 2]> for Position {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<(f64, f64)> for Position {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<Position> for (f64, f64) {
    fn from(value: Position) -> Self {
        (value.x, value.y)
    }
}

impl From<Position> for Point2<f64> {
    fn from(value: Position) -> Self {
        Point2::new(value.x, value.y)
    }
}

impl From<Point2<f64>> for Position {
    fn from(value: Point2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct Angle(f64);

impl Angle {
    pub fn new(radians: f64) -> Self {
        Self(radians)
    }

    /// The same direction expressed in (-π, π].
    pub fn wrapped(self) -> Self {
        let mut angle = self.0 % (2.0 * PI);
        if angle > PI {
            angle -= 2.0 * PI;
        } else if angle <= -PI {
            angle += 2.0 * PI;
        }
        Self(angle)
    }
}

impl Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Angle(-self.0)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl From<Angle> for f64 {
    fn from(value: Angle) -> Self {
        value.0
    }
}

/// Planar pose in the world frame. The yaw is stored as given and only wrapped when compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Pose {
    position: Position,
    yaw: Angle,
}

impl Pose {
    pub const fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            position: Position::new(x, y),
            yaw: Angle(yaw),
        }
    }

    pub fn from_position(position: Position, yaw: Angle) -> Self {
        Self { position, yaw }
    }

    /// Builds a pose from `[x, y]` or `[x, y, yaw]`.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match *values {
            [x, y] => Some(Self::new(x, y, 0.0)),
            [x, y, yaw] => Some(Self::new(x, y, yaw)),
            _ => None,
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x()
    }

    pub fn y(&self) -> f64 {
        self.position.y()
    }

    pub fn yaw(&self) -> Angle {
        self.yaw
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn with_yaw(&self, yaw: Angle) -> Self {
        Self {
            position: self.position,
            yaw,
        }
    }

    pub fn to_isometry(&self) -> Isometry2<f64> {
        Isometry2::new(Vector2::new(self.x(), self.y()), self.yaw.0)
    }

    pub fn from_isometry(isometry: &Isometry2<f64>) -> Self {
        Self::new(
            isometry.translation.x,
            isometry.translation.y,
            isometry.rotation.angle(),
        )
    }

    /// The pose that undoes `self` when used with [`super::geometry::transform`].
    pub fn inverse(&self) -> Self {
        Self::from_isometry(&self.to_isometry().inverse())
    }

    /// Maps a position expressed in this pose's frame into the world frame.
    pub fn transform_position(&self, position: Position) -> Position {
        self.to_isometry()
            .transform_point(&Point2::from(position))
            .into()
    }

    /// Composes `local` (expressed in this pose's frame) into the world frame.
    pub fn compose(&self, local: &Pose) -> Pose {
        Self::from_isometry(&(self.to_isometry() * local.to_isometry()))
    }

    pub fn is_close(&self, other: &Pose, epsilon: f64) -> bool {
        self.position.distance(other.position) <= epsilon
            && f64::from((self.yaw - other.yaw).wrapped()).abs() <= epsilon
    }
}
