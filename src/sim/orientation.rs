//! Cube orientation: discrete turns, drag rotation and snapping to the
//! nearest axis
//!
//! The cumulative rotation is kept orthonormal and its inverse is cached.
//! A rotation that cannot be inverted is an internal invariant violation and
//! panics.

use std::f32::consts::FRAC_PI_2;
use std::str::FromStr;

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::ANGLE_EPSILON;
use crate::error::ParseAxisError;

/// World X, Y and Z
const CARDINALS: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

/// Signed cardinal axis for a discrete turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::PosX => Vec3::X,
            Axis::NegX => Vec3::NEG_X,
            Axis::PosY => Vec3::Y,
            Axis::NegY => Vec3::NEG_Y,
            Axis::PosZ => Vec3::Z,
            Axis::NegZ => Vec3::NEG_Z,
        }
    }
}

impl FromStr for Axis {
    type Err = ParseAxisError;

    /// Accepts `x`, `+x`, `-x` and the same for `y` and `z`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" | "+x" => Ok(Axis::PosX),
            "-x" => Ok(Axis::NegX),
            "y" | "+y" => Ok(Axis::PosY),
            "-y" => Ok(Axis::NegY),
            "z" | "+z" => Ok(Axis::PosZ),
            "-z" => Ok(Axis::NegZ),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

/// Viewer placement, derived from the puzzle size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
}

impl Camera {
    /// Eye on +Z far enough to stay outside the cube, head up +Y
    pub fn for_size(size: i32) -> Self {
        let distance = (size as f32).powi(2) / 2.0;
        Self {
            eye: Vec3::new(0.0, 0.0, distance),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

/// Cumulative cube rotation with cached inverse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    rotation: Mat3,
    inverse: Mat3,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            rotation: Mat3::IDENTITY,
            inverse: Mat3::IDENTITY,
        }
    }

    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    pub fn inverse(&self) -> Mat3 {
        self.inverse
    }

    /// Express a world direction in the cube's local frame
    #[inline]
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.inverse * world
    }

    /// Replace the rotation, re-orthonormalizing and refreshing the inverse
    pub fn set(&mut self, rotation: Mat3) {
        self.rotation = Mat3::from_quat(Quat::from_mat3(&rotation).normalize());
        self.inverse = invert(self.rotation);
    }

    /// Post-multiply by a rotation about a local-frame axis
    pub fn apply_local(&mut self, axis: Vec3, angle: f32) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        self.set(self.rotation * Mat3::from_axis_angle(axis, angle));
    }

    /// Drag rotation: `dy` about world Y, then `dx` about world X, both
    /// mapped through the inverse taken before the drag
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let inverse = self.inverse;
        let mut rotation = self.rotation;
        if dy != 0.0 {
            let axis = (inverse * Vec3::Y).normalize();
            rotation *= Mat3::from_axis_angle(axis, dy);
        }
        if dx != 0.0 {
            let axis = (inverse * Vec3::X).normalize();
            rotation *= Mat3::from_axis_angle(axis, dx);
        }
        self.set(rotation);
    }

    /// Signed-permutation matrix nearest to the rotation, if within tolerance
    pub fn nearest_lattice(&self) -> Option<Mat3> {
        let snapped = Mat3::from_cols(
            self.rotation.x_axis.round(),
            self.rotation.y_axis.round(),
            self.rotation.z_axis.round(),
        );
        let aligned = (snapped.determinant() - 1.0).abs() < 1.0e-3
            && (0..3).all(|i| {
                (snapped.col(i) - self.rotation.col(i)).abs().max_element() < 1.0e-3
            });
        aligned.then_some(snapped)
    }

    /// True if every cube axis is parallel to a world axis
    pub fn is_axis_aligned(&self) -> bool {
        self.nearest_lattice().is_some()
    }

    /// Remove float drift once the cube is axis aligned
    pub fn snap_to_lattice(&mut self) {
        if let Some(snapped) = self.nearest_lattice() {
            self.rotation = snapped;
            self.inverse = invert(snapped);
        }
    }
}

fn invert(rotation: Mat3) -> Mat3 {
    let det = rotation.determinant();
    assert!(
        det.is_finite() && det.abs() > f32::EPSILON,
        "orientation matrix is not invertible (det = {det})"
    );
    rotation.inverse()
}

/// Angle between two directions, stable near zero
fn angle_between(a: Vec3, b: Vec3) -> f32 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Index of the largest value, skipping `exclude`; later indices win ties
fn closest(values: [f32; 3], exclude: Option<usize>) -> usize {
    (0..3)
        .filter(|&i| Some(i) != exclude)
        .reduce(|best, i| if values[i] >= values[best] { i } else { best })
        .unwrap_or(0)
}

/// Discrete 90° turn about a world axis
#[derive(Debug, Clone)]
pub struct TurnAnimation {
    axis: Vec3,
    start: Mat3,
    duration: f32,
    elapsed: f32,
}

impl TurnAnimation {
    pub fn new(axis: Axis, orientation: &Orientation, duration: f32) -> Self {
        Self {
            axis: axis.unit(),
            start: orientation.rotation(),
            duration,
            elapsed: 0.0,
        }
    }

    /// Returns true once the full quarter turn has been applied
    pub fn tick(&mut self, orientation: &mut Orientation, dt: f32) -> bool {
        self.elapsed += dt;
        let fraction = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        let turn = Mat3::from_axis_angle(self.axis, FRAC_PI_2 * fraction);
        orientation.set(turn * self.start);
        if fraction >= 1.0 {
            orientation.snap_to_lattice();
            return true;
        }
        false
    }
}

/// Converge the cube onto the axes nearest the camera eye and up vectors
#[derive(Debug, Clone)]
pub struct SnapToAxis {
    eye: Vec3,
    up: Vec3,
    eye_axis: usize,
    up_axis: usize,
    eye_sign: f32,
    up_sign: f32,
    max_angle: f32,
}

impl SnapToAxis {
    pub fn new(orientation: &Orientation, camera: &Camera, max_angle: f32) -> Self {
        let eye = camera.eye.normalize();
        let up = camera.up.normalize();

        let directions = CARDINALS.map(|a| orientation.to_local(a).normalize());
        let dot_eye = directions.map(|d| eye.dot(d));
        let dot_up = directions.map(|d| up.dot(d));

        let eye_axis = closest(dot_eye.map(f32::abs), None);
        let up_axis = closest(dot_up.map(f32::abs), Some(eye_axis));
        log::debug!("Snapping axis {eye_axis} to eye and axis {up_axis} to up");

        Self {
            eye,
            up,
            eye_axis,
            up_axis,
            eye_sign: dot_eye[eye_axis].signum(),
            up_sign: dot_up[up_axis].signum(),
            max_angle,
        }
    }

    pub fn eye_axis(&self) -> usize {
        self.eye_axis
    }

    pub fn up_axis(&self) -> usize {
        self.up_axis
    }

    /// Rotate one bounded step toward alignment; true once aligned
    pub fn tick(&mut self, orientation: &mut Orientation) -> bool {
        let eye_aligned = self.align(orientation, self.eye_axis, self.eye_sign, self.eye);
        let up_aligned = self.align(orientation, self.up_axis, self.up_sign, self.up);
        if eye_aligned && up_aligned {
            orientation.snap_to_lattice();
            return true;
        }
        false
    }

    fn align(&self, orientation: &mut Orientation, index: usize, sign: f32, target: Vec3) -> bool {
        let current = orientation.to_local(CARDINALS[index]) * sign;
        let angle = angle_between(current, target);
        if angle <= ANGLE_EPSILON {
            return true;
        }
        let axis = target
            .cross(current)
            .try_normalize()
            .unwrap_or_else(|| current.any_orthonormal_vector());
        orientation.apply_local(axis, angle.min(self.max_angle));
        false
    }
}
