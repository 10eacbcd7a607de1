//! Tumble Cube - simulation core for a rotating-cube gravity puzzle
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (orientation, gravity travel, outcome)
//! - `persistence`: Puzzle/solution/world records and their wire framing
//! - `solutions`: Best-solution bookkeeping and star ratings
//! - `settings`: Data-driven tuning and presentation toggles

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod solutions;

pub use error::{CommandError, ParseAxisError, RecordError};
pub use settings::Settings;
pub use solutions::SolutionBook;

use glam::{IVec3, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the native runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Gravity used by drop (units/s²)
    pub const DROP_ACCELERATION: f32 = 9.81;
    /// Gravity used by launch (units/s²)
    pub const LAUNCH_ACCELERATION: f32 = 3.0;

    /// Largest accepted puzzle size; keeps fixed-point travel coordinates
    /// (twice the size, in tenths) well inside `i32`
    pub const MAX_PUZZLE_SIZE: i32 = 4096;

    /// Sub-step length in tenths of a cell
    pub const STEP_TENTHS: i32 = 1;
    /// Tenths per cell (fixed-point scale for travelling spheres)
    pub const TENTHS_PER_CELL: i32 = 10;

    /// Duration of a discrete 90° turn (seconds)
    pub const TURN_DURATION: f32 = 0.25;
    /// Maximum rotation per tick while snapping to the nearest axis (π/20)
    pub const MAX_SNAP_ANGLE: f32 = std::f32::consts::PI / 20.0;
    /// Angles below this are treated as zero when snapping
    pub const ANGLE_EPSILON: f32 = 1.0e-4;
}

/// True if all coordinates are whole numbers
#[inline]
pub fn is_cell_center(position: Vec3) -> bool {
    position == position.round()
}

/// True if any coordinate lies strictly beyond `±size`
#[inline]
pub fn is_out_of_bounds(location: IVec3, size: i32) -> bool {
    location.abs().max_element() > size
}

/// Round a position to the nearest lattice location
#[inline]
pub fn to_location(position: Vec3) -> IVec3 {
    position.round().as_ivec3()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_center() {
        assert!(is_cell_center(Vec3::new(1.0, -3.0, 0.0)));
        assert!(!is_cell_center(Vec3::new(1.0, -2.9, 0.0)));
        assert!(!is_cell_center(Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_out_of_bounds_is_strict() {
        assert!(!is_out_of_bounds(IVec3::new(0, -10, 0), 10));
        assert!(is_out_of_bounds(IVec3::new(0, -11, 0), 10));
        assert!(is_out_of_bounds(IVec3::new(11, 0, 0), 10));
    }

    #[test]
    fn test_to_location_rounds() {
        assert_eq!(to_location(Vec3::new(0.9999, -2.0001, 3.0)), IVec3::new(1, -2, 3));
    }
}
