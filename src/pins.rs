//! Default GPIO pin assignments for the relay board.
//!
//! Each channel uses an adjacent pair: extend on the even pin, retract on
//! the odd one. The config file may override any of these.

/// Head section: extend (raise).
pub const HEAD_UP_GPIO: u32 = 0;
/// Head section: retract (lower).
pub const HEAD_DOWN_GPIO: u32 = 1;

pub const KNEE_UP_GPIO: u32 = 2;
pub const KNEE_DOWN_GPIO: u32 = 3;

/// Elevation tilt.
pub const ELEVATION_UP_GPIO: u32 = 4;
pub const ELEVATION_DOWN_GPIO: u32 = 5;
