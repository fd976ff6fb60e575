//! Degree/radian helpers.

use std::f32::consts::PI;

/// Radians per degree.
pub const RAD: f32 = PI / 180.0;

/// Degrees per radian.
pub const DEG: f32 = 180.0 / PI;

pub const TAU: f32 = PI * 2.0;
pub const HALF: f32 = PI / 2.0;
pub const QUARTER: f32 = PI / 4.0;

#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees * RAD
}

#[inline]
pub fn to_degrees(radians: f32) -> f32 {
    radians * DEG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_angle_is_pi() {
        assert!((to_radians(180.0) - PI).abs() < 1e-6);
        assert!((to_degrees(PI) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn round_trip_keeps_value() {
        assert!((to_degrees(to_radians(37.5)) - 37.5).abs() < 1e-4);
    }
}
