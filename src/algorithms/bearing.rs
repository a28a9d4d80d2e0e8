//! Heading-relative bearing helpers

use super::geo::wrap_360;

/// Signed offset of a target bearing from the viewer's heading, in (-180, 180]
///
/// Positive values are to the viewer's right.
pub fn relative_angle(target_bearing: f64, viewer_heading: f64) -> f64 {
    let offset = wrap_360(target_bearing - viewer_heading + 180.0) - 180.0;
    if offset <= -180.0 {
        offset + 360.0
    } else {
        offset
    }
}

/// Whether the target lies within `half_angle_degrees` of the viewer's heading
pub fn is_in_forward_cone(target_bearing: f64, viewer_heading: f64, half_angle_degrees: f64) -> bool {
    relative_angle(target_bearing, viewer_heading).abs() <= half_angle_degrees
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DIRECTLY_AHEAD_HALF_ANGLE_DEG, FORWARD_CONE_HALF_ANGLE_DEG};
    use proptest::prelude::*;

    #[test]
    fn test_relative_angle_across_north() {
        let rel = relative_angle(10.0, 350.0);
        assert!((rel - 20.0).abs() < 1e-9);
        assert!((relative_angle(350.0, 10.0) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_relative_angle_behind_is_positive_180() {
        assert_eq!(relative_angle(180.0, 0.0), 180.0);
        assert_eq!(relative_angle(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_forward_cone_gating() {
        assert!(is_in_forward_cone(10.0, 350.0, FORWARD_CONE_HALF_ANGLE_DEG));
        assert!(!is_in_forward_cone(10.0, 350.0, DIRECTLY_AHEAD_HALF_ANGLE_DEG));
        assert!(is_in_forward_cone(2.0, 358.0, DIRECTLY_AHEAD_HALF_ANGLE_DEG));
        assert!(!is_in_forward_cone(100.0, 0.0, FORWARD_CONE_HALF_ANGLE_DEG));
        assert!(is_in_forward_cone(45.0, 0.0, FORWARD_CONE_HALF_ANGLE_DEG));
    }

    proptest! {
        #[test]
        fn prop_relative_angle_in_range(target in -720.0f64..720.0, heading in -720.0f64..720.0) {
            let rel = relative_angle(target, heading);
            prop_assert!(rel > -180.0 && rel <= 180.0, "rel = {}", rel);
        }
    }
}
