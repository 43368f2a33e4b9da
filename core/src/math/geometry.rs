//! Relative geometry between own ship and a target, in a local
//! north/east/up frame with meters and degrees.

/// Weight applied to vertical separation when ranking by proximity.
pub const VERTICAL_PROXIMITY_WEIGHT: f32 = 2.0;

pub struct Geometry;

impl Geometry {
    /// Wraps an angle into `[0, 360)`.
    pub fn normalize_degrees(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negatives
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    }

    pub fn horizontal_distance(rel_north: f32, rel_east: f32) -> f32 {
        rel_north.hypot(rel_east)
    }

    /// Distance blended with weighted vertical separation.
    pub fn proximity(distance: f32, rel_vertical: f32) -> f32 {
        let vertical = rel_vertical * VERTICAL_PROXIMITY_WEIGHT;
        (distance * distance + vertical * vertical).sqrt()
    }

    /// True bearing from own ship to the target.
    pub fn true_bearing(rel_north: f32, rel_east: f32) -> f32 {
        Self::normalize_degrees(rel_east.atan2(rel_north).to_degrees())
    }

    /// Angle measured from own heading instead of north.
    pub fn relative_angle(angle: f32, own_heading: f32) -> f32 {
        Self::normalize_degrees(angle - own_heading)
    }

    /// Rotates a north/east offset into an (ahead, right) offset for a
    /// heading-up display.
    pub fn heading_up_offset(rel_north: f32, rel_east: f32, own_heading: f32) -> (f32, f32) {
        let (sin, cos) = own_heading.to_radians().sin_cos();
        let ahead = rel_north * cos + rel_east * sin;
        let right = -rel_north * sin + rel_east * cos;
        (ahead, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn normalize_wraps_negative_and_large_angles() {
        assert!(close(Geometry::normalize_degrees(-90.0), 270.0));
        assert!(close(Geometry::normalize_degrees(725.0), 5.0));
        assert!(Geometry::normalize_degrees(-1e-9) < 360.0);
    }

    #[test]
    fn bearing_follows_compass_convention() {
        assert!(close(Geometry::true_bearing(100.0, 0.0), 0.0));
        assert!(close(Geometry::true_bearing(0.0, 100.0), 90.0));
        assert!(close(Geometry::true_bearing(-100.0, 0.0), 180.0));
        assert!(close(Geometry::true_bearing(0.0, -100.0), 270.0));
    }

    #[test]
    fn proximity_weights_vertical_separation() {
        assert!(close(Geometry::proximity(300.0, 0.0), 300.0));
        assert!(close(Geometry::proximity(300.0, 200.0), 500.0));
    }

    #[test]
    fn heading_up_offset_rotates_with_own_heading() {
        let (ahead, right) = Geometry::heading_up_offset(0.0, 100.0, 90.0);
        assert!(close(ahead, 100.0));
        assert!(close(right, 0.0));

        let (ahead, right) = Geometry::heading_up_offset(100.0, 0.0, 90.0);
        assert!(close(ahead, 0.0));
        assert!(close(right, -100.0));
    }
}
