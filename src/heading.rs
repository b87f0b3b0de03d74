// src/heading.rs
//! Compass heading readout

const CARDINALS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Fold any finite angle into [0, 360)
pub fn normalize_heading(degrees: f32) -> f32 {
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if folded >= 360.0 {
        0.0
    } else {
        folded
    }
}

/// Azimuth of a rotation-vector sensor reading.
///
/// `vector` holds the quaternion's x, y, z components and optionally the
/// scalar part; a missing scalar is rebuilt from the unit-norm constraint.
/// The rotation matrix follows the device-to-world convention, so the
/// azimuth is `atan2(R[0][1], R[1][1])`.
pub fn heading_from_rotation_vector(vector: &[f32]) -> Option<f32> {
    if vector.len() < 3 {
        return None;
    }
    let (q1, q2, q3) = (vector[0], vector[1], vector[2]);
    let q0 = match vector.get(3) {
        Some(w) => *w,
        None => (1.0 - q1 * q1 - q2 * q2 - q3 * q3).max(0.0).sqrt(),
    };

    let r01 = 2.0 * q1 * q2 - 2.0 * q3 * q0;
    let r11 = 1.0 - 2.0 * q1 * q1 - 2.0 * q3 * q3;
    let azimuth = r01.atan2(r11).to_degrees();

    azimuth.is_finite().then(|| normalize_heading(azimuth))
}

/// 8-point compass name for a heading
pub fn cardinal_name(degrees: f32) -> &'static str {
    let sector = ((normalize_heading(degrees) + 22.5) / 45.0) as usize % 8;
    CARDINALS[sector]
}

pub fn heading_text(degrees: f32) -> String {
    format!("Heading: {:.1}° {}", normalize_heading(degrees), cardinal_name(degrees))
}
