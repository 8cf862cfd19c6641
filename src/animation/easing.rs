//! Easing curves used by timeline actions.

use std::f32::consts::PI;

/// Elastic ease-in-out.
///
/// Exact at the endpoints: `f(0) == 0` and `f(1) == 1`, with a damped
/// oscillation through the middle of the range. Inputs outside `[0, 1]`
/// should be clamped by the caller.
#[must_use]
pub fn elastic_in_out(t: f32) -> f32 {
    const C5: f32 = (2.0 * PI) / 4.5;

    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else if t < 0.5 {
        -(2.0_f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0
    } else {
        (2.0_f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0 + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::elastic_in_out;

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(elastic_in_out(0.0), 0.0);
        assert_eq!(elastic_in_out(1.0), 1.0);
    }

    #[test]
    fn midpoint_is_half() {
        // Both branches meet at t = 0.5.
        let v = elastic_in_out(0.5);
        assert!((v - 0.5).abs() < 1e-4, "expected ~0.5, got {v}");
    }
}
