//! Easing curves for camera transitions and marker entrance fades.

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity.
    #[default]
    Linear,
    /// Stronger slow end.
    CubicOut,
    /// Stronger slow start and end.
    CubicInOut,
}

impl Easing {
    /// Applies the curve to a normalized time `t`, clamped to [0, 1].
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 3] = [
        Easing::Linear,
        Easing::CubicOut,
        Easing::CubicInOut,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-9, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_input_is_clamped() {
        for easing in ALL {
            assert!(easing.apply(-3.0).abs() < 1e-9);
            assert!((easing.apply(7.0) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cubic_in_out_is_symmetric() {
        let e = Easing::CubicInOut;
        assert!((e.apply(0.5) - 0.5).abs() < 1e-9);
        for i in 0..10 {
            let t = i as f64 / 10.0;
            assert!((e.apply(t) + e.apply(1.0 - t) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut last = 0.0;
            for i in 1..=100 {
                let v = easing.apply(i as f64 / 100.0);
                assert!(v >= last);
                last = v;
            }
        }
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert!((lerp(-4.0, 4.0, 0.25) + 2.0).abs() < 1e-9);
    }
}
