//! Easing functions
//!
//! Every built-in curve is monotonic with `apply(0) == 0` and
//! `apply(1) == 1`, so a counter never displays a value outside
//! `[start, end]`. There are no overshooting curves (back, elastic, bounce).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

/// Caller-supplied easing curve
///
/// The function receives linear progress in `[0, 1]` and must be monotonic
/// with `f(0) == 0` and `f(1) == 1`.
#[derive(Clone)]
pub struct CustomEasing(Rc<dyn Fn(f64) -> f64>);

impl CustomEasing {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        Self(Rc::new(f))
    }
}

impl fmt::Debug for CustomEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomEasing(..)")
    }
}

/// Animation easing function
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed
    Linear,
    /// Slow start, fast end
    EaseIn,
    /// Fast start, slow end
    EaseOut,
    /// Slow start, fast middle, slow end
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    /// `1 - (1 - t)^3`, the classic count-up curve
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInCirc,
    EaseOutCirc,
    /// CSS-style cubic bezier `(x1, y1, x2, y2)`
    ///
    /// Monotonic only when both y control points lie in `[0, 1]`.
    CubicBezier(f64, f64, f64, f64),
    /// Caller-supplied curve (not serializable)
    #[serde(skip)]
    Custom(CustomEasing),
}

impl Easing {
    /// Wrap a caller-supplied curve
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        Easing::Custom(CustomEasing::new(f))
    }

    /// Apply the curve to linear progress
    ///
    /// Input is clamped to `[0, 1]`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn | Easing::EaseInQuad => t * t,
            Easing::EaseOut | Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut | Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f64.powf(10.0 * t - 10.0)
                }
            }
            Easing::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
            Easing::EaseInOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Easing::EaseInCirc => 1.0 - (1.0 - t * t).sqrt(),
            Easing::EaseOutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_sample(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => (f.0)(t),
        }
    }

    /// Look up a named curve, e.g. `"ease_out_cubic"` or `"linear"`
    pub fn from_name(name: &str) -> Option<Self> {
        let easing = match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "linear" => Easing::Linear,
            "ease_in" => Easing::EaseIn,
            "ease_out" => Easing::EaseOut,
            "ease_in_out" => Easing::EaseInOut,
            "ease_in_quad" => Easing::EaseInQuad,
            "ease_out_quad" => Easing::EaseOutQuad,
            "ease_in_out_quad" => Easing::EaseInOutQuad,
            "ease_in_cubic" => Easing::EaseInCubic,
            "ease_out_cubic" => Easing::EaseOutCubic,
            "ease_in_out_cubic" => Easing::EaseInOutCubic,
            "ease_in_quart" => Easing::EaseInQuart,
            "ease_out_quart" => Easing::EaseOutQuart,
            "ease_in_out_quart" => Easing::EaseInOutQuart,
            "ease_in_sine" => Easing::EaseInSine,
            "ease_out_sine" => Easing::EaseOutSine,
            "ease_in_out_sine" => Easing::EaseInOutSine,
            "ease_in_expo" => Easing::EaseInExpo,
            "ease_out_expo" => Easing::EaseOutExpo,
            "ease_in_out_expo" => Easing::EaseInOutExpo,
            "ease_in_circ" => Easing::EaseInCirc,
            "ease_out_circ" => Easing::EaseOutCirc,
            _ => return None,
        };
        Some(easing)
    }
}

/// Sample a cubic bezier curve at time t
fn cubic_bezier_sample(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Newton-Raphson on x(s) = t, falling back to bisection when the slope
    // flattens out
    let mut s = t;
    for _ in 0..8 {
        let x = cubic_bezier_value(s, x1, x2) - t;
        if x.abs() < 1e-7 {
            return cubic_bezier_value(s, y1, y2);
        }
        let dx = cubic_bezier_derivative(s, x1, x2);
        if dx.abs() < 1e-6 {
            break;
        }
        s -= x / dx;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..32 {
        let x = cubic_bezier_value(s, x1, x2);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }

    cubic_bezier_value(s, y1, y2)
}

fn cubic_bezier_value(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn cubic_bezier_derivative(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curves() -> Vec<Easing> {
        vec![
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::EaseInOutQuad,
            Easing::EaseInCubic,
            Easing::EaseOutCubic,
            Easing::EaseInOutCubic,
            Easing::EaseOutQuart,
            Easing::EaseInOutSine,
            Easing::EaseInExpo,
            Easing::EaseOutExpo,
            Easing::EaseInOutExpo,
            Easing::EaseInCirc,
            Easing::EaseOutCirc,
            Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
        ]
    }

    #[test]
    fn test_boundaries() {
        for easing in &curves() {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_monotonic() {
        for easing in &curves() {
            let mut prev = easing.apply(0.0);
            for i in 1..=200 {
                let value = easing.apply(i as f64 / 200.0);
                assert!(value + 1e-6 >= prev, "{:?} decreased at step {}", easing, i);
                prev = value;
            }
        }
    }

    #[test]
    fn test_ease_out_cubic_values() {
        let easing = Easing::default();
        assert!((easing.apply(0.25) - 0.578125).abs() < 1e-12);
        assert!((easing.apply(0.5) - 0.875).abs() < 1e-12);
        assert!((easing.apply(0.75) - 0.984375).abs() < 1e-12);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
    }

    #[test]
    fn test_custom_easing() {
        let step = Easing::custom(|t| if t < 1.0 { 0.0 } else { 1.0 });
        assert_eq!(step.apply(0.9), 0.0);
        assert_eq!(step.apply(1.0), 1.0);
    }

    #[test]
    fn test_from_name() {
        assert!(matches!(
            Easing::from_name("ease-out-cubic"),
            Some(Easing::EaseOutCubic)
        ));
        assert!(matches!(Easing::from_name("Linear"), Some(Easing::Linear)));
        assert!(Easing::from_name("spring").is_none());
    }
}
