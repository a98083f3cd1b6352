use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Signature d'une courbe fournie par l'appelant : faillible, définie sur [0,1].
pub type EasingFn = dyn Fn(f32) -> anyhow::Result<f32> + Send + Sync;

/// Courbe externe. Une erreur ou une valeur non finie déclenche le repli
/// sur [`Easing::FALLBACK`]. Une panique n'est pas interceptée.
#[derive(Clone)]
pub struct CustomEasing {
    curve: Arc<EasingFn>,
    warned: Arc<AtomicBool>,
}

impl CustomEasing {
    pub fn new<F>(curve: F) -> Self
    where
        F: Fn(f32) -> anyhow::Result<f32> + Send + Sync + 'static,
    {
        Self {
            curve: Arc::new(curve),
            warned: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl fmt::Debug for CustomEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomEasing(..)")
    }
}

/// Courbes d'interpolation de la progression globale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    /// Bézier (0.4, 0, 0.2, 1)
    FastOutSlowIn,
    /// Bézier (0.42, 0, 0.58, 1)
    EaseInOut,
    QuadInOut,
    CubicInOut,
    CubicBezier {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    #[serde(skip)]
    Custom(CustomEasing),
}

impl Easing {
    /// Courbe de repli utilisée quand une courbe externe échoue.
    pub const FALLBACK: Easing = Easing::EaseInOut;

    pub fn custom<F>(curve: F) -> Self
    where
        F: Fn(f32) -> anyhow::Result<f32> + Send + Sync + 'static,
    {
        Easing::Custom(CustomEasing::new(curve))
    }

    /// Applique la courbe à `t` (borné à [0,1]). Total : ne renvoie jamais d'erreur.
    pub fn transform(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Easing::QuadInOut => quad_in_out(t),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
            Easing::Custom(custom) => match (custom.curve)(t) {
                Ok(value) if value.is_finite() => value,
                outcome => {
                    if !custom.warned.swap(true, Ordering::Relaxed) {
                        match outcome {
                            Err(e) => warn!("⚠️ Custom easing failed ({e}), using ease-in-out"),
                            Ok(value) => {
                                warn!("⚠️ Custom easing returned {value}, using ease-in-out")
                            }
                        }
                    }
                    Self::FALLBACK.transform(t)
                }
            },
        }
    }
}

/// `p < 0.5 → 2p²`, sinon `1 − (−2p + 2)² / 2`.
#[inline]
pub fn quad_in_out(p: f32) -> f32 {
    if p < 0.5 {
        2.0 * p * p
    } else {
        let q = -2.0 * p + 2.0;
        1.0 - q * q / 2.0
    }
}

/// Bézier cubique (0,0) → (x1,y1) → (x2,y2) → (1,1), évaluée en x = t.
///
/// x(s) est inversé par Newton puis dichotomie si la dérivée s'annule.
pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let bezier = |a: f32, b: f32, s: f32| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a + 3.0 * inv * s * s * b + s * s * s
    };
    let bezier_dx = |s: f32| {
        let inv = 1.0 - s;
        3.0 * inv * inv * x1 + 6.0 * inv * s * (x2 - x1) + 3.0 * s * s * (1.0 - x2)
    };

    let mut s = t;
    for _ in 0..8 {
        let err = bezier(x1, x2, s) - t;
        if err.abs() < 1e-6 {
            return bezier(y1, y2, s);
        }
        let d = bezier_dx(s);
        if d.abs() < 1e-6 {
            break;
        }
        s = (s - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = t;
    for _ in 0..32 {
        let x = bezier(x1, x2, s);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = 0.5 * (lo + hi);
    }
    bezier(y1, y2, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_hit_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::FastOutSlowIn,
            Easing::EaseInOut,
            Easing::QuadInOut,
            Easing::CubicInOut,
        ] {
            assert!(easing.transform(0.0).abs() < 1e-4, "{easing:?} at 0");
            assert!((easing.transform(1.0) - 1.0).abs() < 1e-4, "{easing:?} at 1");
        }
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        let e = Easing::EaseInOut;
        assert!((e.transform(0.5) - 0.5).abs() < 1e-3);
        assert!((e.transform(0.25) + e.transform(0.75) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn failing_custom_curve_falls_back() {
        let failing = Easing::custom(|_| anyhow::bail!("boom"));
        for t in [0.1, 0.5, 0.9] {
            assert_eq!(failing.transform(t), Easing::FALLBACK.transform(t));
        }
    }

    #[test]
    fn non_finite_custom_curve_falls_back() {
        let nan = Easing::custom(|_| Ok(f32::NAN));
        assert_eq!(nan.transform(0.3), Easing::FALLBACK.transform(0.3));
    }

    #[test]
    fn custom_curve_may_overshoot() {
        let overshoot = Easing::custom(|t| Ok(t * 1.2));
        assert!((overshoot.transform(1.0) - 1.2).abs() < 1e-6);
    }
}
