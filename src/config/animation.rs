// =========================
// Animation Configuration
// =========================

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::animation::Easing;

/// Timing global de l'animation et variations visuelles par particule.
///
/// Construction validée via le builder :
///
/// ```
/// use particlize_sim::config::AnimationConfigBuilder;
///
/// let config = AnimationConfigBuilder::default()
///     .duration_ms(1500)
///     .repeat_count(-1)
///     .build()
///     .unwrap();
/// assert_eq!(config.duration_ms, 1500);
/// ```
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
#[builder(
    pattern = "owned",
    default,
    build_fn(error = "anyhow::Error", validate = "Self::validate")
)]
#[serde(default)]
pub struct AnimationConfig {
    /// Durée d'un cycle (ms), strictement positive
    pub duration_ms: u64,
    pub easing: Easing,
    /// 0 = un seul cycle, n > 0 = n répétitions, -1 = infini
    pub repeat_count: i32,

    /// Décalage temporel aléatoire par particule
    pub randomize_timings: bool,
    pub timing_variation: f32,
    /// Facteur d'alpha aléatoire ∈ [1 − v, 1 + v]
    pub randomize_alpha: bool,
    pub alpha_variation: f32,
    /// Facteur d'échelle aléatoire ∈ [1 − v, 1 + v]
    pub randomize_scale: bool,
    pub scale_variation: f32,

    pub add_oscillation: bool,
    pub oscillation_strength: f32,
    pub oscillation_frequency: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            easing: Easing::Linear,
            repeat_count: 0,
            randomize_timings: true,
            timing_variation: 0.2,
            randomize_alpha: true,
            alpha_variation: 0.2,
            randomize_scale: true,
            scale_variation: 0.15,
            add_oscillation: false,
            oscillation_strength: 0.2,
            oscillation_frequency: 3.0,
        }
    }
}

impl AnimationConfig {
    pub fn quick() -> Self {
        Self {
            duration_ms: 500,
            easing: Easing::FastOutSlowIn,
            ..Self::default()
        }
    }

    pub fn dramatic() -> Self {
        Self {
            duration_ms: 1500,
            easing: Easing::FastOutSlowIn,
            timing_variation: 0.3,
            alpha_variation: 0.3,
            scale_variation: 0.2,
            ..Self::default()
        }
    }

    pub fn organic() -> Self {
        Self {
            duration_ms: 2000,
            easing: Easing::FastOutSlowIn,
            timing_variation: 0.4,
            alpha_variation: 0.3,
            scale_variation: 0.2,
            add_oscillation: true,
            oscillation_strength: 0.3,
            oscillation_frequency: 2.0,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        check_animation(
            self.duration_ms,
            self.repeat_count,
            self.timing_variation,
            self.alpha_variation,
            self.scale_variation,
        )
    }
}

impl AnimationConfigBuilder {
    fn validate(&self) -> anyhow::Result<()> {
        let defaults = AnimationConfig::default();
        check_animation(
            self.duration_ms.unwrap_or(defaults.duration_ms),
            self.repeat_count.unwrap_or(defaults.repeat_count),
            self.timing_variation.unwrap_or(defaults.timing_variation),
            self.alpha_variation.unwrap_or(defaults.alpha_variation),
            self.scale_variation.unwrap_or(defaults.scale_variation),
        )
    }
}

fn check_animation(
    duration_ms: u64,
    repeat_count: i32,
    timing_variation: f32,
    alpha_variation: f32,
    scale_variation: f32,
) -> anyhow::Result<()> {
    anyhow::ensure!(duration_ms > 0, "animation.duration_ms must be > 0");
    anyhow::ensure!(
        repeat_count >= -1,
        "animation.repeat_count must be >= -1 (got {repeat_count})"
    );
    for (name, value) in [
        ("timing_variation", timing_variation),
        ("alpha_variation", alpha_variation),
        ("scale_variation", scale_variation),
    ] {
        anyhow::ensure!(
            (0.0..=1.0).contains(&value),
            "animation.{name} must be in [0, 1] (got {value})"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_uses_struct_defaults() {
        let config = AnimationConfigBuilder::default().build().unwrap();
        assert_eq!(config.duration_ms, 1000);
        assert!(config.randomize_timings);
    }

    #[test]
    fn builder_rejects_zero_duration() {
        let err = AnimationConfigBuilder::default()
            .duration_ms(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duration_ms"));
    }

    #[test]
    fn builder_rejects_repeat_below_infinite() {
        assert!(AnimationConfigBuilder::default()
            .repeat_count(-2)
            .build()
            .is_err());
    }

    #[test]
    fn presets_are_valid() {
        for preset in [
            AnimationConfig::quick(),
            AnimationConfig::dramatic(),
            AnimationConfig::organic(),
        ] {
            preset.validate().unwrap();
        }
    }
}
