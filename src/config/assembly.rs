use serde::{Deserialize, Serialize};

/// Paramètres physiques de l'effet d'assemblage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Distance de départ (pixels) tirée uniformément dans [min, max]
    pub start_distance_min: f32,
    pub start_distance_max: f32,

    pub initial_alpha: f32,
    pub initial_scale: f32,
    pub final_scale: f32,
    pub fade_in_rate: f32,
    pub rotation_speed: f32,

    pub oscillation_strength: f32,
    pub oscillation_frequency: f32,
    pub turbulence_strength: f32,

    pub alpha_variation_range: f32,
    pub scale_variation_range: f32,
    pub rotation_variation_range: f32,

    /// Recalage final sur la cible
    pub snap_distance: f32,
    pub snap_progress: f32,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            start_distance_min: 150.0,
            start_distance_max: 300.0,
            initial_alpha: 0.3,
            initial_scale: 0.5,
            final_scale: 1.0,
            fade_in_rate: 1.0,
            rotation_speed: 1.0,
            oscillation_strength: 0.3,
            oscillation_frequency: 4.0,
            turbulence_strength: 0.2,
            alpha_variation_range: 0.3,
            scale_variation_range: 0.25,
            rotation_variation_range: 0.5,
            snap_distance: 5.0,
            snap_progress: 0.95,
        }
    }
}

impl AssemblyConfig {
    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.start_distance_max.is_finite()
                && self.start_distance_min >= 0.0
                && self.start_distance_min <= self.start_distance_max,
            "assembly start distance range is invalid ({}..{})",
            self.start_distance_min,
            self.start_distance_max
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.initial_alpha),
            "assembly.initial_alpha must be in [0, 1] (got {})",
            self.initial_alpha
        );
        anyhow::ensure!(
            self.snap_distance > 0.0,
            "assembly.snap_distance must be > 0"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.snap_progress),
            "assembly.snap_progress must be in [0, 1) (got {})",
            self.snap_progress
        );
        for (name, value) in [
            ("alpha_variation_range", self.alpha_variation_range),
            ("scale_variation_range", self.scale_variation_range),
            ("rotation_variation_range", self.rotation_variation_range),
        ] {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "assembly.{name} must be finite and >= 0 (got {value})"
            );
        }
        Ok(())
    }
}
