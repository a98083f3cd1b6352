use serde::{Deserialize, Serialize};

/// Type de champ de force radial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceFieldType {
    /// Attire vers le centre
    Attract,
    /// Repousse depuis le centre
    #[default]
    Repel,
    /// Mise en orbite autour du centre
    Orbit,
}

/// Comportement aux bords de la zone de contenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryBehavior {
    #[default]
    None,
    Bounce,
    Wrap,
    Destroy,
}

/// Paramètres physiques de l'effet de désintégration.
///
/// Les positions (`vortex_position`, `force_field_position`) sont en coordonnées
/// normalisées [0,1] relatives au contenu ; les angles sont en degrés
/// (0 = droite, 90 = bas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisintegrationConfig {
    pub gravity: f32,

    // Explosion
    pub explosion_strength: f32,
    /// Fraction de la progression pendant laquelle le surplus d'explosion agit
    pub explosion_duration: f32,
    /// Surplus de vitesse en début d'explosion (×(1 + burst) à p = 0)
    pub explosion_burst: f32,
    /// 0 = omnidirectionnel, 1 = entièrement dirigé par `explosion_direction`
    pub explosion_directionality: f32,
    pub explosion_direction: f32,

    // Vent
    pub wind_enabled: bool,
    pub wind_strength: f32,
    pub wind_direction: f32,
    pub wind_gustiness: f32,

    // Vortex
    pub vortex_enabled: bool,
    pub vortex_strength: f32,
    pub vortex_position: [f32; 2],
    pub vortex_radius: f32,
    pub vortex_decay: f32,
    /// 1 = horaire, -1 = anti-horaire
    pub vortex_direction: f32,

    // Champ de force
    pub force_field_enabled: bool,
    pub force_field_strength: f32,
    pub force_field_position: [f32; 2],
    pub force_field_radius: f32,
    pub force_field_type: ForceFieldType,

    // Bords
    pub boundary_behavior: BoundaryBehavior,
    pub boundary_elasticity: f32,

    // Visuel
    pub rotation_speed: f32,
    pub scale_down_factor: f32,
    pub fade_out_rate: f32,

    // Turbulence et plages aléatoires
    pub turbulence_strength: f32,
    pub turbulence_frequency: f32,
    pub alpha_variation_range: f32,
    pub scale_variation_range: f32,
    pub lifespan_variation_range: f32,
    pub rotation_variation_range: f32,
}

impl Default for DisintegrationConfig {
    fn default() -> Self {
        Self {
            gravity: 0.2,
            explosion_strength: 1.0,
            explosion_duration: 0.3,
            explosion_burst: 1.0,
            explosion_directionality: 0.0,
            explosion_direction: 270.0,
            wind_enabled: false,
            wind_strength: 0.5,
            wind_direction: 0.0,
            wind_gustiness: 0.2,
            vortex_enabled: false,
            vortex_strength: 0.5,
            vortex_position: [0.5, 0.5],
            vortex_radius: 0.3,
            vortex_decay: 2.0,
            vortex_direction: 1.0,
            force_field_enabled: false,
            force_field_strength: 1.0,
            force_field_position: [0.5, 0.5],
            force_field_radius: 0.5,
            force_field_type: ForceFieldType::Repel,
            boundary_behavior: BoundaryBehavior::None,
            boundary_elasticity: 0.5,
            rotation_speed: 1.0,
            scale_down_factor: 0.3,
            fade_out_rate: 1.0,
            turbulence_strength: 0.15,
            turbulence_frequency: 5.0,
            alpha_variation_range: 0.3,
            scale_variation_range: 0.4,
            lifespan_variation_range: 0.2,
            rotation_variation_range: 0.5,
        }
    }
}

impl DisintegrationConfig {
    /// Toutes les forces optionnelles coupées : explosion pure.
    pub fn calm() -> Self {
        Self {
            gravity: 0.0,
            turbulence_strength: 0.0,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.explosion_duration > 0.0 && self.explosion_duration <= 1.0,
            "disintegration.explosion_duration must be in (0, 1] (got {})",
            self.explosion_duration
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.explosion_directionality),
            "disintegration.explosion_directionality must be in [0, 1] (got {})",
            self.explosion_directionality
        );
        anyhow::ensure!(
            self.explosion_strength.is_finite() && self.explosion_strength >= 0.0,
            "disintegration.explosion_strength must be >= 0 (got {})",
            self.explosion_strength
        );
        anyhow::ensure!(
            self.vortex_radius > 0.0 && self.force_field_radius > 0.0,
            "disintegration radii must be > 0"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.lifespan_variation_range),
            "disintegration.lifespan_variation_range must be in [0, 1) (got {})",
            self.lifespan_variation_range
        );
        anyhow::ensure!(
            self.fade_out_rate >= 0.0,
            "disintegration.fade_out_rate must be >= 0 (got {})",
            self.fade_out_rate
        );
        // bornes des tirages aléatoires de `prepare`
        for (name, value) in [
            ("alpha_variation_range", self.alpha_variation_range),
            ("scale_variation_range", self.scale_variation_range),
            ("rotation_variation_range", self.rotation_variation_range),
        ] {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "disintegration.{name} must be finite and >= 0 (got {value})"
            );
        }
        Ok(())
    }
}
