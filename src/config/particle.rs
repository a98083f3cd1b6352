use serde::{Deserialize, Serialize};

use crate::particle::ParticleShape;

/// Apparence de base des particules générées depuis le buffer de pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Taille de base (pixels)
    pub size: f32,
    /// Variation relative de taille : taille ∈ [size·(1−v), size·(1+v)]
    pub size_variation: f32,
    pub shape: ParticleShape,
    /// Norme de la vitesse initiale (unités de déplacement normalisées)
    pub velocity_magnitude: f32,
    /// Teinte optionnelle (RGBA, [0,1]) mélangée aux couleurs d'origine
    pub tint: Option<[f32; 4]>,
    /// Force du mélange avec la teinte (0 = couleurs d'origine, 1 = teinte pure)
    pub tint_strength: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            size: 4.0,
            size_variation: 0.3,
            shape: ParticleShape::Circle,
            velocity_magnitude: 0.5,
            tint: None,
            tint_strength: 0.3,
        }
    }
}

impl ParticleConfig {
    pub fn explosive() -> Self {
        Self {
            size: 3.0,
            velocity_magnitude: 1.5,
            ..Self::default()
        }
    }

    pub fn gentle() -> Self {
        Self {
            size: 5.0,
            velocity_magnitude: 0.3,
            ..Self::default()
        }
    }

    pub fn squared() -> Self {
        Self {
            shape: ParticleShape::Square,
            velocity_magnitude: 0.6,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.size.is_finite() && self.size > 0.0,
            "particle.size must be > 0 (got {})",
            self.size
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.size_variation),
            "particle.size_variation must be in [0, 1) (got {})",
            self.size_variation
        );
        anyhow::ensure!(
            self.velocity_magnitude.is_finite() && self.velocity_magnitude >= 0.0,
            "particle.velocity_magnitude must be >= 0 (got {})",
            self.velocity_magnitude
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.tint_strength),
            "particle.tint_strength must be in [0, 1] (got {})",
            self.tint_strength
        );
        Ok(())
    }
}
