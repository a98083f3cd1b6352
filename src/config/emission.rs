use serde::{Deserialize, Serialize};

/// Mode d'émission : tout d'un coup, ou selon un motif spatial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionType {
    Instant,
    #[default]
    Patterned,
}

/// Motif spatial qui ordonne l'activation des particules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionPattern {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
    CenterOut,
    OutsideIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionConfig {
    #[serde(rename = "type")]
    pub emission_type: EmissionType,
    pub pattern: EmissionPattern,
    /// Nombre cible de particules, fixe aussi la capacité du stockage
    pub particle_count: usize,
    /// Fraction de la durée consacrée à l'émission, dans [0, 1]
    pub duration_factor: f32,

    // Options de randomisation appliquées à la génération
    pub randomize_delays: bool,
    pub random_sizes: bool,
    pub random_alphas: bool,
    pub randomize_colors: bool,
    pub random_rotations: bool,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            emission_type: EmissionType::Patterned,
            pattern: EmissionPattern::LeftToRight,
            particle_count: 10_000,
            duration_factor: 1.0,
            randomize_delays: false,
            random_sizes: false,
            random_alphas: false,
            randomize_colors: false,
            random_rotations: false,
        }
    }
}

impl EmissionConfig {
    pub fn instant_explosion() -> Self {
        Self {
            emission_type: EmissionType::Instant,
            particle_count: 8_000,
            ..Self::default()
        }
    }

    pub fn left_to_right_wave() -> Self {
        Self {
            pattern: EmissionPattern::LeftToRight,
            particle_count: 12_000,
            ..Self::default()
        }
    }

    pub fn center_out_burst() -> Self {
        Self {
            pattern: EmissionPattern::CenterOut,
            duration_factor: 0.8,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.particle_count >= 1,
            "emission.particle_count must be >= 1"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.duration_factor),
            "emission.duration_factor must be in [0, 1] (got {})",
            self.duration_factor
        );
        Ok(())
    }
}
